use vantage_geometry::{Point, Size};

use crate::fonts::{FontInstance, GlyphQuad};

/// Horizontal alignment of one line within a multi-line label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub alignment: TextAlignment,
}

/// Multi-line text with per-line alignment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributedText {
    lines: Vec<Line>,
}

impl AttributedText {
    /// Splits `text` into left-aligned lines.
    pub fn plain(text: &str) -> Self {
        Self::aligned(text, TextAlignment::Left)
    }

    pub fn aligned(text: &str, alignment: TextAlignment) -> Self {
        Self {
            lines: text
                .lines()
                .map(|line| Line {
                    text: line.to_string(),
                    alignment,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn with_line(mut self, text: &str, alignment: TextAlignment) -> Self {
        self.lines.push(Line {
            text: text.to_string(),
            alignment,
        });
        self
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// True when no line contains visible characters.
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.text.trim().is_empty())
    }

    /// Width of the widest line times the stacked line heights.
    pub fn measure(&self, font: &FontInstance) -> Size {
        let width = self
            .lines
            .iter()
            .map(|line| font.measure_line(&line.text).width)
            .fold(0.0, f64::max);
        Size::new(width, self.lines.len() as f64 * font.line_height())
    }

    /// Glyph quads for all lines, laid out from the text's own origin (0, 0).
    /// The caller translates them to the label's final screen position.
    pub fn quads(&self, font: &FontInstance) -> Vec<GlyphQuad> {
        let total_width = self.measure(font).width;
        let mut quads = Vec::new();
        let mut top = 0.0;
        for line in &self.lines {
            let line_width = font.measure_line(&line.text).width;
            let left = match line.alignment {
                TextAlignment::Left => 0.0,
                // Whole-pixel placement keeps glyph edges crisp.
                TextAlignment::Center => ((total_width - line_width) / 2.0).floor(),
                TextAlignment::Right => total_width - line_width,
            };
            quads.extend(font.line_quads(&line.text, Point::new(left, top)));
            top += font.line_height();
        }
        quads
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;
    use crate::{
        fonts::{FontDescriptor, FontLoader},
        headless::FixedMetricsLoader,
    };

    fn font() -> Result<FontInstance> {
        FixedMetricsLoader::default().load(&FontDescriptor::new("fonts/test.ttf", 16))
    }

    #[test]
    fn plain_splits_lines() {
        let text = AttributedText::plain("one\ntwo");
        assert_eq!(text.lines().len(), 2);
        assert_eq!(text.lines()[1].text, "two");
        assert_eq!(text.lines()[1].alignment, TextAlignment::Left);
    }

    #[test]
    fn blankness_ignores_whitespace() {
        assert!(AttributedText::plain("").is_blank());
        assert!(AttributedText::plain("  \n\t").is_blank());
        assert!(!AttributedText::plain(" x ").is_blank());
    }

    #[test]
    fn measures_widest_line_and_stacked_heights() -> Result<()> {
        let font = font()?;
        let text = AttributedText::plain("ab\nabcd\nc");
        assert_eq!(text.measure(&font), Size::new(40.0, 48.0));
        Ok(())
    }

    #[test]
    fn centered_line_is_floored_to_whole_pixels() -> Result<()> {
        let font = font()?;
        let text = AttributedText::default()
            .with_line("abc", TextAlignment::Left)
            .with_line("ab", TextAlignment::Center);
        let quads = text.quads(&font);
        // Three glyphs in the first line, two in the second.
        assert_eq!(quads.len(), 5);
        // (30 - 20) / 2 = 5, already whole.
        assert_eq!(quads[3].rect.left, 5.0);
        // Second line starts one line height down.
        assert_eq!(quads[3].rect.top, 16.0);
        Ok(())
    }

    #[test]
    fn right_alignment_ends_at_the_total_width() -> Result<()> {
        let font = font()?;
        let text = AttributedText::default()
            .with_line("abcd", TextAlignment::Left)
            .with_line("ab", TextAlignment::Right);
        let quads = text.quads(&font);
        assert_eq!(quads[4].rect.left, 20.0);
        Ok(())
    }
}
