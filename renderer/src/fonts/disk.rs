//! Loads font files from disk and computes glyph metrics and atlas
//! placements with `ab_glyph` and `etagere`.

use std::{collections::HashMap, fs};

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use anyhow::{Context, Result};
use etagere::{AtlasAllocator, size2};
use log::warn;
use vantage_geometry::Rect;

use crate::gpu::TextureId;

use super::{FontDescriptor, FontInstance, FontLoader, Glyph};

const DEFAULT_ATLAS_SIZE: i32 = 1024;

/// Reads TrueType / OpenType files and produces one atlas layout per
/// descriptor. Texture contents are the graphics backend's business; this
/// loader decides where each glyph goes and hands the backend a fresh
/// texture id to fill.
pub struct DiskFontLoader {
    charset: Vec<char>,
    atlas_size: i32,
    next_texture: u32,
}

impl Default for DiskFontLoader {
    fn default() -> Self {
        Self {
            charset: (' '..='~').collect(),
            atlas_size: DEFAULT_ATLAS_SIZE,
            next_texture: 0,
        }
    }
}

impl DiskFontLoader {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_charset(mut self, charset: impl IntoIterator<Item = char>) -> Self {
        self.charset = charset.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_atlas_size(mut self, atlas_size: i32) -> Self {
        self.atlas_size = atlas_size;
        self
    }
}

impl FontLoader for DiskFontLoader {
    fn load(&mut self, descriptor: &FontDescriptor) -> Result<FontInstance> {
        let bytes = fs::read(descriptor.path())
            .with_context(|| format!("Reading font file {}", descriptor.path().display()))?;
        let font = FontVec::try_from_vec(bytes)
            .with_context(|| format!("Parsing font file {}", descriptor.path().display()))?;

        let scale = PxScale::from(descriptor.size() as f32);
        let scaled = font.as_scaled(scale);
        let ascent = scaled.ascent() as f64;
        let line_height = (scaled.height() + scaled.line_gap()) as f64;

        let mut atlas = AtlasAllocator::new(size2(self.atlas_size, self.atlas_size));
        let mut glyphs = HashMap::new();
        for &c in &self.charset {
            let glyph_id = font.glyph_id(c);
            let advance = scaled.h_advance(glyph_id) as f64;

            let Some(outlined) = font.outline_glyph(glyph_id.with_scale(scale)) else {
                // No outline (e.g. whitespace): advances the pen, draws nothing.
                glyphs.insert(
                    c,
                    Glyph {
                        advance,
                        bounds: Rect::ZERO,
                        uv: Rect::ZERO,
                    },
                );
                continue;
            };

            let px_bounds = outlined.px_bounds();
            let width = px_bounds.width().ceil() as i32;
            let height = px_bounds.height().ceil() as i32;
            let Some(allocation) = atlas.allocate(size2(width, height)) else {
                warn!(
                    "Atlas full ({}x{}), skipping '{}' of {}",
                    self.atlas_size,
                    self.atlas_size,
                    c,
                    descriptor.path().display()
                );
                continue;
            };

            let slot = allocation.rectangle;
            let uv = Rect::from((
                slot.min.x as f64 / self.atlas_size as f64,
                slot.min.y as f64 / self.atlas_size as f64,
                (slot.min.x + width) as f64 / self.atlas_size as f64,
                (slot.min.y + height) as f64 / self.atlas_size as f64,
            ));
            // px_bounds is already relative to the pen position on the
            // baseline, y down, which is our glyph bounds convention.
            let bounds = Rect::from((
                px_bounds.min.x as f64,
                px_bounds.min.y as f64,
                px_bounds.max.x as f64,
                px_bounds.max.y as f64,
            ));

            glyphs.insert(
                c,
                Glyph {
                    advance,
                    bounds,
                    uv,
                },
            );
        }

        let texture = TextureId(self.next_texture);
        self.next_texture += 1;
        Ok(FontInstance::new(texture, ascent, line_height, glyphs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_font_file_is_an_error() {
        let mut loader = DiskFontLoader::new();
        let result = loader.load(&FontDescriptor::new("does/not/exist.ttf", 16));
        assert!(result.is_err());
    }
}
