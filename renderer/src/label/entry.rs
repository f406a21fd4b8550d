use anyhow::Result;
use vantage_geometry::{Camera, Color, Contains, Point, Projection, Rect, Size, Vector};

use crate::{
    config::RenderPrefs,
    fonts::{FontCatalog, FontDescriptor, GlyphQuad},
};

use super::{AttributedText, LabelAnchor};

/// Zoom range over which 2D labels fade in above their minimum zoom.
const ZOOM_FADE_WINDOW: f64 = 0.3;

/// One label for one frame: its text, anchor, and style, plus the screen
/// placement computed by [`LabelEntry::setup`].
pub struct LabelEntry<'frame> {
    text: AttributedText,
    anchor: &'frame dyn LabelAnchor,
    font: FontDescriptor,
    foreground: Color,
    background: Color,
    inset: Vector,
    on_top: bool,
    min_zoom: f64,
    max_view_distance: Option<f64>,
    exact_viewport_measure: bool,

    // Computed by setup.
    prepared: bool,
    valid: bool,
    distance: f64,
    size: Size,
    position: Point,
    alpha: f32,
    quads: Vec<GlyphQuad>,
}

impl<'frame> LabelEntry<'frame> {
    pub fn new(text: AttributedText, anchor: &'frame dyn LabelAnchor, font: FontDescriptor) -> Self {
        Self {
            text,
            anchor,
            font,
            foreground: Color::WHITE,
            background: Color::BLACK.with_alpha(0.6),
            inset: Vector::new(4.0, 4.0),
            on_top: false,
            min_zoom: 0.0,
            max_view_distance: None,
            exact_viewport_measure: false,
            prepared: false,
            valid: false,
            distance: 0.0,
            size: Size::ZERO,
            position: Point::ZERO,
            alpha: 0.0,
            quads: Vec::new(),
        }
    }

    /// A single-line label aligned the way its anchor suggests.
    pub fn plain(text: &str, anchor: &'frame dyn LabelAnchor, font: FontDescriptor) -> Self {
        Self::new(
            AttributedText::aligned(text, anchor.text_alignment()),
            anchor,
            font,
        )
    }

    #[must_use]
    pub fn on_top(mut self) -> Self {
        self.on_top = true;
        self
    }

    #[must_use]
    pub fn with_foreground(mut self, color: Color) -> Self {
        self.foreground = color;
        self
    }

    #[must_use]
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    #[must_use]
    pub fn with_inset(mut self, inset: Vector) -> Self {
        self.inset = inset;
        self
    }

    /// Hides the label in 2D views below this zoom; it fades back in over a
    /// small zoom window above it.
    #[must_use]
    pub fn with_min_zoom(mut self, min_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self
    }

    /// Per-entry view distance limit overriding the preferences' default.
    #[must_use]
    pub fn with_max_view_distance(mut self, distance: f64) -> Self {
        self.max_view_distance = Some(distance);
        self
    }

    /// Drops the label entirely when its bounds do not fit the viewport,
    /// instead of letting it draw partially clipped.
    #[must_use]
    pub fn with_exact_viewport_measure(mut self) -> Self {
        self.exact_viewport_measure = true;
        self
    }

    pub fn font(&self) -> &FontDescriptor {
        &self.font
    }

    pub fn is_on_top(&self) -> bool {
        self.on_top
    }

    pub fn foreground(&self) -> Color {
        self.foreground
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// True after a setup run that passed every check.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn quads(&self) -> &[GlyphQuad] {
        &self.quads
    }

    /// The label's screen footprint: text rectangle grown by the inset. This
    /// is both the background shape and the overlap shape.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.position, self.size).with_outset(self.inset)
    }

    /// Moves the label on screen; used by the layout engine to resolve
    /// overlap.
    pub(super) fn nudge(&mut self, correction: Vector) {
        self.position = self.position + correction;
    }

    /// Computes placement and visibility for this frame. Runs its checks in a
    /// fixed order and stops at the first failure; the entry stays invalid
    /// then. Calling setup again is a no-op and returns the first result.
    pub fn setup(
        &mut self,
        camera: &Camera,
        prefs: &RenderPrefs,
        fonts: &mut FontCatalog,
    ) -> Result<bool> {
        if self.prepared {
            return Ok(self.valid);
        }
        self.prepared = true;

        let base = self.anchor.base_position(camera);
        self.distance = camera.perpendicular_distance(base);
        if self.distance <= 0.0 {
            return Ok(false);
        }

        if !self.on_top {
            match camera.projection() {
                Projection::Perspective => {
                    let max = self.max_view_distance.unwrap_or(prefs.max_view_distance);
                    if self.distance > max {
                        return Ok(false);
                    }
                }
                Projection::Orthographic { zoom } => {
                    if zoom < self.min_zoom {
                        return Ok(false);
                    }
                }
            }
        }

        if self.text.is_blank() {
            return Ok(false);
        }

        let instance = fonts.instance(&self.font)?;
        self.size = self.text.measure(instance);
        if self.size.is_empty() {
            return Ok(false);
        }

        let Some(projected) = camera.project_to_viewport(base) else {
            return Ok(false);
        };
        self.position = (projected + self.anchor.offset(camera, self.size)).floored();

        if self.exact_viewport_measure && !camera.viewport().contains(&self.bounds()) {
            return Ok(false);
        }

        self.quads = self.text.quads(instance);
        self.alpha = self.alpha_factor(camera, prefs) as f32;
        self.valid = true;
        Ok(true)
    }

    /// Distance fade in 3D, zoom fade in 2D; on-top labels never fade.
    fn alpha_factor(&self, camera: &Camera, prefs: &RenderPrefs) -> f64 {
        if self.on_top {
            return 1.0;
        }
        match camera.projection() {
            Projection::Perspective => {
                let max = self.max_view_distance.unwrap_or(prefs.max_view_distance);
                let fade = prefs.fade_out_factor * max;
                if fade <= 0.0 {
                    return if self.distance >= max { 0.0 } else { 1.0 };
                }
                ((max - self.distance) / fade).clamp(0.0, 1.0)
            }
            Projection::Orthographic { zoom } => {
                ((zoom - self.min_zoom) / ZOOM_FADE_WINDOW).clamp(0.0, 1.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use vantage_geometry::Vector3;

    use super::*;
    use crate::{headless::FixedMetricsLoader, label::WorldAnchor};

    fn camera_3d() -> Camera {
        Camera::perspective(
            Vector3::ZERO,
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::Y,
            Camera::DEFAULT_FOVY_DEGREES,
            Rect::new((0.0, 0.0), (800.0, 600.0)),
        )
    }

    fn camera_2d(zoom: f64) -> Camera {
        Camera::orthographic(
            Vector3::new(0.0, 0.0, 100.0),
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::Y,
            zoom,
            Rect::new((0.0, 0.0), (800.0, 600.0)),
        )
    }

    fn fonts() -> FontCatalog {
        FontCatalog::new(Box::new(FixedMetricsLoader::default()))
    }

    fn font() -> FontDescriptor {
        FontDescriptor::new("fonts/test.ttf", 16)
    }

    #[test]
    fn labels_behind_the_camera_are_culled() -> Result<()> {
        let anchor = WorldAnchor::new(Vector3::new(0.0, 0.0, 10.0));
        let mut entry = LabelEntry::plain("behind", &anchor, font());
        assert!(!entry.setup(&camera_3d(), &RenderPrefs::default(), &mut fonts())?);
        assert!(!entry.is_valid());
        Ok(())
    }

    #[test]
    fn blank_text_is_culled() -> Result<()> {
        let anchor = WorldAnchor::new(Vector3::new(0.0, 0.0, -10.0));
        let mut entry = LabelEntry::plain("   ", &anchor, font());
        assert!(!entry.setup(&camera_3d(), &RenderPrefs::default(), &mut fonts())?);
        Ok(())
    }

    #[test]
    fn degenerate_measured_size_is_culled() -> Result<()> {
        // A font without vertical extent measures to height zero; the label
        // must not validate with a zero-height background plate.
        struct FlatLoader;

        impl crate::fonts::FontLoader for FlatLoader {
            fn load(
                &mut self,
                _descriptor: &FontDescriptor,
            ) -> Result<crate::fonts::FontInstance> {
                let glyphs = ('a'..='z')
                    .map(|c| {
                        (
                            c,
                            crate::fonts::Glyph {
                                advance: 10.0,
                                bounds: Rect::ZERO,
                                uv: Rect::ZERO,
                            },
                        )
                    })
                    .collect();
                Ok(crate::fonts::FontInstance::new(
                    crate::gpu::TextureId(0),
                    0.0,
                    0.0,
                    glyphs,
                ))
            }
        }

        let mut fonts = FontCatalog::new(Box::new(FlatLoader));
        let anchor = WorldAnchor::new(Vector3::new(0.0, 0.0, -10.0));
        let mut entry = LabelEntry::plain("flat", &anchor, font());
        assert!(!entry.setup(&camera_3d(), &RenderPrefs::default(), &mut fonts)?);
        assert!(!entry.is_valid());
        Ok(())
    }

    #[test]
    fn setup_is_idempotent() -> Result<()> {
        let anchor = WorldAnchor::new(Vector3::new(0.0, 0.0, -10.0));
        let mut entry = LabelEntry::plain("label", &anchor, font());
        let mut fonts = fonts();
        let prefs = RenderPrefs::default();
        let camera = camera_3d();

        assert!(entry.setup(&camera, &prefs, &mut fonts)?);
        let position = entry.position();
        entry.nudge(Vector::new(3.0, 3.0));

        // A repeated setup neither recomputes nor undoes the nudge.
        assert!(entry.setup(&camera, &prefs, &mut fonts)?);
        assert_eq!(entry.position(), position + Vector::new(3.0, 3.0));
        Ok(())
    }

    #[test]
    fn entries_beyond_the_view_distance_are_culled_unless_on_top() -> Result<()> {
        let prefs = RenderPrefs {
            max_view_distance: 512.0,
            ..Default::default()
        };
        let anchor = WorldAnchor::new(Vector3::new(0.0, 0.0, -600.0));

        let mut culled = LabelEntry::plain("far", &anchor, font());
        assert!(!culled.setup(&camera_3d(), &prefs, &mut fonts())?);

        let mut on_top = LabelEntry::plain("far", &anchor, font()).on_top();
        assert!(on_top.setup(&camera_3d(), &prefs, &mut fonts())?);
        assert_eq!(on_top.alpha(), 1.0);
        Ok(())
    }

    #[test]
    fn fades_towards_the_view_distance_limit() -> Result<()> {
        // Fade window is 0.25 * 512 = 128, so the fade starts at 384.
        let prefs = RenderPrefs {
            max_view_distance: 512.0,
            ..Default::default()
        };
        let camera = camera_3d();
        let mut fonts = fonts();

        let anchor = WorldAnchor::new(Vector3::new(0.0, 0.0, -500.0));
        let mut entry = LabelEntry::plain("fading", &anchor, font());
        assert!(entry.setup(&camera, &prefs, &mut fonts)?);
        assert_abs_diff_eq!(entry.alpha(), 12.0 / 128.0);

        // Alpha never increases with distance.
        let mut previous = f32::INFINITY;
        for distance in [100.0, 384.0, 400.0, 450.0, 511.0] {
            let anchor = WorldAnchor::new(Vector3::new(0.0, 0.0, -distance));
            let mut entry = LabelEntry::plain("fading", &anchor, font());
            assert!(entry.setup(&camera, &prefs, &mut fonts)?);
            assert!(entry.alpha() <= previous);
            previous = entry.alpha();
        }
        Ok(())
    }

    #[test]
    fn zoom_fade_ramps_in_over_the_fade_window() -> Result<()> {
        let prefs = RenderPrefs::default();
        let mut fonts = fonts();
        let anchor = WorldAnchor::new(Vector3::ZERO);

        let mut below = LabelEntry::plain("zoomed", &anchor, font()).with_min_zoom(1.0);
        assert!(!below.setup(&camera_2d(0.9), &prefs, &mut fonts)?);

        let mut half = LabelEntry::plain("zoomed", &anchor, font()).with_min_zoom(1.0);
        assert!(half.setup(&camera_2d(1.15), &prefs, &mut fonts)?);
        assert_abs_diff_eq!(half.alpha(), 0.5);

        let mut full = LabelEntry::plain("zoomed", &anchor, font()).with_min_zoom(1.0);
        assert!(full.setup(&camera_2d(1.5), &prefs, &mut fonts)?);
        assert_eq!(full.alpha(), 1.0);
        Ok(())
    }

    #[test]
    fn exact_viewport_measure_culls_partially_clipped_labels() -> Result<()> {
        let prefs = RenderPrefs::default();
        let mut fonts = fonts();
        let camera = camera_3d();

        // Projects to the viewport center; fits easily.
        let center = WorldAnchor::new(Vector3::new(0.0, 0.0, -10.0));
        let mut fits = LabelEntry::plain("fits", &center, font()).with_exact_viewport_measure();
        assert!(fits.setup(&camera, &prefs, &mut fonts)?);

        // Pushed off the right edge by a screen offset.
        let clipped_anchor = WorldAnchor::new(Vector3::new(0.0, 0.0, -10.0))
            .with_screen_offset(Vector::new(500.0, 0.0));
        let mut clipped =
            LabelEntry::plain("clipped", &clipped_anchor, font()).with_exact_viewport_measure();
        assert!(!clipped.setup(&camera, &prefs, &mut fonts)?);

        // Without the exact measure the same label stays visible.
        let mut lenient = LabelEntry::plain("clipped", &clipped_anchor, font());
        assert!(lenient.setup(&camera, &prefs, &mut fonts)?);
        Ok(())
    }
}
