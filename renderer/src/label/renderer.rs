use anyhow::Result;
use vantage_geometry::Camera;

use crate::{
    config::RenderPrefs,
    fonts::FontCatalog,
    gpu::{GraphicsApi, PrimitiveKind, ShaderId},
    renderable::{PreparationContext, RenderContext, Renderable},
};

use super::{LabelEntry, LabelGroup, LabelLayoutEngine};

/// Draws all labels of a frame in screen space.
///
/// Labels render under a pixel-space orthographic projection; the camera's
/// own view-projection is restored afterwards. Within a group the
/// backgrounds draw before the glyphs so text is never covered by its own
/// plate.
#[derive(Default)]
pub struct LabelBatchRenderer<'frame> {
    engine: LabelLayoutEngine<'frame>,
}

impl<'frame> LabelBatchRenderer<'frame> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entry up against the camera and hands it to the layout
    /// engine. Entries that fail a visibility check are silently dropped;
    /// font loading failures propagate.
    pub fn add_label(
        &mut self,
        mut entry: LabelEntry<'frame>,
        camera: &Camera,
        prefs: &RenderPrefs,
        fonts: &mut FontCatalog,
    ) -> Result<()> {
        if !entry.setup(camera, prefs, fonts)? {
            return Ok(());
        }
        let texture = fonts.instance(entry.font())?.texture();
        self.engine.add_entry(entry, texture);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    pub fn groups(&self) -> impl Iterator<Item = &LabelGroup<'frame>> {
        self.engine.groups()
    }

    fn render_group(group: &LabelGroup, api: &mut dyn GraphicsApi) {
        if let Some(buffer) = group.rect_buffer() {
            api.bind_shader(ShaderId::TextBackground);
            api.draw(
                buffer,
                PrimitiveKind::Triangles,
                0,
                group.rect_vertex_count(),
            );
        }
        if let Some(buffer) = group.glyph_buffer() {
            api.bind_shader(ShaderId::Text);
            api.bind_texture(group.texture());
            api.draw(
                buffer,
                PrimitiveKind::Triangles,
                0,
                group.glyph_vertex_count(),
            );
        }
    }
}

impl Renderable for LabelBatchRenderer<'_> {
    #[tracing::instrument(skip_all)]
    fn prepare(&mut self, context: &mut PreparationContext) {
        self.engine
            .prepare_vertex_buffers(context.uploader, context.prefs);
    }

    fn render(&mut self, context: &mut RenderContext) {
        if self.is_empty() {
            return;
        }

        let camera = context.camera;
        let api = &mut *context.api;
        api.set_view_projection(camera.viewport_matrix());

        for group in self.engine.groups() {
            if !group.is_on_top() {
                Self::render_group(group, api);
            }
        }
        for group in self.engine.groups() {
            if group.is_on_top() {
                api.set_depth_test(false);
                Self::render_group(group, api);
                api.set_depth_test(true);
            }
        }

        api.set_view_projection(camera.view_projection());
    }
}
