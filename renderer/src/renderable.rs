use vantage_geometry::Camera;

use crate::{
    config::RenderPrefs,
    gpu::{BufferUploader, GraphicsApi},
};

/// The context provided to `prepare()`: vertex generation and upload happen
/// here and nowhere else.
pub struct PreparationContext<'a> {
    pub uploader: &'a mut dyn BufferUploader,
    pub prefs: &'a RenderPrefs,
}

/// The context provided to `render()`: camera state, preferences, and the
/// draw-state primitives of the graphics device.
pub struct RenderContext<'a> {
    pub camera: &'a Camera,
    pub prefs: &'a RenderPrefs,
    pub api: &'a mut dyn GraphicsApi,
}

/// A unit of drawable work with a two-phase contract.
///
/// `prepare` runs exactly once per frame, before any `render` call, and is
/// the only phase allowed to upload buffer data. `render` only issues draw
/// calls against buffers prepared earlier in the same frame.
pub trait Renderable {
    fn prepare(&mut self, context: &mut PreparationContext);
    fn render(&mut self, context: &mut RenderContext);
}
