//! Edge rendering: colored line and point primitives with strict draw-state
//! discipline.
//!
//! Two batch shapes share the same draw path: [`DirectEdgeBatch`] owns its
//! vertices, [`IndexedEdgeBatch`] indexes into a [`VertexPool`] shared by
//! several batches so the pool uploads once per frame.

use std::{cell::RefCell, rc::Rc};

use derive_more::Constructor;
use vantage_geometry::{Color, Projection, Vector3};

use crate::{
    gpu::{BufferId, GraphicsApi, PrimitiveKind, ShaderId, UniformValue},
    pods::ColorVertex,
    renderable::{PreparationContext, RenderContext, Renderable},
};

/// Depth offset applied while edges draw, pulling them slightly towards the
/// camera so they win against coincident surface geometry.
const DEFAULT_DEPTH_OFFSET: f32 = 0.025;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeColor {
    /// Each vertex carries its own color.
    PerVertex,
    /// One color for the whole batch; per-vertex colors are ignored.
    Uniform(Color),
}

/// How a batch of edges is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeStyle {
    /// Draw with depth testing suspended so the edges are never occluded.
    pub on_top: bool,
    /// Line width override; None draws with the preferences' default width.
    pub width: Option<f32>,
    pub color: EdgeColor,
    pub depth_offset: f32,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            on_top: false,
            width: None,
            color: EdgeColor::PerVertex,
            depth_offset: DEFAULT_DEPTH_OFFSET,
        }
    }
}

impl EdgeStyle {
    #[must_use]
    pub fn on_top(mut self) -> Self {
        self.on_top = true;
        self
    }

    #[must_use]
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub fn with_uniform_color(mut self, color: Color) -> Self {
        self.color = EdgeColor::Uniform(color);
        self
    }
}

/// A contiguous run of primitives inside a batch's buffer.
#[derive(Debug, Clone, Copy, Constructor)]
pub struct PrimitiveRange {
    pub primitive: PrimitiveKind,
    pub first: u32,
    pub count: u32,
}

/// An edge batch that owns its vertices and uploads them itself.
pub struct DirectEdgeBatch {
    style: EdgeStyle,
    vertices: Vec<ColorVertex>,
    primitives: Vec<PrimitiveRange>,
    buffer: Option<BufferId>,
}

impl DirectEdgeBatch {
    pub fn new(style: EdgeStyle) -> Self {
        Self {
            style,
            vertices: Vec::new(),
            primitives: Vec::new(),
            buffer: None,
        }
    }

    pub fn style(&self) -> &EdgeStyle {
        &self.style
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn push(&mut self, primitive: PrimitiveKind, vertices: impl IntoIterator<Item = ColorVertex>) {
        let first = self.vertices.len() as u32;
        self.vertices.extend(vertices);
        let count = self.vertices.len() as u32 - first;
        if count != 0 {
            self.primitives.push(PrimitiveRange::new(primitive, first, count));
        }
    }

    /// Adds independent line segments given as endpoint pairs.
    pub fn lines(
        &mut self,
        segments: impl IntoIterator<Item = (Vector3, Vector3)>,
        color: Color,
    ) {
        let vertices: Vec<_> = segments
            .into_iter()
            .flat_map(|(a, b)| [ColorVertex::new(a, color), ColorVertex::new(b, color)])
            .collect();
        self.push(PrimitiveKind::Lines, vertices);
    }
}

impl Renderable for DirectEdgeBatch {
    fn prepare(&mut self, context: &mut PreparationContext) {
        if !self.vertices.is_empty() {
            self.buffer = Some(context.uploader.upload_vertices(&self.vertices));
        }
    }

    fn render(&mut self, context: &mut RenderContext) {
        let Some(buffer) = self.buffer else {
            return;
        };
        let primitives = &self.primitives;
        render_edges(&self.style, context, |api| {
            for range in primitives {
                api.draw(buffer, range.primitive, range.first, range.count);
            }
        });
    }
}

/// Vertex storage shared by several indexed edge batches. Uploaded at most
/// once per frame, by whichever batch prepares first.
#[derive(Default)]
pub struct VertexPool {
    vertices: Vec<ColorVertex>,
    buffer: Option<BufferId>,
}

impl VertexPool {
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Appends a vertex and returns its pool index.
    pub fn push(&mut self, vertex: ColorVertex) -> u32 {
        debug_assert!(self.buffer.is_none(), "pool is already uploaded");
        self.vertices.push(vertex);
        self.vertices.len() as u32 - 1
    }

    pub fn extend(&mut self, vertices: impl IntoIterator<Item = ColorVertex>) -> u32 {
        debug_assert!(self.buffer.is_none(), "pool is already uploaded");
        let first = self.vertices.len() as u32;
        self.vertices.extend(vertices);
        first
    }

    fn ensure_uploaded(&mut self, context: &mut PreparationContext) -> Option<BufferId> {
        if self.buffer.is_none() && !self.vertices.is_empty() {
            self.buffer = Some(context.uploader.upload_vertices(&self.vertices));
        }
        self.buffer
    }
}

/// An edge batch whose vertices live in a shared [`VertexPool`].
pub struct IndexedEdgeBatch {
    style: EdgeStyle,
    pool: Rc<RefCell<VertexPool>>,
    indices: Vec<u32>,
    primitives: Vec<PrimitiveRange>,
    vertex_buffer: Option<BufferId>,
    index_buffer: Option<BufferId>,
}

impl IndexedEdgeBatch {
    pub fn new(style: EdgeStyle, pool: Rc<RefCell<VertexPool>>) -> Self {
        Self {
            style,
            pool,
            indices: Vec::new(),
            primitives: Vec::new(),
            vertex_buffer: None,
            index_buffer: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn push(&mut self, primitive: PrimitiveKind, indices: impl IntoIterator<Item = u32>) {
        let first = self.indices.len() as u32;
        self.indices.extend(indices);
        let count = self.indices.len() as u32 - first;
        if count != 0 {
            self.primitives.push(PrimitiveRange::new(primitive, first, count));
        }
    }
}

impl Renderable for IndexedEdgeBatch {
    fn prepare(&mut self, context: &mut PreparationContext) {
        if self.indices.is_empty() {
            return;
        }
        self.vertex_buffer = self.pool.borrow_mut().ensure_uploaded(context);
        self.index_buffer = Some(context.uploader.upload_vertices(&self.indices));
    }

    fn render(&mut self, context: &mut RenderContext) {
        let (Some(vertices), Some(indices)) = (self.vertex_buffer, self.index_buffer) else {
            return;
        };
        let primitives = &self.primitives;
        render_edges(&self.style, context, |api| {
            for range in primitives {
                api.draw_indexed(vertices, indices, range.primitive, range.first, range.count);
            }
        });
    }
}

/// The shared edge draw path: binds the edge shader, applies the style's draw
/// state, invokes `draw`, and restores every state change in reverse order.
fn render_edges(
    style: &EdgeStyle,
    context: &mut RenderContext,
    draw: impl FnOnce(&mut dyn GraphicsApi),
) {
    let prefs = context.prefs;
    let projection = context.camera.projection();
    let api = &mut *context.api;

    api.bind_shader(ShaderId::Edge);

    let soft_bounds = &prefs.soft_bounds;
    api.set_uniform("softBoundsVisible", UniformValue::Bool(soft_bounds.visible));
    if soft_bounds.visible {
        api.set_uniform(
            "softBoundsMin",
            UniformValue::Vec3(soft_bounds.min.map(|v| v as f32)),
        );
        api.set_uniform(
            "softBoundsMax",
            UniformValue::Vec3(soft_bounds.max.map(|v| v as f32)),
        );
        api.set_uniform(
            "softBoundsColor",
            UniformValue::Vec4(soft_bounds.color.to_array()),
        );
    }

    match style.color {
        EdgeColor::PerVertex => {
            api.set_uniform("useUniformColor", UniformValue::Bool(false));
        }
        EdgeColor::Uniform(color) => {
            api.set_uniform("useUniformColor", UniformValue::Bool(true));
            api.set_uniform("uniformColor", UniformValue::Vec4(color.to_array()));
        }
    }

    if style.on_top {
        if prefs.show_hidden_selection_bounds {
            api.clear_depth();
        }
        api.set_depth_test(false);
    }

    let default_width = prefs.default_edge_width;
    let width = match (style.width, projection) {
        (None, _) => default_width,
        // In 2D views wide selection outlines overpower the flat geometry,
        // so requested widths are reduced but never below the default.
        (Some(width), Projection::Orthographic { .. }) => (width / 3.0).max(default_width),
        (Some(width), Projection::Perspective) => width,
    };
    if width != default_width {
        api.set_line_width(width);
    }

    api.set_depth_offset(style.depth_offset);
    draw(api);
    api.set_depth_offset(0.0);

    if width != default_width {
        api.set_line_width(default_width);
    }
    if style.on_top {
        api.set_depth_test(true);
    }
}

#[cfg(test)]
mod tests {
    use vantage_geometry::{Camera, Rect, Vector3};

    use super::*;
    use crate::{
        RenderPrefs,
        headless::{ApiEvent, HeadlessUploader, RecordingApi},
    };

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

    fn segment() -> (Vector3, Vector3) {
        (Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0))
    }

    fn prepare_and_render(
        batch: &mut DirectEdgeBatch,
        camera: &Camera,
        prefs: &RenderPrefs,
    ) -> RecordingApi {
        let mut uploader = HeadlessUploader::default();
        batch.prepare(&mut PreparationContext {
            uploader: &mut uploader,
            prefs,
        });
        let mut api = RecordingApi::default();
        batch.render(&mut RenderContext {
            camera,
            prefs,
            api: &mut api,
        });
        api
    }

    #[test]
    fn empty_batch_neither_uploads_nor_draws() {
        let mut batch = DirectEdgeBatch::new(EdgeStyle::default());
        let prefs = RenderPrefs::default();
        let mut uploader = HeadlessUploader::default();
        batch.prepare(&mut PreparationContext {
            uploader: &mut uploader,
            prefs: &prefs,
        });
        assert!(uploader.uploads.is_empty());

        let camera = camera_3d();
        let mut api = RecordingApi::default();
        batch.render(&mut RenderContext {
            camera: &camera,
            prefs: &prefs,
            api: &mut api,
        });
        assert!(api.events.is_empty());
    }

    #[test]
    fn on_top_wide_batch_restores_width_before_depth_test() {
        let mut batch = DirectEdgeBatch::new(EdgeStyle::default().on_top().with_width(4.0));
        batch.lines([segment()], Color::WHITE);
        let api = prepare_and_render(&mut batch, &camera_3d(), &RenderPrefs::default());

        let relevant: Vec<_> = api
            .events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    ApiEvent::DepthTest(_)
                        | ApiEvent::LineWidth(_)
                        | ApiEvent::DepthOffset(_)
                        | ApiEvent::Draw { .. }
                )
            })
            .cloned()
            .collect();
        assert_eq!(
            relevant,
            vec![
                ApiEvent::DepthTest(false),
                ApiEvent::LineWidth(4.0),
                ApiEvent::DepthOffset(DEFAULT_DEPTH_OFFSET),
                ApiEvent::Draw {
                    buffer: crate::gpu::BufferId(0),
                    primitive: PrimitiveKind::Lines,
                    first: 0,
                    count: 2,
                },
                ApiEvent::DepthOffset(0.0),
                ApiEvent::LineWidth(1.0),
                ApiEvent::DepthTest(true),
            ]
        );
    }

    #[test]
    fn uniform_color_sets_both_uniforms() {
        let color = Color::rgb(0.2, 0.4, 0.6);
        let mut batch = DirectEdgeBatch::new(EdgeStyle::default().with_uniform_color(color));
        batch.lines([segment()], Color::WHITE);
        let api = prepare_and_render(&mut batch, &camera_3d(), &RenderPrefs::default());

        assert!(api.events.contains(&ApiEvent::Uniform(
            "useUniformColor".into(),
            UniformValue::Bool(true)
        )));
        assert!(api.events.contains(&ApiEvent::Uniform(
            "uniformColor".into(),
            UniformValue::Vec4(color.to_array())
        )));
    }

    #[test]
    fn requested_width_is_reduced_in_2d_but_not_below_default() {
        let mut batch = DirectEdgeBatch::new(EdgeStyle::default().with_width(9.0));
        batch.lines([segment()], Color::WHITE);
        let api = prepare_and_render(&mut batch, &camera_2d(1.0), &RenderPrefs::default());
        assert!(api.events.contains(&ApiEvent::LineWidth(3.0)));

        // A request below three times the default clamps to the default and
        // therefore never touches the line width at all.
        let mut batch = DirectEdgeBatch::new(EdgeStyle::default().with_width(2.0));
        batch.lines([segment()], Color::WHITE);
        let api = prepare_and_render(&mut batch, &camera_2d(1.0), &RenderPrefs::default());
        assert!(
            !api.events
                .iter()
                .any(|e| matches!(e, ApiEvent::LineWidth(_)))
        );
    }

    #[test]
    fn hidden_selection_bounds_pref_clears_depth_for_on_top_batches() {
        let mut batch = DirectEdgeBatch::new(EdgeStyle::default().on_top());
        batch.lines([segment()], Color::WHITE);

        let mut prefs = RenderPrefs::default();
        prefs.show_hidden_selection_bounds = true;
        let api = prepare_and_render(&mut batch, &camera_3d(), &prefs);
        assert!(api.events.contains(&ApiEvent::ClearDepth));

        let mut batch = DirectEdgeBatch::new(EdgeStyle::default().on_top());
        batch.lines([segment()], Color::WHITE);
        let api = prepare_and_render(&mut batch, &camera_3d(), &RenderPrefs::default());
        assert!(!api.events.contains(&ApiEvent::ClearDepth));
    }

    #[test]
    fn indexed_batches_share_one_pool_upload() {
        let pool = VertexPool::shared();
        let a_first = pool.borrow_mut().extend([
            ColorVertex::new(Vector3::ZERO, Color::WHITE),
            ColorVertex::new(Vector3::X, Color::WHITE),
        ]);
        let b_first = pool.borrow_mut().extend([
            ColorVertex::new(Vector3::Y, Color::WHITE),
            ColorVertex::new(Vector3::Z, Color::WHITE),
        ]);

        let mut a = IndexedEdgeBatch::new(EdgeStyle::default(), pool.clone());
        a.push(PrimitiveKind::Lines, [a_first, a_first + 1]);
        let mut b = IndexedEdgeBatch::new(EdgeStyle::default(), pool.clone());
        b.push(PrimitiveKind::Lines, [b_first, b_first + 1]);

        let prefs = RenderPrefs::default();
        let mut uploader = HeadlessUploader::default();
        let mut context = PreparationContext {
            uploader: &mut uploader,
            prefs: &prefs,
        };
        a.prepare(&mut context);
        b.prepare(&mut context);

        // One vertex upload for the pool plus one index upload per batch.
        assert_eq!(uploader.uploads.len(), 3);
        assert_eq!(a.vertex_buffer, b.vertex_buffer);
        assert_ne!(a.index_buffer, b.index_buffer);
    }
}
