//! The seams to the GPU collaborators: buffer upload and draw-state control.
//!
//! The batching engine never talks to a graphics device directly; uploads and
//! draw calls go through these traits so the engine stays independent of the
//! backing API and can run headless in tests.

use vantage_geometry::Matrix4;

/// Handle to an uploaded vertex or index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// Handle to a texture owned by a collaborator (e.g. a font atlas).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// The fixed set of shaders this subsystem binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderId {
    Edge,
    Text,
    TextBackground,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
}

/// A value assigned to a named uniform of the currently bound shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    F32(f32),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
}

/// Synchronous vertex data upload.
///
/// Assumed to always succeed for in-memory arrays of practical size; prepare
/// is the only phase that is allowed to call this.
pub trait BufferUploader {
    fn upload(&mut self, data: &[u8]) -> BufferId;
}

impl dyn BufferUploader + '_ {
    /// Uploads a slice of Pod vertices.
    pub fn upload_vertices<T: bytemuck::Pod>(&mut self, vertices: &[T]) -> BufferId {
        self.upload(bytemuck::cast_slice(vertices))
    }
}

/// Draw-state and submission primitives exposed by the render context.
pub trait GraphicsApi {
    fn set_depth_test(&mut self, enabled: bool);
    fn clear_depth(&mut self);
    /// Depth offset against z-fighting between coincident geometry; 0.0 disables.
    fn set_depth_offset(&mut self, factor: f32);
    fn set_line_width(&mut self, width: f32);
    fn set_view_projection(&mut self, matrix: Matrix4);
    fn bind_shader(&mut self, shader: ShaderId);
    fn set_uniform(&mut self, name: &str, value: UniformValue);
    fn bind_texture(&mut self, texture: TextureId);
    fn draw(&mut self, buffer: BufferId, primitive: PrimitiveKind, first: u32, count: u32);
    fn draw_indexed(
        &mut self,
        vertices: BufferId,
        indices: BufferId,
        primitive: PrimitiveKind,
        first: u32,
        count: u32,
    );
}
