//! Headless doubles for the GPU and font-loading seams.
//!
//! These never touch a device: the uploader records the bytes it was handed,
//! the graphics api records every call as an event, and the font loader
//! fabricates monospace metrics. The test suite asserts call order and state
//! restoration against them.

use std::collections::HashMap;

use anyhow::Result;
use vantage_geometry::{Matrix4, Rect};

use crate::{
    fonts::{FontDescriptor, FontInstance, FontLoader, Glyph},
    gpu::{BufferId, BufferUploader, GraphicsApi, PrimitiveKind, ShaderId, TextureId, UniformValue},
};

/// Records uploads and hands out sequential buffer ids.
#[derive(Debug, Default)]
pub struct HeadlessUploader {
    pub uploads: Vec<Vec<u8>>,
}

impl BufferUploader for HeadlessUploader {
    fn upload(&mut self, data: &[u8]) -> BufferId {
        self.uploads.push(data.to_vec());
        BufferId(self.uploads.len() as u32 - 1)
    }
}

/// One recorded [`GraphicsApi`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiEvent {
    DepthTest(bool),
    ClearDepth,
    DepthOffset(f32),
    LineWidth(f32),
    ViewProjection(Matrix4),
    BindShader(ShaderId),
    Uniform(String, UniformValue),
    BindTexture(TextureId),
    Draw {
        buffer: BufferId,
        primitive: PrimitiveKind,
        first: u32,
        count: u32,
    },
    DrawIndexed {
        vertices: BufferId,
        indices: BufferId,
        primitive: PrimitiveKind,
        first: u32,
        count: u32,
    },
}

/// Records every call in submission order.
#[derive(Debug, Default)]
pub struct RecordingApi {
    pub events: Vec<ApiEvent>,
}

impl RecordingApi {
    /// The recorded draw and draw_indexed events only, in order.
    pub fn draws(&self) -> Vec<&ApiEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, ApiEvent::Draw { .. } | ApiEvent::DrawIndexed { .. }))
            .collect()
    }
}

impl GraphicsApi for RecordingApi {
    fn set_depth_test(&mut self, enabled: bool) {
        self.events.push(ApiEvent::DepthTest(enabled));
    }

    fn clear_depth(&mut self) {
        self.events.push(ApiEvent::ClearDepth);
    }

    fn set_depth_offset(&mut self, factor: f32) {
        self.events.push(ApiEvent::DepthOffset(factor));
    }

    fn set_line_width(&mut self, width: f32) {
        self.events.push(ApiEvent::LineWidth(width));
    }

    fn set_view_projection(&mut self, matrix: Matrix4) {
        self.events.push(ApiEvent::ViewProjection(matrix));
    }

    fn bind_shader(&mut self, shader: ShaderId) {
        self.events.push(ApiEvent::BindShader(shader));
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.events.push(ApiEvent::Uniform(name.to_string(), value));
    }

    fn bind_texture(&mut self, texture: TextureId) {
        self.events.push(ApiEvent::BindTexture(texture));
    }

    fn draw(&mut self, buffer: BufferId, primitive: PrimitiveKind, first: u32, count: u32) {
        self.events.push(ApiEvent::Draw {
            buffer,
            primitive,
            first,
            count,
        });
    }

    fn draw_indexed(
        &mut self,
        vertices: BufferId,
        indices: BufferId,
        primitive: PrimitiveKind,
        first: u32,
        count: u32,
    ) {
        self.events.push(ApiEvent::DrawIndexed {
            vertices,
            indices,
            primitive,
            first,
            count,
        });
    }
}

/// Fabricates monospace font instances so font-dependent code runs without
/// font files. Metrics scale linearly with the descriptor's point size.
#[derive(Debug)]
pub struct FixedMetricsLoader {
    /// Glyph advance at 16pt.
    pub advance: f64,
    /// Line height at 16pt.
    pub line_height: f64,
    /// Ascent at 16pt.
    pub ascent: f64,
    pub loads: usize,
    next_texture: u32,
}

impl Default for FixedMetricsLoader {
    fn default() -> Self {
        Self {
            advance: 10.0,
            line_height: 16.0,
            ascent: 12.0,
            loads: 0,
            next_texture: 0,
        }
    }
}

impl FontLoader for FixedMetricsLoader {
    fn load(&mut self, descriptor: &FontDescriptor) -> Result<FontInstance> {
        self.loads += 1;
        let factor = descriptor.size() as f64 / 16.0;
        let advance = self.advance * factor;
        let ascent = self.ascent * factor;
        let line_height = self.line_height * factor;

        let mut glyphs = HashMap::new();
        for c in ' '..='~' {
            let bounds = if c == ' ' {
                // Whitespace advances the pen but produces no quad.
                Rect::ZERO
            } else {
                (0.0, -ascent, advance, line_height - ascent).into()
            };
            glyphs.insert(
                c,
                Glyph {
                    advance,
                    bounds,
                    uv: (0.0, 0.0, 1.0, 1.0).into(),
                },
            );
        }

        let texture = TextureId(self.next_texture);
        self.next_texture += 1;
        Ok(FontInstance::new(texture, ascent, line_height, glyphs))
    }
}
