use std::mem::size_of;

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

use vantage_geometry as geometry;
use vantage_geometry::Vector3;

/// RGBA color
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Color(pub [f32; 4]);

// Uniform block alignment requirement
const_assert_eq!(size_of::<Color>() % 16, 0);

impl From<geometry::Color> for Color {
    fn from(value: geometry::Color) -> Self {
        Self([value.red, value.green, value.blue, value.alpha])
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    position: [f32; 3],
}

impl Vertex {
    fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z],
        }
    }
}

impl From<(f32, f32, f32)> for Vertex {
    fn from(v: (f32, f32, f32)) -> Self {
        Self::new(v.0, v.1, v.2)
    }
}

impl From<Vector3> for Vertex {
    fn from(v: Vector3) -> Self {
        let v = v.as_vec3();
        Self::new(v.x, v.y, v.z)
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: Vertex,
    pub color: Color,
}

impl ColorVertex {
    pub fn new(position: impl Into<Vertex>, color: impl Into<Color>) -> Self {
        Self {
            position: position.into(),
            color: color.into(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct TextureColorVertex {
    pub position: Vertex,
    pub tex_coords: [f32; 2],
    pub color: Color,
}

impl TextureColorVertex {
    pub fn new(position: impl Into<Vertex>, uv: (f32, f32), color: impl Into<Color>) -> Self {
        Self {
            position: position.into(),
            tex_coords: [uv.0, uv.1],
            color: color.into(),
        }
    }
}
