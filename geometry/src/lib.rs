//! Geometry primitives for the vantage renderer.

mod camera;
mod color;
mod point;
mod rect;
mod size;

pub use camera::*;
pub use color::*;
pub use point::*;
pub use rect::*;
pub use size::*;

pub const EPSILON: f64 = f64::EPSILON;

pub trait Contains<Other> {
    fn contains(&self, other: Other) -> bool;
}

pub type Matrix4 = glam::DMat4;
pub type Vector3 = glam::DVec3;
pub type Vector4 = glam::DVec4;

pub trait PerspectiveDivide {
    fn perspective_divide(&self) -> Option<Vector3>;
}

impl PerspectiveDivide for Vector4 {
    // Converts a homogeneous Vector4 (x,y,z,w) into Vector3 (x/w,y/w,z/w),
    // returning None if w is too close to zero.
    fn perspective_divide(&self) -> Option<Vector3> {
        let w = self.w;
        if w.abs() < EPSILON {
            return None;
        }
        Some(Vector3::new(self.x / w, self.y / w, self.z / w))
    }
}
