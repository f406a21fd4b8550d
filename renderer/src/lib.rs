//! Deferred scene-render batching and label placement.
//!
//! Call sites collect drawable geometry and text labels into a [`RenderBatch`]
//! during a frame without touching the GPU. A single preparation pass then
//! generates and uploads vertex data, and the draw pass issues draw calls in a
//! controlled order: normal depth-tested geometry first, "always on top"
//! geometry last with depth testing suspended.

mod config;
mod edge_batch;
pub mod fonts;
pub mod gpu;
pub mod headless;
mod label;
mod pods;
mod render_batch;
mod renderable;

pub use config::*;
pub use edge_batch::*;
pub use label::*;
pub use pods::*;
pub use render_batch::*;
pub use renderable::*;
