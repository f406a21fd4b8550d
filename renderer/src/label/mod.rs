//! Text labels: attributed text, anchoring, per-frame setup and culling,
//! overlap layout, and the batch renderer that draws them in screen space.

mod anchor;
mod background;
mod entry;
mod layout;
mod renderer;
mod text;

pub use anchor::*;
pub use entry::*;
pub use layout::*;
pub use renderer::*;
pub use text::*;
