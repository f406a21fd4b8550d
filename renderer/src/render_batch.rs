//! The per-frame collection of renderables and the prepare/render protocol.

use crate::renderable::{PreparationContext, RenderContext, Renderable};

/// Which layer of a [`RenderBatch`] a renderable is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Depth-tested, drawn first.
    Normal,
    /// Drawn after the normal layer with depth testing suspended, so its
    /// content always wins visually regardless of depth.
    Top,
}

enum Slot<'frame> {
    /// Owned by the batch; dropped with it at the end of the frame.
    OneShot(Box<dyn Renderable + 'frame>),
    /// Borrowed from a longer-lived owner for the duration of the frame.
    Persistent(&'frame mut dyn Renderable),
}

impl Slot<'_> {
    fn renderable(&mut self) -> &mut dyn Renderable {
        match self {
            Slot::OneShot(renderable) => renderable.as_mut(),
            Slot::Persistent(renderable) => *renderable,
        }
    }
}

/// An ordered collection of renderables for one frame.
///
/// Draw order within a layer is insertion order; there is no automatic
/// sorting. Callers control visual layering by choosing the layer and the
/// order in which they add.
#[derive(Default)]
pub struct RenderBatch<'frame> {
    slots: Vec<Slot<'frame>>,
    normal: Vec<usize>,
    top: Vec<usize>,
    prepared: bool,
}

impl<'frame> RenderBatch<'frame> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a renderable the caller keeps alive for the rest of the frame.
    pub fn add(&mut self, layer: Layer, renderable: &'frame mut dyn Renderable) {
        self.push(layer, Slot::Persistent(renderable));
    }

    /// Adds a renderable the batch takes ownership of; it is dropped with
    /// the batch after the frame.
    pub fn add_one_shot(&mut self, layer: Layer, renderable: Box<dyn Renderable + 'frame>) {
        self.push(layer, Slot::OneShot(renderable));
    }

    fn push(&mut self, layer: Layer, slot: Slot<'frame>) {
        debug_assert!(!self.prepared, "cannot add to a batch after prepare");
        let index = self.slots.len();
        self.slots.push(slot);
        match layer {
            Layer::Normal => self.normal.push(index),
            Layer::Top => self.top.push(index),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Prepares every renderable exactly once, in insertion order, letting
    /// each upload its vertex data. Must run before [`Self::render`].
    #[tracing::instrument(skip_all)]
    pub fn prepare(&mut self, context: &mut PreparationContext) {
        debug_assert!(!self.prepared, "prepare must run exactly once per frame");
        for slot in &mut self.slots {
            slot.renderable().prepare(context);
        }
        self.prepared = true;
    }

    /// Draws the normal layer with depth testing as provided by the context,
    /// then the top layer with depth testing suspended for each renderable's
    /// draw and restored immediately afterwards.
    #[tracing::instrument(skip_all)]
    pub fn render(&mut self, context: &mut RenderContext) {
        debug_assert!(self.prepared, "render requires a prior prepare");
        for &index in &self.normal {
            self.slots[index].renderable().render(context);
        }
        for &index in &self.top {
            context.api.set_depth_test(false);
            self.slots[index].renderable().render(context);
            context.api.set_depth_test(true);
        }
    }
}
