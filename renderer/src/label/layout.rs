//! Grouping and screen-space overlap resolution for label entries.

use std::collections::HashMap;

use vantage_geometry::{Rect, Vector};

use crate::{
    config::RenderPrefs,
    fonts::FontDescriptor,
    gpu::{BufferId, BufferUploader, TextureId},
    pods::{ColorVertex, TextureColorVertex},
};

use super::{LabelEntry, background};

/// Displacement applied per overlap-resolution step. Overlapping labels walk
/// down-right in a staircase until they separate.
///
/// TODO: replace the staircase with a placement that tries the anchor's other
/// sides first.
const OVERLAP_CORRECTION: Vector = Vector::new(3.0, 3.0);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    font: FontDescriptor,
    on_top: bool,
}

/// Labels sharing a font atlas and layer, drawn with two draw calls: one for
/// the backgrounds, one for the glyphs.
pub struct LabelGroup<'frame> {
    font: FontDescriptor,
    on_top: bool,
    texture: TextureId,
    entries: Vec<LabelEntry<'frame>>,
    glyph_vertices: Vec<TextureColorVertex>,
    rect_vertices: Vec<ColorVertex>,
    glyph_buffer: Option<BufferId>,
    rect_buffer: Option<BufferId>,
}

impl<'frame> LabelGroup<'frame> {
    fn new(font: FontDescriptor, on_top: bool, texture: TextureId) -> Self {
        Self {
            font,
            on_top,
            texture,
            entries: Vec::new(),
            glyph_vertices: Vec::new(),
            rect_vertices: Vec::new(),
            glyph_buffer: None,
            rect_buffer: None,
        }
    }

    pub fn font(&self) -> &FontDescriptor {
        &self.font
    }

    pub fn is_on_top(&self) -> bool {
        self.on_top
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }

    pub fn entries(&self) -> &[LabelEntry<'frame>] {
        &self.entries
    }

    pub fn glyph_vertex_count(&self) -> u32 {
        self.glyph_vertices.len() as u32
    }

    pub fn rect_vertex_count(&self) -> u32 {
        self.rect_vertices.len() as u32
    }

    pub fn glyph_buffer(&self) -> Option<BufferId> {
        self.glyph_buffer
    }

    pub fn rect_buffer(&self) -> Option<BufferId> {
        self.rect_buffer
    }

    fn build_vertices(&mut self, prefs: &RenderPrefs) {
        self.glyph_vertices.clear();
        self.rect_vertices.clear();

        for entry in &self.entries {
            let alpha = entry.alpha();
            if alpha <= 0.0 {
                continue;
            }

            let background_color = entry.background().faded(alpha);
            let outline = background::rounded_rect(
                entry.bounds(),
                prefs.label_background.corner_radius,
                prefs.label_background.corner_segments,
            );
            self.rect_vertices.extend(outline.into_iter().map(|point| {
                ColorVertex::new((point.x as f32, point.y as f32, 0.0), background_color)
            }));

            let foreground_color = entry.foreground().faded(alpha);
            let position = entry.position();
            for quad in entry.quads() {
                let rect = quad.rect + position;
                push_glyph_quad(&mut self.glyph_vertices, rect, quad.uv, foreground_color);
            }
        }
    }
}

/// Emits a glyph quad as two triangles.
fn push_glyph_quad(
    vertices: &mut Vec<TextureColorVertex>,
    rect: Rect,
    uv: Rect,
    color: vantage_geometry::Color,
) {
    let (l, t, r, b) = (
        rect.left as f32,
        rect.top as f32,
        rect.right as f32,
        rect.bottom as f32,
    );
    let (ul, ut, ur, ub) = (
        uv.left as f32,
        uv.top as f32,
        uv.right as f32,
        uv.bottom as f32,
    );
    let lt = TextureColorVertex::new((l, t, 0.0), (ul, ut), color);
    let lb = TextureColorVertex::new((l, b, 0.0), (ul, ub), color);
    let rb = TextureColorVertex::new((r, b, 0.0), (ur, ub), color);
    let rt = TextureColorVertex::new((r, t, 0.0), (ur, ut), color);
    vertices.extend([lt, lb, rb, rb, rt, lt]);
}

/// Collects valid label entries into groups and resolves screen-space
/// overlap greedily at insertion time.
#[derive(Default)]
pub struct LabelLayoutEngine<'frame> {
    index: HashMap<GroupKey, usize>,
    groups: Vec<LabelGroup<'frame>>,
}

impl<'frame> LabelLayoutEngine<'frame> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|group| group.entries.is_empty())
    }

    pub fn groups(&self) -> impl Iterator<Item = &LabelGroup<'frame>> {
        self.groups.iter()
    }

    /// Adds a set-up entry, nudging it until it no longer overlaps any label
    /// placed earlier in its own group. Labels of other groups do not take
    /// part in the comparison. Terminates because each step moves the label
    /// further down-right while the placed set stays fixed.
    pub fn add_entry(&mut self, mut entry: LabelEntry<'frame>, texture: TextureId) {
        debug_assert!(entry.is_valid(), "only valid entries can be laid out");

        let key = GroupKey {
            font: entry.font().clone(),
            on_top: entry.is_on_top(),
        };
        let index = *self.index.entry(key).or_insert_with(|| {
            self.groups.push(LabelGroup::new(
                entry.font().clone(),
                entry.is_on_top(),
                texture,
            ));
            self.groups.len() - 1
        });

        let group = &mut self.groups[index];
        let mut bounds = entry.bounds();
        while group
            .entries
            .iter()
            .any(|placed| placed.bounds().intersects(bounds))
        {
            bounds = bounds + OVERLAP_CORRECTION;
            entry.nudge(OVERLAP_CORRECTION);
        }
        group.entries.push(entry);
    }

    /// Builds and uploads one glyph and one background vertex stream per
    /// group. Runs in the prepare phase.
    pub fn prepare_vertex_buffers(
        &mut self,
        uploader: &mut dyn BufferUploader,
        prefs: &RenderPrefs,
    ) {
        for group in &mut self.groups {
            group.build_vertices(prefs);
            group.rect_buffer = (!group.rect_vertices.is_empty())
                .then(|| uploader.upload_vertices(&group.rect_vertices));
            group.glyph_buffer = (!group.glyph_vertices.is_empty())
                .then(|| uploader.upload_vertices(&group.glyph_vertices));
        }
    }
}
