//! Font metrics: descriptors, cached instances, and the catalog.
//!
//! Only glyph *metrics* live here. Rasterization and atlas texture upload are
//! a collaborator's concern behind [`FontLoader`]; this module works with the
//! placements and advances the loader produced.

mod disk;

pub use disk::*;

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Result;
use derive_more::Constructor;
use vantage_geometry::{Point, Rect, Size, Vector};

use crate::gpu::TextureId;

/// Cache key for a loaded font: file path and integral point size.
///
/// Two descriptors are equal iff path and size match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontDescriptor {
    path: PathBuf,
    size: u32,
}

impl FontDescriptor {
    pub fn new(path: impl Into<PathBuf>, size: u32) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    pub fn with_size(&self, size: u32) -> Self {
        Self {
            path: self.path.clone(),
            size,
        }
    }
}

/// Metrics and atlas placement of a single rasterized glyph.
#[derive(Debug, Clone, Copy)]
pub struct Glyph {
    pub advance: f64,
    /// Outline bounds relative to the pen position on the baseline (y down);
    /// empty for glyphs without visible outline, e.g. whitespace.
    pub bounds: Rect,
    /// Texture coordinates of the rasterized glyph in the atlas.
    pub uv: Rect,
}

/// A glyph's placed rectangle and its atlas texture coordinates.
#[derive(Debug, Clone, Copy, Constructor)]
pub struct GlyphQuad {
    pub rect: Rect,
    pub uv: Rect,
}

/// Metrics of one font at one size, plus its atlas texture handle.
///
/// Owned exclusively by the [`FontCatalog`]; lives as long as the catalog.
#[derive(Debug, Clone)]
pub struct FontInstance {
    texture: TextureId,
    ascent: f64,
    line_height: f64,
    glyphs: HashMap<char, Glyph>,
}

impl FontInstance {
    pub fn new(
        texture: TextureId,
        ascent: f64,
        line_height: f64,
        glyphs: HashMap<char, Glyph>,
    ) -> Self {
        Self {
            texture,
            ascent,
            line_height,
            glyphs,
        }
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }

    pub fn ascent(&self) -> f64 {
        self.ascent
    }

    pub fn line_height(&self) -> f64 {
        self.line_height
    }

    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c)
    }

    /// Measures a single line of text. Characters outside the loaded charset
    /// contribute nothing.
    pub fn measure_line(&self, line: &str) -> Size {
        let width = line
            .chars()
            .filter_map(|c| self.glyph(c))
            .map(|glyph| glyph.advance)
            .sum();
        Size::new(width, self.line_height)
    }

    /// Glyph quads for one line, with the line's top-left corner at `origin`.
    pub fn line_quads(&self, line: &str, origin: Point) -> Vec<GlyphQuad> {
        let mut quads = Vec::with_capacity(line.len());
        let mut pen = Vector::new(origin.x, origin.y + self.ascent);
        for c in line.chars() {
            let Some(glyph) = self.glyph(c) else {
                continue;
            };
            if !glyph.bounds.is_empty() {
                quads.push(GlyphQuad::new(glyph.bounds + pen, glyph.uv));
            }
            pen.x += glyph.advance;
        }
        quads
    }
}

/// Loads font instances. The on-disk font file loader sits behind this trait;
/// failures here are its concern and simply propagate.
pub trait FontLoader {
    fn load(&mut self, descriptor: &FontDescriptor) -> Result<FontInstance>;
}

/// Memoizing single-owner cache of font instances, keyed by descriptor.
///
/// Never evicts; the working set of distinct fonts is small and bounded.
/// Explicitly constructed and injected, never a process-wide singleton.
pub struct FontCatalog {
    loader: Box<dyn FontLoader>,
    instances: HashMap<FontDescriptor, FontInstance>,
}

impl FontCatalog {
    pub fn new(loader: Box<dyn FontLoader>) -> Self {
        Self {
            loader,
            instances: HashMap::new(),
        }
    }

    /// Returns the cached instance for the descriptor, loading it on first
    /// request.
    pub fn instance(&mut self, descriptor: &FontDescriptor) -> Result<&FontInstance> {
        if !self.instances.contains_key(descriptor) {
            let instance = self.loader.load(descriptor)?;
            self.instances.insert(descriptor.clone(), instance);
        }
        Ok(self
            .instances
            .get(descriptor)
            .expect("Internal Error: instance cached above"))
    }

    pub fn measure_line(&mut self, descriptor: &FontDescriptor, line: &str) -> Result<Size> {
        Ok(self.instance(descriptor)?.measure_line(line))
    }

    /// Decrements the point size until `text` measures at most `max_width`
    /// wide or the size reaches `min_size`.
    ///
    /// Greedy linear search; glyph widths are monotonic in size for standard
    /// rasterization, so the simple decrement loop suffices.
    pub fn select_size_to_fit_width(
        &mut self,
        descriptor: &FontDescriptor,
        text: &str,
        max_width: f64,
        min_size: u32,
    ) -> Result<FontDescriptor> {
        let mut current = descriptor.clone();
        loop {
            let width = self.measure_line(&current, text)?.width;
            if width <= max_width || current.size() <= min_size {
                return Ok(current);
            }
            current = current.with_size(current.size() - 1);
        }
    }

    /// Interpolates a size between `max_size` at distance zero and `min_size`
    /// at `max_distance`, clamped to `[min_size, max_size]`. Used to shrink
    /// labels that are far from the camera.
    pub fn select_size_by_distance(
        &self,
        descriptor: &FontDescriptor,
        distance: f64,
        max_distance: f64,
        min_size: u32,
        max_size: u32,
    ) -> FontDescriptor {
        if max_distance <= 0.0 {
            return descriptor.with_size(max_size);
        }
        let t = (distance / max_distance).clamp(0.0, 1.0);
        let size = max_size as f64 - t * (max_size as f64 - min_size as f64);
        descriptor.with_size((size.round() as u32).clamp(min_size, max_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::FixedMetricsLoader;

    fn catalog() -> FontCatalog {
        FontCatalog::new(Box::new(FixedMetricsLoader::default()))
    }

    fn descriptor(size: u32) -> FontDescriptor {
        FontDescriptor::new("fonts/test.ttf", size)
    }

    #[test]
    fn instances_are_cached_by_descriptor() {
        let mut catalog = FontCatalog::new(Box::new(FixedMetricsLoader::default()));
        let first = catalog.instance(&descriptor(16)).unwrap().texture();
        let again = catalog.instance(&descriptor(16)).unwrap().texture();
        assert_eq!(first, again);

        // A different size is a different cache entry.
        let other = catalog.instance(&descriptor(12)).unwrap().texture();
        assert_ne!(first, other);
    }

    #[test]
    fn measure_sums_advances_and_uses_line_height() {
        let mut catalog = catalog();
        let size = catalog.measure_line(&descriptor(16), "abcd").unwrap();
        assert_eq!(size, Size::new(40.0, 16.0));
    }

    #[test]
    fn fit_width_returns_first_size_that_fits() {
        let mut catalog = catalog();
        // At 16pt "wide" measures 40; 60 requires 24 or less.
        let result = catalog
            .select_size_to_fit_width(&descriptor(32), "wide", 60.0, 4)
            .unwrap();
        assert_eq!(result.size(), 24);
    }

    #[test]
    fn fit_width_terminates_at_min_size_when_nothing_fits() {
        let mut catalog = catalog();
        let result = catalog
            .select_size_to_fit_width(&descriptor(32), "does not fit anywhere", 1.0, 6)
            .unwrap();
        assert_eq!(result.size(), 6);
    }

    #[test]
    fn fit_width_keeps_the_requested_size_when_it_already_fits() {
        let mut catalog = catalog();
        let result = catalog
            .select_size_to_fit_width(&descriptor(16), "ab", 1000.0, 4)
            .unwrap();
        assert_eq!(result.size(), 16);
    }

    #[test]
    fn size_by_distance_interpolates_and_clamps() {
        let catalog = catalog();
        let base = descriptor(16);
        assert_eq!(
            catalog
                .select_size_by_distance(&base, 0.0, 100.0, 8, 16)
                .size(),
            16
        );
        assert_eq!(
            catalog
                .select_size_by_distance(&base, 50.0, 100.0, 8, 16)
                .size(),
            12
        );
        assert_eq!(
            catalog
                .select_size_by_distance(&base, 100.0, 100.0, 8, 16)
                .size(),
            8
        );
        // Beyond the horizon clamps to the minimum.
        assert_eq!(
            catalog
                .select_size_by_distance(&base, 1000.0, 100.0, 8, 16)
                .size(),
            8
        );
    }

    #[test]
    fn whitespace_advances_without_producing_quads() {
        let mut catalog = catalog();
        let instance = catalog.instance(&descriptor(16)).unwrap();
        let quads = instance.line_quads("a b", Point::ZERO);
        assert_eq!(quads.len(), 2);
        // The second visible glyph starts two advances in.
        assert_eq!(quads[1].rect.left, 20.0);
    }
}
