use xxhash_rust::xxh3::Xxh3;

use crate::foundation::core::CellSize;
use crate::foundation::error::{RenderError, RenderResult};

const XXH3_SEED: u64 = 0x5f3c_91d2_a07e_44b1;

/// Draws the glyph strip the atlas is built from.
///
/// Implementations render `glyphs[i]` in white on opaque black inside the slot
/// `[i * cell.width, (i + 1) * cell.width)` of a strip that is `glyphs.len() * cell.width`
/// pixels wide and `cell.height` pixels tall, and return it as tightly packed RGBA8.
pub trait GlyphRasterizer {
    /// Render the strip.
    fn render_strip(
        &mut self,
        glyphs: &[String],
        cell: CellSize,
        text_size: f32,
    ) -> RenderResult<Vec<u8>>;
}

/// Flattened single-channel ink mask for every glyph of a frame, laid out side by side.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphMask {
    cell: CellSize,
    glyph_count: usize,
    bytes: Vec<u8>,
}

impl GlyphMask {
    /// Cell the mask was built for.
    pub fn cell(&self) -> CellSize {
        self.cell
    }

    /// Number of glyph slots.
    pub fn glyph_count(&self) -> usize {
        self.glyph_count
    }

    /// Bytes per mask pixel row (`glyph_count * cell.width`).
    pub fn stride(&self) -> usize {
        self.glyph_count * self.cell.width
    }

    /// Mask bytes, nonzero where a glyph has ink.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Return `true` when the mask cannot serve any lookup.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Build a mask directly from per-pixel bytes (row stride `glyph_count * cell.width`).
    pub fn from_bytes(cell: CellSize, glyph_count: usize, bytes: Vec<u8>) -> RenderResult<Self> {
        let expected = glyph_count * cell.area();
        if bytes.len() != expected {
            return Err(RenderError::glyph(format!(
                "glyph mask has {} bytes, expected {expected}",
                bytes.len()
            )));
        }
        Ok(Self {
            cell,
            glyph_count,
            bytes,
        })
    }
}

/// Cache identity: cell geometry plus an order-sensitive digest of the glyph strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AtlasKey {
    cell: CellSize,
    glyph_count: usize,
    glyphs_digest: u128,
}

impl AtlasKey {
    /// Compute the key for a glyph set and cell.
    pub fn new(glyphs: &[String], cell: CellSize) -> Self {
        let mut h = Xxh3::with_seed(XXH3_SEED);
        for g in glyphs {
            h.update(&(g.len() as u64).to_le_bytes());
            h.update(g.as_bytes());
        }
        Self {
            cell,
            glyph_count: glyphs.len(),
            glyphs_digest: h.digest128(),
        }
    }
}

/// Cached glyph mask, rebuilt only when the [`AtlasKey`] changes.
pub struct GlyphAtlasCache {
    rasterizer: Box<dyn GlyphRasterizer>,
    key: Option<AtlasKey>,
    mask: GlyphMask,
    rebuilds: u64,
}

impl GlyphAtlasCache {
    /// Create an empty cache drawing glyphs with `rasterizer`.
    pub fn new(rasterizer: Box<dyn GlyphRasterizer>) -> Self {
        Self {
            rasterizer,
            key: None,
            mask: GlyphMask::default(),
            rebuilds: 0,
        }
    }

    /// Return a mask for `glyphs` at `cell`, rebuilding only on a key change.
    ///
    /// Requests that would produce a zero-width or zero-height strip skip the rebuild and return
    /// the current mask unchanged. On rasterizer failure the previous mask and key are kept.
    pub fn ensure(
        &mut self,
        glyphs: &[String],
        cell: CellSize,
        text_size: f32,
    ) -> RenderResult<&GlyphMask> {
        if glyphs.is_empty() || cell.is_empty() {
            tracing::debug!(
                glyphs = glyphs.len(),
                cell_w = cell.width,
                cell_h = cell.height,
                "zero-size atlas request; keeping cached mask"
            );
            return Ok(&self.mask);
        }

        let key = AtlasKey::new(glyphs, cell);
        if self.key == Some(key) {
            return Ok(&self.mask);
        }

        let rgba = self.rasterizer.render_strip(glyphs, cell, text_size)?;
        let pixels = glyphs.len() * cell.area();
        if rgba.len() != pixels * 4 {
            return Err(RenderError::glyph(format!(
                "glyph strip has {} bytes, expected {}",
                rgba.len(),
                pixels * 4
            )));
        }

        // Ink is white on black, so any one channel carries the coverage. Take blue.
        let mut bytes = std::mem::take(&mut self.mask.bytes);
        bytes.clear();
        bytes.extend(rgba.chunks_exact(4).map(|px| px[2]));

        self.mask = GlyphMask {
            cell,
            glyph_count: glyphs.len(),
            bytes,
        };
        self.key = Some(key);
        self.rebuilds = self.rebuilds.saturating_add(1);
        tracing::debug!(
            glyphs = glyphs.len(),
            cell_w = cell.width,
            cell_h = cell.height,
            rebuilds = self.rebuilds,
            "rebuilt glyph atlas"
        );
        Ok(&self.mask)
    }

    /// Current mask without checking freshness.
    pub fn mask(&self) -> &GlyphMask {
        &self.mask
    }

    /// Number of times the mask has been rebuilt.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Drop the cached mask so the next `ensure` rebuilds.
    pub fn invalidate(&mut self) {
        self.key = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/atlas.rs"]
mod tests;
