/// Packed `0xAARRGGBB` pixel written where a glyph mask has no ink.
pub const OPAQUE_BLACK: u32 = 0xFF00_0000;

/// Pack straight-alpha channels into a `0xAARRGGBB` value.
pub fn argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    (u32::from(a) << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Pack an opaque color.
pub fn rgb(r: u8, g: u8, b: u8) -> u32 {
    argb(0xFF, r, g, b)
}

/// Unpack `0xAARRGGBB` into `[r, g, b, a]` byte order.
pub fn argb_to_rgba8(c: u32) -> [u8; 4] {
    let [a, r, g, b] = c.to_be_bytes();
    [r, g, b, a]
}

/// Integer pixel size of one monospace glyph cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellSize {
    /// Cell width in pixels.
    pub width: usize,
    /// Cell height in pixels.
    pub height: usize,
}

impl CellSize {
    /// Create a cell size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Return `true` when either side is zero and nothing can be drawn.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel count of a single cell.
    pub fn area(self) -> usize {
        self.width.saturating_mul(self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
