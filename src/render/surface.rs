use crate::foundation::core::{OPAQUE_BLACK, argb_to_rgba8};

/// Raster target holding packed `0xAARRGGBB` pixels, row-major and tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Surface {
    /// Allocate an opaque black surface.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![OPAQUE_BLACK; width.saturating_mul(height)],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Return `true` when the surface has the given dimensions.
    pub fn has_size(&self, width: usize, height: usize) -> bool {
        self.width == width && self.height == height
    }

    /// All pixels, row-major.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// One row of pixels, or `None` when `y` is out of bounds.
    pub fn row(&self, y: usize) -> Option<&[u32]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.pixels.get(start..start + self.width)
    }

    /// Reset every pixel to `color`.
    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Fill the half-open rectangle `[x0, x1) x [y0, y1)`, clipped to the surface.
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: u32) {
        let clamp_x = |v: i64| v.clamp(0, self.width as i64) as usize;
        let clamp_y = |v: i64| v.clamp(0, self.height as i64) as usize;
        let (x0, x1) = (clamp_x(x0), clamp_x(x1));
        let (y0, y1) = (clamp_y(y0), clamp_y(y1));
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for y in y0..y1 {
            let start = y * self.width;
            self.pixels[start + x0..start + x1].fill(color);
        }
    }

    /// Convert to an RGBA8 image for display or export.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let mut data = Vec::with_capacity(self.pixels.len() * 4);
        for &px in &self.pixels {
            data.extend_from_slice(&argb_to_rgba8(px));
        }
        image::RgbaImage::from_raw(self.width as u32, self.height as u32, data)
            .unwrap_or_else(|| image::RgbaImage::new(self.width as u32, self.height as u32))
    }
}

/// Double-buffered pair of surfaces.
///
/// One surface is visible; the other is the write target. [`SurfaceFlipper::begin_frame`]
/// always hands out the write target and [`SurfaceFlipper::commit_frame`] swaps roles. The
/// mutable borrow taken by `begin_frame` means the visible surface can never be read mid-write.
/// Both slots start as 0x0 surfaces and are sized on first use.
#[derive(Debug)]
pub struct SurfaceFlipper {
    surfaces: [Surface; 2],
    active: usize,
    pending: bool,
    committed: bool,
    allocations: u64,
}

impl Default for SurfaceFlipper {
    fn default() -> Self {
        Self {
            surfaces: [Surface::new(0, 0), Surface::new(0, 0)],
            active: 0,
            pending: false,
            committed: false,
            allocations: 0,
        }
    }
}

impl SurfaceFlipper {
    /// Create a flipper; surfaces are allocated lazily.
    pub fn new() -> Self {
        Self::default()
    }

    fn building_index(&self) -> usize {
        (self.active + 1) % self.surfaces.len()
    }

    /// Return the inactive surface, reallocating it if its size differs from the request.
    pub fn begin_frame(&mut self, width: usize, height: usize) -> &mut Surface {
        let next = self.building_index();
        if !self.surfaces[next].has_size(width, height) {
            tracing::debug!(width, height, slot = next, "allocating frame surface");
            self.allocations = self.allocations.saturating_add(1);
            self.surfaces[next] = Surface::new(width, height);
        }
        self.pending = true;
        &mut self.surfaces[next]
    }

    /// Make the surface handed out by the last [`SurfaceFlipper::begin_frame`] visible and
    /// return it.
    ///
    /// Without a pending `begin_frame` nothing flips and the current front surface is returned.
    pub fn commit_frame(&mut self) -> &Surface {
        if self.pending {
            self.active = self.building_index();
            self.pending = false;
            self.committed = true;
        }
        &self.surfaces[self.active]
    }

    /// The latest fully committed surface, `None` before the first commit.
    pub fn visible(&self) -> Option<&Surface> {
        self.committed.then(|| &self.surfaces[self.active])
    }

    /// Front slot, which is a 0x0 surface until the first commit.
    pub fn front(&self) -> &Surface {
        &self.surfaces[self.active]
    }

    /// Index of the visible slot (0 or 1).
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Number of surface allocations performed so far.
    pub fn allocations(&self) -> u64 {
        self.allocations
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
