use crate::foundation::core::CellSize;

/// Text size used before any camera size is known.
pub(crate) const DEFAULT_TEXT_SIZE: u32 = 10;

/// Output raster geometry derived from the viewport and the camera/source aspect ratio.
///
/// Glyph metrics scale with output width: a 10 point text size per 1000 px, never below 10.
/// Character cells are 70% of the text size wide and 90% tall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutputGeometry {
    max_width: u32,
    max_height: u32,
    output_width: u32,
    output_height: u32,
    text_size: u32,
    char_pixel_width: f32,
    char_pixel_height: f32,
}

impl Default for OutputGeometry {
    fn default() -> Self {
        Self {
            max_width: 0,
            max_height: 0,
            output_width: 0,
            output_height: 0,
            text_size: DEFAULT_TEXT_SIZE,
            char_pixel_width: 3.5,
            char_pixel_height: 4.5,
        }
    }
}

impl OutputGeometry {
    /// Set the viewport bounds the output must fit in.
    ///
    /// Takes effect on the next [`OutputGeometry::set_source_size`].
    pub fn set_maximum_size(&mut self, max_width: u32, max_height: u32) {
        self.max_width = max_width;
        self.max_height = max_height;
    }

    /// Fit the source aspect ratio into the viewport and recompute glyph metrics.
    ///
    /// A source narrower than the viewport pins the height; otherwise the width is pinned.
    /// Aspect ratios are compared by cross-multiplication so the result is exact.
    pub fn set_source_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || self.max_width == 0 || self.max_height == 0 {
            tracing::warn!(
                source_w = width,
                source_h = height,
                max_w = self.max_width,
                max_h = self.max_height,
                "degenerate geometry; output collapses to 0x0"
            );
            self.output_width = 0;
            self.output_height = 0;
        } else {
            let (sw, sh) = (u64::from(width), u64::from(height));
            let (mw, mh) = (u64::from(self.max_width), u64::from(self.max_height));
            if sw * mh < mw * sh {
                self.output_height = self.max_height;
                self.output_width = (mh * sw / sh) as u32;
            } else {
                self.output_width = self.max_width;
                self.output_height = (mw * sh / sw) as u32;
            }
        }

        self.text_size = (f64::from(self.output_width) / 100.0)
            .max(f64::from(DEFAULT_TEXT_SIZE))
            .round() as u32;
        self.char_pixel_width = self.text_size as f32 * 0.7;
        self.char_pixel_height = self.text_size as f32 * 0.9;
    }

    /// Viewport width bound.
    pub fn max_width(&self) -> u32 {
        self.max_width
    }

    /// Viewport height bound.
    pub fn max_height(&self) -> u32 {
        self.max_height
    }

    /// Output image width in pixels.
    pub fn output_width(&self) -> u32 {
        self.output_width
    }

    /// Output image height in pixels.
    pub fn output_height(&self) -> u32 {
        self.output_height
    }

    /// Font size the glyph atlas is rasterized at.
    pub fn text_size(&self) -> u32 {
        self.text_size
    }

    /// Fractional character advance.
    pub fn char_pixel_width(&self) -> f32 {
        self.char_pixel_width
    }

    /// Fractional character line height.
    pub fn char_pixel_height(&self) -> f32 {
        self.char_pixel_height
    }

    /// Integer cell the atlas and row workers operate on (truncated metrics).
    pub fn cell(&self) -> CellSize {
        CellSize::new(
            self.char_pixel_width as usize,
            self.char_pixel_height as usize,
        )
    }

    /// Number of grid columns that fit in `width` pixels.
    pub fn columns_for_width(&self, width: u32) -> usize {
        (width as f32 / self.char_pixel_width) as usize
    }

    /// Number of grid rows that fit in `height` pixels.
    pub fn rows_for_height(&self, height: u32) -> usize {
        (height as f32 / self.char_pixel_height) as usize
    }

    /// Grid columns for the current output width.
    pub fn columns(&self) -> usize {
        self.columns_for_width(self.output_width)
    }

    /// Grid rows for the current output height.
    pub fn rows(&self) -> usize {
        self.rows_for_height(self.output_height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/geometry.rs"]
mod tests;
