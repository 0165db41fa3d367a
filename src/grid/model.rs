use crate::foundation::error::{RenderError, RenderResult};

/// Color policy the converter used for a frame.
///
/// Rendering only distinguishes [`ColorMode::FullColor`] from everything else.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Single ink color.
    #[default]
    Monochrome,
    /// Small fixed palette.
    Ansi,
    /// Per-cell colors sampled from the source image.
    FullColor,
}

/// Read-only view of one converted frame.
///
/// Per-cell accessors are only defined for `row < rows()` and `col < columns()`. Implementors
/// must be `Sync`: row workers read the same grid concurrently.
pub trait AsciiGrid: Sync {
    /// Number of grid rows.
    fn rows(&self) -> usize;
    /// Number of grid columns.
    fn columns(&self) -> usize;
    /// Distinct glyphs used by this frame, addressed by [`AsciiGrid::glyph_index_at`].
    fn glyph_set(&self) -> &[String];
    /// Index into [`AsciiGrid::glyph_set`] for a cell.
    fn glyph_index_at(&self, row: usize, col: usize) -> u32;
    /// Packed `0xAARRGGBB` color for a cell.
    fn color_at(&self, row: usize, col: usize) -> u32;
    /// Normalized brightness in `[0, 1]`.
    fn brightness_ratio_at(&self, row: usize, col: usize) -> f32;
    /// Color policy for the frame.
    fn color_mode(&self) -> ColorMode;

    /// Return `true` when there is nothing to draw.
    fn is_degenerate(&self) -> bool {
        self.rows() == 0 || self.columns() == 0 || self.glyph_set().is_empty()
    }
}

/// Values for a single cell, used by [`ConversionResult::from_fn`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    /// Glyph index.
    pub glyph: u32,
    /// Packed `0xAARRGGBB` color.
    pub color: u32,
    /// Normalized brightness.
    pub brightness: f32,
}

/// Owned, row-major grid frame.
///
/// This is the JSON interchange format of the command-line front end. Deserialization goes
/// through [`ConversionResult::new`], so a decoded grid always has consistent vector lengths.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawConversionResult")]
pub struct ConversionResult {
    rows: usize,
    columns: usize,
    glyph_set: Vec<String>,
    glyph_indices: Vec<u32>,
    colors: Vec<u32>,
    brightness: Vec<f32>,
    color_mode: ColorMode,
}

/// Unchecked wire form of [`ConversionResult`].
#[derive(serde::Deserialize)]
struct RawConversionResult {
    rows: usize,
    columns: usize,
    glyph_set: Vec<String>,
    glyph_indices: Vec<u32>,
    colors: Vec<u32>,
    brightness: Vec<f32>,
    #[serde(default)]
    color_mode: ColorMode,
}

impl TryFrom<RawConversionResult> for ConversionResult {
    type Error = RenderError;

    fn try_from(raw: RawConversionResult) -> RenderResult<Self> {
        Self::new(
            raw.rows,
            raw.columns,
            raw.glyph_set,
            raw.glyph_indices,
            raw.colors,
            raw.brightness,
            raw.color_mode,
        )
    }
}

impl ConversionResult {
    /// Build a grid from row-major cell vectors.
    ///
    /// Every per-cell vector must hold exactly `rows * columns` entries.
    pub fn new(
        rows: usize,
        columns: usize,
        glyph_set: Vec<String>,
        glyph_indices: Vec<u32>,
        colors: Vec<u32>,
        brightness: Vec<f32>,
        color_mode: ColorMode,
    ) -> RenderResult<Self> {
        let out = Self {
            rows,
            columns,
            glyph_set,
            glyph_indices,
            colors,
            brightness,
            color_mode,
        };
        out.validate()?;
        Ok(out)
    }

    /// Build a grid by evaluating `cell` for every `(row, col)`.
    pub fn from_fn(
        rows: usize,
        columns: usize,
        glyph_set: Vec<String>,
        color_mode: ColorMode,
        mut cell: impl FnMut(usize, usize) -> Cell,
    ) -> Self {
        let n = rows.saturating_mul(columns);
        let mut glyph_indices = Vec::with_capacity(n);
        let mut colors = Vec::with_capacity(n);
        let mut brightness = Vec::with_capacity(n);
        for r in 0..rows {
            for c in 0..columns {
                let v = cell(r, c);
                glyph_indices.push(v.glyph);
                colors.push(v.color);
                brightness.push(v.brightness);
            }
        }
        Self {
            rows,
            columns,
            glyph_set,
            glyph_indices,
            colors,
            brightness,
            color_mode,
        }
    }

    /// Check that per-cell vectors match the declared dimensions.
    ///
    /// Glyph indices are not range-checked here; row workers reject out-of-range indices per
    /// band.
    pub fn validate(&self) -> RenderResult<()> {
        let n = self
            .rows
            .checked_mul(self.columns)
            .ok_or_else(|| RenderError::validation("grid dimensions overflow"))?;
        for (name, len) in [
            ("glyph_indices", self.glyph_indices.len()),
            ("colors", self.colors.len()),
            ("brightness", self.brightness.len()),
        ] {
            if len != n {
                return Err(RenderError::validation(format!(
                    "{name} has {len} entries, expected rows*columns = {n}"
                )));
            }
        }
        Ok(())
    }

    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.columns + col
    }
}

impl AsciiGrid for ConversionResult {
    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn glyph_set(&self) -> &[String] {
        &self.glyph_set
    }

    fn glyph_index_at(&self, row: usize, col: usize) -> u32 {
        self.glyph_indices[self.idx(row, col)]
    }

    fn color_at(&self, row: usize, col: usize) -> u32 {
        self.colors[self.idx(row, col)]
    }

    fn brightness_ratio_at(&self, row: usize, col: usize) -> f32 {
        self.brightness[self.idx(row, col)]
    }

    fn color_mode(&self) -> ColorMode {
        self.color_mode
    }
}

#[cfg(test)]
#[path = "../../tests/unit/grid/model.rs"]
mod tests;
