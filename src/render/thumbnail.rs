use crate::grid::model::{AsciiGrid, ColorMode};
use crate::render::surface::Surface;

/// Brightness above which a dim-mode cell is drawn as a full block.
pub const FULL_BLOCK_BRIGHTNESS: f32 = 0.5;

/// Render a quarter-size preview of `grid` without glyphs.
///
/// Text does not survive downscaling, so every second row and column is drawn as a solid
/// rectangle covering its 2x2 neighbourhood. In non-full-color modes, cells at or below
/// [`FULL_BLOCK_BRIGHTNESS`] shrink to a centered 2x2 dot instead.
pub fn render_thumbnail<G: AsciiGrid + ?Sized>(
    grid: &G,
    output_width: u32,
    output_height: u32,
) -> Surface {
    let width = (output_width / 4) as i64;
    let height = (output_height / 4) as i64;
    let mut surface = Surface::new(width as usize, height as usize);

    let rows = grid.rows();
    let columns = grid.columns();
    if rows == 0 || columns == 0 {
        return surface;
    }
    let full_color = grid.color_mode() == ColorMode::FullColor;
    let (rows_i, cols_i) = (rows as i64, columns as i64);

    for r in (0..rows).step_by(2) {
        let ymin = height * r as i64 / rows_i;
        let ymax = height * (r as i64 + 2) / rows_i;
        for c in (0..columns).step_by(2) {
            let xmin = width * c as i64 / cols_i;
            let xmax = width * (c as i64 + 2) / cols_i;
            let color = grid.color_at(r, c);
            if full_color || grid.brightness_ratio_at(r, c) > FULL_BLOCK_BRIGHTNESS {
                surface.fill_rect(xmin, ymin, xmax, ymax, color);
            } else {
                let x = (xmin + xmax) / 2 - 1;
                let y = (ymin + ymax) / 2 - 1;
                surface.fill_rect(x, y, x + 2, y + 2, color);
            }
        }
    }
    surface
}

#[cfg(test)]
#[path = "../../tests/unit/render/thumbnail.rs"]
mod tests;
