use super::*;
use crate::foundation::core::OPAQUE_BLACK;
use crate::grid::model::{Cell, ConversionResult};

const INK: u32 = 0xFF20_C040;

fn uniform(rows: usize, columns: usize, mode: ColorMode, brightness: f32) -> ConversionResult {
    ConversionResult::from_fn(rows, columns, vec!["#".into()], mode, |_, _| Cell {
        glyph: 0,
        color: INK,
        brightness,
    })
}

fn ink_count(s: &Surface) -> usize {
    s.pixels().iter().filter(|&&p| p == INK).count()
}

#[test]
fn thumbnail_is_quarter_size() {
    let s = render_thumbnail(&uniform(4, 4, ColorMode::FullColor, 0.0), 800, 450);
    assert_eq!((s.width(), s.height()), (200, 112));
}

#[test]
fn full_color_draws_full_blocks() {
    // 4x4 grid on a 16x16 thumbnail: each sampled cell covers 8x8.
    let s = render_thumbnail(&uniform(4, 4, ColorMode::FullColor, 0.0), 64, 64);
    assert_eq!(ink_count(&s), 16 * 16);
}

#[test]
fn bright_cells_draw_full_blocks() {
    let s = render_thumbnail(&uniform(4, 4, ColorMode::Monochrome, 0.9), 64, 64);
    assert_eq!(ink_count(&s), 16 * 16);
}

#[test]
fn dim_cells_draw_centered_dots() {
    let s = render_thumbnail(&uniform(4, 4, ColorMode::Monochrome, 0.1), 64, 64);
    // Four sampled cells, each a 2x2 dot.
    assert_eq!(ink_count(&s), 4 * 4);
    // First block spans [0, 8); its dot sits at (3..5, 3..5).
    assert_eq!(s.pixel(3, 3), Some(INK));
    assert_eq!(s.pixel(4, 4), Some(INK));
    assert_eq!(s.pixel(2, 2), Some(OPAQUE_BLACK));
    assert_eq!(s.pixel(5, 5), Some(OPAQUE_BLACK));
}

#[test]
fn midpoint_brightness_is_a_dot() {
    let s = render_thumbnail(&uniform(2, 2, ColorMode::Ansi, 0.5), 32, 32);
    assert_eq!(ink_count(&s), 4);
}

#[test]
fn odd_grids_clip_last_block() {
    // Last sampled row/column (index 4) extends past the surface and is clipped.
    let s = render_thumbnail(&uniform(5, 5, ColorMode::FullColor, 1.0), 40, 40);
    assert_eq!((s.width(), s.height()), (10, 10));
    assert_eq!(ink_count(&s), 100);
}

#[test]
fn empty_grid_is_black() {
    let s = render_thumbnail(&uniform(0, 0, ColorMode::FullColor, 1.0), 40, 40);
    assert!(s.pixels().iter().all(|&p| p == OPAQUE_BLACK));
}
