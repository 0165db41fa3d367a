use super::*;
use crate::foundation::core::OPAQUE_BLACK;
use crate::grid::model::{Cell, ColorMode, ConversionResult};
use crate::render::fill::{AcceleratedFill, PortableFill};

/// Glyph 0 has no ink, glyph 1 is solid.
fn solid_mask(cell: CellSize) -> GlyphMask {
    let mut bytes = Vec::new();
    for _ in 0..cell.height {
        bytes.extend(std::iter::repeat_n(0u8, cell.width));
        bytes.extend(std::iter::repeat_n(255u8, cell.width));
    }
    GlyphMask::from_bytes(cell, 2, bytes).unwrap()
}

fn row_color(row: usize) -> u32 {
    0xFF00_0000 | (row as u32 + 1)
}

fn solid_grid(rows: usize, columns: usize) -> ConversionResult {
    ConversionResult::from_fn(
        rows,
        columns,
        vec![" ".into(), "#".into()],
        ColorMode::FullColor,
        |r, _| Cell {
            glyph: 1,
            color: row_color(r),
            brightness: 1.0,
        },
    )
}

#[test]
fn bands_partition_rows_exactly() {
    for rows in [1usize, 2, 7, 10, 33, 100] {
        for count in [1usize, 2, 3, 4, 6, 16] {
            let bs = bands(rows, count);
            assert_eq!(bs.len(), count);
            assert_eq!(bs[0].start, 0);
            assert_eq!(bs[count - 1].end, rows);
            for w in bs.windows(2) {
                assert_eq!(w[0].end, w[1].start, "rows={rows} count={count}");
            }
            let covered: usize = bs.iter().map(|b| b.len()).sum();
            assert_eq!(covered, rows);
        }
    }
}

#[test]
fn uneven_rows_use_floor_division() {
    assert_eq!(bands(10, 4), vec![0..2, 2..5, 5..7, 7..10]);
    assert_eq!(band(0, 0, 10), 0..0);
}

#[test]
fn resolve_thread_count_autodetects() {
    assert_eq!(resolve_thread_count(3), 3);
    assert!(resolve_thread_count(0) >= 1);
}

#[test]
fn init_is_idempotent_and_rebuilds_on_change() {
    let mut s = RowScheduler::new();
    assert!(!s.is_running());
    s.init(2).unwrap();
    assert_eq!(s.worker_count(), 2);
    s.init(2).unwrap();
    assert_eq!(s.worker_count(), 2);
    s.init(3).unwrap();
    assert_eq!(s.worker_count(), 3);
    s.destroy();
    assert!(!s.is_running());
}

#[test]
fn render_fills_every_band() {
    let cell = CellSize::new(3, 2);
    let mask = solid_mask(cell);
    let grid = solid_grid(10, 20);
    let mut surface = Surface::new(60, 20);
    let mut s = RowScheduler::new();
    s.init(4).unwrap();

    let stats = s.render(&grid, cell, &mask, &PortableFill, &mut surface);
    assert_eq!(stats.workers, 4);
    assert_eq!(stats.bands, 4);
    assert_eq!(stats.failed_bands, 0);
    for y in 0..20 {
        let expected = row_color(y / 2);
        assert!(surface.row(y).unwrap().iter().all(|&p| p == expected), "row {y}");
    }
}

#[test]
fn parallel_output_matches_single_worker() {
    let cell = CellSize::new(4, 5);
    let mask = solid_mask(cell);
    let grid = ConversionResult::from_fn(
        13,
        9,
        vec![" ".into(), "#".into()],
        ColorMode::Ansi,
        |r, c| Cell {
            glyph: ((r + c) % 2) as u32,
            color: 0xFF00_0000 | (r * 31 + c) as u32,
            brightness: 0.5,
        },
    );

    let mut one = RowScheduler::new();
    one.init(1).unwrap();
    let mut a = Surface::new(36, 65);
    one.render(&grid, cell, &mask, &PortableFill, &mut a);

    let mut many = RowScheduler::new();
    many.init(5).unwrap();
    let mut b = Surface::new(36, 65);
    many.render(&grid, cell, &mask, &AcceleratedFill, &mut b);

    assert_eq!(a, b);
}

#[test]
fn strips_are_clipped_to_surface() {
    let cell = CellSize::new(3, 3);
    let mask = solid_mask(cell);
    let grid = solid_grid(4, 4);
    // Grid covers 12x12 pixels; surface is smaller on both axes.
    let mut surface = Surface::new(10, 7);
    let mut s = RowScheduler::new();
    s.init(3).unwrap();
    let stats = s.render(&grid, cell, &mask, &PortableFill, &mut surface);
    assert_eq!(stats.failed_bands, 0);
    assert_eq!(surface.pixel(9, 6), Some(row_color(2)));
    assert_eq!(surface.pixel(0, 0), Some(row_color(0)));
}

#[test]
fn short_grid_leaves_bottom_untouched() {
    let cell = CellSize::new(2, 2);
    let mask = solid_mask(cell);
    let grid = solid_grid(2, 3);
    let mut surface = Surface::new(6, 8);
    let mut s = RowScheduler::new();
    s.init(4).unwrap();
    let stats = s.render(&grid, cell, &mask, &PortableFill, &mut surface);
    // Two rows across four workers leaves two empty bands.
    assert_eq!(stats.bands, 2);
    assert_eq!(surface.pixel(0, 3), Some(row_color(1)));
    assert_eq!(surface.pixel(0, 4), Some(OPAQUE_BLACK));
}

#[test]
fn failed_band_is_skipped_and_reported() {
    let cell = CellSize::new(2, 2);
    let mask = solid_mask(cell);
    let grid = ConversionResult::from_fn(
        8,
        2,
        vec![" ".into(), "#".into()],
        ColorMode::FullColor,
        |r, _| Cell {
            // Row 6 references a glyph the atlas does not have.
            glyph: if r == 6 { 7 } else { 1 },
            color: row_color(r),
            brightness: 1.0,
        },
    );
    let mut surface = Surface::new(4, 16);
    let mut s = RowScheduler::new();
    s.init(4).unwrap();
    let stats = s.render(&grid, cell, &mask, &PortableFill, &mut surface);

    assert_eq!(stats.failed_bands, 1);
    // Band 3 covers rows 6..8 and failed on its first row.
    assert_eq!(surface.pixel(0, 12), Some(OPAQUE_BLACK));
    assert_eq!(surface.pixel(0, 14), Some(OPAQUE_BLACK));
    // Other bands rendered.
    assert_eq!(surface.pixel(0, 0), Some(row_color(0)));
    assert_eq!(surface.pixel(0, 11), Some(row_color(5)));
}

#[test]
fn render_without_init_starts_default_pool() {
    let cell = CellSize::new(1, 1);
    let mask = solid_mask(cell);
    let grid = solid_grid(3, 3);
    let mut surface = Surface::new(3, 3);
    let mut s = RowScheduler::new();
    let stats = s.render(&grid, cell, &mask, &PortableFill, &mut surface);
    assert!(s.is_running());
    assert_eq!(stats.workers, resolve_thread_count(0));
    assert_eq!(surface.pixel(2, 2), Some(row_color(2)));
}
