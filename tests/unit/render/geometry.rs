use super::*;

fn fitted(max: (u32, u32), source: (u32, u32)) -> OutputGeometry {
    let mut g = OutputGeometry::default();
    g.set_maximum_size(max.0, max.1);
    g.set_source_size(source.0, source.1);
    g
}

#[test]
fn wide_source_pins_width() {
    let g = fitted((800, 800), (1600, 900));
    assert_eq!(g.output_width(), 800);
    assert_eq!(g.output_height(), 450);
}

#[test]
fn narrow_source_pins_height() {
    let g = fitted((800, 600), (480, 640));
    assert_eq!(g.output_height(), 600);
    assert_eq!(g.output_width(), 450);
}

#[test]
fn equal_aspect_fills_viewport() {
    let g = fitted((1280, 720), (1920, 1080));
    assert_eq!((g.output_width(), g.output_height()), (1280, 720));
}

#[test]
fn text_size_scales_with_width_and_has_floor() {
    let small = fitted((640, 480), (640, 480));
    assert_eq!(small.text_size(), 10);
    assert_eq!(small.cell(), CellSize::new(7, 9));

    let large = fitted((2000, 1000), (2000, 1000));
    assert_eq!(large.text_size(), 20);
    assert!((large.char_pixel_width() - 14.0).abs() < 1e-4);
    assert!((large.char_pixel_height() - 18.0).abs() < 1e-4);
    assert_eq!(large.cell(), CellSize::new(14, 18));
}

#[test]
fn grid_dimensions_follow_char_metrics() {
    let g = fitted((800, 800), (1600, 900));
    // text size 10 -> 7.0 x 9.0 cells
    assert_eq!(g.columns(), 114);
    assert_eq!(g.rows(), 50);
    assert_eq!(g.columns_for_width(70), 10);
    assert_eq!(g.rows_for_height(89), 9);
}

#[test]
fn zero_sizes_collapse_output() {
    let g = fitted((800, 800), (0, 900));
    assert_eq!((g.output_width(), g.output_height()), (0, 0));
    assert_eq!(g.text_size(), 10);

    let no_viewport = fitted((0, 0), (640, 480));
    assert_eq!(no_viewport.output_width(), 0);
}
