use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

/// Slot `i` gets ink on every pixel where `(x + y) % (i + 2) == 0`.
struct PatternRasterizer {
    calls: Arc<AtomicUsize>,
}

impl GlyphRasterizer for PatternRasterizer {
    fn render_strip(
        &mut self,
        glyphs: &[String],
        cell: CellSize,
        _text_size: f32,
    ) -> RenderResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let w = glyphs.len() * cell.width;
        let mut out = Vec::with_capacity(w * cell.height * 4);
        for y in 0..cell.height {
            for x in 0..w {
                let slot = x / cell.width;
                let v = if (x % cell.width + y) % (slot + 2) == 0 {
                    255
                } else {
                    0
                };
                out.extend_from_slice(&[v, v, v, 255]);
            }
        }
        Ok(out)
    }
}

struct FailingRasterizer;

impl GlyphRasterizer for FailingRasterizer {
    fn render_strip(&mut self, _: &[String], _: CellSize, _: f32) -> RenderResult<Vec<u8>> {
        Err(RenderError::glyph("no font"))
    }
}

fn cache() -> (GlyphAtlasCache, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = GlyphAtlasCache::new(Box::new(PatternRasterizer {
        calls: Arc::clone(&calls),
    }));
    (c, calls)
}

fn glyphs(s: &[&str]) -> Vec<String> {
    s.iter().map(|g| g.to_string()).collect()
}

#[test]
fn mask_is_strip_of_all_glyphs() {
    let (mut c, _) = cache();
    let set = glyphs(&[" ", ".", "#"]);
    let mask = c.ensure(&set, CellSize::new(4, 3), 10.0).unwrap();
    assert_eq!(mask.glyph_count(), 3);
    assert_eq!(mask.stride(), 12);
    assert_eq!(mask.bytes().len(), 36);
    // Slot 0, pixel (0,0): (0+0)%2 == 0 -> ink.
    assert_eq!(mask.bytes()[0], 255);
    // Slot 1 starts at x=4; local (1,0): 1%3 != 0 -> no ink.
    assert_eq!(mask.bytes()[5], 0);
}

#[test]
fn identical_requests_do_not_rebuild() {
    let (mut c, calls) = cache();
    let set = glyphs(&[" ", "@"]);
    let first = c.ensure(&set, CellSize::new(7, 9), 10.0).unwrap().clone();
    let second = c.ensure(&set, CellSize::new(7, 9), 10.0).unwrap().clone();
    assert_eq!(first, second);
    assert_eq!(c.rebuilds(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn geometry_or_glyph_change_rebuilds() {
    let (mut c, _) = cache();
    let set = glyphs(&[" ", "@"]);
    c.ensure(&set, CellSize::new(7, 9), 10.0).unwrap();
    c.ensure(&set, CellSize::new(8, 9), 10.0).unwrap();
    c.ensure(&set, CellSize::new(8, 10), 10.0).unwrap();
    c.ensure(&glyphs(&[" ", "%"]), CellSize::new(8, 10), 10.0)
        .unwrap();
    assert_eq!(c.rebuilds(), 4);

    // Reordering changes glyph indices, so it must rebuild too.
    c.ensure(&glyphs(&["%", " "]), CellSize::new(8, 10), 10.0)
        .unwrap();
    assert_eq!(c.rebuilds(), 5);
}

#[test]
fn zero_width_request_is_a_no_op() {
    let (mut c, calls) = cache();
    let set = glyphs(&["a"]);
    let before = c.ensure(&set, CellSize::new(2, 2), 10.0).unwrap().clone();

    let after = c.ensure(&set, CellSize::new(0, 2), 10.0).unwrap().clone();
    assert_eq!(before, after);
    let empty = c.ensure(&[], CellSize::new(2, 2), 10.0).unwrap().clone();
    assert_eq!(before, empty);
    assert_eq!(c.rebuilds(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn invalidate_forces_rebuild() {
    let (mut c, _) = cache();
    let set = glyphs(&["a"]);
    c.ensure(&set, CellSize::new(2, 2), 10.0).unwrap();
    c.invalidate();
    c.ensure(&set, CellSize::new(2, 2), 10.0).unwrap();
    assert_eq!(c.rebuilds(), 2);
}

#[test]
fn rasterizer_failure_keeps_previous_state() {
    let mut c = GlyphAtlasCache::new(Box::new(FailingRasterizer));
    let err = c
        .ensure(&glyphs(&["a"]), CellSize::new(2, 2), 10.0)
        .unwrap_err();
    assert!(matches!(err, RenderError::Glyph(_)));
    assert!(c.mask().is_empty());
    assert_eq!(c.rebuilds(), 0);
}

#[test]
fn mask_from_bytes_checks_length() {
    assert!(GlyphMask::from_bytes(CellSize::new(2, 2), 2, vec![0; 8]).is_ok());
    assert!(GlyphMask::from_bytes(CellSize::new(2, 2), 2, vec![0; 7]).is_err());
}
