use std::path::Path;

use crate::config::RendererOpts;
use crate::foundation::core::{CellSize, OPAQUE_BLACK};
use crate::foundation::error::RenderResult;
use crate::grid::model::AsciiGrid;
use crate::render::atlas::{GlyphAtlasCache, GlyphRasterizer};
use crate::render::fill::{RowFill, select_row_fill};
use crate::render::geometry::OutputGeometry;
use crate::render::scheduler::{FrameStats, RowScheduler};
use crate::render::surface::{Surface, SurfaceFlipper};
use crate::render::text::FontGlyphRasterizer;
use crate::render::thumbnail::render_thumbnail;

/// Grid-to-raster renderer.
///
/// Owns the output geometry, the glyph atlas, the row worker pool and a pair of flipped
/// surfaces. A single caller drives it serially; each [`AsciiRenderer::create_bitmap`] call
/// blocks until every row band has been written, then publishes the frame.
pub struct AsciiRenderer {
    opts: RendererOpts,
    geometry: OutputGeometry,
    camera: Option<(u32, u32)>,
    atlas: GlyphAtlasCache,
    fill: &'static dyn RowFill,
    scheduler: RowScheduler,
    flipper: SurfaceFlipper,
    last_stats: Option<FrameStats>,
}

impl AsciiRenderer {
    /// Create a renderer drawing glyphs with `rasterizer`.
    pub fn new(rasterizer: Box<dyn GlyphRasterizer>, opts: RendererOpts) -> Self {
        let fill = select_row_fill(opts.fill);
        tracing::debug!(fill = fill.name(), threads = opts.threads, "renderer created");
        Self {
            opts,
            geometry: OutputGeometry::default(),
            camera: None,
            atlas: GlyphAtlasCache::new(rasterizer),
            fill,
            scheduler: RowScheduler::new(),
            flipper: SurfaceFlipper::new(),
            last_stats: None,
        }
    }

    /// Create a renderer rasterizing glyphs from a font file.
    pub fn from_font_path(path: impl AsRef<Path>, opts: RendererOpts) -> RenderResult<Self> {
        let rasterizer = FontGlyphRasterizer::from_path(path)?;
        Ok(Self::new(Box::new(rasterizer), opts))
    }

    /// Options the renderer was built with.
    pub fn opts(&self) -> RendererOpts {
        self.opts
    }

    /// Name of the row fill in use (`"portable"` or `"accelerated"`).
    pub fn fill_name(&self) -> &'static str {
        self.fill.name()
    }

    // --- geometry ---

    /// Set the viewport bounds. Refits the output when a camera size is already known.
    pub fn set_maximum_image_size(&mut self, width: u32, height: u32) {
        self.geometry.set_maximum_size(width, height);
        if let Some((w, h)) = self.camera {
            self.geometry.set_source_size(w, h);
        }
    }

    /// Set the source (camera) frame size and refit the output to its aspect ratio.
    pub fn set_camera_image_size(&mut self, width: u32, height: u32) {
        self.camera = Some((width, height));
        self.geometry.set_source_size(width, height);
        tracing::debug!(
            output_w = self.geometry.output_width(),
            output_h = self.geometry.output_height(),
            text_size = self.geometry.text_size(),
            "output geometry updated"
        );
    }

    /// Current output geometry.
    pub fn geometry(&self) -> &OutputGeometry {
        &self.geometry
    }

    /// Output image width in pixels.
    pub fn output_image_width(&self) -> u32 {
        self.geometry.output_width()
    }

    /// Output image height in pixels.
    pub fn output_image_height(&self) -> u32 {
        self.geometry.output_height()
    }

    /// Fractional character advance in pixels.
    pub fn char_pixel_width(&self) -> f32 {
        self.geometry.char_pixel_width()
    }

    /// Fractional character line height in pixels.
    pub fn char_pixel_height(&self) -> f32 {
        self.geometry.char_pixel_height()
    }

    /// Font size glyphs are rasterized at.
    pub fn text_size(&self) -> u32 {
        self.geometry.text_size()
    }

    /// Grid columns fitting in `width` pixels.
    pub fn ascii_columns_for_width(&self, width: u32) -> usize {
        self.geometry.columns_for_width(width)
    }

    /// Grid rows fitting in `height` pixels.
    pub fn ascii_rows_for_height(&self, height: u32) -> usize {
        self.geometry.rows_for_height(height)
    }

    /// Grid columns for the current output width.
    pub fn ascii_columns(&self) -> usize {
        self.geometry.columns()
    }

    /// Grid rows for the current output height.
    pub fn ascii_rows(&self) -> usize {
        self.geometry.rows()
    }

    // --- worker pool ---

    /// Start the row worker pool with `count` threads (0 = all cores).
    pub fn init_render_thread_pool(&mut self, count: usize) -> RenderResult<()> {
        self.opts.threads = count;
        self.scheduler.init(count)
    }

    /// Stop the row worker pool. The next frame starts it again on demand.
    pub fn destroy_thread_pool(&mut self) {
        self.scheduler.destroy();
    }

    /// Workers the next frame will be split across, 0 when no pool is running.
    pub fn worker_count(&self) -> usize {
        if self.scheduler.is_running() {
            self.scheduler.worker_count()
        } else {
            0
        }
    }

    fn ensure_pool(&mut self) {
        if self.scheduler.is_running() {
            return;
        }
        if let Err(e) = self.scheduler.init(self.opts.threads) {
            tracing::warn!(error = %e, threads = self.opts.threads, "could not start render pool");
        }
    }

    // --- rendering ---

    /// Most recently committed frame, `None` before the first frame.
    pub fn visible_surface(&self) -> Option<&Surface> {
        self.flipper.visible()
    }

    /// Counters of the last full-resolution frame.
    pub fn last_frame_stats(&self) -> Option<FrameStats> {
        self.last_stats
    }

    /// Times the glyph atlas has been rebuilt.
    pub fn atlas_rebuilds(&self) -> u64 {
        self.atlas.rebuilds()
    }

    /// Render `grid` at the configured output size and return the newly visible frame.
    ///
    /// Degenerate grids produce a blank black frame. If the glyph atlas cannot be built the
    /// previous frame stays visible. Failed row bands keep stale pixels; the rest of the frame
    /// is still published.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(rows = grid.rows(), columns = grid.columns())
    )]
    pub fn create_bitmap<G: AsciiGrid + ?Sized>(&mut self, grid: &G) -> &Surface {
        let width = self.geometry.output_width() as usize;
        let height = self.geometry.output_height() as usize;
        let cell = self.geometry.cell();

        if grid.is_degenerate() || cell.is_empty() {
            tracing::debug!(
                cell_w = cell.width,
                cell_h = cell.height,
                "nothing to draw; presenting blank frame"
            );
            self.flipper.begin_frame(width, height).clear(OPAQUE_BLACK);
            self.last_stats = Some(FrameStats {
                rows: grid.rows(),
                ..FrameStats::default()
            });
            return self.flipper.commit_frame();
        }

        self.ensure_pool();
        let text_size = self.geometry.text_size() as f32;
        let mask = match self.atlas.ensure(grid.glyph_set(), cell, text_size) {
            Ok(mask) => mask,
            Err(e) => {
                tracing::warn!(error = %e, "glyph atlas unavailable; keeping previous frame");
                if self.flipper.visible().is_none() {
                    self.flipper.begin_frame(width, height).clear(OPAQUE_BLACK);
                    self.flipper.commit_frame();
                }
                return self.flipper.front();
            }
        };

        let surface = self.flipper.begin_frame(width, height);
        clear_uncovered(surface, grid, cell);
        let stats = self.scheduler.render(grid, cell, mask, self.fill, surface);
        tracing::debug!(
            elapsed_us = stats.elapsed.as_micros() as u64,
            threads = stats.workers,
            failed_bands = stats.failed_bands,
            "rendered frame"
        );
        self.last_stats = Some(stats);
        self.flipper.commit_frame()
    }

    /// Render a quarter-size, glyph-free preview of `grid`.
    pub fn create_thumbnail_bitmap<G: AsciiGrid + ?Sized>(&self, grid: &G) -> Surface {
        render_thumbnail(
            grid,
            self.geometry.output_width(),
            self.geometry.output_height(),
        )
    }
}

/// Blank the pixels right of and below the area the grid covers.
///
/// The write target still holds the frame from two commits ago; row workers only overwrite the
/// covered area.
fn clear_uncovered<G: AsciiGrid + ?Sized>(surface: &mut Surface, grid: &G, cell: CellSize) {
    let covered_w = (grid.columns() * cell.width) as i64;
    let covered_h = (grid.rows() * cell.height) as i64;
    let (w, h) = (surface.width() as i64, surface.height() as i64);
    surface.fill_rect(covered_w, 0, w, covered_h, OPAQUE_BLACK);
    surface.fill_rect(0, covered_h, w, h, OPAQUE_BLACK);
}

#[cfg(test)]
#[path = "../../tests/unit/render/engine.rs"]
mod tests;
