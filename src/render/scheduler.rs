use std::ops::Range;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::foundation::core::CellSize;
use crate::foundation::error::{RenderError, RenderResult};
use crate::grid::model::AsciiGrid;
use crate::render::atlas::GlyphMask;
use crate::render::fill::RowFill;
use crate::render::surface::Surface;

/// Rows `[rows*index/count, rows*(index+1)/count)` of band `index`.
///
/// Consecutive bands are contiguous and together cover `[0, rows)`; when `rows` does not
/// divide evenly the floor division spreads the remainder across bands.
pub fn band(index: usize, count: usize, rows: usize) -> Range<usize> {
    if count == 0 {
        return 0..0;
    }
    rows * index / count..rows * (index + 1) / count
}

/// All `count` bands for a grid of `rows` rows.
pub fn bands(rows: usize, count: usize) -> Vec<Range<usize>> {
    (0..count).map(|i| band(i, count, rows)).collect()
}

/// Resolve a requested worker count (0 = available hardware parallelism).
pub fn resolve_thread_count(requested: usize) -> usize {
    if requested > 0 {
        return requested;
    }
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Counters for one full-resolution frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Workers the frame was split across.
    pub workers: usize,
    /// Grid rows in the frame.
    pub rows: usize,
    /// Non-empty bands dispatched.
    pub bands: usize,
    /// Bands that failed and were left stale.
    pub failed_bands: usize,
    /// Wall time spent in the workers.
    pub elapsed: Duration,
}

/// Per-worker scratch, reused across frames.
#[derive(Debug, Default)]
struct RenderTask {
    glyph_indices: Vec<u32>,
    colors: Vec<u32>,
    block: Vec<u32>,
}

impl RenderTask {
    fn prepare(&mut self, columns: usize, cell: CellSize) {
        if self.glyph_indices.len() != columns {
            self.glyph_indices.resize(columns, 0);
        }
        if self.colors.len() != columns {
            self.colors.resize(columns, 0);
        }
        let block_len = cell.area() * columns;
        if self.block.len() != block_len {
            self.block.resize(block_len, 0);
        }
    }

    /// Render `rows` into `target`, whose first pixel row is the top of `rows.start`.
    #[allow(clippy::too_many_arguments)]
    fn run<G: AsciiGrid + ?Sized>(
        &mut self,
        grid: &G,
        rows: Range<usize>,
        cell: CellSize,
        mask: &GlyphMask,
        fill: &dyn RowFill,
        target: &mut [u32],
        surface_width: usize,
    ) -> RenderResult<()> {
        let columns = grid.columns();
        self.prepare(columns, cell);
        let strip_w = columns * cell.width;
        let copy_w = strip_w.min(surface_width);
        let target_rows = target.len().checked_div(surface_width).unwrap_or(0);
        let glyph_count = mask.glyph_count();
        if strip_w == 0 || cell.is_empty() {
            return Ok(());
        }

        for (local, row) in rows.enumerate() {
            let y0 = local * cell.height;
            if y0 >= target_rows {
                break;
            }
            for col in 0..columns {
                let glyph = grid.glyph_index_at(row, col);
                if glyph as usize >= glyph_count {
                    return Err(RenderError::worker(format!(
                        "glyph index {glyph} at ({row}, {col}) outside atlas of {glyph_count} glyphs"
                    )));
                }
                self.glyph_indices[col] = glyph;
                self.colors[col] = grid.color_at(row, col);
            }

            fill.fill_block(
                &mut self.block,
                cell,
                &self.glyph_indices,
                &self.colors,
                mask,
            );

            let visible = cell.height.min(target_rows - y0);
            for (y, src) in self.block.chunks_exact(strip_w).take(visible).enumerate() {
                let dst = (y0 + y) * surface_width;
                target[dst..dst + copy_w].copy_from_slice(&src[..copy_w]);
            }
        }
        Ok(())
    }
}

/// Row-parallel renderer backed by a fixed-size rayon pool.
///
/// Each worker owns its scratch and a disjoint slice of the target surface, so strips are
/// written without locking. The pool is created on demand and rebuilt when the requested
/// thread count changes.
#[derive(Default)]
pub struct RowScheduler {
    pool: Option<rayon::ThreadPool>,
    threads: usize,
    tasks: Vec<RenderTask>,
}

impl RowScheduler {
    /// Create a scheduler without a running pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the pool with `requested` threads, 0 meaning all cores.
    ///
    /// Keeps the current pool when the resolved count is unchanged.
    pub fn init(&mut self, requested: usize) -> RenderResult<()> {
        let n = resolve_thread_count(requested);
        if self.pool.is_some() && self.threads == n {
            return Ok(());
        }
        self.pool = None;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .thread_name(|i| format!("ascii-row-{i}"))
            .build()
            .map_err(|e| RenderError::worker(format!("failed to build rayon thread pool: {e}")))?;
        self.pool = Some(pool);
        self.threads = n;
        self.tasks.resize_with(n, RenderTask::default);
        tracing::debug!(threads = n, "render thread pool ready");
        Ok(())
    }

    /// Shut the pool down. The next render starts a default-sized pool.
    pub fn destroy(&mut self) {
        if self.pool.take().is_some() {
            tracing::debug!(threads = self.threads, "render thread pool destroyed");
        }
    }

    /// Return `true` while a pool is alive.
    pub fn is_running(&self) -> bool {
        self.pool.is_some()
    }

    /// Number of workers frames are split across.
    pub fn worker_count(&self) -> usize {
        self.tasks.len()
    }

    fn ensure_workers(&mut self) {
        if self.pool.is_some() {
            return;
        }
        if let Err(e) = self.init(0) {
            tracing::warn!(error = %e, "thread pool unavailable; rendering on the calling thread");
            if self.tasks.is_empty() {
                self.tasks.push(RenderTask::default());
            }
        }
    }

    /// Render every grid row into `surface`, blocking until all bands finished or failed.
    ///
    /// Failed bands are logged and leave their pixels untouched.
    pub fn render<G: AsciiGrid + ?Sized>(
        &mut self,
        grid: &G,
        cell: CellSize,
        mask: &GlyphMask,
        fill: &dyn RowFill,
        surface: &mut Surface,
    ) -> FrameStats {
        self.ensure_workers();
        let started = Instant::now();
        let rows = grid.rows();
        let n = self.tasks.len();
        let bands = bands(rows, n);

        let width = surface.width();
        let height = surface.height();
        let mut rest: &mut [u32] = surface.pixels_mut();
        let mut targets = Vec::<&mut [u32]>::with_capacity(n);
        for b in &bands {
            let y0 = (b.start * cell.height).min(height);
            let y1 = (b.end * cell.height).min(height);
            let (head, tail) = std::mem::take(&mut rest).split_at_mut((y1 - y0) * width);
            targets.push(head);
            rest = tail;
        }

        let run_band = |task: &mut RenderTask,
                        target: &mut [u32],
                        rows: &Range<usize>|
         -> RenderResult<()> {
            if rows.is_empty() {
                return Ok(());
            }
            catch_unwind(AssertUnwindSafe(|| {
                task.run(grid, rows.clone(), cell, mask, fill, target, width)
            }))
            .unwrap_or_else(|payload| Err(RenderError::worker(panic_message(payload.as_ref()))))
        };

        let Self { pool, tasks, .. } = self;
        let results: Vec<RenderResult<()>> = match pool {
            Some(pool) => pool.install(|| {
                tasks
                    .par_iter_mut()
                    .zip(targets.into_par_iter())
                    .zip(bands.par_iter())
                    .map(|((task, target), rows)| run_band(task, target, rows))
                    .collect()
            }),
            None => tasks
                .iter_mut()
                .zip(targets)
                .zip(&bands)
                .map(|((task, target), rows)| run_band(task, target, rows))
                .collect(),
        };

        let mut stats = FrameStats {
            workers: n,
            rows,
            bands: bands.iter().filter(|b| !b.is_empty()).count(),
            ..FrameStats::default()
        };
        for (i, (res, b)) in results.into_iter().zip(&bands).enumerate() {
            if let Err(e) = res {
                stats.failed_bands += 1;
                tracing::warn!(
                    band = i,
                    start_row = b.start,
                    end_row = b.end,
                    error = %e,
                    "row band failed; leaving stale pixels"
                );
            }
        }
        stats.elapsed = started.elapsed();
        stats
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("row worker panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("row worker panicked: {s}")
    } else {
        "row worker panicked".to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scheduler.rs"]
mod tests;
