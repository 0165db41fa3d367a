//! Raster side of the pipeline: glyph atlas, row workers, double-buffered output surfaces and
//! the [`engine::AsciiRenderer`] facade tying them together.

/// Glyph strip rasterization and the cached ink mask.
pub mod atlas;
/// Frame rendering facade.
pub mod engine;
/// Per-row glyph blitting kernels.
pub mod fill;
/// Output size and glyph metrics.
pub mod geometry;
/// Row band partitioning and the worker pool.
pub mod scheduler;
/// Pixel surfaces and double buffering.
pub mod surface;
/// Font-backed glyph rasterizer.
pub mod text;
/// Reduced-resolution previews.
pub mod thumbnail;
