//! Ascii-render turns character grids into raster images.
//!
//! An upstream converter maps camera frames to a grid of glyph indices, colors and brightness
//! values. This crate draws such grids:
//!
//! - Describe a frame through [`AsciiGrid`] (or build a [`ConversionResult`])
//! - Create an [`AsciiRenderer`] and size it with the viewport and camera dimensions
//! - Call [`AsciiRenderer::create_bitmap`] for a full-resolution frame, or
//!   [`AsciiRenderer::create_thumbnail_bitmap`] for a quarter-size preview
//!
//! Full frames are split into row bands rendered in parallel on a rayon pool. Glyph ink comes
//! from a cached atlas that is rebuilt only when the cell size or glyph set changes.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub mod config;
pub mod grid;
pub mod render;

pub use crate::config::RendererOpts;
pub use crate::foundation::core::{CellSize, OPAQUE_BLACK, argb, argb_to_rgba8, rgb};
pub use crate::foundation::error::{RenderError, RenderResult};
pub use crate::grid::model::{AsciiGrid, Cell, ColorMode, ConversionResult};
pub use crate::render::atlas::{GlyphAtlasCache, GlyphMask, GlyphRasterizer};
pub use crate::render::engine::AsciiRenderer;
pub use crate::render::fill::{
    AcceleratedFill, FillChoice, PortableFill, RowFill, acceleration_available, select_row_fill,
};
pub use crate::render::geometry::OutputGeometry;
pub use crate::render::scheduler::{FrameStats, RowScheduler, band, bands};
pub use crate::render::surface::{Surface, SurfaceFlipper};
pub use crate::render::text::{FontGlyphRasterizer, find_system_monospace_font};
pub use crate::render::thumbnail::render_thumbnail;
