//! Character-grid frames produced by the upstream image-to-text converter.

/// The grid contract and a concrete owned grid.
pub mod model;
