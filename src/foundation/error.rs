/// Convenience result type used across the renderer.
pub type RenderResult<T> = Result<T, RenderError>;

/// Top-level error taxonomy used by renderer APIs.
///
/// Most rendering failures are absorbed inside the engine (logged, frame degraded); these
/// variants surface from configuration, grid construction and glyph rasterization.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    /// Invalid user-provided grid or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while shaping or rasterizing glyphs for the atlas.
    #[error("glyph error: {0}")]
    Glyph(String),

    /// Errors raised by a row worker or the worker pool.
    #[error("worker error: {0}")]
    Worker(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RenderError {
    /// Build a [`RenderError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RenderError::Glyph`] value.
    pub fn glyph(msg: impl Into<String>) -> Self {
        Self::Glyph(msg.into())
    }

    /// Build a [`RenderError::Worker`] value.
    pub fn worker(msg: impl Into<String>) -> Self {
        Self::Worker(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
