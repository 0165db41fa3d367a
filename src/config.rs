//! Renderer configuration.

use crate::render::fill::FillChoice;

/// Environment variable overriding [`RendererOpts::threads`].
pub const THREADS_ENV: &str = "ASCII_RENDER_THREADS";
/// Environment variable overriding [`RendererOpts::fill`] (`auto|portable|accelerated`).
pub const FILL_ENV: &str = "ASCII_RENDER_FILL";

/// Construction options for [`crate::AsciiRenderer`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RendererOpts {
    /// Row worker count; 0 sizes the pool to available hardware parallelism.
    pub threads: usize,
    /// Row fill implementation.
    pub fill: FillChoice,
}

impl RendererOpts {
    /// Defaults overridden by `ASCII_RENDER_THREADS` / `ASCII_RENDER_FILL` when set and valid.
    pub fn from_env() -> Self {
        Self::default().with_overrides(
            std::env::var(THREADS_ENV).ok().as_deref(),
            std::env::var(FILL_ENV).ok().as_deref(),
        )
    }

    /// Apply raw override strings; unparsable values keep the current setting.
    pub fn with_overrides(mut self, threads: Option<&str>, fill: Option<&str>) -> Self {
        if let Some(n) = threads.and_then(|v| v.trim().parse::<usize>().ok()) {
            self.threads = n;
        }
        if let Some(choice) = fill.and_then(|v| v.parse::<FillChoice>().ok()) {
            self.fill = choice;
        }
        self
    }

    /// Set the worker count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the fill implementation.
    pub fn with_fill(mut self, fill: FillChoice) -> Self {
        self.fill = fill;
        self
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
