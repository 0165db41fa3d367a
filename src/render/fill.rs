use std::sync::OnceLock;

use crate::foundation::core::{CellSize, OPAQUE_BLACK};
use crate::render::atlas::GlyphMask;

/// Which inner loop row workers blit with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillChoice {
    /// Accelerated when the CPU probe succeeds, portable otherwise.
    #[default]
    Auto,
    /// Always the portable reference loop.
    Portable,
    /// Always the accelerated loop, skipping the probe.
    Accelerated,
}

impl std::str::FromStr for FillChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "portable" => Ok(Self::Portable),
            "accelerated" => Ok(Self::Accelerated),
            other => Err(format!("unknown fill choice '{other}'")),
        }
    }
}

/// Blits one grid row of glyph cells into a pixel strip.
///
/// `out` receives `cell.height` pixel rows of `glyph_indices.len() * cell.width` pixels. For
/// every pixel, the mask byte at
/// `y * mask.stride() + glyph_index * cell.width + x` selects the cell color (nonzero) or
/// opaque black (zero).
///
/// Callers guarantee `out.len() == cell.area() * glyph_indices.len()`,
/// `colors.len() == glyph_indices.len()`, `mask.cell() == cell` and every glyph index
/// `< mask.glyph_count()`. Implementations must produce identical output.
pub trait RowFill: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Fill the strip.
    fn fill_block(
        &self,
        out: &mut [u32],
        cell: CellSize,
        glyph_indices: &[u32],
        colors: &[u32],
        mask: &GlyphMask,
    );
}

/// Straightforward per-pixel reference loop.
#[derive(Clone, Copy, Debug, Default)]
pub struct PortableFill;

impl RowFill for PortableFill {
    fn name(&self) -> &'static str {
        "portable"
    }

    fn fill_block(
        &self,
        out: &mut [u32],
        cell: CellSize,
        glyph_indices: &[u32],
        colors: &[u32],
        mask: &GlyphMask,
    ) {
        let bytes = mask.bytes();
        let stride = mask.stride();
        let mut offset = 0;
        for y in 0..cell.height {
            for (&glyph, &color) in glyph_indices.iter().zip(colors) {
                let mut src = y * stride + glyph as usize * cell.width;
                for _ in 0..cell.width {
                    out[offset] = if bytes[src] != 0 { color } else { OPAQUE_BLACK };
                    offset += 1;
                    src += 1;
                }
            }
        }
    }
}

/// Branchless slice-at-a-time loop.
///
/// Each cell row is a fixed-width zip of two slices with a mask-select, which the compiler
/// turns into vector code on targets with SIMD.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceleratedFill;

impl RowFill for AcceleratedFill {
    fn name(&self) -> &'static str {
        "accelerated"
    }

    fn fill_block(
        &self,
        out: &mut [u32],
        cell: CellSize,
        glyph_indices: &[u32],
        colors: &[u32],
        mask: &GlyphMask,
    ) {
        if cell.is_empty() || glyph_indices.is_empty() {
            return;
        }
        let bytes = mask.bytes();
        let stride = mask.stride();
        let row_px = glyph_indices.len() * cell.width;
        for (y, out_row) in out.chunks_exact_mut(row_px).take(cell.height).enumerate() {
            let mask_row = &bytes[y * stride..(y + 1) * stride];
            for ((dst, &glyph), &color) in out_row
                .chunks_exact_mut(cell.width)
                .zip(glyph_indices)
                .zip(colors)
            {
                let start = glyph as usize * cell.width;
                let src = &mask_row[start..start + cell.width];
                let ink = color ^ OPAQUE_BLACK;
                for (d, &m) in dst.iter_mut().zip(src) {
                    let sel = u32::from(m != 0).wrapping_neg();
                    *d = OPAQUE_BLACK ^ (ink & sel);
                }
            }
        }
    }
}

static PORTABLE: PortableFill = PortableFill;
static ACCELERATED: AcceleratedFill = AcceleratedFill;
static PROBED: OnceLock<bool> = OnceLock::new();

/// Return `true` when the CPU has the vector unit the accelerated loop is tuned for.
///
/// On x86_64 this is AVX2, which older and low-power parts lack. NEON is part of the aarch64
/// baseline, so the probe only falls back there on unusual kernels that hide it. Other
/// architectures always report `false`. The probe runs once per process.
pub fn acceleration_available() -> bool {
    *PROBED.get_or_init(|| {
        let available = probe_vector_unit();
        if !available {
            tracing::debug!("no vector unit detected; row fill uses the portable loop");
        }
        available
    })
}

#[cfg(target_arch = "x86_64")]
fn probe_vector_unit() -> bool {
    std::arch::is_x86_feature_detected!("avx2")
}

#[cfg(target_arch = "aarch64")]
fn probe_vector_unit() -> bool {
    std::arch::is_aarch64_feature_detected!("neon")
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
fn probe_vector_unit() -> bool {
    false
}

/// Resolve a [`FillChoice`] to an implementation.
pub fn select_row_fill(choice: FillChoice) -> &'static dyn RowFill {
    match choice {
        FillChoice::Portable => &PORTABLE,
        FillChoice::Accelerated => &ACCELERATED,
        FillChoice::Auto if acceleration_available() => &ACCELERATED,
        FillChoice::Auto => &PORTABLE,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fill.rs"]
mod tests;
