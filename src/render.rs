//! Rasterizes a [`QrMatrix`] into module-sized squares.

use crate::error::Result;
use crate::geometry::touches_bounds;
use crate::matrix::QrMatrix;

/// A filled square covering one dark module, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleRect {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

/// Whether the exclusion zone is carved out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Skip dark modules inside the exclusion zone.
    Exclusion,
    /// Emit every dark module.
    Full,
}

/// Emits one [`ModuleRect`] per dark module, column by column.
///
/// The exclusion zone is a circle of `radius` pixels centered on the canvas.
/// In [`RenderMode::Exclusion`] every dark module for which
/// [`touches_bounds`] holds is left out so the logo can sit there.
///
/// # Errors
///
/// Returns [`Error::Config`](crate::Error::Config) when the canvas side
/// overflows a `u32`.
pub fn render_modules(
    matrix: &QrMatrix,
    module_size: u32,
    radius: f64,
    mode: RenderMode,
) -> Result<Vec<ModuleRect>> {
    let side = matrix.side();
    let center = matrix.canvas_size(module_size)? as f64 / 2.0;
    let mut rects = Vec::with_capacity(matrix.dark_count());
    for x in 0..side {
        for y in 0..side {
            if !matrix.is_dark(x, y) {
                continue;
            }
            let excluded = mode == RenderMode::Exclusion
                && touches_bounds(center, x as f64, y as f64, radius, module_size as f64);
            if !excluded {
                rects.push(ModuleRect {
                    x: x as u32 * module_size,
                    y: y as u32 * module_size,
                    size: module_size,
                });
            }
        }
    }
    Ok(rects)
}
