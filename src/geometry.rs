//! Distance helpers used to carve the logo hole out of the QR matrix.

/// Euclidean distance between two points.
pub fn distance(p0: (f64, f64), p1: (f64, f64)) -> f64 {
    let dx = p0.0 - p1.0;
    let dy = p0.1 - p1.1;
    (dx * dx + dy * dy).sqrt()
}

/// Returns `true` when the module at `(x, y)` falls inside the exclusion zone.
///
/// `center` is the canvas center in pixels and `(x, y)` is a module coordinate,
/// so the center is first scaled down into module units. The extra module of
/// margin keeps modules sitting exactly on the circle out of the logo area.
///
/// # Arguments
///
/// * `center` - Center of the canvas in pixels (the canvas is square).
/// * `x`, `y` - Column and row of the module.
/// * `radius` - Exclusion radius in pixels.
/// * `module_size` - Side of one module in pixels.
pub fn touches_bounds(center: f64, x: f64, y: f64, radius: f64, module_size: f64) -> bool {
    let scaled_center = center / module_size;
    let dis = distance((scaled_center, scaled_center), (x, y));
    dis <= radius / module_size + 1.0
}
