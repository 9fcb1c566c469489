use crate::grid::Axis;

/// Fractional index of coordinate `v` on `axis`, or NaN outside the axis.
///
/// Bounds are inclusive on both ends. There is no extrapolation.
#[inline]
pub fn value_to_index(axis: &Axis, v: f64) -> f64 {
    let (lo, hi) = axis.bounds();
    if lo <= v && v <= hi {
        (v - axis.first()) / axis.step()
    } else {
        f64::NAN
    }
}

pub fn value_to_grid(axis: &Axis, values: &[f64]) -> Vec<f64> {
    values.iter().map(|&v| value_to_index(axis, v)).collect()
}

/// Fractional indices of every coordinate of `target` on `source`.
pub fn axis_to_grid(source: &Axis, target: &Axis) -> Vec<f64> {
    let coords: Vec<f64> = (0..target.length()).map(|i| target.coordinate(i)).collect();
    value_to_grid(source, &coords)
}

/// Interpolation anchor for fractional index `f` on an axis of `len` samples.
///
/// Returns `floor(f)` only when it lies in `[0, len - 1)`, so the anchor
/// always has a right/upper neighbor. NaN maps to `None`.
#[inline]
pub fn floor_index(f: f64, len: usize) -> Option<usize> {
    if !f.is_finite() {
        return None;
    }
    let r = f.floor();
    if r < 0.0 || r >= len.saturating_sub(1) as f64 {
        return None;
    }
    Some(r as usize)
}
