#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMax {
    pub min: f32,
    pub max: f32,
    pub min_index: usize,
    pub max_index: usize,
}

/// Smallest and largest finite values with their first positions.
///
/// NaN and infinities are skipped. With no finite input the result is
/// `min = f32::MAX`, `max = -f32::MAX` and both indices are `0`.
pub fn minmax(values: &[f32]) -> MinMax {
    let mut out = MinMax {
        min: f32::MAX,
        max: -f32::MAX,
        min_index: 0,
        max_index: 0,
    };

    for (i, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            continue;
        }
        if v < out.min {
            out.min = v;
            out.min_index = i;
        }
        if v > out.max {
            out.max = v;
            out.max_index = i;
        }
    }

    out
}
