use fg_core::floor_index;

use crate::resampler::ResamplingMode;

/// Per-target-cell recipe, shared by all channels of a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stencil {
    /// Outside the source footprint; the target keeps its NaN.
    Skip,
    /// Copy one source sample.
    Copy(usize),
    /// Weighted sum of the 2x2 block anchored at `k`, corners ordered
    /// `(ir, jr)`, `(ir+1, jr)`, `(ir, jr+1)`, `(ir+1, jr+1)`.
    Blend { k: usize, w: [f64; 4] },
}

/// Builds stencils for every cell of a `x_idx.len() x y_idx.len()` target.
///
/// Distances are squared Euclidean distances in index space from the
/// fractional position to the four corners of the enclosing cell. The last
/// source row and column never anchor a cell.
pub fn build_stencils(
    y_idx: &[f64],
    x_idx: &[f64],
    src_w: usize,
    src_h: usize,
    mode: ResamplingMode,
) -> Vec<Stencil> {
    let dst_w = x_idx.len();
    let mut out = vec![Stencil::Skip; dst_w * y_idx.len()];
    let offsets = [0, 1, src_w, src_w + 1];

    for (j, &y) in y_idx.iter().enumerate() {
        let Some(jr) = floor_index(y, src_h) else {
            continue;
        };
        let dy = y - jr as f64;

        for (i, &x) in x_idx.iter().enumerate() {
            let Some(ir) = floor_index(x, src_w) else {
                continue;
            };
            let dx = x - ir as f64;
            let k = jr * src_w + ir;

            let d = [
                dx * dx + dy * dy,
                (1.0 - dx) * (1.0 - dx) + dy * dy,
                dx * dx + (1.0 - dy) * (1.0 - dy),
                (1.0 - dx) * (1.0 - dx) + (1.0 - dy) * (1.0 - dy),
            ];

            out[j * dst_w + i] = match mode {
                ResamplingMode::NearestNeighbor => Stencil::Copy(k + offsets[argmin(&d)]),
                ResamplingMode::WeightedAverage => {
                    if let Some(c) = d.iter().position(|&v| v == 0.0) {
                        Stencil::Copy(k + offsets[c])
                    } else {
                        let mut w = d.map(|v| 1.0 / v);
                        let sum: f64 = w.iter().sum();
                        for wi in &mut w {
                            *wi /= sum;
                        }
                        Stencil::Blend { k, w }
                    }
                }
            };
        }
    }

    out
}

/// Index of the smallest distance; ties go to the earliest corner.
fn argmin(d: &[f64; 4]) -> usize {
    let mut best = 0;
    for (c, &v) in d.iter().enumerate().skip(1) {
        if v < d[best] {
            best = c;
        }
    }
    best
}

pub fn apply_stencils(stencils: &[Stencil], src_w: usize, src: &[f32], dst: &mut [f32]) {
    debug_assert_eq!(stencils.len(), dst.len());

    for (out, stencil) in dst.iter_mut().zip(stencils) {
        match *stencil {
            Stencil::Skip => {}
            Stencil::Copy(k) => *out = src[k],
            Stencil::Blend { k, w } => {
                let v = w[0] * src[k] as f64
                    + w[1] * src[k + 1] as f64
                    + w[2] * src[k + src_w] as f64
                    + w[3] * src[k + src_w + 1] as f64;
                *out = v as f32;
            }
        }
    }
}

/// General-ratio resampling of one channel.
pub fn interpolate(
    y_idx: &[f64],
    x_idx: &[f64],
    src_w: usize,
    src_h: usize,
    src: &[f32],
    dst: &mut [f32],
    mode: ResamplingMode,
) {
    debug_assert_eq!(src.len(), src_w * src_h);
    let stencils = build_stencils(y_idx, x_idx, src_w, src_h, mode);
    apply_stencils(&stencils, src_w, src, dst);
}

#[cfg(test)]
mod tests {
    use super::{Stencil, build_stencils, interpolate};
    use crate::resampler::ResamplingMode;

    const SRC2X2: [f32; 4] = [0.0, 10.0, 20.0, 30.0];

    #[test]
    fn equidistant_point_is_plain_mean() {
        let mut dst = [f32::NAN; 1];
        interpolate(
            &[0.5],
            &[0.5],
            2,
            2,
            &SRC2X2,
            &mut dst,
            ResamplingMode::WeightedAverage,
        );
        assert!((dst[0] - 15.0).abs() < 1e-6);
    }

    #[test]
    fn inverse_distance_favors_nearest_corner() {
        let mut dst = [f32::NAN; 1];
        interpolate(
            &[0.0],
            &[0.25],
            2,
            2,
            &SRC2X2,
            &mut dst,
            ResamplingMode::WeightedAverage,
        );

        let d: [f64; 4] = [0.0625, 0.5625, 1.0625, 1.5625];
        let w: Vec<f64> = d.iter().map(|v| 1.0 / v).collect();
        let sum: f64 = w.iter().sum();
        let expected = (w[1] * 10.0 + w[2] * 20.0 + w[3] * 30.0) / sum;
        assert!((dst[0] as f64 - expected).abs() < 1e-4);
        assert!(dst[0] < 5.0);
    }

    #[test]
    fn grid_point_snaps_even_next_to_nan() {
        let src = [1.0, f32::NAN, 3.0, 4.0];
        let stencils = build_stencils(&[0.0], &[0.0], 2, 2, ResamplingMode::WeightedAverage);
        assert_eq!(stencils, vec![Stencil::Copy(0)]);

        let mut dst = [f32::NAN; 1];
        interpolate(
            &[0.0],
            &[0.0],
            2,
            2,
            &src,
            &mut dst,
            ResamplingMode::WeightedAverage,
        );
        assert_eq!(dst[0], 1.0);
    }

    #[test]
    fn nan_corner_poisons_weighted_sum() {
        let src = [1.0, f32::NAN, 3.0, 4.0];
        let mut dst = [0.0f32; 1];
        interpolate(
            &[0.5],
            &[0.5],
            2,
            2,
            &src,
            &mut dst,
            ResamplingMode::WeightedAverage,
        );
        assert!(dst[0].is_nan());
    }

    #[test]
    fn nearest_picks_closest_corner_and_breaks_ties_in_order() {
        let src: Vec<f32> = (0..9).map(|v| v as f32).collect();
        let mut dst = [f32::NAN; 2];
        interpolate(
            &[1.6],
            &[0.4, 0.5],
            3,
            3,
            &src,
            &mut dst,
            ResamplingMode::NearestNeighbor,
        );
        // (0.4, 1.6) -> corner (0, 2); (0.5, 1.6) ties between (0, 2) and
        // (1, 2), the left corner is evaluated first.
        assert_eq!(dst, [6.0, 6.0]);

        let mut dst = [f32::NAN; 1];
        interpolate(
            &[0.5],
            &[0.5],
            3,
            3,
            &src,
            &mut dst,
            ResamplingMode::NearestNeighbor,
        );
        assert_eq!(dst[0], 0.0);
    }

    #[test]
    fn nearest_resolves_distances_below_f32_precision() {
        let mut dst = [f32::NAN; 1];
        interpolate(
            &[0.0],
            &[0.5 + 5e-9],
            2,
            2,
            &SRC2X2,
            &mut dst,
            ResamplingMode::NearestNeighbor,
        );
        assert_eq!(dst[0], 10.0);
    }

    #[test]
    fn last_row_and_column_never_anchor() {
        let stencils = build_stencils(
            &[0.0, 1.0],
            &[0.0, 1.0, f64::NAN],
            2,
            2,
            ResamplingMode::WeightedAverage,
        );
        assert_eq!(stencils[0], Stencil::Copy(0));
        assert!(stencils[1..].iter().all(|s| *s == Stencil::Skip));
    }
}
