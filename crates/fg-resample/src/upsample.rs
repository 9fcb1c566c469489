use fg_core::floor_index;

use crate::resampler::ResamplingMode;

/// Integer-factor fast path over fractional source indices.
///
/// Each target cell is anchored at `(floor(x_idx[i]), floor(y_idx[j]))`;
/// cells whose anchor is outside `[0, len - 1)` on either axis are left
/// untouched. Nearest-neighbor takes the sample one row above the anchor
/// (`k + src_w`), following the Fixed Grid Frame orientation. Weighted
/// average is the mean of the 2x2 block at the anchor.
pub fn integer_upsample(
    y_idx: &[f64],
    x_idx: &[f64],
    src_w: usize,
    src_h: usize,
    src: &[f32],
    dst: &mut [f32],
    mode: ResamplingMode,
) {
    let dst_w = x_idx.len();
    let dst_h = y_idx.len();
    debug_assert_eq!(src.len(), src_w * src_h);
    debug_assert_eq!(dst.len(), dst_w * dst_h);

    if dst_w == 0 || dst_h == 0 {
        return;
    }

    let cols: Vec<Option<usize>> = x_idx.iter().map(|&f| floor_index(f, src_w)).collect();

    for (j, &fy) in y_idx.iter().enumerate() {
        let Some(jr) = floor_index(fy, src_h) else {
            continue;
        };
        let dst_row = &mut dst[j * dst_w..(j + 1) * dst_w];
        let src_base = jr * src_w;

        match mode {
            ResamplingMode::NearestNeighbor => {
                for (out, col) in dst_row.iter_mut().zip(&cols) {
                    let Some(ir) = *col else { continue };
                    if let Some(&v) = src.get(src_base + ir + src_w) {
                        *out = v;
                    }
                }
            }
            ResamplingMode::WeightedAverage => {
                for (out, col) in dst_row.iter_mut().zip(&cols) {
                    let Some(ir) = *col else { continue };
                    let k = src_base + ir;
                    if k + src_w + 1 >= src.len() {
                        continue;
                    }
                    *out = (src[k] + src[k + 1] + src[k + src_w] + src[k + src_w + 1]) * 0.25;
                }
            }
        }
    }
}
