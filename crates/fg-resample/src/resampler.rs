use core::fmt;
use core::str::FromStr;

use fg_core::{BandField, Channel, Error, RectilinearGrid, axis_to_grid};
use tracing::{debug, trace};

use crate::interp::{apply_stencils, build_stencils};
use crate::upsample::integer_upsample;

/// Maximum distance of the target origin from a half-source-step offset,
/// in source steps, for the integer fast path.
pub const OFFSET_TOLERANCE: f64 = 0.01;

/// Maximum step-ratio error accumulated over the target length, in source
/// steps, for the integer fast path.
pub const ACCUM_TOLERANCE: f64 = 0.01;

/// Step ratios the integer fast path accepts.
const FAST_FACTORS: [u32; 2] = [2, 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResamplingMode {
    NearestNeighbor,
    #[default]
    WeightedAverage,
}

impl fmt::Display for ResamplingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NearestNeighbor => write!(f, "nearest_neighbor"),
            Self::WeightedAverage => write!(f, "weighted_average"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resampling mode '{0}', expected 'nearest' or 'weighted'")]
pub struct ParseModeError(String);

impl FromStr for ResamplingMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" | "nearest_neighbor" => Ok(Self::NearestNeighbor),
            "weighted" | "weighted_average" => Ok(Self::WeightedAverage),
            _ => Err(ParseModeError(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub offset: f64,
    pub accum: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            offset: OFFSET_TOLERANCE,
            accum: ACCUM_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResamplePath {
    Identity,
    IntegerUpsample { factor: u32 },
    General,
}

/// Chooses how `source` is carried onto `target`.
///
/// The integer path requires the target step to be 2x or 4x the source step
/// on both axes, with the target origin sitting half a source step into a
/// source cell. Anything else, downsampling included, is general.
pub fn select_path(
    source: &RectilinearGrid,
    target: &RectilinearGrid,
    tol: &Tolerances,
) -> ResamplePath {
    if source == target {
        return ResamplePath::Identity;
    }

    let ratio_x = target.step_x() / source.step_x();
    let ratio_y = target.step_y() / source.step_y();
    if !(ratio_x > 1.0 && ratio_y > 1.0) {
        return ResamplePath::General;
    }

    let off_x = (target.first_x() - source.first_x()) / source.step_x();
    let off_y = (target.first_y() - source.first_y()) / source.step_y();
    let half_step = |off: f64| (off - off.floor() - 0.5).abs() <= tol.offset;
    if !(half_step(off_x) && half_step(off_y)) {
        return ResamplePath::General;
    }

    let len_x = target.length_x() as f64;
    let len_y = target.length_y() as f64;
    for factor in FAST_FACTORS {
        let k = factor as f64;
        if (ratio_x - k).abs() * len_x <= tol.accum && (ratio_y - k).abs() * len_y <= tol.accum {
            return ResamplePath::IntegerUpsample { factor };
        }
    }

    ResamplePath::General
}

/// Resamples band fields onto a target rectilinear grid.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridResampler {
    pub mode: ResamplingMode,
    pub tolerances: Tolerances,
}

impl GridResampler {
    pub fn new(mode: ResamplingMode) -> Self {
        Self {
            mode,
            tolerances: Tolerances::default(),
        }
    }

    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    pub fn path(
        &self,
        source: &BandField,
        target: &RectilinearGrid,
    ) -> Result<ResamplePath, Error> {
        Ok(select_path(source.grid()?, target, &self.tolerances))
    }

    /// Returns a new field over `target` with the same channels as `source`.
    ///
    /// When the grids are equal the result shares `source`'s sample buffers.
    /// Target cells outside the source footprint are NaN.
    pub fn resample(
        &self,
        source: &BandField,
        target: &RectilinearGrid,
    ) -> Result<BandField, Error> {
        let src_grid = source.grid()?;
        let path = select_path(src_grid, target, &self.tolerances);
        debug!(
            ?path,
            mode = %self.mode,
            src_w = src_grid.length_x(),
            src_h = src_grid.length_y(),
            dst_w = target.length_x(),
            dst_h = target.length_y(),
            "resampling band field"
        );

        if path == ResamplePath::Identity {
            return Ok(source.clone());
        }

        let src_w = src_grid.length_x();
        let src_h = src_grid.length_y();
        let x_idx = axis_to_grid(src_grid.x(), target.x());
        let y_idx = axis_to_grid(src_grid.y(), target.y());

        let mut channels = Vec::with_capacity(source.num_channels());
        match path {
            ResamplePath::IntegerUpsample { .. } => {
                for ch in source.channels() {
                    let mut dst = vec![f32::NAN; target.len()];
                    integer_upsample(
                        &y_idx,
                        &x_idx,
                        src_w,
                        src_h,
                        ch.samples(),
                        &mut dst,
                        self.mode,
                    );
                    channels.push(Channel::new(ch.name(), dst));
                }
            }
            _ => {
                let stencils = build_stencils(&y_idx, &x_idx, src_w, src_h, self.mode);
                trace!(cells = stencils.len(), "built interpolation stencils");
                for ch in source.channels() {
                    let mut dst = vec![f32::NAN; target.len()];
                    apply_stencils(&stencils, src_w, ch.samples(), &mut dst);
                    channels.push(Channel::new(ch.name(), dst));
                }
            }
        }

        BandField::new(*target, channels)
    }
}

pub fn resample(
    source: &BandField,
    target: &RectilinearGrid,
    mode: ResamplingMode,
) -> Result<BandField, Error> {
    GridResampler::new(mode).resample(source, target)
}
