//! Resampling and compositing of fixed-grid imager bands.
//!
//! `fg-resample` carries a [`BandField`] from its own rectilinear grid onto a
//! target grid, picking one of two paths per grid pair:
//!
//! - Integer upsample: the target step is exactly 2x or 4x the source step on
//!   both axes and the target origin sits half a source step into a source
//!   cell (within [`Tolerances`]). Each target sample comes from the 2x2
//!   source block under it.
//! - General: everything else. Each target sample is taken from the four
//!   source samples around its fractional position, either the nearest one
//!   or an inverse-squared-distance blend.
//!
//! Equal grids short-circuit and share the source buffers.
//!
//! Missing-data policy:
//! - Target cells outside the source footprint stay `NaN`; there is no
//!   extrapolation and the last source row/column never anchors a cell.
//! - `NaN` samples propagate through averaging.
//! - [`Compositor`] masks a pixel in all three channels when any band is
//!   `NaN` there.

mod composite;
mod interp;
mod resampler;
mod upsample;

pub use composite::{Compositor, composite};
pub use fg_core::{BandField, Error, RectilinearGrid};
pub use interp::{Stencil, apply_stencils, build_stencils, interpolate};
pub use resampler::{
    ACCUM_TOLERANCE, GridResampler, OFFSET_TOLERANCE, ParseModeError, ResamplePath,
    ResamplingMode, Tolerances, resample, select_path,
};
pub use upsample::integer_upsample;
