//! Foundational types for fixed-grid imager band processing.
//!
//! ## Grids
//! A [`RectilinearGrid`] is two independent uniformly sampled axes, each
//! given by its first and last coordinate and a sample count. Axes may run
//! in either direction. Grid equality is exact value equality and is used as
//! a zero-copy short-circuit by the resampler.
//!
//! ## Band Fields
//! A [`BandField`] holds one or more named channels of `f32` samples in
//! row-major order (`index = row * length_x + col`). `NaN` marks missing
//! data and propagates through arithmetic. Channel buffers are reference
//! counted, so domain transforms and identity resampling never copy samples.
//!
//! ## Index Mapping
//! [`value_to_grid`] maps coordinates to fractional indices with inclusive
//! bounds and no extrapolation: anything outside the axis becomes `NaN`.

mod error;
mod field;
mod grid;
mod index;
mod stats;
mod transform;

pub use error::Error;
pub use field::{BandField, Channel};
pub use grid::{Axis, Domain, IrregularGrid, RectilinearGrid};
pub use index::{axis_to_grid, floor_index, value_to_grid, value_to_index};
pub use stats::{MinMax, minmax};
pub use transform::{DomainTransform, transform};
