//! Umbrella crate for the `fixed-grid` workspace.
//!
//! Re-exports the grid/field primitives of `fg-core` and the resampling and
//! compositing kernels of `fg-resample`.

pub use fg_core::*;
pub use fg_resample::*;
