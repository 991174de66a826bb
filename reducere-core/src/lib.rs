//! Adjust just intonation scales to lie lower in the harmonic series.
//!
//! A scale of exact rational ratios is re-expressed as integer harmonic
//! numbers over a common base harmonic (the harmonic assigned to the octave
//! 2/1). Two optimization passes over a mixed-integer model do the work:
//!
//! 1. a baseline pass that finds the smallest base under which every note is
//!    an exact integer harmonic, and
//! 2. a reduction pass that lets at most `max_changes` notes move to nearby
//!    harmonics so the base can shrink toward a requested `max_harmonic`
//!    ceiling, picking the retuning closest to the original among ties.
//!
//! When the ceiling cannot be met within the change budget the best
//! achievable base is returned together with a nonzero violation, reported
//! as a warning rather than an error.

pub mod common;
mod model;
pub mod reduce;
pub mod report;
pub mod scale;

pub use reduce::{
    harmonic_reduce, run_reduce, HarmonicAssignment, ReduceConfig, ReduceError, Reduction,
};
pub use report::{ReduceReport, ScaleRow};
pub use scale::{JustRatio, Scale, ScaleError};
