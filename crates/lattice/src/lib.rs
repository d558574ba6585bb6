//! Resonant lattice numerics.
//!
//! A line of text is injected into an `N × N` complex field (one byte per
//! cell), evolved for a fixed number of explicit steps, and scored by the
//! accumulated imaginary amplitude. The score is called entropy and always
//! lies in `[0, 1]`.

pub mod field;
pub mod params;

pub use field::ResonantLattice;
pub use params::{LatticeError, LatticeParams};
