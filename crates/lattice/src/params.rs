use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SIZE: usize = 80;
pub const DEFAULT_DT: f64 = 0.108;
pub const DEFAULT_DAMPING: f64 = 0.991;
pub const DEFAULT_NONLINEARITY: f64 = 0.618;
pub const DEFAULT_PHASE_TWIST: f64 = 0.61;
pub const DEFAULT_STEPS: usize = 70;
/// Largest accepted side length, matching `latticeSize` in the config schema.
pub const MAX_SIZE: usize = 1024;

#[derive(Debug, Error, PartialEq)]
pub enum LatticeError {
    #[error("lattice size must be at least 1")]
    ZeroSize,

    #[error("lattice size must be at most 1024, got {0}")]
    SizeTooLarge(usize),

    #[error("step count must be at least 1")]
    ZeroSteps,

    #[error("time step must be finite and positive, got {0}")]
    InvalidTimeStep(f64),

    #[error("damping must be within (0, 1], got {0}")]
    InvalidDamping(f64),

    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },
}

/// Tunables of the lattice evolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatticeParams {
    /// Side length `N`; the field holds `N * N` cells.
    pub size: usize,
    pub dt: f64,
    pub damping: f64,
    pub nonlinearity: f64,
    /// Ratio of imaginary to real amplitude at injection.
    pub phase_twist: f64,
    /// Evolution steps per evaluation.
    pub steps: usize,
}

impl Default for LatticeParams {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            dt: DEFAULT_DT,
            damping: DEFAULT_DAMPING,
            nonlinearity: DEFAULT_NONLINEARITY,
            phase_twist: DEFAULT_PHASE_TWIST,
            steps: DEFAULT_STEPS,
        }
    }
}

impl LatticeParams {
    /// `size * size`, or `None` if that overflows.
    pub fn cells(&self) -> Option<usize> {
        self.size.checked_mul(self.size)
    }

    pub fn validate(&self) -> Result<(), LatticeError> {
        if self.size == 0 {
            return Err(LatticeError::ZeroSize);
        }
        if self.size > MAX_SIZE {
            return Err(LatticeError::SizeTooLarge(self.size));
        }
        if self.steps == 0 {
            return Err(LatticeError::ZeroSteps);
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(LatticeError::InvalidTimeStep(self.dt));
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(LatticeError::InvalidDamping(self.damping));
        }
        if !self.nonlinearity.is_finite() {
            return Err(LatticeError::NonFinite {
                name: "nonlinearity",
                value: self.nonlinearity,
            });
        }
        if !self.phase_twist.is_finite() {
            return Err(LatticeError::NonFinite {
                name: "phase_twist",
                value: self.phase_twist,
            });
        }
        Ok(())
    }
}
