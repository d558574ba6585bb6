use num_complex::Complex;
use tracing::trace;

use crate::params::{LatticeError, LatticeParams};

const ZERO: Complex<f64> = Complex::new(0.0, 0.0);

/// Toroidal `N × N` complex field evolved under a damped nonlinear
/// Schrödinger-style update.
#[derive(Debug, Clone)]
pub struct ResonantLattice {
    params: LatticeParams,
    psi: Vec<Complex<f64>>,
    next: Vec<Complex<f64>>,
    entropy: f64,
}

impl ResonantLattice {
    pub fn new(params: LatticeParams) -> Result<Self, LatticeError> {
        params.validate()?;
        let cells = params
            .cells()
            .ok_or(LatticeError::SizeTooLarge(params.size))?;
        Ok(Self {
            params,
            psi: vec![ZERO; cells],
            next: vec![ZERO; cells],
            entropy: 0.0,
        })
    }

    pub fn params(&self) -> &LatticeParams {
        &self.params
    }

    pub fn field(&self) -> &[Complex<f64>] {
        &self.psi
    }

    /// Entropy produced by the most recent [`step`](Self::step).
    pub fn entropy(&self) -> f64 {
        self.entropy
    }

    pub fn reset(&mut self) {
        self.psi.fill(ZERO);
        self.entropy = 0.0;
    }

    /// Clears the field and seeds it with `bytes`, one byte per cell in
    /// row-major order. Bytes past the last cell are dropped.
    pub fn inject(&mut self, bytes: &[u8]) {
        self.psi.fill(ZERO);
        let twist = self.params.phase_twist;
        for (cell, &b) in self.psi.iter_mut().zip(bytes) {
            let v = f64::from(b) / 255.0;
            *cell = Complex::new(v, v * twist);
        }
    }

    /// Advances the field by one explicit step and recomputes entropy.
    ///
    /// Neighbours are taken on the flattened index with wraparound, so the
    /// left neighbour of a row's first cell is the previous row's last cell.
    pub fn step(&mut self) {
        let n = self.params.size as isize;
        let cells = self.psi.len() as isize;
        let dt = self.params.dt;
        let damping = self.params.damping;
        let k = self.params.nonlinearity;
        let wrap = |i: usize, d: isize| (i as isize + d).rem_euclid(cells) as usize;

        let mut dissonance = 0.0;
        for i in 0..self.psi.len() {
            let here = self.psi[i];
            let laplacian = self.psi[wrap(i, -n)]
                + self.psi[wrap(i, n)]
                + self.psi[wrap(i, -1)]
                + self.psi[wrap(i, 1)]
                - here * 4.0;
            let nonlinear = here * (1.0 + k * here.norm_sqr());

            let evolved = (here + (laplacian - nonlinear) * Complex::i() * dt) * damping;
            dissonance += evolved.im.abs();
            self.next[i] = evolved;
        }
        std::mem::swap(&mut self.psi, &mut self.next);

        let entropy = dissonance / self.params.size as f64;
        // NaN only appears once the field has blown up; treat that as maximal.
        self.entropy = if entropy.is_nan() { 1.0 } else { entropy.clamp(0.0, 1.0) };
    }

    /// Injects `bytes`, runs the configured number of steps and returns the
    /// resulting entropy.
    pub fn evaluate(&mut self, bytes: &[u8]) -> f64 {
        self.inject(bytes);
        for _ in 0..self.params.steps {
            self.step();
        }
        trace!(bytes = bytes.len(), entropy = self.entropy, "lattice evaluated");
        self.entropy
    }
}
