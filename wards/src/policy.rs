use lattice::ResonantLattice;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{WardsConfig, WardsError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Verified,
    Blocked,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Verified => write!(f, "VERIFIED"),
            Verdict::Blocked => write!(f, "BLOCKED"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub verdict: Verdict,
    pub entropy: f64,
    pub threshold: f64,
    /// Length of the evaluated (trimmed) line in bytes.
    pub bytes: usize,
}

impl Decision {
    pub fn allowed(&self) -> bool {
        self.verdict == Verdict::Verified
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub evaluated: u64,
    pub verified: u64,
    pub blocked: u64,
    /// Blank lines, never evaluated.
    pub skipped: u64,
}

impl Tally {
    pub fn block_rate(&self) -> f64 {
        if self.evaluated == 0 {
            0.0
        } else {
            self.blocked as f64 / self.evaluated as f64
        }
    }
}

/// Strips surrounding whitespace. Valid UTF-8 is trimmed with Unicode
/// whitespace rules, anything else with ASCII rules.
pub fn trim_line(line: &[u8]) -> &[u8] {
    match std::str::from_utf8(line) {
        Ok(s) => s.trim().as_bytes(),
        Err(_) => line.trim_ascii(),
    }
}

pub struct PolicyKernel {
    cfg: WardsConfig,
    lattice: ResonantLattice,
    tally: Tally,
}

impl PolicyKernel {
    pub fn new(cfg: WardsConfig) -> Result<Self, WardsError> {
        cfg.validate()?;
        let lattice = ResonantLattice::new(cfg.lattice)?;
        Ok(Self {
            cfg,
            lattice,
            tally: Tally::default(),
        })
    }

    pub fn config(&self) -> &WardsConfig {
        &self.cfg
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn last_entropy(&self) -> f64 {
        self.lattice.entropy()
    }

    /// Scores one line. Returns `None` for lines that are blank after
    /// trimming; those only count towards `skipped`.
    pub fn evaluate(&mut self, line: &[u8]) -> Option<Decision> {
        let text = trim_line(line);
        if text.is_empty() {
            self.tally.skipped += 1;
            return None;
        }

        let entropy = self.lattice.evaluate(text);
        let verdict = if entropy > self.cfg.threshold {
            Verdict::Blocked
        } else {
            Verdict::Verified
        };

        self.tally.evaluated += 1;
        match verdict {
            Verdict::Verified => self.tally.verified += 1,
            Verdict::Blocked => self.tally.blocked += 1,
        }
        debug!(bytes = text.len(), entropy, %verdict, "line evaluated");

        Some(Decision {
            verdict,
            entropy,
            threshold: self.cfg.threshold,
            bytes: text.len(),
        })
    }
}
