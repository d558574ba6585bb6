use lattice::{LatticeError, LatticeParams};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Golden-ratio cutoff: lines scoring strictly above this are blocked.
pub const DEFAULT_THRESHOLD: f64 = 0.618;

pub const ENV_THRESHOLD: &str = "GOVERNOR_THRESHOLD";
pub const ENV_STEPS: &str = "GOVERNOR_STEPS";
pub const ENV_LATTICE_SIZE: &str = "GOVERNOR_LATTICE_SIZE";
pub const ENV_DT: &str = "GOVERNOR_DT";
pub const ENV_DAMPING: &str = "GOVERNOR_DAMPING";
pub const ENV_COMPACT: &str = "GOVERNOR_WARDS";

#[derive(Debug, Error, PartialEq)]
pub enum WardsError {
    #[error("{var} has invalid value '{value}': {reason}")]
    InvalidVar {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("GOVERNOR_WARDS entry #{index} {reason}")]
    InvalidEntry { index: usize, reason: String },

    #[error("threshold must be within [0, 1], got {0}")]
    ThresholdOutOfRange(f64),

    #[error(transparent)]
    Lattice(#[from] LatticeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardsConfig {
    pub threshold: f64,
    pub lattice: LatticeParams,
}

impl Default for WardsConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            lattice: LatticeParams::default(),
        }
    }
}

impl WardsConfig {
    pub fn validate(&self) -> Result<(), WardsError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(WardsError::ThresholdOutOfRange(self.threshold));
        }
        self.lattice.validate()?;
        Ok(())
    }
}

/// Defaults overlaid with `GOVERNOR_*` environment variables.
pub fn load_from_env() -> Result<WardsConfig, WardsError> {
    apply_env(WardsConfig::default())
}

/// Overlays `GOVERNOR_*` environment variables on `base`.
pub fn apply_env(base: WardsConfig) -> Result<WardsConfig, WardsError> {
    apply_vars(base, |name| std::env::var(name).ok())
}

/// Overlays variables from `lookup` on `base`. Individual variables are
/// applied first, then the compact `GOVERNOR_WARDS` string.
pub fn apply_vars<F>(base: WardsConfig, lookup: F) -> Result<WardsConfig, WardsError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = base;
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = get(ENV_THRESHOLD) {
        cfg.threshold = parse_var(ENV_THRESHOLD, &v)?;
    }
    if let Some(v) = get(ENV_STEPS) {
        cfg.lattice.steps = parse_var(ENV_STEPS, &v)?;
    }
    if let Some(v) = get(ENV_LATTICE_SIZE) {
        cfg.lattice.size = parse_var(ENV_LATTICE_SIZE, &v)?;
    }
    if let Some(v) = get(ENV_DT) {
        cfg.lattice.dt = parse_var(ENV_DT, &v)?;
    }
    if let Some(v) = get(ENV_DAMPING) {
        cfg.lattice.damping = parse_var(ENV_DAMPING, &v)?;
    }
    if let Some(v) = get(ENV_COMPACT) {
        parse_compact(&v, &mut cfg)?;
    }
    Ok(cfg)
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, WardsError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| WardsError::InvalidVar {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Applies a compact override string to `cfg`.
///
/// Format: `key=value,key=value` with keys `threshold`, `steps`, `size`,
/// `dt`, `damping`, `nonlinearity` and `phase_twist`. Blank entries are
/// skipped.
pub fn parse_compact(raw: &str, cfg: &mut WardsConfig) -> Result<(), WardsError> {
    for (idx, entry) in raw.split(',').enumerate() {
        let index = idx + 1;
        let e = entry.trim();
        if e.is_empty() {
            continue;
        }

        let (key, value) = e.split_once('=').ok_or_else(|| WardsError::InvalidEntry {
            index,
            reason: format!("'{e}' is missing '='"),
        })?;
        let key = key.trim();
        let value = value.trim();
        if value.is_empty() {
            return Err(WardsError::InvalidEntry {
                index,
                reason: format!("missing value for '{key}'"),
            });
        }

        match key {
            "threshold" => cfg.threshold = parse_entry(index, key, value)?,
            "steps" => cfg.lattice.steps = parse_entry(index, key, value)?,
            "size" => cfg.lattice.size = parse_entry(index, key, value)?,
            "dt" => cfg.lattice.dt = parse_entry(index, key, value)?,
            "damping" => cfg.lattice.damping = parse_entry(index, key, value)?,
            "nonlinearity" => cfg.lattice.nonlinearity = parse_entry(index, key, value)?,
            "phase_twist" => cfg.lattice.phase_twist = parse_entry(index, key, value)?,
            other => {
                return Err(WardsError::InvalidEntry {
                    index,
                    reason: format!("has unknown key '{other}'"),
                })
            }
        }
    }
    Ok(())
}

fn parse_entry<T>(index: usize, key: &str, value: &str) -> Result<T, WardsError>
where
    T: FromStr,
{
    value.parse().map_err(|_| WardsError::InvalidEntry {
        index,
        reason: format!("invalid {key} '{value}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn no_vars_keeps_base() {
        let cfg = apply_vars(WardsConfig::default(), lookup(&[])).unwrap();
        assert_eq!(cfg, WardsConfig::default());
    }

    #[test]
    fn individual_vars_override_base() {
        let cfg = apply_vars(
            WardsConfig::default(),
            lookup(&[
                (ENV_THRESHOLD, "0.5"),
                (ENV_STEPS, " 12 "),
                (ENV_LATTICE_SIZE, "16"),
                (ENV_DAMPING, ""),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.threshold, 0.5);
        assert_eq!(cfg.lattice.steps, 12);
        assert_eq!(cfg.lattice.size, 16);
        assert_eq!(cfg.lattice.damping, LatticeParams::default().damping);
    }

    #[test]
    fn compact_applies_after_individual_vars() {
        let cfg = apply_vars(
            WardsConfig::default(),
            lookup(&[(ENV_THRESHOLD, "0.5"), (ENV_COMPACT, "threshold=0.7,dt=0.05")]),
        )
        .unwrap();
        assert_eq!(cfg.threshold, 0.7);
        assert_eq!(cfg.lattice.dt, 0.05);
    }

    #[test]
    fn bad_var_names_the_variable() {
        let err = apply_vars(WardsConfig::default(), lookup(&[(ENV_STEPS, "many")])).unwrap_err();
        assert!(matches!(err, WardsError::InvalidVar { var: ENV_STEPS, .. }));
        assert!(err.to_string().contains("GOVERNOR_STEPS"));
    }

    #[test]
    fn compact_errors_carry_entry_index() {
        let mut cfg = WardsConfig::default();
        let err = parse_compact("steps=3, ,bogus=1", &mut cfg).unwrap_err();
        assert_eq!(
            err,
            WardsError::InvalidEntry {
                index: 3,
                reason: "has unknown key 'bogus'".into()
            }
        );

        let err = parse_compact("steps", &mut cfg).unwrap_err();
        assert!(matches!(err, WardsError::InvalidEntry { index: 1, .. }));

        let err = parse_compact("size=-4", &mut cfg).unwrap_err();
        assert!(err.to_string().contains("invalid size '-4'"));
    }

    #[test]
    fn validate_checks_threshold_and_lattice() {
        let cfg = WardsConfig {
            threshold: 1.2,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(WardsError::ThresholdOutOfRange(1.2)));

        let mut cfg = WardsConfig::default();
        cfg.lattice.size = 0;
        assert_eq!(cfg.validate(), Err(WardsError::Lattice(LatticeError::ZeroSize)));
    }
}
