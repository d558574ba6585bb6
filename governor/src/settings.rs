//! Effective settings: CLI flags over `GOVERNOR_*` env over config file over defaults.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use config_loader::ConfigManager;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use wards::WardsConfig;

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Config file (JSON, or YAML when ending in .yaml/.yml)
    #[arg(long, global = true, env = "GOVERNOR_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Entropy above which a line is blocked [default: 0.618]
    #[arg(long, global = true, value_name = "F")]
    pub threshold: Option<f64>,

    /// Lattice evolution steps per line [default: 70]
    #[arg(long, global = true, value_name = "N")]
    pub steps: Option<usize>,

    /// When to colour verdicts
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Machine-readable JSON verdicts / output
    #[arg(long, global = true)]
    pub json: bool,

    /// Open the ring-of-truth window
    #[arg(long, global = true)]
    pub visualize: bool,

    /// Exit with status 1 if any line was blocked
    #[arg(long, global = true)]
    pub fail_on_block: bool,

    /// Suppress the banner and per-line verdicts
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                if env::var_os("NO_COLOR").is_some() {
                    return false;
                }
                supports_color::on(supports_color::Stream::Stderr).is_some()
            }
        }
    }
}

/// Governor config file contents; every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    pub threshold: Option<f64>,
    pub steps: Option<usize>,
    pub lattice_size: Option<usize>,
    pub dt: Option<f64>,
    pub damping: Option<f64>,
    pub nonlinearity: Option<f64>,
    pub phase_twist: Option<f64>,
    pub color: Option<ColorChoice>,
    pub visualize: Option<bool>,
    pub json_verdicts: Option<bool>,
}

impl FileConfig {
    fn apply(&self, cfg: &mut WardsConfig) {
        if let Some(v) = self.threshold {
            cfg.threshold = v;
        }
        if let Some(v) = self.steps {
            cfg.lattice.steps = v;
        }
        if let Some(v) = self.lattice_size {
            cfg.lattice.size = v;
        }
        if let Some(v) = self.dt {
            cfg.lattice.dt = v;
        }
        if let Some(v) = self.damping {
            cfg.lattice.damping = v;
        }
        if let Some(v) = self.nonlinearity {
            cfg.lattice.nonlinearity = v;
        }
        if let Some(v) = self.phase_twist {
            cfg.lattice.phase_twist = v;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub wards: WardsConfig,
    pub color: ColorChoice,
    pub json: bool,
    pub visualize: bool,
    pub fail_on_block: bool,
    pub quiet: bool,
}

pub fn resolve(opts: &GlobalOpts) -> Result<Settings> {
    let manager = ConfigManager::new().context("Failed to load embedded config schema")?;
    let file: FileConfig = match &opts.config {
        Some(path) => manager
            .load_file(path)
            .with_context(|| format!("Failed to load config file: {:?}", path))?,
        None => manager
            .load_or_default(None)
            .context("Failed to build default config")?,
    };
    merge(opts, &file, wards::config::apply_env)
}

fn merge<F>(opts: &GlobalOpts, file: &FileConfig, env_overlay: F) -> Result<Settings>
where
    F: FnOnce(WardsConfig) -> Result<WardsConfig, wards::WardsError>,
{
    let mut base = WardsConfig::default();
    file.apply(&mut base);

    let mut cfg = env_overlay(base).context("Invalid GOVERNOR_* environment")?;
    if let Some(t) = opts.threshold {
        cfg.threshold = t;
    }
    if let Some(s) = opts.steps {
        cfg.lattice.steps = s;
    }
    cfg.validate().context("Invalid governor configuration")?;

    Ok(Settings {
        wards: cfg,
        color: opts.color.or(file.color).unwrap_or_default(),
        json: opts.json || file.json_verdicts.unwrap_or(false),
        visualize: opts.visualize || file.visualize.unwrap_or(false),
        fail_on_block: opts.fail_on_block,
        quiet: opts.quiet,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(cfg: WardsConfig) -> Result<WardsConfig, wards::WardsError> {
        Ok(cfg)
    }

    #[test]
    fn schema_defaults_agree_with_built_in_defaults() {
        let file: FileConfig = ConfigManager::new()
            .unwrap()
            .load_or_default(None)
            .unwrap();
        let settings = merge(&GlobalOpts::default(), &file, no_env).unwrap();
        assert_eq!(settings.wards, WardsConfig::default());
        assert_eq!(settings.color, ColorChoice::Auto);
        assert!(!settings.json && !settings.visualize);
    }

    #[test]
    fn precedence_is_flag_then_env_then_file() {
        let file = FileConfig {
            threshold: Some(0.3),
            steps: Some(10),
            lattice_size: Some(20),
            color: Some(ColorChoice::Never),
            json_verdicts: Some(true),
            ..Default::default()
        };
        let env = |mut cfg: WardsConfig| -> Result<WardsConfig, wards::WardsError> {
            cfg.threshold = 0.4;
            cfg.lattice.steps = 11;
            Ok(cfg)
        };
        let opts = GlobalOpts {
            threshold: Some(0.5),
            ..Default::default()
        };

        let settings = merge(&opts, &file, env).unwrap();
        assert_eq!(settings.wards.threshold, 0.5);
        assert_eq!(settings.wards.lattice.steps, 11);
        assert_eq!(settings.wards.lattice.size, 20);
        assert_eq!(settings.color, ColorChoice::Never);
        assert!(settings.json);
    }

    #[test]
    fn out_of_range_flag_is_rejected() {
        let opts = GlobalOpts {
            threshold: Some(2.0),
            ..Default::default()
        };
        let err = merge(&opts, &FileConfig::default(), no_env).unwrap_err();
        assert!(format!("{:#}", err).contains("threshold must be within [0, 1]"));
    }

    #[test]
    fn explicit_color_choices() {
        assert!(ColorChoice::Always.enabled());
        assert!(!ColorChoice::Never.enabled());
    }
}
