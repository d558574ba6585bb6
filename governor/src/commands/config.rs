//! Config command - print the effective settings

use anyhow::Result;

use crate::settings::Settings;

/// Prints the effective configuration after all overrides are applied.
pub fn run(settings: &Settings) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}
