//! Score command - evaluate strings given on the command line

use anyhow::{Context, Result};
use serde::Serialize;
use tabled::{settings::style::Style, Table, Tabled};
use wards::{PolicyKernel, Verdict};

use crate::settings::Settings;

const PREVIEW_CHARS: usize = 48;

#[derive(Debug, Serialize)]
struct ScoreRecord {
    text: String,
    /// `None` for text that is blank after trimming.
    entropy: Option<f64>,
    verdict: Option<Verdict>,
    threshold: f64,
}

#[derive(Debug, Tabled)]
struct ScoreRow {
    #[tabled(rename = "TEXT")]
    text: String,
    #[tabled(rename = "ENTROPY")]
    entropy: String,
    #[tabled(rename = "VERDICT")]
    verdict: String,
}

impl From<&ScoreRecord> for ScoreRow {
    fn from(r: &ScoreRecord) -> Self {
        Self {
            text: preview(&r.text),
            entropy: r
                .entropy
                .map(|e| format!("{e:.3}"))
                .unwrap_or_else(|| "-".to_string()),
            verdict: r
                .verdict
                .map(|v| v.to_string())
                .unwrap_or_else(|| "SKIPPED".to_string()),
        }
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(PREVIEW_CHARS - 1).collect();
    cut.push('…');
    cut
}

fn score_all(settings: &Settings, texts: &[String]) -> Result<Vec<ScoreRecord>> {
    let mut kernel =
        PolicyKernel::new(settings.wards).context("Failed to initialise the lattice")?;
    Ok(texts
        .iter()
        .map(|text| {
            let decision = kernel.evaluate(text.as_bytes());
            ScoreRecord {
                text: text.clone(),
                entropy: decision.map(|d| d.entropy),
                verdict: decision.map(|d| d.verdict),
                threshold: settings.wards.threshold,
            }
        })
        .collect())
}

pub fn run(settings: &Settings, texts: &[String]) -> Result<()> {
    let records = score_all(settings, texts)?;

    if settings.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let rows: Vec<ScoreRow> = records.iter().map(ScoreRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
    println!("Threshold: {}", settings.wards.threshold);
    Ok(())
}
