//! Filter command - stream stdin to stdout, reporting a verdict per line on stderr

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::{self, BufRead, ErrorKind, Write};
use std::process::ExitCode;
use tracing::{debug, info};
use wards::{trim_line, Decision, PolicyKernel, Tally, Verdict};

use crate::gauge::EntropyGauge;
use crate::settings::Settings;
use crate::visualizer;

const RULE: &str = "─────────────────────────────────────────────────────";

#[derive(Debug, Serialize)]
struct VerdictRecord {
    ts: String,
    verdict: Verdict,
    entropy: f64,
    threshold: f64,
    bytes: usize,
}

impl From<&Decision> for VerdictRecord {
    fn from(d: &Decision) -> Self {
        Self {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            verdict: d.verdict,
            entropy: d.entropy,
            threshold: d.threshold,
            bytes: d.bytes,
        }
    }
}

/// Writes per-line verdicts to stderr.
pub struct Reporter {
    color: bool,
    json: bool,
    quiet: bool,
}

impl Reporter {
    pub fn new(settings: &Settings) -> Self {
        Self {
            color: settings.color.enabled(),
            json: settings.json,
            quiet: settings.quiet,
        }
    }

    pub fn banner<E: Write>(&self, err: &mut E) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(err, "GOVERNOR v{}", env!("CARGO_PKG_VERSION"))?;
        writeln!(err, "Status: Listening on stdin | Pipe any LLM output here")?;
        writeln!(err, "{RULE}")
    }

    pub fn report<E: Write>(&self, err: &mut E, decision: &Decision) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        if self.json {
            serde_json::to_writer(&mut *err, &VerdictRecord::from(decision))?;
            return writeln!(err);
        }
        writeln!(err, "{}", self.render(decision))
    }

    fn render(&self, d: &Decision) -> String {
        let label = self.paint(d.verdict);
        match d.verdict {
            Verdict::Blocked => format!(
                "{label}   Hallucination — entropy {:.3} > {}",
                d.entropy, d.threshold
            ),
            Verdict::Verified => format!("{label}  Coherent — entropy {:.3}", d.entropy),
        }
    }

    fn paint(&self, verdict: Verdict) -> String {
        let label = verdict.to_string();
        if !self.color {
            return label;
        }
        match verdict {
            Verdict::Verified => label.bright_green().to_string(),
            Verdict::Blocked => label.bright_red().to_string(),
        }
    }
}

pub fn run(settings: &Settings) -> Result<ExitCode> {
    let mut kernel =
        PolicyKernel::new(settings.wards).context("Failed to initialise the lattice")?;
    let gauge = EntropyGauge::new();
    if settings.visualize {
        visualizer::spawn(gauge.clone());
    }

    let reporter = Reporter::new(settings);
    let tally = stream(
        &mut kernel,
        io::stdin().lock(),
        io::stdout().lock(),
        &reporter,
        &gauge,
    )?;

    info!(
        evaluated = tally.evaluated,
        verified = tally.verified,
        blocked = tally.blocked,
        skipped = tally.skipped,
        "stream finished"
    );

    if settings.fail_on_block && tally.blocked > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Prints the banner and pumps `input` to `out`, reporting on stderr.
///
/// Stderr is locked per write rather than for the whole stream, so other
/// threads (the visualizer) can still log while the pipe is open.
fn stream<R, W>(
    kernel: &mut PolicyKernel,
    input: R,
    out: W,
    reporter: &Reporter,
    gauge: &EntropyGauge,
) -> Result<Tally>
where
    R: BufRead,
    W: Write,
{
    let mut err = io::stderr();
    ignore_broken_pipe(reporter.banner(&mut err)).context("Failed to write to stderr")?;
    pump(kernel, input, out, &mut err, reporter, gauge)
}

/// Runs every line of `input` through `kernel`. Verified lines are written,
/// trimmed, to `out` and flushed immediately. Stops early if `out` is closed.
pub fn pump<R, W, E>(
    kernel: &mut PolicyKernel,
    mut input: R,
    mut out: W,
    err: &mut E,
    reporter: &Reporter,
    gauge: &EntropyGauge,
) -> Result<Tally>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = input
            .read_until(b'\n', &mut buf)
            .context("Failed to read from stdin")?;
        if n == 0 {
            break;
        }

        let text = trim_line(strip_newline(&buf));
        let Some(decision) = kernel.evaluate(text) else {
            continue;
        };
        gauge.publish(decision.entropy);
        ignore_broken_pipe(reporter.report(err, &decision))
            .context("Failed to write to stderr")?;

        if decision.allowed() {
            match write_line(&mut out, text) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    debug!("stdout closed by downstream, stopping");
                    break;
                }
                Err(e) => return Err(e).context("Failed to write to stdout"),
            }
        }
    }
    Ok(kernel.tally())
}

fn strip_newline(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn write_line<W: Write>(out: &mut W, text: &[u8]) -> io::Result<()> {
    out.write_all(text)?;
    out.write_all(b"\n")?;
    out.flush()
}

fn ignore_broken_pipe(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}
