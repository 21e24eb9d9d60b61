//! JSON files of verification reports and run configurations.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::pipeline::{PipelineConfig, VerificationReport};

/// Writes a verification report as pretty JSON.
///
/// # Example
/// ```no_run
/// use biharmonic3d::io::write_report;
/// use biharmonic3d::pipeline::{PipelineConfig, run};
/// use std::path::Path;
///
/// let outcome = run(&PipelineConfig::default()).unwrap();
/// write_report(Path::new("report.json"), &outcome.report).unwrap();
/// ```
pub fn write_report(path: &Path, report: &VerificationReport) -> Result<()> {
    write_json(path, report, "report")
}

/// Reads a verification report written by [`write_report`].
pub fn read_report(path: &Path) -> Result<VerificationReport> {
    read_json(path, "report")
}

pub fn write_config(path: &Path, config: &PipelineConfig) -> Result<()> {
    write_json(path, config, "config")
}

/// Reads a run configuration. Missing fields take their default values.
pub fn read_config(path: &Path) -> Result<PipelineConfig> {
    read_json(path, "config")
}

fn write_json<T: Serialize>(path: &Path, value: &T, what: &str) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, value)
        .with_context(|| format!("Failed to serialize {} to: {}", what, path.display()))?;

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let value: T = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to deserialize {} from: {}", what, path.display()))?;

    Ok(value)
}
