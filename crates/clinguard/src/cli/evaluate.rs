//! Evaluate command implementation

use super::output::{self, OutputFormat};
use anyhow::{Context, Result};
use clinguard_eval::{EngineConfig, ProtocolEngine};
use clinguard_logic::ProtocolEntry;
use clinguard_types::{PatientState, ProtocolSetOutput};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for evaluate command
pub struct EvaluateConfig {
    pub state: PathBuf,
    pub protocols: Vec<PathBuf>,
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

/// Evaluate protocol files against a patient snapshot
pub fn evaluate(config: EvaluateConfig) -> Result<()> {
    let engine = match &config.config {
        Some(path) => ProtocolEngine::with_config(
            EngineConfig::from_path(path)
                .with_context(|| format!("Failed to load engine config: {}", path.display()))?,
        ),
        None => ProtocolEngine::new(),
    };

    let state = load_state(&config.state)?;
    let protocols = load_protocol_files(&engine, &config.protocols)?;
    let rejected = protocols.iter().filter(|entry| entry.is_err()).count();
    info!(
        "evaluating {} protocol(s) from {} file(s)",
        protocols.len() - rejected,
        config.protocols.len()
    );
    if rejected > 0 {
        warn!("{} protocol(s) failed to load and will be skipped", rejected);
    }

    let report = run(&engine, &state, &protocols);
    let content = output::render(&report, config.format)?;
    output::write_output(&content, config.output_file.as_deref())
}

/// Evaluate loaded protocol entries; rejected entries are reported as skips
pub fn run(
    engine: &ProtocolEngine,
    state: &PatientState,
    protocols: &[ProtocolEntry],
) -> ProtocolSetOutput {
    engine.evaluate_entries(state, protocols.iter().map(Result::as_ref))
}

/// Read a patient snapshot document
pub fn load_state(path: &Path) -> Result<PatientState> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse state file: {}", path.display()))
}

/// Read protocol documents in order, concatenating their entries.
///
/// An unreadable file or malformed JSON is an error. A single entry that does
/// not load is kept as a rejected entry so the rest can still be evaluated.
pub fn load_protocol_files(
    engine: &ProtocolEngine,
    paths: &[PathBuf],
) -> Result<Vec<ProtocolEntry>> {
    let mut protocols = Vec::new();
    for path in paths {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read protocol file: {}", path.display()))?;
        let entries = engine
            .load_protocol_entries(&text)
            .with_context(|| format!("Failed to load protocols from {}", path.display()))?;
        for rejected in entries.iter().filter_map(|entry| entry.as_ref().err()) {
            warn!(
                "{}: protocol #{} ({}): {}",
                path.display(),
                rejected.index,
                rejected.rule_id,
                rejected.error
            );
        }
        protocols.extend(entries);
    }
    Ok(protocols)
}
