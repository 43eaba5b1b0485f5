//! Check command implementation
//!
//! Loads protocol files and reports load errors without evaluating anything.
//! Besides hard errors it warns about authoring mistakes the loader accepts:
//! duplicate rule ids and result literals outside `allowedActions`.

use super::output;
use anyhow::{Result, bail};
use clinguard_logic::{ClinicalProtocolRule, OperatorTable};
use colored::Colorize;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

/// Configuration for check command
pub struct CheckConfig {
    pub files: Vec<PathBuf>,
    pub no_action_token: String,
    pub verbose: bool,
}

/// Diagnostics for one protocol document
#[derive(Debug, Default, PartialEq)]
pub struct CheckReport {
    /// Protocols that loaded successfully
    pub loaded: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Check protocol files
pub fn check(config: CheckConfig) -> Result<()> {
    if config.files.is_empty() {
        bail!("No protocol files specified");
    }

    let table = OperatorTable::standard();
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for file in &config.files {
        let report = match fs::read_to_string(file) {
            Ok(text) => check_document(&text, &table, &config.no_action_token),
            Err(e) => CheckReport {
                errors: vec![format!("Failed to read file: {}", e)],
                ..Default::default()
            },
        };

        total_errors += report.errors.len();
        total_warnings += report.warnings.len();
        print_report(file, &report, config.verbose);
    }

    println!();
    if total_errors > 0 {
        bail!(
            "{} error(s), {} warning(s) in {} file(s)",
            total_errors,
            total_warnings,
            config.files.len()
        );
    }

    println!(
        "{}",
        output::format_success(&format!(
            "All {} file(s) loaded ({} warning(s))",
            config.files.len(),
            total_warnings
        ))
    );
    Ok(())
}

/// Check one protocol document (an array of protocols or a single object).
///
/// Every protocol is checked on its own, so one malformed entry does not
/// hide errors in the others.
pub fn check_document(text: &str, table: &OperatorTable, no_action_token: &str) -> CheckReport {
    let mut report = CheckReport::default();

    let json: JsonValue = match serde_json::from_str(text) {
        Ok(json) => json,
        Err(e) => {
            report.errors.push(format!("Malformed JSON: {}", e));
            return report;
        }
    };
    let items = match json {
        JsonValue::Array(items) => items,
        single => vec![single],
    };

    let mut seen = HashSet::new();
    for (index, item) in items.iter().enumerate() {
        match ClinicalProtocolRule::from_json_value(item, table) {
            Ok(rule) => {
                report.loaded += 1;
                if !seen.insert(rule.rule_id.clone()) {
                    report
                        .warnings
                        .push(format!("{}: duplicate ruleId", rule.rule_id));
                }
                for action in rule.logic.result_literals() {
                    if action != no_action_token && !rule.allows_action(action) {
                        report.warnings.push(format!(
                            "{}: result '{}' is not in allowedActions",
                            rule.rule_id, action
                        ));
                    }
                }
            }
            Err(e) => report.errors.push(format!("protocol #{}: {}", index, e)),
        }
    }

    report
}

fn print_report(file: &std::path::Path, report: &CheckReport, verbose: bool) {
    let status = if report.errors.is_empty() {
        "ok".green()
    } else {
        "failed".red()
    };
    println!(
        "{} {} ({} protocol(s))",
        file.display().to_string().cyan(),
        status,
        report.loaded
    );

    for error in &report.errors {
        println!("  {} {}", "error:".red().bold(), error);
    }
    if verbose || !report.errors.is_empty() {
        for warning in &report.warnings {
            println!("  {}", output::format_warning(warning));
        }
    }
}
