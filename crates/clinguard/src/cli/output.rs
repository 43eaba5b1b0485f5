//! Output formatting utilities

use anyhow::{Context, Result};
use clap::ValueEnum;
use clinguard_types::ProtocolSetOutput;
use colored::Colorize;
use std::fmt::Write as _;
use std::fs;
use std::io::IsTerminal;
use std::path::Path;

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Indented JSON
    #[default]
    Pretty,
    /// Human-readable report
    Summary,
}

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::set_override(std::io::stdout().is_terminal()),
    }
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {:#}", "Error:".red().bold(), error)
}

/// Format a warning for display
pub fn format_warning(warning: &str) -> String {
    format!("{} {}", "Warning:".yellow().bold(), warning)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        fs::write(path, content)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?;
        eprintln!(
            "{}",
            format_success(&format!("Output written to {}", path.display()))
        );
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// Render a batch report in the requested format
pub fn render(output: &ProtocolSetOutput, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string(output).context("Failed to serialize report"),
        OutputFormat::Pretty => {
            serde_json::to_string_pretty(output).context("Failed to serialize report")
        }
        OutputFormat::Summary => Ok(format_summary(output)),
    }
}

/// Format a batch report for a terminal
pub fn format_summary(output: &ProtocolSetOutput) -> String {
    let mut text = String::new();

    let _ = writeln!(
        text,
        "{} protocol(s) evaluated in {:.3} ms",
        output.len(),
        output.evaluation_time_ms
    );

    if !output.actions.is_empty() {
        let _ = writeln!(text, "\n{}", "Actions".bold());
        for action in &output.actions {
            let review = if action.requires_review {
                " [review]".yellow().to_string()
            } else {
                String::new()
            };
            let _ = writeln!(
                text,
                "  {} {} (confidence {:.2}){}",
                action.protocol.cyan(),
                action.action.green(),
                action.confidence,
                review
            );
        }
    }

    if !output.skipped_rules.is_empty() {
        let _ = writeln!(text, "\n{}", "Skipped".bold());
        for skip in &output.skipped_rules {
            let reason = if skip.reason.is_data_quality() {
                skip.reason.as_str().yellow()
            } else {
                skip.reason.as_str().dimmed()
            };
            let _ = writeln!(text, "  {} {}", skip.rule_id.cyan(), reason);
        }
    }

    text.trim_end().to_string()
}
