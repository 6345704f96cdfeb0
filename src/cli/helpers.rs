//! Shared helper functions for CLI commands

use chrono::{DateTime, Local, Utc};
use miette::Result;

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::core::{AssessmentStatus, Config, Project, UncertaintyEngine, UncertaintyResult};
use crate::storage::FileStore;

/// Locate the enclosing project, honoring `--project`
pub fn open_project(global: &GlobalOpts) -> Result<Project> {
    let project = match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    };
    project.map_err(|e| miette::miette!("{}", e))
}

/// Rehydrate the engine from the project's state directory
pub fn open_engine(global: &GlobalOpts) -> Result<UncertaintyEngine<FileStore>> {
    let project = open_project(global)?;
    Ok(UncertaintyEngine::load(FileStore::new(project.state_dir())))
}

/// Resolve the assessment key for a command: explicit flag, then config.
/// `None` leaves the choice to the engine's well-known fallback key.
pub fn resolve_assessment(explicit: Option<String>) -> Option<String> {
    Config::load().resolve_assessment(explicit)
}

/// Determine the effective output format based on config and context
pub fn effective_format(format: OutputFormat) -> OutputFormat {
    if format != OutputFormat::Auto {
        return format;
    }
    match Config::load().default_format.as_deref() {
        Some("json") => OutputFormat::Json,
        _ => OutputFormat::Tsv,
    }
}

/// Format an optional declared value with its unit ("-" when unset)
pub fn fmt_value(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{} {}", v, unit),
        None => "-".to_string(),
    }
}

/// Format a combined uncertainty in micrometers at 3 decimal places
pub fn fmt_result(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.3} μm", v),
        None => "-".to_string(),
    }
}

/// Format a timestamp in local time ("-" when absent)
pub fn fmt_timestamp(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(dt) => {
            let local: DateTime<Local> = dt.with_timezone(&Local);
            local.format("%Y-%m-%d %H:%M").to_string()
        }
        None => "-".to_string(),
    }
}

/// Status with the usual color coding
pub fn styled_status(status: AssessmentStatus) -> String {
    let s = status.to_string();
    let styled = match status {
        AssessmentStatus::Empty => console::style(s).dim(),
        AssessmentStatus::Filled => console::style(s).green(),
        AssessmentStatus::Stale => console::style(s).yellow(),
    };
    styled.to_string()
}

/// One-line summary of a combination result
pub fn result_summary(result: &UncertaintyResult) -> String {
    if result.valid {
        format!(
            "radial {} / axial {}",
            fmt_result(result.radial),
            fmt_result(result.axial)
        )
    } else {
        "incomplete (a contributor value is missing)".to_string()
    }
}
