//! `sut assess` command - assessment lifecycle (show, save, reset, staleness)

use clap::Subcommand;
use console::style;
use dialoguer::Confirm;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers::{
    effective_format, fmt_result, fmt_timestamp, open_engine, resolve_assessment, result_summary,
    styled_status,
};
use crate::core::{resolve_key, AssessmentRecord, AssessmentStatus, UncertaintyEngine};
use crate::storage::FileStore;

#[derive(Subcommand, Debug)]
pub enum AssessCommands {
    /// Show the active assessment record
    Show(KeyArgs),

    /// List all assessment records
    List(ListArgs),

    /// Commit the current parameters as the assessment's results
    Save(KeyArgs),

    /// Reset parameters to the factory baseline
    Reset(ResetArgs),

    /// Copy the saved defaults into the assessment
    UseDefaults(KeyArgs),

    /// Flag committed results as stale without editing parameters
    MarkStale(KeyArgs),
}

#[derive(clap::Args, Debug)]
pub struct KeyArgs {
    /// Assessment key (default: configured or well-known key)
    #[arg(long, short = 'A')]
    pub assessment: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {}

#[derive(clap::Args, Debug)]
pub struct ResetArgs {
    /// Assessment key (default: configured or well-known key)
    #[arg(long, short = 'A')]
    pub assessment: Option<String>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: AssessCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        AssessCommands::Show(args) => run_show(args, global),
        AssessCommands::List(args) => run_list(args, global),
        AssessCommands::Save(args) => run_save(args, global),
        AssessCommands::Reset(args) => run_reset(args, global),
        AssessCommands::UseDefaults(args) => run_use_defaults(args, global),
        AssessCommands::MarkStale(args) => run_mark_stale(args, global),
    }
}

fn run_show(args: KeyArgs, global: &GlobalOpts) -> Result<()> {
    let key = resolve_assessment(args.assessment);
    let mut engine = open_engine(global)?;
    let record = engine.get_active(key.as_deref());

    if effective_format(global.format) == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(record).into_diagnostic()?);
        return Ok(());
    }

    print_record(resolve_key(key.as_deref()), record);
    Ok(())
}

fn print_record(key: &str, record: &AssessmentRecord) {
    println!("Assessment {}", style(key).cyan().bold());
    println!("  Status:      {}", styled_status(record.status));
    println!("  Last saved:  {}", fmt_timestamp(record.last_updated));
    println!("  Radial:      {}", fmt_result(record.results.radial));
    println!("  Axial:       {}", fmt_result(record.results.axial));

    if record.status == AssessmentStatus::Stale {
        println!();
        println!(
            "{} Parameters changed since the last save; current budget: {}",
            style("!").yellow(),
            result_summary(&record.recompute())
        );
    }
}

fn run_list(_args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let engine = open_engine(global)?;

    if effective_format(global.format) == OutputFormat::Json {
        let records: std::collections::BTreeMap<&str, &AssessmentRecord> =
            engine.assessments().collect();
        println!("{}", serde_json::to_string_pretty(&records).into_diagnostic()?);
        return Ok(());
    }

    print_table(&engine, global);
    Ok(())
}

/// Print the key/status/results table shared with `sut status`
pub(crate) fn print_table(engine: &UncertaintyEngine<FileStore>, global: &GlobalOpts) {
    if engine.assessment_count() == 0 {
        println!(
            "No assessments yet. Run {} to start one.",
            style("sut param set").yellow()
        );
        return;
    }

    println!(
        "{:<20} {:<8} {:<18} {:<12} {}",
        style("KEY").bold(),
        style("STATUS").bold(),
        style("LAST SAVED").bold(),
        style("RADIAL").bold(),
        style("AXIAL").bold()
    );
    println!("{}", "-".repeat(72));

    for (key, record) in engine.assessments() {
        println!(
            "{:<20} {:<8} {:<18} {:<12} {}",
            style(key).cyan(),
            styled_status(record.status),
            fmt_timestamp(record.last_updated),
            fmt_result(record.results.radial),
            fmt_result(record.results.axial)
        );
    }

    if !global.quiet {
        println!();
        println!("{} assessment(s)", style(engine.assessment_count()).cyan());
    }
}

fn run_save(args: KeyArgs, global: &GlobalOpts) -> Result<()> {
    let key = resolve_assessment(args.assessment);
    let mut engine = open_engine(global)?;
    let record = engine.save(key.as_deref());

    match record.status {
        AssessmentStatus::Filled => println!(
            "{} Saved assessment {}: {}",
            style("✓").green(),
            style(resolve_key(key.as_deref())).cyan(),
            result_summary(&record.results)
        ),
        _ => println!(
            "{} Budget incomplete; assessment {} left empty",
            style("!").yellow(),
            style(resolve_key(key.as_deref())).cyan()
        ),
    }
    Ok(())
}

fn run_reset(args: ResetArgs, global: &GlobalOpts) -> Result<()> {
    let key = resolve_assessment(args.assessment);
    let key_name = resolve_key(key.as_deref()).to_string();

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Reset assessment '{}' to the factory baseline?",
                key_name
            ))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let mut engine = open_engine(global)?;
    engine.reset_to_defaults(key.as_deref());
    println!(
        "{} Assessment {} reset to the factory baseline",
        style("✓").green(),
        style(key_name).cyan()
    );
    Ok(())
}

fn run_use_defaults(args: KeyArgs, global: &GlobalOpts) -> Result<()> {
    let key = resolve_assessment(args.assessment);
    let mut engine = open_engine(global)?;
    let preview = engine.load_defaults_into(key.as_deref());

    println!(
        "{} Loaded defaults into assessment {}",
        style("✓").green(),
        style(resolve_key(key.as_deref())).cyan()
    );
    println!("  {}", result_summary(&preview));
    println!(
        "  Run {} to commit the budget",
        style("sut assess save").yellow()
    );
    Ok(())
}

fn run_mark_stale(args: KeyArgs, global: &GlobalOpts) -> Result<()> {
    let key = resolve_assessment(args.assessment);
    let mut engine = open_engine(global)?;

    if engine.mark_stale(key.as_deref()) {
        println!(
            "{} Assessment {} marked stale",
            style("✓").green(),
            style(resolve_key(key.as_deref())).cyan()
        );
    } else {
        println!(
            "Assessment {} has no committed results to mark stale",
            style(resolve_key(key.as_deref())).cyan()
        );
    }
    Ok(())
}
