//! `sut defaults` command - the organization-wide default parameter set
//!
//! Engine-side, default edits are drafts until an explicit save. One CLI
//! invocation is one engine session, so the commands here pair the edit
//! with the save; `edit` keeps the draft open across the whole walk-through
//! and commits once at the end.

use clap::Subcommand;
use console::style;
use dialoguer::{Confirm, Input};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::args::{DistributionArg, GlobalOpts, OutputFormat, ParamName};
use crate::cli::commands::param::apply_edit;
use crate::cli::helpers::{effective_format, fmt_timestamp, fmt_value, open_engine};
use crate::core::Contributor;

#[derive(Subcommand, Debug)]
pub enum DefaultsCommands {
    /// Show the default parameter set
    Show(ShowArgs),

    /// Set a default parameter value
    Set(SetArgs),

    /// Clear a default parameter value
    Clear(ClearArgs),

    /// Walk through every default contributor interactively
    Edit(EditArgs),

    /// Restore factory defaults
    Reset(ResetArgs),

    /// Export the defaults as a JSON document
    Export(ExportArgs),

    /// Import defaults from an exported JSON document
    Import(ImportArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Parameter to set
    pub name: ParamName,

    /// New value, in the parameter's declared unit
    #[arg(allow_hyphen_values = true)]
    pub value: f64,

    /// Declared unit ("nm" is converted; anything else reads as μm)
    #[arg(long, short = 'u')]
    pub unit: Option<String>,

    /// Distribution shape of the declared value
    #[arg(long, short = 'd')]
    pub distribution: Option<DistributionArg>,
}

#[derive(clap::Args, Debug)]
pub struct ClearArgs {
    /// Parameter to clear
    pub name: ParamName,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {}

#[derive(clap::Args, Debug)]
pub struct ResetArgs {
    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Write the document to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Exported JSON document to read
    pub file: PathBuf,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: DefaultsCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DefaultsCommands::Show(args) => run_show(args, global),
        DefaultsCommands::Set(args) => run_set(args, global),
        DefaultsCommands::Clear(args) => run_clear(args, global),
        DefaultsCommands::Edit(args) => run_edit(args, global),
        DefaultsCommands::Reset(args) => run_reset(args, global),
        DefaultsCommands::Export(args) => run_export(args, global),
        DefaultsCommands::Import(args) => run_import(args, global),
    }
}

fn run_show(_args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let engine = open_engine(global)?;
    let record = engine.defaults_record();

    if effective_format(global.format) == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(record).into_diagnostic()?);
        return Ok(());
    }

    println!("Default parameter set");
    println!("  Last modified: {}", fmt_timestamp(record.last_modified));
    println!();
    println!(
        "{:<32} {:<12} {}",
        style("PARAMETER").bold(),
        style("VALUE").bold(),
        style("DIST").bold()
    );
    println!("{}", "-".repeat(56));
    for which in Contributor::ALL {
        let param = record.params.contributor(which);
        println!(
            "{:<32} {:<12} {}",
            which.label(),
            fmt_value(param.value, &param.unit),
            param.distribution
        );
    }
    let temperature = &record.params.environment_temperature;
    let humidity = &record.params.environment_humidity;
    println!(
        "{:<32} {:<12} {}",
        "environment temperature",
        fmt_value(temperature.value, &temperature.unit),
        "-"
    );
    println!(
        "{:<32} {:<12} {}",
        "environment humidity",
        fmt_value(humidity.value, &humidity.unit),
        "-"
    );
    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    let mut engine = open_engine(global)?;
    engine.update_defaults(|params| {
        apply_edit(
            params,
            args.name,
            Some(args.value),
            args.unit.as_deref(),
            args.distribution,
        )
    });
    engine.save_defaults();

    if !global.quiet {
        println!(
            "{} Set default {}",
            style("✓").green(),
            style(args.name.label()).cyan()
        );
        println!("  New assessments will seed from the updated defaults");
    }
    Ok(())
}

fn run_clear(args: ClearArgs, global: &GlobalOpts) -> Result<()> {
    let mut engine = open_engine(global)?;
    engine.update_defaults(|params| apply_edit(params, args.name, None, None, None));
    engine.save_defaults();

    if !global.quiet {
        println!(
            "{} Cleared default {}",
            style("✓").green(),
            style(args.name.label()).cyan()
        );
    }
    Ok(())
}

fn run_edit(_args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut engine = open_engine(global)?;
    let mut params = engine.defaults_record().params.clone();

    println!("Editing defaults (empty keeps the current value, '-' clears it)");

    for which in Contributor::ALL {
        let param = params.contributor_mut(which);
        let prompt = format!("{} [{}]", which.label(), fmt_value(param.value, &param.unit));
        let entry: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?;
        let entry = entry.trim();

        if entry.is_empty() {
            continue;
        }
        if entry == "-" {
            param.value = None;
            continue;
        }
        match entry.parse::<f64>() {
            Ok(value) => param.value = Some(value),
            Err(_) => println!(
                "{} Not a number, keeping the current value",
                style("!").yellow()
            ),
        }
    }

    engine.update_defaults(move |_| params);
    let record = engine.save_defaults();
    println!(
        "{} Saved defaults ({})",
        style("✓").green(),
        fmt_timestamp(record.last_modified)
    );
    Ok(())
}

fn run_reset(args: ResetArgs, global: &GlobalOpts) -> Result<()> {
    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt("Reset the shared defaults to factory values?")
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let mut engine = open_engine(global)?;
    engine.reset_defaults();
    println!("{} Defaults reset to factory values", style("✓").green());
    Ok(())
}

fn run_export(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let engine = open_engine(global)?;
    let doc = engine.export_defaults();

    match args.output {
        Some(path) => {
            std::fs::write(&path, &doc).into_diagnostic()?;
            println!(
                "{} Exported defaults to {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
        None => println!("{}", doc),
    }
    Ok(())
}

fn run_import(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let doc = std::fs::read_to_string(&args.file).into_diagnostic()?;

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Replace the shared defaults with {}?",
                args.file.display()
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
    if !engine.import_defaults(&doc) {
        return Err(miette::miette!(
            "import rejected: {} has no 'params' field",
            args.file.display()
        ));
    }

    println!(
        "{} Imported defaults from {}",
        style("✓").green(),
        style(args.file.display()).cyan()
    );
    Ok(())
}
