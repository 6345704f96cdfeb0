//! `sut param` command - budget parameters of the active assessment

use clap::Subcommand;
use console::style;
use dialoguer::Input;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::{DistributionArg, GlobalOpts, OutputFormat, ParamName};
use crate::cli::helpers::{
    effective_format, fmt_value, open_engine, resolve_assessment, result_summary,
};
use crate::core::{resolve_key, Contributor, ParameterSet};

#[derive(Subcommand, Debug)]
pub enum ParamCommands {
    /// List the budget parameters and their standard uncertainties
    List(ListArgs),

    /// Set a parameter value (and optionally its unit/distribution)
    Set(SetArgs),

    /// Clear a parameter value (the budget is incomplete until it returns)
    Clear(ClearArgs),

    /// Walk through every contributor interactively
    Edit(EditArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Assessment key (default: configured or well-known key)
    #[arg(long, short = 'A')]
    pub assessment: Option<String>,
}

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

    /// Assessment key (default: configured or well-known key)
    #[arg(long, short = 'A')]
    pub assessment: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ClearArgs {
    /// Parameter to clear
    pub name: ParamName,

    /// Assessment key (default: configured or well-known key)
    #[arg(long, short = 'A')]
    pub assessment: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Assessment key (default: configured or well-known key)
    #[arg(long, short = 'A')]
    pub assessment: Option<String>,
}

pub fn run(cmd: ParamCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ParamCommands::List(args) => run_list(args, global),
        ParamCommands::Set(args) => run_set(args, global),
        ParamCommands::Clear(args) => run_clear(args, global),
        ParamCommands::Edit(args) => run_edit(args, global),
    }
}

/// Apply one name/value/unit/distribution edit to a parameter set
pub(crate) fn apply_edit(
    mut params: ParameterSet,
    name: ParamName,
    value: Option<f64>,
    unit: Option<&str>,
    distribution: Option<DistributionArg>,
) -> ParameterSet {
    match name.contributor() {
        Some(which) => {
            let param = params.contributor_mut(which);
            param.value = value;
            if let Some(unit) = unit {
                param.unit = unit.to_string();
            }
            if let Some(distribution) = distribution {
                param.distribution = distribution.into();
            }
        }
        None => {
            let reading = match name {
                ParamName::Temperature => &mut params.environment_temperature,
                _ => &mut params.environment_humidity,
            };
            reading.value = value;
            if let Some(unit) = unit {
                reading.unit = unit.to_string();
            }
        }
    }
    params
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    let key = resolve_assessment(args.assessment.clone());
    let mut engine = open_engine(global)?;

    let preview = engine.update_params(key.as_deref(), |params| {
        apply_edit(
            params,
            args.name,
            Some(args.value),
            args.unit.as_deref(),
            args.distribution,
        )
    });

    if !global.quiet {
        println!(
            "{} Set {} on assessment {}",
            style("✓").green(),
            style(args.name.label()).cyan(),
            style(resolve_key(key.as_deref())).cyan()
        );
        println!("  {}", result_summary(&preview));
        println!(
            "  Run {} to commit the budget",
            style("sut assess save").yellow()
        );
    }
    Ok(())
}

fn run_clear(args: ClearArgs, global: &GlobalOpts) -> Result<()> {
    let key = resolve_assessment(args.assessment.clone());
    let mut engine = open_engine(global)?;

    let preview =
        engine.update_params(key.as_deref(), |params| apply_edit(params, args.name, None, None, None));

    if !global.quiet {
        println!(
            "{} Cleared {} on assessment {}",
            style("✓").green(),
            style(args.name.label()).cyan(),
            style(resolve_key(key.as_deref())).cyan()
        );
        println!("  {}", result_summary(&preview));
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let key = resolve_assessment(args.assessment.clone());
    let mut engine = open_engine(global)?;
    let mut params = engine.get_active(key.as_deref()).params.clone();

    println!(
        "Editing assessment {} (empty keeps the current value, '-' clears it)",
        style(resolve_key(key.as_deref())).cyan()
    );

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

    let preview = engine.update_params(key.as_deref(), move |_| params);
    println!("{} Parameters updated", style("✓").green());
    println!("  {}", result_summary(&preview));
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let key = resolve_assessment(args.assessment.clone());
    let mut engine = open_engine(global)?;
    let record = engine.get_active(key.as_deref());

    if effective_format(global.format) == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(&record.params).into_diagnostic()?
        );
        return Ok(());
    }

    println!(
        "{:<32} {:<12} {:<12} {}",
        style("PARAMETER").bold(),
        style("VALUE").bold(),
        style("DIST").bold(),
        style("STD UNC").bold()
    );
    println!("{}", "-".repeat(68));

    for which in Contributor::ALL {
        let param = record.params.contributor(which);
        let sigma = match param.standard_uncertainty() {
            Some(sigma) => format!("{:.4} μm", sigma),
            None => style("-").dim().to_string(),
        };
        println!(
            "{:<32} {:<12} {:<12} {}",
            which.label(),
            fmt_value(param.value, &param.unit),
            param.distribution,
            sigma
        );
    }

    let temperature = &record.params.environment_temperature;
    let humidity = &record.params.environment_humidity;
    println!(
        "{:<32} {:<12} {:<12} {}",
        "environment temperature",
        fmt_value(temperature.value, &temperature.unit),
        "-",
        "-"
    );
    println!(
        "{:<32} {:<12} {:<12} {}",
        "environment humidity",
        fmt_value(humidity.value, &humidity.unit),
        "-",
        "-"
    );

    println!();
    println!("Current budget: {}", result_summary(&record.recompute()));
    Ok(())
}
