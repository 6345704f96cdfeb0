//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    assess::AssessCommands, completions::CompletionsArgs, defaults::DefaultsCommands,
    init::InitArgs, param::ParamCommands, status::StatusArgs,
};
use crate::core::{Contributor, Distribution};

#[derive(Parser)]
#[command(name = "sut")]
#[command(author, version, about = "Spindle Uncertainty Toolkit")]
#[command(
    long_about = "A Unix-style toolkit for building measurement uncertainty budgets for spindle-error analysis runs and tracking their freshness across reports."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .sut/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new SUT project
    Init(InitArgs),

    /// Assessment lifecycle (show, save, reset, staleness)
    #[command(subcommand)]
    Assess(AssessCommands),

    /// Budget parameters of the active assessment
    #[command(subcommand)]
    Param(ParamCommands),

    /// Organization-wide default parameter set
    #[command(subcommand)]
    Defaults(DefaultsCommands),

    /// Show project status dashboard
    Status(StatusArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context
    #[default]
    Auto,
    /// Aligned text columns (for reading and piping)
    Tsv,
    /// JSON format (for programming)
    Json,
}

/// Settable budget parameter names as they appear on the command line
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ParamName {
    SensorError,
    StandardError,
    EnvironmentError,
    MisalignmentRadial,
    MisalignmentAxial,
    LateralRadial,
    LateralAxial,
    Temperature,
    Humidity,
}

impl ParamName {
    /// The uncertainty contributor behind this name; `None` for the two
    /// descriptive environment readings
    pub fn contributor(self) -> Option<Contributor> {
        match self {
            ParamName::SensorError => Some(Contributor::SensorError),
            ParamName::StandardError => Some(Contributor::StandardError),
            ParamName::EnvironmentError => Some(Contributor::EnvironmentError),
            ParamName::MisalignmentRadial => Some(Contributor::SensorMisalignmentRadial),
            ParamName::MisalignmentAxial => Some(Contributor::SensorMisalignmentAxial),
            ParamName::LateralRadial => Some(Contributor::SensorLateralDisplacementRadial),
            ParamName::LateralAxial => Some(Contributor::SensorLateralDisplacementAxial),
            ParamName::Temperature | ParamName::Humidity => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self.contributor() {
            Some(which) => which.label(),
            None => match self {
                ParamName::Temperature => "environment temperature",
                _ => "environment humidity",
            },
        }
    }
}

/// Distribution shape as a CLI argument
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DistributionArg {
    Uniform,
    Normal,
    Triangular,
}

impl From<DistributionArg> for Distribution {
    fn from(arg: DistributionArg) -> Self {
        match arg {
            DistributionArg::Uniform => Distribution::Uniform,
            DistributionArg::Normal => Distribution::Normal,
            DistributionArg::Triangular => Distribution::Triangular,
        }
    }
}
