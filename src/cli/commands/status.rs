//! `sut status` command - project status dashboard

use console::style;
use miette::Result;

use crate::cli::args::GlobalOpts;
use crate::cli::commands::assess::print_table;
use crate::cli::helpers::{fmt_timestamp, open_engine, open_project};

#[derive(clap::Args, Debug)]
pub struct StatusArgs {}

pub fn run(_args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let engine = open_engine(global)?;

    println!(
        "{} {}",
        style("Project:").bold(),
        style(project.root().display()).cyan()
    );

    let defaults = engine.defaults_record();
    match defaults.last_modified {
        Some(_) => println!(
            "{} customized, last modified {}",
            style("Defaults:").bold(),
            fmt_timestamp(defaults.last_modified)
        ),
        None => println!("{} factory values", style("Defaults:").bold()),
    }

    println!();
    print_table(&engine, global);
    Ok(())
}
