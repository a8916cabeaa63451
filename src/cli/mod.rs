use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::ScenarioType;

#[derive(Parser, Debug)]
#[command(
    name = "council",
    version,
    about = "Put a sustainability scenario in front of a seven-persona CSR council"
)]
pub struct Args {
    /// TOML config file; unset keys keep their defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub model: Option<String>,

    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one council session.
    Run(RunArgs),
    /// Talk to the CSR coach.
    Chat,
    /// List the preset scenarios.
    Presets,
}

#[derive(ClapArgs, Debug)]
pub struct RunArgs {
    /// Display name to log in with. The council is only open to logged-in users.
    #[arg(long)]
    pub user: Option<String>,

    #[arg(long, conflicts_with = "preset")]
    pub scenario: Option<String>,

    /// Start from a preset scenario by name (see `council presets`).
    #[arg(long)]
    pub preset: Option<String>,

    #[arg(long = "type", value_enum)]
    pub scenario_type: Option<ScenarioType>,

    /// Image of the project site, described by the model and added as context.
    #[arg(long)]
    pub image: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub coach: bool,

    #[arg(long, default_value_t = false)]
    pub improve: bool,

    #[arg(long, default_value_t = false)]
    pub explain: bool,

    #[arg(long, default_value_t = false)]
    pub report: bool,
}
