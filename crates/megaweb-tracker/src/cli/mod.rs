/*
[INPUT]:  Command line arguments
[OUTPUT]: Parsed Cli with the selected subcommand
[POS]:    CLI layer - argument definitions for the megaweb binary
[UPDATE]: When adding subcommands or flags
*/

pub mod commands;
pub mod init;
pub mod interactive;
pub mod watch;

use clap::{Args, Parser, Subcommand};
use megaweb_adapter::TaskType;
use megaweb_tracker::forms::parse_field_assignment;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "megaweb", version, about = "Submit Mega-Web tasks and follow them to completion")]
pub struct Cli {
    /// Configuration file (defaults to ~/.megaweb/config.yaml when present)
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info", global = true)]
    pub log_level: String,
    /// Also write logs to this file
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List task types and their form fields
    Forms,
    /// Submit a task and watch it until it finishes
    Submit(SubmitArgs),
    /// Show the current status of a task
    Status {
        #[arg(value_name = "TASK_ID")]
        task_id: String,
        /// Print the raw status record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Watch existing tasks until they finish
    Watch {
        #[arg(value_name = "TASK_ID", required = true)]
        task_ids: Vec<String>,
    },
    /// Write a configuration file interactively
    Init {
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    #[arg(value_name = "TASK_TYPE")]
    pub task_type: TaskType,
    /// Form field, repeatable: -f url=https://...
    #[arg(
        short = 'f',
        long = "field",
        value_name = "FIELD=VALUE",
        value_parser = parse_field_assignment
    )]
    pub fields: Vec<(String, String)>,
    /// Prompt for every form field
    #[arg(short = 'i', long)]
    pub interactive: bool,
    /// Print the task id and exit without polling
    #[arg(long = "no-watch")]
    pub no_watch: bool,
}
