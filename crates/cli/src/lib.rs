pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::commands::recommend::{FamilyArg, RecommendArgs};

#[derive(Debug, Parser)]
#[command(
    name = "postwise",
    about = "Postwise operator CLI",
    long_about = "Inspect configuration, check data readiness, seed demo data, and run offline scheme recommendations.",
    after_help = "Examples:\n  postwise doctor --json\n  postwise seed\n  postwise recommend \"Aluva SO\" --family both --vote"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, dataset and predictor loading, and LLM readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Write the deterministic demo dataset and predictors")]
    Seed {
        #[arg(long, help = "Target data directory (defaults to data.dir)")]
        data_dir: Option<PathBuf>,
        #[arg(long, help = "Target models directory (defaults to data.models_dir)")]
        models_dir: Option<PathBuf>,
    },
    #[command(about = "Rank schemes for one post office")]
    Recommend {
        post_office: String,
        #[arg(long, value_enum, default_value = "both")]
        family: FamilyArg,
        #[arg(long, help = "List length (defaults to the configured top-n per family)")]
        top_n: Option<usize>,
        #[arg(long, help = "Blend in neighbor votes")]
        vote: bool,
        #[arg(
            long,
            value_parser = clap::value_parser!(u32).range(1..=12),
            help = "Calendar month for the agriculture score (defaults to the current month)"
        )]
        month: Option<u32>,
    },
    #[command(about = "Project five-year workforce trends for a district")]
    Trends { district: String },
    #[command(about = "Show the feature record of a post office")]
    Demographics { post_office: String },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Seed { data_dir, models_dir } => commands::seed::run(data_dir, models_dir),
        Command::Recommend { post_office, family, top_n, vote, month } => {
            commands::recommend::run(RecommendArgs { post_office, family, top_n, vote, month })
        }
        Command::Trends { district } => commands::trends::run(&district),
        Command::Demographics { post_office } => commands::demographics::run(&post_office),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
