use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::GlobalArgs;

mod commands;
mod output;
mod tty;

use commands::{config, list, prereqs, run};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "kiln")]
#[command(version = VERSION)]
#[command(about = "Build orchestration for .NET applications")]
struct Cli {
    /// Properties file with the per-environment settings
    #[arg(short = 'f', long, global = true, default_value = kiln::settings::DEFAULT_PROPERTIES_FILE)]
    properties: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run tasks and their prerequisites
    Run(run::RunArgs),
    /// List the available tasks
    List(list::ListArgs),
    /// Show task prerequisites and execution order
    Prereqs(prereqs::PrereqsArgs),
    /// Show the resolved settings for an environment
    Config(config::ConfigArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let global = GlobalArgs {
        properties: cli.properties,
    };

    let (json_result, exit_code) = commands::run_json(cli.command, &global);
    if let Err(err) = output::print_json_result(json_result) {
        eprintln!("{}", err);
        return std::process::ExitCode::from(exit_code_to_u8(1));
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
