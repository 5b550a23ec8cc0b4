use clap::Args;
use serde::Serialize;
use std::rc::Rc;

use kiln::build::{self, BuildReport};
use kiln::{DryRunRunner, ProcessRunner, ToolRunner};

use crate::commands::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct RunArgs {
    /// Tasks to run, e.g. `env:test compile:all` (default: `default`)
    pub tasks: Vec<String>,

    /// Show the tool command lines without running anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput {
    #[serde(flatten)]
    pub report: BuildReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
}

pub fn run(args: RunArgs, global: &GlobalArgs) -> CmdResult<RunOutput> {
    if args.dry_run {
        let recorder = Rc::new(DryRunRunner::new());
        let runner: Rc<dyn ToolRunner> = recorder.clone();
        let report = build::run(&global.properties, &args.tasks, true, runner)?;
        return Ok((
            RunOutput {
                report,
                commands: recorder.command_lines(),
            },
            0,
        ));
    }

    let report = build::run(&global.properties, &args.tasks, false, Rc::new(ProcessRunner))?;
    Ok((
        RunOutput {
            report,
            commands: Vec::new(),
        },
        0,
    ))
}
