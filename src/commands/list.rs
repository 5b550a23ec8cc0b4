use clap::Args;
use serde::Serialize;

use kiln::recipe;
use kiln::TaskSummary;

use super::CmdResult;

#[derive(Args)]
pub struct ListArgs {
    /// Include tasks without a description
    #[arg(long)]
    pub all: bool,
}

#[derive(Serialize)]
pub struct ListOutput {
    pub tasks: Vec<TaskSummary>,
}

pub fn run(args: ListArgs) -> CmdResult<ListOutput> {
    let graph = recipe::build_graph()?;
    let tasks = graph
        .summaries()
        .into_iter()
        .filter(|t| args.all || t.description.is_some())
        .collect();

    Ok((ListOutput { tasks }, 0))
}
