use clap::Args;
use serde::Serialize;

use kiln::recipe;
use kiln::{Error, TaskSummary};

use super::CmdResult;

#[derive(Args)]
pub struct PrereqsArgs {
    /// Show one task and the order its run would take
    pub task: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrereqsOutput {
    pub tasks: Vec<TaskSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_order: Option<Vec<String>>,
}

pub fn run(args: PrereqsArgs) -> CmdResult<PrereqsOutput> {
    let graph = recipe::build_graph()?;
    let summaries = graph.summaries();

    let Some(task) = args.task else {
        return Ok((
            PrereqsOutput {
                tasks: summaries,
                execution_order: None,
            },
            0,
        ));
    };

    let order = graph.plan(&[task.as_str()])?;
    let summary = summaries
        .into_iter()
        .find(|s| s.name == task)
        .ok_or_else(|| Error::task_not_found(task.clone(), None))?;

    Ok((
        PrereqsOutput {
            tasks: vec![summary],
            execution_order: Some(order),
        },
        0,
    ))
}
