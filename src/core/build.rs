//! One build run: load settings for the requested environment, resolve the
//! requested tasks and run them.

use serde::Serialize;
use std::path::Path;
use std::rc::Rc;

use crate::context::{BuildContext, RunOptions};
use crate::error::Result;
use crate::graph::TaskRecord;
use crate::invocation::ToolRunner;
use crate::recipe::{self, BuildGraph};
use crate::settings::{self, Settings};
use crate::teamcity::BuildStatistics;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub environment: String,
    pub requested: Vec<String>,
    pub options: RunOptions,
    pub tasks: Vec<TaskRecord>,
    #[serde(skip_serializing_if = "BuildStatistics::is_empty")]
    pub statistics: BuildStatistics,
}

/// Requested task names, `default` when none are given.
pub fn requested_tasks(tasks: &[String]) -> Vec<String> {
    if tasks.is_empty() {
        vec![recipe::DEFAULT_TASK.to_string()]
    } else {
        tasks.to_vec()
    }
}

/// Environment the requested tasks select.
pub fn environment_for(tasks: &[String]) -> String {
    settings::environment_from_tasks(tasks)
        .unwrap_or_else(|| settings::DEFAULT_ENVIRONMENT.to_string())
}

pub fn run(
    properties: &Path,
    tasks: &[String],
    dry_run: bool,
    runner: Rc<dyn ToolRunner>,
) -> Result<BuildReport> {
    let requested = requested_tasks(tasks);

    // Task names are checked before the properties file is read.
    let graph = recipe::build_graph()?;
    let names: Vec<&str> = requested.iter().map(String::as_str).collect();
    graph.plan(&names)?;

    let settings = Settings::load(properties, &environment_for(&requested))?;
    let options = RunOptions {
        quick: recipe::is_quick(&requested),
        dry_run,
    };

    run_with(&graph, BuildContext::new(settings, options, runner), requested)
}

/// Run `requested` against an existing graph and context.
///
/// Statistics recorded before a failure are still written.
pub fn run_with(graph: &BuildGraph, ctx: BuildContext, requested: Vec<String>) -> Result<BuildReport> {
    let names: Vec<&str> = requested.iter().map(String::as_str).collect();
    log_status!(
        "build",
        "Running {} for '{}'",
        names.join(", "),
        ctx.settings.environment
    );

    let result = graph.run(&names, &ctx);
    let flushed = ctx.flush_statistics();
    let tasks = result?;
    flushed?;

    Ok(BuildReport {
        environment: ctx.settings.environment.clone(),
        requested,
        options: ctx.options,
        tasks,
        statistics: ctx.statistics(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_tasks_means_default() {
        assert_eq!(requested_tasks(&[]), vec!["default"]);
        assert_eq!(requested_tasks(&["package".to_string()]), vec!["package"]);
    }

    #[test]
    fn environment_defaults_to_development() {
        assert_eq!(environment_for(&["package".to_string()]), "development");
        assert_eq!(
            environment_for(&["env:test".to_string(), "tests:run".to_string()]),
            "test"
        );
    }
}
