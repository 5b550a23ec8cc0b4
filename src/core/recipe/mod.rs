//! The build: every task kiln knows and what each one runs.
//!
//! Tasks are declared once into a [`TaskGraph`] over [`BuildContext`]. Modules
//! group them by namespace:
//!
//! - `env` - environment selection (`env:development`, ...)
//! - `generate` - version info and config templates
//! - `db` - migrations and exports
//! - `compile` - MSBuild projects
//! - `testing` - test runs and code quality (`tests:*`)
//! - `package` - archive, deploy and publish

mod compile;
mod db;
mod env;
mod generate;
mod package;
mod testing;

use crate::clean;
use crate::context::BuildContext;
use crate::error::Result;
use crate::graph::{TaskGraph, TaskSpec};

pub const DEFAULT_TASK: &str = "default";
pub const QUICK_TASK: &str = "quick";

pub type BuildGraph = TaskGraph<BuildContext>;

pub fn build_graph() -> Result<BuildGraph> {
    let mut graph = TaskGraph::new();
    declare_tasks(&mut graph)?;
    Ok(graph)
}

pub fn declare_tasks(graph: &mut BuildGraph) -> Result<()> {
    graph.declare(
        TaskSpec::new(DEFAULT_TASK).needs(["clobber", "compile:all", "tests:run", "package"]),
    )?;

    graph.declare(
        TaskSpec::new(QUICK_TASK)
            .describe("Runs a quick build just compiling the libs that are not up to date")
            .action(|_: &BuildContext| {
                log_status!("quick", "Keeping previous output, skipping up-to-date projects");
                Ok(())
            }),
    )?;

    graph.declare(
        TaskSpec::new("clean")
            .describe("Removes intermediate build output")
            .action(|ctx: &BuildContext| clean::clean(ctx).map(|_| ())),
    )?;

    graph.declare(
        TaskSpec::new("clobber")
            .needs(["clean"])
            .describe("Removes all build output")
            .action(|ctx: &BuildContext| clean::clobber(ctx).map(|_| ())),
    )?;

    env::declare(graph)?;
    generate::declare(graph)?;
    db::declare(graph)?;
    compile::declare(graph)?;
    testing::declare(graph)?;
    package::declare(graph)?;

    Ok(())
}

/// Whether the requested top-level tasks ask for a quick build.
pub fn is_quick(tasks: &[String]) -> bool {
    tasks.iter().any(|t| t == QUICK_TASK)
}
