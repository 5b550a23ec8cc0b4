use std::path::PathBuf;

use crate::context::BuildContext;
use crate::error::Result;
use crate::files::FileList;
use crate::graph::TaskSpec;
use crate::paths;
use crate::tools::{msbuild, MSBUILD};

use super::BuildGraph;

const PREPARE: [&str; 3] = ["clobber", "generate:version", "generate:config"];

pub fn declare(graph: &mut BuildGraph) -> Result<()> {
    graph.namespace("compile", |compile| {
        compile.declare(
            TaskSpec::new("app")
                .needs(PREPARE)
                .describe("Compiles the application")
                .action(|ctx: &BuildContext| {
                    let projects = FileList::new(ctx.path(&ctx.settings.dir.app))
                        .include("**/*.Application.csproj")
                        .include("**/*.Modules.*.csproj")
                        .resolve()?;
                    compile_projects(ctx, projects, true)
                }),
        )?;

        compile.declare(
            TaskSpec::new("tests")
                .needs(PREPARE)
                .describe("Compiles the tests")
                .action(|ctx: &BuildContext| {
                    let projects = FileList::new(ctx.path(&ctx.settings.dir.test))
                        .include("**/*.csproj")
                        .resolve()?;
                    compile_projects(ctx, projects, false)
                }),
        )?;

        compile.declare(
            TaskSpec::new("dbtools")
                .needs(PREPARE)
                .describe("Compiles the database tools")
                .action(|ctx: &BuildContext| {
                    let name = glob::Pattern::escape(&format!(
                        "{}.Tools.Database",
                        ctx.settings.project
                    ));
                    let projects = FileList::new(ctx.path(&ctx.settings.dir.app))
                        .include(format!("{0}/{0}.csproj", name))
                        .resolve()?;
                    compile_projects(ctx, projects, true)
                }),
        )?;

        compile.declare(TaskSpec::new("all").needs(["app", "tests", "dbtools"]))
    })
}

fn compile_projects(ctx: &BuildContext, projects: Vec<PathBuf>, warnings_as_errors: bool) -> Result<()> {
    if projects.is_empty() {
        log_status!("compile", "No projects to compile");
        return Ok(());
    }

    let program = ctx.tool(MSBUILD)?;
    let build_dir = ctx.path(&ctx.settings.dir.build);
    let solution_dir = ctx.path(&ctx.settings.dir.source);

    for project in projects {
        if ctx.options.quick && msbuild::is_up_to_date(&build_dir, &project)? {
            log_status!("compile", "{} is up to date", paths::file_stem_string(&project));
            continue;
        }

        let properties = msbuild::properties(
            &solution_dir,
            &ctx.settings.build.configuration,
            warnings_as_errors,
        );
        ctx.run(&msbuild::compile(program.clone(), &project, properties))?;
    }

    Ok(())
}
