use std::path::PathBuf;

use crate::context::BuildContext;
use crate::error::{Error, Result};
use crate::files::FileList;
use crate::graph::TaskSpec;
use crate::tools::{msdeploy, sevenzip, MSDEPLOY, ZIP};

use super::BuildGraph;

pub fn declare(graph: &mut BuildGraph) -> Result<()> {
    graph.declare(
        TaskSpec::new("package")
            .needs(["compile:app"])
            .describe("Packages the build artifacts")
            .action(package),
    )?;

    graph.declare(
        TaskSpec::new("deploy")
            .needs(["package"])
            .describe("Deploys the build artifacts to the QA system")
            .action(deploy),
    )?;

    graph.declare(
        TaskSpec::new("publish")
            .needs(["package"])
            .describe("Publishes the package to the deployment server")
            .action(publish),
    )
}

fn package_path(ctx: &BuildContext) -> Result<PathBuf> {
    let package = ctx.settings.require("deployment.package")?;
    Ok(ctx.path(&package))
}

fn package(ctx: &BuildContext) -> Result<()> {
    let application = ctx.path(&ctx.settings.dir.build).join("Application");
    let archive = package_path(ctx)?;

    let mut list = FileList::new(&application);
    for include in sevenzip::PACKAGE_INCLUDES {
        list = list.include(*include);
    }
    let files = list.exclude(sevenzip::PACKAGE_EXCLUDE).resolve_relative()?;

    if files.is_empty() && !ctx.is_dry_run() {
        return Err(Error::validation_invalid_argument(
            "package",
            format!("Nothing to package in {}", application.display()),
            None,
            None,
        )
        .with_hint("Run compile:app first"));
    }

    if let Some(parent) = archive.parent() {
        ctx.ensure_dir(parent)?;
    }
    ctx.remove(&archive)?;

    log_status!("package", "Packaging {} file(s) into {}", files.len(), archive.display());
    let invocation = sevenzip::zip(ctx.tool(ZIP)?, &archive, &application, &files);
    ctx.run(&invocation).map(|_| ())
}

fn deploy(ctx: &BuildContext) -> Result<()> {
    let location = ctx.settings.require("deployment.location")?;
    let location = ctx.path(&location);
    ctx.remove(&location)?;

    let invocation = sevenzip::unzip(ctx.tool(ZIP)?, &package_path(ctx)?, &location);
    ctx.run(&invocation).map(|_| ())
}

fn publish(ctx: &BuildContext) -> Result<()> {
    let server = ctx.settings.require("deployment.server")?;
    let tool = ctx.settings.tools.get(MSDEPLOY).map(String::as_str).unwrap_or_default();
    let options = msdeploy::sync_options(tool, &package_path(ctx)?, &server);
    let invocation = msdeploy::sync(options, ctx.root())?;
    ctx.run(&invocation).map(|_| ())
}
