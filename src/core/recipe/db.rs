use std::path::Path;

use crate::context::BuildContext;
use crate::error::Result;
use crate::graph::TaskSpec;
use crate::paths;
use crate::tools::dbtool::{self, Export};
use crate::tools::tarantino::{self, Action};
use crate::tools::{sqlpubwiz, SQLPUBWIZ, TARANTINO};

use super::BuildGraph;

pub fn declare(graph: &mut BuildGraph) -> Result<()> {
    graph.namespace("db", |db| {
        for (name, action, description) in [
            ("create", Action::Create, "Creates the database"),
            ("update", Action::Update, "Updates the database"),
            ("drop", Action::Drop, "Drops the database"),
            ("rebuild", Action::Rebuild, "Rebuilds the database"),
        ] {
            db.declare(
                TaskSpec::new(name)
                    .describe(description)
                    .action(move |ctx: &BuildContext| migrate(ctx, action)),
            )?;
        }

        db.namespace("export", |export| {
            export.declare(
                TaskSpec::new("create")
                    .needs(["compile:dbtools"])
                    .describe("Exports the create scripts")
                    .action(|ctx: &BuildContext| export_schema(ctx, Export::Create)),
            )?;

            export.declare(
                TaskSpec::new("update")
                    .needs(["compile:dbtools"])
                    .describe("Exports the update script (forward migration)")
                    .action(|ctx: &BuildContext| export_schema(ctx, Export::Update)),
            )?;

            export.declare(
                TaskSpec::new("sample_data")
                    .describe("Exports the data in the current database")
                    .action(export_sample_data),
            )
        })?;

        db.namespace("import", |import| {
            import.declare(
                TaskSpec::new("sample_data")
                    .needs(["db:rebuild"])
                    .describe("Imports sample data")
                    .action(import_sample_data),
            )
        })
    })
}

fn migrate(ctx: &BuildContext, action: Action) -> Result<()> {
    let scripts = ctx.settings.require("database.scripts")?;
    let scripts = paths::display(&ctx.path(&scripts));
    run_migrator(ctx, action, &scripts)
}

fn run_migrator(ctx: &BuildContext, action: Action, scripts: &str) -> Result<()> {
    let program = ctx.tool(TARANTINO)?;
    let invocation = tarantino::run(program, action, &ctx.settings.database, scripts)?;
    ctx.run(&invocation).map(|_| ())
}

fn export_schema(ctx: &BuildContext, export: Export) -> Result<()> {
    let deploy_dir = ctx.path(&ctx.settings.dir.deploy);
    let output = deploy_dir.join(export.script_name());
    ctx.ensure_dir(&deploy_dir)?;

    log_status!("db", "Exporting {} to {}", export.operation(), output.display());
    let invocation = dbtool::export(
        &ctx.settings.project,
        &ctx.path(&ctx.settings.dir.build),
        export,
        &output,
    );
    ctx.run(&invocation).map(|_| ())
}

fn sample_data_file(ctx: &BuildContext) -> Result<String> {
    let dir = ctx.settings.require("database.sample_data")?;
    Ok(paths::display(&ctx.path(&dir).join(sqlpubwiz::SAMPLE_DATA_FILE)))
}

fn export_sample_data(ctx: &BuildContext) -> Result<()> {
    let output = sample_data_file(ctx)?;
    let connection = ctx.settings.require("database.connectionstring")?;
    let invocation = sqlpubwiz::export_data(ctx.tool(SQLPUBWIZ)?, &connection, Path::new(&output));
    ctx.run(&invocation).map(|_| ())
}

fn import_sample_data(ctx: &BuildContext) -> Result<()> {
    let script = sample_data_file(ctx)?;
    run_migrator(ctx, Action::ExecuteScript, &script)
}
