use std::path::PathBuf;

use crate::context::BuildContext;
use crate::error::Result;
use crate::files::FileList;
use crate::graph::TaskSpec;
use crate::invocation;
use crate::reports::XmlReport;
use crate::teamcity;
use crate::tools::ncover::{self, Coverage};
use crate::tools::{cloc, fxcop, mspec, stylecop};
use crate::tools::{CLOC, FXCOP, MSPEC, NCOVER, NCOVER_EXPLORER, STYLECOP};

use super::BuildGraph;

pub fn declare(graph: &mut BuildGraph) -> Result<()> {
    graph.namespace("tests", |tests| {
        tests.declare(
            TaskSpec::new("run")
                .needs(["compile:tests", "db:rebuild"])
                .describe("Runs unit tests")
                .action(run_specs),
        )?;

        tests.declare(
            TaskSpec::new("cloc")
                .describe("Runs CLOC to create some source code statistics")
                .action(count_lines),
        )?;

        tests.declare(
            TaskSpec::new("ncover")
                .needs(["compile:tests", "db:rebuild"])
                .describe("Runs NCover code coverage")
                .action(measure_coverage),
        )?;

        tests.declare(
            TaskSpec::new("fxcop")
                .needs(["clean", "compile:app"])
                .describe("Runs FxCop to analyze assemblies for compliance with the coding guidelines")
                .action(analyze_assemblies),
        )?;

        tests.declare(
            TaskSpec::new("stylecop")
                .describe("Runs StyleCop to analyze C# source code for compliance with the coding guidelines")
                .action(analyze_sources),
        )?;

        tests.declare(
            TaskSpec::new("quality")
                .needs(["ncover", "cloc", "fxcop", "stylecop"])
                .describe("Run all code quality-related tasks"),
        )
    })
}

fn test_assemblies(ctx: &BuildContext) -> Result<Vec<PathBuf>> {
    FileList::new(ctx.path(&ctx.settings.dir.build).join("Test"))
        .include("**/*.Tests.dll")
        .resolve()
}

fn report_dir(ctx: &BuildContext) -> Result<PathBuf> {
    let dir = ctx.path(&ctx.settings.dir.test_results);
    ctx.ensure_dir(&dir)?;
    Ok(dir)
}

fn run_specs(ctx: &BuildContext) -> Result<()> {
    let assemblies = test_assemblies(ctx)?;
    if assemblies.is_empty() {
        log_status!("tests", "No test assemblies found");
        return Ok(());
    }

    let program = ctx.tool(MSPEC)?;
    let reports = report_dir(ctx)?;
    for assembly in assemblies {
        let invocation = mspec::run(program.clone(), &assembly, &reports, teamcity::is_ci());
        ctx.run(&invocation)?;
    }
    Ok(())
}

fn count_lines(ctx: &BuildContext) -> Result<()> {
    let report = report_dir(ctx)?.join(cloc::REPORT_FILE);
    let invocation = cloc::count(ctx.tool(CLOC)?, &ctx.path(&ctx.settings.dir.source), &report);
    ctx.run(&invocation)?;
    if ctx.is_dry_run() {
        return Ok(());
    }

    let counts = cloc::line_counts(&XmlReport::load(&report)?)?;
    for (key, value) in counts.statistics() {
        ctx.add_statistic(key, value);
    }
    ctx.append_status_text(counts.status_text());
    Ok(())
}

fn measure_coverage(ctx: &BuildContext) -> Result<()> {
    let reports = report_dir(ctx)?;
    let test_build = ctx.path(&ctx.settings.dir.build).join("Test");
    let application = ncover::application_assemblies(&test_build, &ctx.settings.project)?;
    let spec_runner = ctx.tool(MSPEC)?;
    let ncover_program = ctx.tool(NCOVER)?;

    let mut raw_reports = Vec::new();
    for assembly in test_assemblies(ctx)? {
        let coverage = Coverage {
            program: &spec_runner,
            program_args: mspec::arguments(&assembly, None, teamcity::is_ci()),
            report_dir: &reports,
            assemblies: &application,
        };
        ctx.run(&ncover::run_coverage(ncover_program.clone(), &assembly, &coverage))?;
        raw_reports.push(ncover::raw_report(&reports, &assembly));
    }

    let explore = ncover::explore(
        ctx.tool(NCOVER_EXPLORER)?,
        &ctx.settings.project,
        &reports,
        &raw_reports,
    );
    let output = ctx.run_tolerant(&explore)?;

    let summary = reports.join(ncover::XML_REPORT);
    if !ctx.is_dry_run() && summary.is_file() {
        let coverage = ncover::function_coverage(&XmlReport::load(&summary)?)?;
        ctx.add_statistic("NCoverCodeCoverage", coverage.to_string());
        ctx.append_status_text(ncover::status_text(coverage));
    }

    if output.success {
        Ok(())
    } else {
        Err(invocation::failure(&explore, output).with_hint(format!(
            "Function coverage must be at least {}%",
            ncover::MIN_COVERAGE
        )))
    }
}

fn analyze_assemblies(ctx: &BuildContext) -> Result<()> {
    let program = ctx.tool(FXCOP)?;
    let application = ctx.path(&ctx.settings.dir.build).join("Application");
    let assemblies = fxcop::assemblies(&application, &ctx.settings.project)?;
    let project = ctx.path(&ctx.settings.dir.source).join(fxcop::PROJECT_FILE);
    let report = report_dir(ctx)?.join(fxcop::REPORT_FILE);

    ctx.run_tolerant(&fxcop::analyze(program, &project, &report, &assemblies))?;
    if ctx.is_dry_run() {
        return Ok(());
    }

    let violations = fxcop::violations(&report)?;
    ctx.append_status_text(fxcop::status_text(violations));
    ctx.add_statistic("FxCopViolations", violations.to_string());
    Ok(())
}

fn analyze_sources(ctx: &BuildContext) -> Result<()> {
    let program = ctx.tool(STYLECOP)?;
    let settings = ctx.path(&ctx.settings.dir.source).join(stylecop::SETTINGS_FILE);
    let report = report_dir(ctx)?.join(stylecop::REPORT_FILE);

    let invocation = stylecop::analyze(program, &ctx.path(&ctx.settings.dir.app), &settings, &report);
    ctx.run_tolerant(&invocation)?;
    if ctx.is_dry_run() {
        return Ok(());
    }

    let violations = stylecop::violations(&report)?;
    ctx.append_status_text(stylecop::status_text(violations));
    ctx.add_statistic("StyleCopViolations", violations.to_string());
    Ok(())
}
