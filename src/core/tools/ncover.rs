//! Coverage with NCover, summarized by NCoverExplorer.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::files::FileList;
use crate::invocation::ToolInvocation;
use crate::options::{OptionMap, SwitchStyle};
use crate::paths;
use crate::reports::XmlReport;

use super::{NCOVER, NCOVER_EXPLORER};

pub const MIN_COVERAGE: u32 = 70;
pub const XML_REPORT: &str = "Coverage.xml";
pub const HTML_REPORT: &str = "Coverage.html";
const RAW_REPORT_PREFIX: &str = "Coverage-";

pub struct Coverage<'a> {
    pub program: &'a Path,
    pub program_args: Vec<String>,
    pub report_dir: &'a Path,
    pub assemblies: &'a [String],
}

/// Application assembly names under `test_build_dir`: `<project>*.dll`
/// without test, test-support and executable files.
pub fn application_assemblies(test_build_dir: &Path, project: &str) -> Result<Vec<String>> {
    let project = glob::Pattern::escape(project);
    let files = FileList::new(test_build_dir)
        .include(format!("**/{}*.dll", project))
        .include(format!("**/{}*.exe", project))
        .exclude_matching(r"(Tests\.dll$)|(ForTesting\.dll$)")?
        .exclude_matching(r"\.exe$")?
        .resolve()?;

    let mut names: Vec<String> = Vec::new();
    for file in files {
        let name = paths::file_stem_string(&file);
        if !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(names)
}

/// `ncover <program> <program args> //x <report> //a <a;b> //w <dir>`
pub fn run_coverage(ncover: PathBuf, assembly: &Path, coverage: &Coverage<'_>) -> ToolInvocation {
    let working_dir = assembly
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let report = raw_report(coverage.report_dir, assembly);

    ToolInvocation::new(NCOVER, ncover)
        .arg(paths::display(coverage.program))
        .args(coverage.program_args.iter().cloned())
        .args(["//x".to_string(), paths::display(&report)])
        .args(["//a".to_string(), coverage.assemblies.join(";")])
        .args(["//w".to_string(), paths::display(&working_dir)])
        .current_dir(working_dir)
}

/// Raw coverage file [`run_coverage`] writes for a test assembly.
pub fn raw_report(report_dir: &Path, assembly: &Path) -> PathBuf {
    report_dir.join(format!(
        "{}{}.xml",
        RAW_REPORT_PREFIX,
        paths::file_stem_string(assembly)
    ))
}

/// `ncoverexplorer <raw reports> /p:<project> /x:<xml> /h:<html> /m:<min> /fc`
pub fn explore(explorer: PathBuf, project: &str, report_dir: &Path, raw: &[PathBuf]) -> ToolInvocation {
    let switches = OptionMap::new()
        .with("p", project)
        .with("x", paths::display(&report_dir.join(XML_REPORT)))
        .with("h", paths::display(&report_dir.join(HTML_REPORT)))
        .with("m", MIN_COVERAGE)
        .with("fc", true);

    ToolInvocation::new(NCOVER_EXPLORER, explorer)
        .args(raw.iter().map(|r| paths::display(r)))
        .switches(&switches, SwitchStyle::SLASH)
}

/// Function coverage percentage from the explorer's XML summary.
pub fn function_coverage(report: &XmlReport) -> Result<f64> {
    let value = report.require(
        report.attribute("project", "functionCoverage"),
        "project/@functionCoverage",
    )?;
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| report.invalid(format!("Coverage value '{}' is not a number", value)))
}

pub fn status_text(coverage: f64) -> String {
    format!("Code coverage: {}%", coverage.round())
}
