use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::files::FileList;
use crate::invocation::ToolInvocation;
use crate::options::{OptionMap, SwitchStyle};
use crate::paths;
use crate::reports::XmlReport;

use super::FXCOP;

pub const PROJECT_FILE: &str = "Settings.FxCop";
pub const REPORT_FILE: &str = "FxCop.xml";

/// Application assemblies to analyze, host-process files excluded.
pub fn assemblies(application_dir: &Path, project: &str) -> Result<Vec<PathBuf>> {
    FileList::new(application_dir)
        .include(format!("**/{}*.dll", glob::Pattern::escape(project)))
        .exclude("**/*.vshost*")
        .resolve()
}

/// `fxcopcmd /project:<p> /out:<report> /console /summary /file:<a>...`
pub fn analyze(program: PathBuf, project: &Path, report: &Path, assemblies: &[PathBuf]) -> ToolInvocation {
    let switches = OptionMap::new()
        .with("project", paths::display(project))
        .with("out", paths::display(report))
        .with("console", true)
        .with("summary", true);

    ToolInvocation::new(FXCOP, program)
        .switches(&switches, SwitchStyle::SLASH)
        .args(assemblies.iter().map(|a| format!("/file:{}", paths::display(a))))
}

/// Violations are the `Issue` elements of the report. No report means none.
pub fn violations(report: &Path) -> Result<usize> {
    if !report.is_file() {
        return Ok(0);
    }
    Ok(XmlReport::load(report)?.count("Issue"))
}

pub fn status_text(violations: usize) -> String {
    format!("{} FxCop violation(s)", violations)
}
