use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::invocation::ToolInvocation;
use crate::paths;
use crate::reports::XmlReport;

use super::STYLECOP;

pub const SETTINGS_FILE: &str = "Settings.StyleCop";
pub const REPORT_FILE: &str = "StyleCop.xml";

/// Generated and boilerplate sources nobody styles by hand.
pub const IGNORE_FILE_PATTERNS: &[&str] = &[
    r"(?:Version|Solution|Assembly|FxCop)Info\.cs$",
    r"\.Designer\.cs$",
    r"\.hbm\.cs$",
    r"QueryBuilder\.cs$",
];

/// `stylecopcmd -d <dir> -r -ifp <pattern>... -sc <settings> -of <report>`
pub fn analyze(program: PathBuf, directory: &Path, settings: &Path, report: &Path) -> ToolInvocation {
    let mut inv = ToolInvocation::new(STYLECOP, program)
        .args(["-d".to_string(), paths::display(directory), "-r".to_string()]);
    for pattern in IGNORE_FILE_PATTERNS {
        inv = inv.args(["-ifp", *pattern]);
    }
    inv.args(["-sc".to_string(), paths::display(settings)])
        .args(["-of".to_string(), paths::display(report)])
}

/// Violations are the `Violation` elements of the report. No report means none.
pub fn violations(report: &Path) -> Result<usize> {
    if !report.is_file() {
        return Ok(0);
    }
    Ok(XmlReport::load(report)?.count("Violation"))
}

pub fn status_text(violations: usize) -> String {
    format!("{} StyleCop violation(s)", violations)
}
