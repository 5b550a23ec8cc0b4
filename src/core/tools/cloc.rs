use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::invocation::ToolInvocation;
use crate::paths;
use crate::reports::XmlReport;

use super::CLOC;

pub const REPORT_FILE: &str = "cloc.xml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineCounts {
    pub cs_code: String,
    pub cs_files: String,
    pub total_code: String,
    pub total_files: String,
}

impl LineCounts {
    /// Statistic keys and values, in reporting order.
    pub fn statistics(&self) -> [(&'static str, &str); 4] {
        [
            ("LOC.CS", self.cs_code.as_str()),
            ("Files.CS", self.cs_files.as_str()),
            ("LOC.Total", self.total_code.as_str()),
            ("Files.Total", self.total_files.as_str()),
        ]
    }

    pub fn status_text(&self) -> String {
        format!("{} LOC in {} C# Files", self.cs_code, self.cs_files)
    }
}

/// `cloc --xml --quiet --report-file=<report> <dir>`
pub fn count(program: PathBuf, search_dir: &Path, report: &Path) -> ToolInvocation {
    ToolInvocation::new(CLOC, program).args([
        "--xml".to_string(),
        "--quiet".to_string(),
        format!("--report-file={}", paths::display(report)),
        paths::display(search_dir),
    ])
}

/// Counts from the XML report. A language cloc did not see counts as zero.
pub fn line_counts(report: &XmlReport) -> Result<LineCounts> {
    let cs = |attr: &str| {
        report
            .attribute_where("language", ("name", "C#"), attr)
            .unwrap_or_else(|| "0".to_string())
    };

    Ok(LineCounts {
        cs_code: cs("code"),
        cs_files: cs("files_count"),
        total_code: report.require(report.attribute("total", "code"), "total/@code")?,
        total_files: report.require(report.attribute("total", "sum_files"), "total/@sum_files")?,
    })
}
