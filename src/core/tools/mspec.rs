use std::path::{Path, PathBuf};

use crate::invocation::ToolInvocation;
use crate::paths;

use super::MSPEC;

/// Arguments for one test assembly. Shared with the coverage run, which
/// starts the spec runner itself.
pub fn arguments(assembly: &Path, report_dir: Option<&Path>, teamcity: bool) -> Vec<String> {
    let mut args = Vec::new();
    if teamcity {
        args.push("--teamcity".to_string());
    }
    if let Some(report_dir) = report_dir {
        let report = report_dir.join(format!("{}.html", paths::file_stem_string(assembly)));
        args.push("--html".to_string());
        args.push(paths::display(&report));
    }
    args.push(paths::display(assembly));
    args
}

/// `mspec [--teamcity] --html <report_dir>/<Assembly>.html <assembly>`
pub fn run(program: PathBuf, assembly: &Path, report_dir: &Path, teamcity: bool) -> ToolInvocation {
    ToolInvocation::new(MSPEC, program).args(arguments(assembly, Some(report_dir), teamcity))
}
