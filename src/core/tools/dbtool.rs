//! The project's own database tool, built by `compile:dbtools`.

use std::path::Path;

use crate::invocation::ToolInvocation;
use crate::options::{OptionMap, SwitchStyle};
use crate::paths;

pub const OUTPUT_DIR: &str = "DbTool";
pub const CREATE_SCRIPT: &str = "0001_Create schema.sql";
pub const UPDATE_SCRIPT: &str = "Update.sql";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Export {
    Create,
    Update,
}

impl Export {
    pub fn operation(&self) -> &'static str {
        match self {
            Export::Create => "ExportCreate",
            Export::Update => "ExportUpdate",
        }
    }

    pub fn script_name(&self) -> &'static str {
        match self {
            Export::Create => CREATE_SCRIPT,
            Export::Update => UPDATE_SCRIPT,
        }
    }
}

pub fn executable_name(project: &str) -> String {
    format!("{}.Tools.Database.exe", project)
}

/// `<project>.Tools.Database.exe /Operation:<op> /OutputFile:<file>`, run
/// inside `<build>/DbTool`.
pub fn export(project: &str, build_dir: &Path, export: Export, output: &Path) -> ToolInvocation {
    let tool_dir = build_dir.join(OUTPUT_DIR);
    let switches = OptionMap::new()
        .with("Operation", export.operation())
        .with("OutputFile", paths::display(output));

    ToolInvocation::new("dbtool", tool_dir.join(executable_name(project)))
        .switches(&switches, SwitchStyle::SLASH)
        .current_dir(tool_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn export_runs_inside_tool_directory() {
        let inv = export(
            "Shop",
            Path::new("/work/build"),
            Export::Create,
            Path::new("/work/deploy/0001_Create schema.sql"),
        );

        assert_eq!(inv.program, PathBuf::from("/work/build/DbTool/Shop.Tools.Database.exe"));
        assert_eq!(inv.working_dir, Some(PathBuf::from("/work/build/DbTool")));
        assert_eq!(
            inv.args,
            vec!["/Operation:ExportCreate", "/OutputFile:/work/deploy/0001_Create schema.sql"]
        );
    }
}
