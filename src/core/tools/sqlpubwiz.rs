use std::path::{Path, PathBuf};

use crate::invocation::ToolInvocation;
use crate::paths;

use super::SQLPUBWIZ;

pub const SAMPLE_DATA_FILE: &str = "Sample data.sql";

/// `sqlpubwiz script -C <connection> <output> -dataonly`
pub fn export_data(program: PathBuf, connection_string: &str, output: &Path) -> ToolInvocation {
    ToolInvocation::new(SQLPUBWIZ, program)
        .args(["script", "-C"])
        .secret_arg(connection_string)
        .args([paths::display(output), "-dataonly".to_string()])
}
