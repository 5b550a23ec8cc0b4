use std::path::{Path, PathBuf};

use crate::invocation::ToolInvocation;
use crate::paths;

use super::ZIP;

/// Globs archived from the application output.
pub const PACKAGE_INCLUDES: &[&str] = &["**/*.dll", "**/*.pdb", "**/*.config", "**/*.boo"];
pub const PACKAGE_EXCLUDE: &str = "obj";

/// `7za a -tzip <archive> <files>...`, run inside `working_dir` so the
/// archive keeps relative paths.
pub fn zip(program: PathBuf, archive: &Path, working_dir: &Path, files: &[String]) -> ToolInvocation {
    ToolInvocation::new(ZIP, program)
        .args(["a".to_string(), "-tzip".to_string(), paths::display(archive)])
        .args(files.iter().cloned())
        .current_dir(working_dir)
}

/// `7za x <archive> -o<destination> -y`
pub fn unzip(program: PathBuf, archive: &Path, destination: &Path) -> ToolInvocation {
    ToolInvocation::new(ZIP, program).args([
        "x".to_string(),
        paths::display(archive),
        format!("-o{}", paths::display(destination)),
        "-y".to_string(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_keeps_relative_file_names() {
        let inv = zip(
            PathBuf::from("7za"),
            Path::new("/work/deploy/Shop-1.0.0.0.zip"),
            Path::new("/work/build/Application"),
            &["Shop.Web.dll".to_string(), "bin/Shop.Core.pdb".to_string()],
        );

        assert_eq!(
            inv.args,
            vec!["a", "-tzip", "/work/deploy/Shop-1.0.0.0.zip", "Shop.Web.dll", "bin/Shop.Core.pdb"]
        );
        assert_eq!(inv.working_dir, Some(PathBuf::from("/work/build/Application")));
    }

    #[test]
    fn unzip_overwrites_into_destination() {
        let inv = unzip(PathBuf::from("7za"), Path::new("/d/Shop.zip"), Path::new("/srv/qa"));
        assert_eq!(inv.command_line(), "7za x /d/Shop.zip -o/srv/qa -y");
    }
}
