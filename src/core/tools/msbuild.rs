use std::path::{Path, PathBuf};

use crate::files::{self, FileList};
use crate::error::Result;
use crate::invocation::ToolInvocation;
use crate::options::{OptionMap, SwitchStyle};
use crate::paths;

use super::MSBUILD;

/// `msbuild <project> /nologo /verbosity:minimal /property:K=V;...`
pub fn compile(program: PathBuf, project: &Path, properties: OptionMap) -> ToolInvocation {
    let switches = OptionMap::new()
        .with("nologo", true)
        .with("verbosity", "minimal")
        .with("property", properties);

    ToolInvocation::new(MSBUILD, program)
        .arg(paths::display(project))
        .switches(&switches, SwitchStyle::SLASH)
}

/// Build properties shared by every compile.
pub fn properties(solution_dir: &Path, configuration: &str, warnings_as_errors: bool) -> OptionMap {
    let mut props = OptionMap::new()
        .with("SolutionDir", paths::with_trailing_separator(solution_dir))
        .with("Configuration", configuration);
    if warnings_as_errors {
        props.insert("TreatWarningsAsErrors", "true");
    }
    props
}

/// Assemblies a project produced: `<build>/**/<ProjectDir>.dll` or `.exe`.
pub fn artifacts_of(build_dir: &Path, project: &Path) -> Result<Vec<PathBuf>> {
    let name = glob::Pattern::escape(&paths::parent_name(project));
    FileList::new(build_dir)
        .include(format!("**/{}.dll", name))
        .include(format!("**/{}.exe", name))
        .resolve()
}

/// Whether every artifact of `project` is newer than everything in its directory.
pub fn is_up_to_date(build_dir: &Path, project: &Path) -> Result<bool> {
    let artifacts = artifacts_of(build_dir, project)?;
    let Some(project_dir) = project.parent() else {
        return Ok(false);
    };
    let sources = files::files_under(project_dir)?;
    files::is_up_to_date(&artifacts, &sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn compile_renders_properties_as_one_switch() {
        let props = properties(Path::new("/work/source"), "Release", true);
        let inv = compile(
            PathBuf::from("msbuild"),
            Path::new("/work/source/app/Shop.Web/Shop.Web.csproj"),
            props,
        );

        assert_eq!(
            inv.args,
            vec![
                "/work/source/app/Shop.Web/Shop.Web.csproj",
                "/nologo",
                "/verbosity:minimal",
                "/property:SolutionDir=/work/source/;Configuration=Release;TreatWarningsAsErrors=true",
            ]
        );
    }

    #[test]
    fn tests_compile_without_warnings_as_errors() {
        let props = properties(Path::new("/work/source/"), "Debug", false);
        assert!(props.get("TreatWarningsAsErrors").is_none());
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn up_to_date_compares_artifacts_with_project_files() {
        let dir = TempDir::new().unwrap();
        let project_dir = dir.path().join("source/app/Shop.Core");
        let build = dir.path().join("build");
        fs::create_dir_all(&project_dir).unwrap();
        fs::create_dir_all(build.join("Application")).unwrap();

        let project = project_dir.join("Shop.Core.csproj");
        fs::write(&project, "<Project/>").unwrap();
        fs::write(project_dir.join("Order.cs"), "class Order {}").unwrap();
        assert!(!is_up_to_date(&build, &project).unwrap());

        let old = SystemTime::now() - Duration::from_secs(600);
        for source in ["Shop.Core.csproj", "Order.cs"] {
            File::options()
                .write(true)
                .open(project_dir.join(source))
                .unwrap()
                .set_modified(old)
                .unwrap();
        }
        fs::write(build.join("Application/Shop.Core.dll"), "MZ").unwrap();
        assert!(is_up_to_date(&build, &project).unwrap());
    }
}
