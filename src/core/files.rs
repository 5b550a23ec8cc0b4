//! File lists with glob includes and excludes, and timestamp comparison.

use glob_match::glob_match;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{Error, Result};
use crate::paths;

enum Exclude {
    Glob(String),
    Pattern(Regex),
}

/// Glob patterns rooted at a base directory.
///
/// Excludes are matched against the path relative to the base, with `/`
/// separators. A glob exclude also matches any path below a matching directory,
/// so `obj` removes `obj/Debug/x.dll` too.
pub struct FileList {
    base: PathBuf,
    includes: Vec<String>,
    excludes: Vec<Exclude>,
}

impl FileList {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            includes: Vec::new(),
            excludes: Vec::new(),
        }
    }

    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.includes.push(pattern.into());
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(Exclude::Glob(pattern.into()));
        self
    }

    pub fn exclude_matching(mut self, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            Error::validation_invalid_argument(
                "exclude",
                format!("Invalid pattern '{}': {}", pattern, e),
                Some(pattern.to_string()),
                None,
            )
        })?;
        self.excludes.push(Exclude::Pattern(regex));
        Ok(self)
    }

    /// Matching paths, in include order, each path once.
    pub fn resolve(&self) -> Result<Vec<PathBuf>> {
        let base = glob::Pattern::escape(&paths::display(&self.base));
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for include in &self.includes {
            let pattern = format!("{}/{}", base.trim_end_matches('/'), include);
            let entries = glob::glob(&pattern).map_err(|e| {
                Error::validation_invalid_argument(
                    "include",
                    format!("Invalid glob pattern '{}': {}", include, e),
                    Some(include.clone()),
                    None,
                )
            })?;

            let mut matched: Vec<PathBuf> = entries.filter_map(|entry| entry.ok()).collect();
            matched.sort();

            for path in matched {
                if !self.is_excluded(&path) && seen.insert(path.clone()) {
                    out.push(path);
                }
            }
        }

        Ok(out)
    }

    /// Paths relative to the base directory.
    pub fn resolve_relative(&self) -> Result<Vec<String>> {
        Ok(self
            .resolve()?
            .iter()
            .map(|p| self.relative(p))
            .collect())
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.base)
            .map(paths::display)
            .unwrap_or_else(|_| paths::display(path))
            .replace('\\', "/")
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let relative = self.relative(path);
        self.excludes.iter().any(|exclude| match exclude {
            Exclude::Glob(pattern) => {
                glob_match(pattern, &relative)
                    || glob_match(&format!("{}/**", pattern), &relative)
                    || glob_match(&format!("**/{}", pattern), &relative)
                    || glob_match(&format!("**/{}/**", pattern), &relative)
            }
            Exclude::Pattern(regex) => regex.is_match(&relative),
        })
    }
}

/// Every file under `dir`, recursively.
pub fn files_under(dir: &Path) -> Result<Vec<PathBuf>> {
    FileList::new(dir).include("**/*").resolve().map(|paths| {
        paths.into_iter().filter(|p| p.is_file()).collect()
    })
}

/// True when every artifact is newer than every source. No artifacts means stale.
pub fn is_up_to_date(artifacts: &[PathBuf], sources: &[PathBuf]) -> Result<bool> {
    if artifacts.is_empty() {
        return Ok(false);
    }

    let mut newest_source = None;
    for source in sources {
        let modified = modified(source)?;
        if newest_source.map_or(true, |newest| modified > newest) {
            newest_source = Some(modified);
        }
    }

    let Some(newest_source) = newest_source else {
        return Ok(true);
    };

    for artifact in artifacts {
        if modified(artifact)? <= newest_source {
            return Ok(false);
        }
    }

    Ok(true)
}

fn modified(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| Error::internal_io(e.to_string(), Some(format!("stat {}", path.display()))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, relative).unwrap();
        path
    }

    fn age(path: &Path, seconds_ago: u64) {
        let time = SystemTime::now() - Duration::from_secs(seconds_ago);
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    #[test]
    fn resolves_includes_once_in_order() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Application/Shop.dll");
        touch(dir.path(), "Application/Shop.pdb");
        touch(dir.path(), "Application/plugins/Shop.Plugin.dll");

        let list = FileList::new(dir.path())
            .include("**/*.dll")
            .include("**/*.pdb")
            .include("Application/Shop.dll");

        assert_eq!(
            list.resolve_relative().unwrap(),
            vec![
                "Application/Shop.dll",
                "Application/plugins/Shop.Plugin.dll",
                "Application/Shop.pdb",
            ]
        );
    }

    #[test]
    fn glob_exclude_removes_directory_contents() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Shop.dll");
        touch(dir.path(), "obj/Debug/Shop.dll");

        let list = FileList::new(dir.path()).include("**/*.dll").exclude("obj");
        assert_eq!(list.resolve_relative().unwrap(), vec!["Shop.dll"]);
    }

    #[test]
    fn regex_exclude_filters_names() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Test/Shop.Core.dll");
        touch(dir.path(), "Test/Shop.Core.Tests.dll");
        touch(dir.path(), "Test/Shop.ForTesting.dll");

        let list = FileList::new(dir.path())
            .include("Test/**/Shop*.dll")
            .exclude_matching(r"(Tests\.dll$)|(ForTesting\.dll$)")
            .unwrap();

        assert_eq!(list.resolve_relative().unwrap(), vec!["Test/Shop.Core.dll"]);
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let result = FileList::new("/tmp").exclude_matching("(unclosed");
        assert!(result.is_err());
    }

    #[test]
    fn up_to_date_requires_newer_artifacts() {
        let dir = TempDir::new().unwrap();
        let source = touch(dir.path(), "src/Shop/Order.cs");
        let artifact = touch(dir.path(), "build/Shop.dll");

        age(&source, 600);
        age(&artifact, 60);
        assert!(is_up_to_date(&[artifact.clone()], &[source.clone()]).unwrap());

        age(&source, 10);
        assert!(!is_up_to_date(&[artifact], &[source]).unwrap());
    }

    #[test]
    fn no_artifacts_is_never_up_to_date() {
        let dir = TempDir::new().unwrap();
        let source = touch(dir.path(), "src/Shop/Order.cs");
        assert!(!is_up_to_date(&[], &[source]).unwrap());
    }

    #[test]
    fn files_under_skips_directories() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Shop/Order.cs");
        touch(dir.path(), "Shop/Properties/AssemblyInfo.cs");

        let files = files_under(&dir.path().join("Shop")).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.is_file()));
    }
}
