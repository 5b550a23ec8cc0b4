use std::env;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Resolve `path` against `base` unless it is already absolute. `~` is expanded.
pub fn absolute(path: &str, base: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(path).to_string();
    let candidate = PathBuf::from(expanded);
    let joined = if candidate.is_absolute() {
        candidate
    } else {
        base.join(candidate)
    };
    normalize(&joined)
}

/// Resolve a tool location. Bare command names (no separator) stay as they are
/// so the OS looks them up on `PATH`.
pub fn resolve_tool(tool: &str, base: &Path) -> PathBuf {
    let looks_like_path = tool.starts_with('~') || tool.contains('/') || tool.contains('\\');
    if looks_like_path {
        absolute(tool, base)
    } else {
        PathBuf::from(tool)
    }
}

pub fn current_dir() -> Result<PathBuf> {
    env::current_dir()
        .map_err(|e| Error::internal_io(e.to_string(), Some("resolve working directory".to_string())))
}

/// Lexically drop `.` and resolve `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Strip the last extension: `Web.config.template` becomes `Web.config`.
pub fn strip_extension(path: &Path) -> PathBuf {
    match path.file_stem() {
        Some(stem) => path.with_file_name(stem),
        None => path.to_path_buf(),
    }
}

/// File name without directory and without extension.
pub fn file_stem_string(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Name of the directory a file lives in: `app/Shop.Web/Shop.Web.csproj` gives `Shop.Web`.
pub fn parent_name(path: &Path) -> String {
    path.parent()
        .and_then(|p| p.file_name())
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub fn display(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Directory path with exactly one trailing separator.
pub fn with_trailing_separator(path: &Path) -> String {
    let mut s = display(path);
    while s.ends_with('/') || s.ends_with('\\') {
        s.pop();
    }
    s.push('/');
    s
}
