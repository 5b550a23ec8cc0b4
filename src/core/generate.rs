//! Generated sources: assembly version info and configuration files rendered
//! from `.template` files.

use std::path::PathBuf;

use crate::context::BuildContext;
use crate::error::Result;
use crate::files::FileList;
use crate::paths;
use crate::utils::{io, template};

pub const VERSION_INFO_FILE: &str = "VersionInfo.cs";
pub const TEMPLATE_EXTENSION: &str = "template";

const VERSION_INFO_TEMPLATE: &str = "\
using System.Reflection;
using System.Runtime.InteropServices;

[assembly: AssemblyFileVersion(\"{{version}}\")]
[assembly: AssemblyVersion(\"{{version}}\")]
";

pub fn version_info(version: &str) -> String {
    template::render(VERSION_INFO_TEMPLATE, &[("version", version)])
}

/// Write `VersionInfo.cs` for the configured build number. Without one,
/// the checked-in file is left alone.
pub fn write_version_info(ctx: &BuildContext) -> Result<Option<PathBuf>> {
    let Some(number) = ctx.settings.build.number.as_deref() else {
        log_status!("generate", "No build number, keeping existing version info");
        return Ok(None);
    };

    let path = ctx.path(&ctx.settings.dir.source).join(VERSION_INFO_FILE);
    ctx.write(&path, &version_info(number))?;
    Ok(Some(path))
}

/// Render every `.template` under the source directory next to itself.
pub fn render_templates(ctx: &BuildContext) -> Result<Vec<PathBuf>> {
    let templates = FileList::new(ctx.path(&ctx.settings.dir.source))
        .include(format!("**/*.{}", TEMPLATE_EXTENSION))
        .resolve()?;

    let mut written = Vec::with_capacity(templates.len());
    for source in templates {
        let content = io::read_file(&source, "read template")?;
        let rendered = template::render_with(&content, &paths::display(&source), |key| {
            ctx.settings.lookup_text(key)
        })?;

        let target = paths::strip_extension(&source);
        ctx.write(&target, &rendered)?;
        written.push(target);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RunOptions;
    use crate::invocation::DryRunRunner;
    use crate::settings::Settings;
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn context(root: &Path, build_number: Option<&str>) -> BuildContext {
        let raw = json!({
            "project": "Shop",
            "database": { "server": "db01", "name": "Shop", "sspi": true }
        });
        let settings = Settings::from_value(
            raw,
            "development",
            root.to_path_buf(),
            build_number.map(str::to_string),
        )
        .unwrap();
        BuildContext::new(settings, RunOptions::default(), Rc::new(DryRunRunner::new()))
    }

    #[test]
    fn version_info_sets_both_versions() {
        let text = version_info("2.1.0.77");
        assert!(text.contains("[assembly: AssemblyFileVersion(\"2.1.0.77\")]"));
        assert!(text.contains("[assembly: AssemblyVersion(\"2.1.0.77\")]"));
    }

    #[test]
    fn version_info_needs_a_build_number() {
        let dir = TempDir::new().unwrap();
        assert_eq!(write_version_info(&context(dir.path(), None)).unwrap(), None);
        assert!(!dir.path().join("source/VersionInfo.cs").exists());

        let written = write_version_info(&context(dir.path(), Some("3.0.0.1"))).unwrap();
        assert_eq!(written, Some(dir.path().join("source/VersionInfo.cs")));
        let content = fs::read_to_string(dir.path().join("source/VersionInfo.cs")).unwrap();
        assert!(content.contains("3.0.0.1"));
    }

    #[test]
    fn templates_render_next_to_source() {
        let dir = TempDir::new().unwrap();
        let web = dir.path().join("source/app/Shop.Web");
        fs::create_dir_all(&web).unwrap();
        fs::write(
            web.join("Web.config.template"),
            "<db server=\"{{database.server}}\" cs=\"{{ database.connectionstring }}\"/>",
        )
        .unwrap();

        let written = render_templates(&context(dir.path(), None)).unwrap();
        assert_eq!(written, vec![web.join("Web.config")]);

        let content = fs::read_to_string(web.join("Web.config")).unwrap();
        assert!(content.starts_with("<db server=\"db01\" cs=\"Data Source=db01;"));
    }

    #[test]
    fn template_with_unknown_key_fails() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("App.config.template"), "{{smtp.host}}").unwrap();

        let err = render_templates(&context(dir.path(), None)).unwrap_err();
        assert_eq!(err.code.as_str(), "config.missing_key");
        assert_eq!(err.details["key"], "smtp.host");
        assert!(!source.join("App.config").exists());
    }
}
