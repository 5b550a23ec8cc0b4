//! Build settings loaded from `properties.yml`.
//!
//! The file holds one section per environment:
//!
//! ```yaml
//! default:
//!   project: Shop
//!   build: { configuration: Release }
//! development:
//!   default_to: default
//!   local_properties: local.yml
//!   database: { server: ".\\SQLEXPRESS", name: Shop_Dev, sspi: true }
//! ```
//!
//! `default_to` names a section to inherit from (deep merge, child wins).
//! `local_properties` names a file merged over the result when it exists.
//! Settings are resolved once, before any task runs, and never mutated.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths;
use crate::utils::io;

pub const DEFAULT_PROPERTIES_FILE: &str = "properties.yml";
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const BUILD_NUMBER_VAR: &str = "BUILD_NUMBER";
pub const FALLBACK_BUILD_NUMBER: &str = "1.0.0.0";

const INHERIT_KEY: &str = "default_to";
const OVERRIDE_KEY: &str = "local_properties";
const MASK: &str = "********";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub project: String,
    pub build: BuildSettings,
    pub dir: DirSettings,
    pub database: DatabaseSettings,
    pub tools: BTreeMap<String, String>,
    pub deployment: DeploymentSettings,

    #[serde(skip)]
    pub environment: String,
    #[serde(skip)]
    pub root: PathBuf,
    #[serde(skip)]
    raw: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    pub number: Option<String>,
    pub configuration: String,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            number: None,
            configuration: "Debug".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirSettings {
    pub source: String,
    pub app: String,
    pub test: String,
    pub build: String,
    pub deploy: String,
    pub test_results: String,
}

impl Default for DirSettings {
    fn default() -> Self {
        Self {
            source: "source".to_string(),
            app: "source/app".to_string(),
            test: "source/test".to_string(),
            build: "build".to_string(),
            deploy: "deploy".to_string(),
            test_results: "build/test-results".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DatabaseSettings {
    pub server: Option<String>,
    pub name: Option<String>,
    pub sspi: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub scripts: Option<String>,
    pub sample_data: Option<String>,
    pub connectionstring: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DeploymentSettings {
    pub package: Option<String>,
    pub location: Option<String>,
    pub server: Option<String>,
}

impl Settings {
    /// Load `environment` from the properties file at `path`.
    ///
    /// `BUILD_NUMBER` from the process environment overrides `build.number`.
    pub fn load(path: &Path, environment: &str) -> Result<Self> {
        let build_number = env::var(BUILD_NUMBER_VAR).ok().filter(|v| !v.trim().is_empty());
        Self::load_with(path, environment, build_number)
    }

    pub fn load_with(path: &Path, environment: &str, build_number: Option<String>) -> Result<Self> {
        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let root = if root.is_absolute() {
            root
        } else {
            paths::normalize(&paths::current_dir()?.join(root))
        };

        let document = read_yaml(path)?;
        let mut section = resolve_section(&document, environment, &mut Vec::new())?;

        if let Some(local) = section.get(OVERRIDE_KEY).and_then(Value::as_str) {
            let local_path = paths::absolute(local, &root);
            if local_path.is_file() {
                log_status!("settings", "Applying local overrides from {}", local_path.display());
                let overrides = read_yaml(&local_path)?;
                merge(&mut section, overrides);
            }
        }

        strip_directives(&mut section);
        Self::from_value(section, environment, root, build_number)
    }

    /// Build settings from an already merged document.
    pub fn from_value(
        mut raw: Value,
        environment: &str,
        root: PathBuf,
        build_number: Option<String>,
    ) -> Result<Self> {
        if !raw.is_object() {
            return Err(Error::config_invalid_value(
                environment,
                None,
                format!("Environment '{}' must be a mapping", environment),
            ));
        }

        if let Some(number) = build_number {
            set_path(&mut raw, &["build", "number"], Value::String(number));
        }

        let mut settings: Settings = serde_json::from_value(raw.clone()).map_err(|e| {
            Error::config_invalid_value(environment, None, e.to_string())
        })?;

        if settings.database.connectionstring.is_none() {
            let derived = connection_string(&settings.database);
            set_path(&mut raw, &["database", "connectionstring"], Value::String(derived.clone()));
            settings.database.connectionstring = Some(derived);
        }

        if settings.deployment.package.is_none() {
            let file = format!("{}-{}.zip", settings.project, settings.build_number());
            let package = paths::display(&Path::new(&settings.dir.deploy).join(file));
            set_path(&mut raw, &["deployment", "package"], Value::String(package.clone()));
            settings.deployment.package = Some(package);
        }

        settings.environment = environment.to_string();
        settings.root = root;
        settings.raw = raw;
        Ok(settings)
    }

    pub fn build_number(&self) -> &str {
        self.build.number.as_deref().unwrap_or(FALLBACK_BUILD_NUMBER)
    }

    /// Resolve a settings directory (or any relative path) against the project root.
    pub fn path(&self, relative: &str) -> PathBuf {
        paths::absolute(relative, &self.root)
    }

    /// Path of a configured tool, required.
    pub fn tool(&self, name: &str) -> Result<PathBuf> {
        self.tools
            .get(name)
            .filter(|t| !t.trim().is_empty())
            .map(|t| paths::resolve_tool(t, &self.root))
            .ok_or_else(|| {
                Error::config_missing_key(format!("tools.{}", name), None)
                    .with_hint(format!("Set tools.{} in properties.yml", name))
            })
    }

    /// Look up a dotted key path, e.g. `database.server`.
    pub fn lookup(&self, key_path: &str) -> Option<&Value> {
        key_path
            .split('.')
            .try_fold(&self.raw, |value, key| value.get(key))
    }

    /// Scalar at a key path rendered as text. Mappings and sequences are not text.
    pub fn lookup_text(&self, key_path: &str) -> Option<String> {
        match self.lookup(key_path)? {
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Required text value at a key path.
    pub fn require(&self, key_path: &str) -> Result<String> {
        self.lookup_text(key_path)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_missing_key(key_path, None))
    }

    /// The merged document with secrets masked, for display.
    pub fn redacted(&self) -> Value {
        let mut raw = self.raw.clone();
        redact(&mut raw);
        raw
    }
}

/// Environment selected by the requested tasks: the last `env:<name>` wins.
pub fn environment_from_tasks(tasks: &[String]) -> Option<String> {
    tasks
        .iter()
        .rev()
        .find_map(|t| t.strip_prefix("env:"))
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}

fn read_yaml(path: &Path) -> Result<Value> {
    let raw = io::read_file(path, "read properties")?;
    let yaml: serde_yml::Value = serde_yml::from_str(&raw)
        .map_err(|e| Error::config_invalid_yaml(paths::display(path), e.to_string()))?;

    match yaml {
        serde_yml::Value::Null => Ok(Value::Object(Map::new())),
        yaml => serde_json::to_value(yaml)
            .map_err(|e| Error::config_invalid_yaml(paths::display(path), e.to_string())),
    }
}

fn resolve_section(document: &Value, name: &str, chain: &mut Vec<String>) -> Result<Value> {
    if chain.iter().any(|c| c == name) {
        chain.push(name.to_string());
        return Err(Error::config_invalid_value(
            INHERIT_KEY,
            Some(name.to_string()),
            format!("Inheritance cycle: {}", chain.join(" -> ")),
        ));
    }

    let section = document.get(name).ok_or_else(|| {
        let available: Vec<String> = document
            .as_object()
            .map(|o| o.keys().cloned().collect())
            .unwrap_or_default();
        Error::config_missing_key(name, Some(DEFAULT_PROPERTIES_FILE.to_string()))
            .with_hint(format!("Available environments: {}", available.join(", ")))
    })?;

    let mut section = match section {
        Value::Null => Value::Object(Map::new()),
        Value::Object(_) => section.clone(),
        _ => {
            return Err(Error::config_invalid_value(
                name,
                None,
                format!("Section '{}' must be a mapping", name),
            ))
        }
    };

    let Some(parent) = section
        .get(INHERIT_KEY)
        .and_then(Value::as_str)
        .map(str::to_string)
    else {
        return Ok(section);
    };

    chain.push(name.to_string());
    let mut base = resolve_section(document, &parent, chain)?;
    chain.pop();

    if let Value::Object(map) = &mut section {
        map.remove(INHERIT_KEY);
    }
    merge(&mut base, section);
    Ok(base)
}

/// Deep merge: mappings merge key by key, everything else is replaced.
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn strip_directives(section: &mut Value) {
    if let Value::Object(map) = section {
        map.remove(INHERIT_KEY);
        map.remove(OVERRIDE_KEY);
    }
}

fn set_path(root: &mut Value, keys: &[&str], value: Value) {
    let Some((last, parents)) = keys.split_last() else {
        *root = value;
        return;
    };

    let mut current = root;
    for key in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        current = map
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        map.insert(last.to_string(), value);
    }
}

fn connection_string(db: &DatabaseSettings) -> String {
    let sspi = if db.sspi { "Integrated Security=true; " } else { "" };
    format!(
        "Data Source={}; Initial Catalog={}; {} Persist Security Info=False;",
        db.server.as_deref().unwrap_or_default(),
        db.name.as_deref().unwrap_or_default(),
        sspi
    )
}

/// Keys whose values may carry credentials.
const SECRET_KEYS: &[&str] = &["password", "connectionstring"];

fn is_secret(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SECRET_KEYS.iter().any(|secret| key.contains(secret))
}

fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if is_secret(key) && child.is_string() {
                    *child = Value::String(MASK.to_string());
                } else {
                    redact(child);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const PROPERTIES: &str = r#"
default:
  project: Shop
  build:
    configuration: Release
  database:
    server: db01
    name: Shop
    sspi: true
  tools:
    zip: tools/7-Zip/7za.exe
development:
  default_to: default
  local_properties: local.yml
  build:
    configuration: Debug
  database:
    name: Shop_Dev
production:
  default_to: default
  database:
    sspi: false
    username: deploy
    password: hunter2
loop_a:
  default_to: loop_b
loop_b:
  default_to: loop_a
"#;

    fn write_properties(dir: &Path) -> PathBuf {
        let path = dir.join("properties.yml");
        fs::write(&path, PROPERTIES).unwrap();
        path
    }

    #[test]
    fn inherits_from_parent_section() {
        let dir = tempdir().unwrap();
        let path = write_properties(dir.path());

        let settings = Settings::load_with(&path, "development", None).unwrap();

        assert_eq!(settings.project, "Shop");
        assert_eq!(settings.build.configuration, "Debug");
        assert_eq!(settings.database.name.as_deref(), Some("Shop_Dev"));
        assert_eq!(settings.database.server.as_deref(), Some("db01"));
        assert!(settings.database.sspi);
        assert_eq!(settings.environment, "development");
        assert_eq!(settings.lookup_text("database.name").as_deref(), Some("Shop_Dev"));
        assert!(settings.lookup("default_to").is_none());
    }

    #[test]
    fn local_properties_override_section() {
        let dir = tempdir().unwrap();
        let path = write_properties(dir.path());
        fs::write(dir.path().join("local.yml"), "database:\n  server: localhost\n").unwrap();

        let settings = Settings::load_with(&path, "development", None).unwrap();
        assert_eq!(settings.database.server.as_deref(), Some("localhost"));
        assert_eq!(settings.database.name.as_deref(), Some("Shop_Dev"));
    }

    #[test]
    fn build_number_override_and_derived_package() {
        let dir = tempdir().unwrap();
        let path = write_properties(dir.path());

        let settings = Settings::load_with(&path, "production", Some("2.1.0.77".to_string())).unwrap();
        assert_eq!(settings.build.number.as_deref(), Some("2.1.0.77"));
        assert_eq!(settings.deployment.package.as_deref(), Some("deploy/Shop-2.1.0.77.zip"));
        assert_eq!(
            settings.lookup_text("deployment.package").as_deref(),
            Some("deploy/Shop-2.1.0.77.zip")
        );

        let unnumbered = Settings::load_with(&path, "production", None).unwrap();
        assert_eq!(unnumbered.deployment.package.as_deref(), Some("deploy/Shop-1.0.0.0.zip"));
    }

    #[test]
    fn connection_string_reflects_security_mode() {
        let dir = tempdir().unwrap();
        let path = write_properties(dir.path());

        let dev = Settings::load_with(&path, "development", None).unwrap();
        assert_eq!(
            dev.database.connectionstring.as_deref(),
            Some("Data Source=db01; Initial Catalog=Shop_Dev; Integrated Security=true;  Persist Security Info=False;")
        );

        let prod = Settings::load_with(&path, "production", None).unwrap();
        assert_eq!(
            prod.database.connectionstring.as_deref(),
            Some("Data Source=db01; Initial Catalog=Shop;  Persist Security Info=False;")
        );
    }

    #[test]
    fn inheritance_cycle_is_rejected() {
        let dir = tempdir().unwrap();
        let path = write_properties(dir.path());

        let err = Settings::load_with(&path, "loop_a", None).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
    }

    #[test]
    fn unknown_environment_lists_available_ones() {
        let dir = tempdir().unwrap();
        let path = write_properties(dir.path());

        let err = Settings::load_with(&path, "staging", None).unwrap_err();
        assert_eq!(err.code.as_str(), "config.missing_key");
        assert!(err.hints[0].message.contains("production"));
    }

    #[test]
    fn invalid_yaml_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("properties.yml");
        fs::write(&path, "development: [unclosed").unwrap();

        let err = Settings::load_with(&path, "development", None).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_yaml");
    }

    #[test]
    fn tools_resolve_against_root_and_missing_tools_fail() {
        let dir = tempdir().unwrap();
        let path = write_properties(dir.path());
        let settings = Settings::load_with(&path, "development", None).unwrap();

        assert_eq!(settings.tool("zip").unwrap(), settings.root.join("tools/7-Zip/7za.exe"));
        let err = settings.tool("mspec").unwrap_err();
        assert_eq!(err.details["key"], "tools.mspec");
    }

    #[test]
    fn redacted_masks_passwords_and_connection_strings() {
        let dir = tempdir().unwrap();
        let path = write_properties(dir.path());
        let settings = Settings::load_with(&path, "production", None).unwrap();

        let shown = settings.redacted();
        assert_eq!(shown["database"]["password"], "********");
        assert_eq!(shown["database"]["connectionstring"], "********");
        assert_eq!(settings.database.password.as_deref(), Some("hunter2"));
        assert!(settings
            .database
            .connectionstring
            .as_deref()
            .is_some_and(|c| c.contains("Initial Catalog=")));
    }

    #[test]
    fn configured_connection_string_is_masked() {
        let raw = serde_json::json!({
            "project": "Shop",
            "database": { "connectionstring": "Server=db01;User Id=sa;Password=hunter2" }
        });
        let settings =
            Settings::from_value(raw, "development", PathBuf::from("/work"), None).unwrap();

        let shown = serde_json::to_string(&settings.redacted()).unwrap();
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn environment_from_tasks_prefers_last() {
        let tasks = vec![
            "env:test".to_string(),
            "compile:all".to_string(),
            "env:production".to_string(),
        ];
        assert_eq!(environment_from_tasks(&tasks).as_deref(), Some("production"));
        assert_eq!(environment_from_tasks(&["package".to_string()]), None);
    }
}
