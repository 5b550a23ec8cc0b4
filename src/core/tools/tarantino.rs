//! Database migrations with Tarantino's database deployer.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::invocation::ToolInvocation;
use crate::settings::DatabaseSettings;

use super::TARANTINO;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Drop,
    Rebuild,
    ExecuteScript,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "Create",
            Action::Update => "Update",
            Action::Drop => "Drop",
            Action::Rebuild => "Rebuild",
            Action::ExecuteScript => "ExecuteScript",
        }
    }
}

/// `deployer <action> <server> <database> <scripts> [<username> <password>]`
///
/// Integrated security passes no credentials. Otherwise both are required.
pub fn run(
    program: PathBuf,
    action: Action,
    database: &DatabaseSettings,
    scripts: &str,
) -> Result<ToolInvocation> {
    let server = required(database.server.as_deref(), "database.server")?;
    let name = required(database.name.as_deref(), "database.name")?;

    let inv = ToolInvocation::new(TARANTINO, program).args([
        action.as_str(),
        server,
        name,
        scripts,
    ]);

    if database.sspi {
        return Ok(inv);
    }

    let username = required(database.username.as_deref(), "database.username")?;
    let password = required(database.password.as_deref(), "database.password")?;
    Ok(inv.arg(username).secret_arg(password))
}

fn required<'a>(value: Option<&'a str>, key: &str) -> Result<&'a str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::config_missing_key(key, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database(sspi: bool) -> DatabaseSettings {
        DatabaseSettings {
            server: Some(".\\SQLEXPRESS".to_string()),
            name: Some("Shop_Dev".to_string()),
            sspi,
            username: Some("deploy".to_string()),
            password: Some("s3cret".to_string()),
            ..DatabaseSettings::default()
        }
    }

    #[test]
    fn integrated_security_passes_no_credentials() {
        let inv = run(PathBuf::from("DatabaseDeployer.exe"), Action::Rebuild, &database(true), "db/scripts")
            .unwrap();
        assert_eq!(inv.args, vec!["Rebuild", ".\\SQLEXPRESS", "Shop_Dev", "db/scripts"]);
    }

    #[test]
    fn sql_logins_pass_masked_credentials() {
        let inv = run(PathBuf::from("DatabaseDeployer.exe"), Action::Update, &database(false), "db/scripts")
            .unwrap();
        assert_eq!(inv.args[4..], ["deploy", "s3cret"]);
        assert!(!inv.command_line().contains("s3cret"));
    }

    #[test]
    fn missing_server_is_a_config_error() {
        let mut db = database(true);
        db.server = None;
        let err = run(PathBuf::from("x"), Action::Create, &db, "scripts").unwrap_err();
        assert_eq!(err.details["key"], "database.server");
    }
}
