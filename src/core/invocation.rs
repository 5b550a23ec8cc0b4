//! External tool invocation.
//!
//! Every process kiln starts goes through a [`ToolInvocation`]: an executable,
//! a structured argument list and an optional working directory. Arguments are
//! never concatenated into a shell string, so values need no escaping. A
//! [`ToolRunner`] executes invocations; [`ProcessRunner`] spawns real
//! processes and [`DryRunRunner`] only records them.

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;

use crate::error::{Error, Result, ToolInvocationFailedDetails};
use crate::options::{render_switches, OptionMap, OptionValue, SwitchStyle};
use crate::paths;
use crate::utils::shell;

/// Option key naming the executable in an option map.
pub const TOOL_KEY: &str = "tool";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocation {
    /// Short name used in logs and errors, e.g. `msdeploy`.
    pub tool: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
    /// Positions in `args` that are masked on display.
    #[serde(skip)]
    secrets: Vec<usize>,
}

const SECRET_MASK: &str = "********";

impl ToolInvocation {
    pub fn new(tool: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            secrets: Vec::new(),
        }
    }

    /// Build an invocation from an option map holding the reserved `tool` key.
    ///
    /// The `tool` entry is taken out of the map and resolved against `base`;
    /// the remaining entries become switches in `style`.
    pub fn from_options(
        tool: impl Into<String>,
        mut options: OptionMap,
        style: SwitchStyle,
        base: &Path,
    ) -> Result<Self> {
        let tool = tool.into();
        let program = match options.remove(TOOL_KEY) {
            Some(OptionValue::Scalar(path)) if !path.is_empty() => paths::resolve_tool(&path, base),
            _ => {
                return Err(Error::config_missing_key(format!("tools.{}", tool), None)
                    .with_hint(format!("Set tools.{} in properties.yml", tool)))
            }
        };

        Ok(Self::new(tool, program).switches(&options, style))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// An argument passed as is but masked in command lines.
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.secrets.push(self.args.len());
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn switches(mut self, options: &OptionMap, style: SwitchStyle) -> Self {
        self.args.extend(render_switches(options, style));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// The invocation as one display line, quoted like a POSIX shell would need.
    pub fn command_line(&self) -> String {
        let program = shell::quote_arg(&paths::display(&self.program));
        if self.args.is_empty() {
            return program;
        }

        let shown: Vec<&str> = self
            .args
            .iter()
            .enumerate()
            .map(|(i, arg)| {
                if self.secrets.contains(&i) {
                    SECRET_MASK
                } else {
                    arg.as_str()
                }
            })
            .collect();
        format!("{} {}", program, shell::quote_args(&shown))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutput {
    pub exit_code: i32,
    pub success: bool,
}

impl ToolOutput {
    pub fn from_code(exit_code: i32) -> Self {
        Self {
            exit_code,
            success: exit_code == 0,
        }
    }
}

pub trait ToolRunner {
    /// Run the invocation to completion. A nonzero exit is not an error here;
    /// only failures of the runner itself are.
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput>;
}

/// Run and require exit code zero.
pub fn run_checked(runner: &dyn ToolRunner, invocation: &ToolInvocation) -> Result<ToolOutput> {
    let output = runner.run(invocation)?;
    if output.success {
        Ok(output)
    } else {
        Err(failure(invocation, output))
    }
}

/// The error for an invocation that exited nonzero.
pub fn failure(invocation: &ToolInvocation, output: ToolOutput) -> Error {
    let err = Error::tool_failed(ToolInvocationFailedDetails {
        tool: invocation.tool.clone(),
        exit_code: output.exit_code,
        command: invocation.command_line(),
        working_dir: invocation.working_dir.as_deref().map(paths::display),
    });

    match output.exit_code {
        -1 => err.with_hint(format!(
            "Check that '{}' exists and is executable",
            paths::display(&invocation.program)
        )),
        127 => err.with_hint("Command not found. Check the tools section of properties.yml."),
        126 => err.with_hint("Permission denied. Check file permissions on the tool."),
        _ => err,
    }
}

/// Spawns the tool, waits for it and streams its output.
///
/// The child's stdout goes to kiln's stderr so kiln's own stdout stays a
/// single JSON document. The child inherits the environment.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput> {
        log_status!("run", "{}", invocation.command_line());

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(io::stderr()))
            .stderr(Stdio::inherit());

        if let Some(dir) = &invocation.working_dir {
            cmd.current_dir(dir);
        }

        match cmd.status() {
            Ok(status) => Ok(ToolOutput::from_code(status.code().unwrap_or(-1))),
            Err(e) => {
                log_status!("run", "Failed to start {}: {}", invocation.tool, e);
                Ok(ToolOutput::from_code(-1))
            }
        }
    }
}

/// Records invocations instead of running them. Every invocation succeeds.
#[derive(Debug, Default)]
pub struct DryRunRunner {
    recorded: RefCell<Vec<ToolInvocation>>,
}

impl DryRunRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<ToolInvocation> {
        self.recorded.borrow().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.recorded
            .borrow()
            .iter()
            .map(ToolInvocation::command_line)
            .collect()
    }
}

impl ToolRunner for DryRunRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput> {
        log_status!("dry-run", "{}", invocation.command_line());
        self.recorded.borrow_mut().push(invocation.clone());
        Ok(ToolOutput::from_code(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    struct FixedExit(i32);

    impl ToolRunner for FixedExit {
        fn run(&self, _invocation: &ToolInvocation) -> Result<ToolOutput> {
            Ok(ToolOutput::from_code(self.0))
        }
    }

    fn deploy_options() -> OptionMap {
        OptionMap::new()
            .with("tool", "/bin/x")
            .with("Configuration", "Release")
            .with("TreatWarningsAsErrors", true)
            .with("Props", OptionMap::new().with("A", "1").with("B", true))
    }

    #[test]
    fn from_options_takes_out_the_tool_key() {
        let inv = ToolInvocation::from_options(
            "msdeploy",
            deploy_options(),
            SwitchStyle::DASH,
            Path::new("/work"),
        )
        .unwrap();

        assert_eq!(inv.program, PathBuf::from("/bin/x"));
        assert_eq!(
            inv.args,
            vec!["-Configuration:Release", "-TreatWarningsAsErrors", "-Props:A=1,B"]
        );
        assert_eq!(
            inv.command_line(),
            "/bin/x -Configuration:Release -TreatWarningsAsErrors -Props:A=1,B"
        );
    }

    #[test]
    fn from_options_resolves_relative_tool_paths() {
        let options = OptionMap::new().with("tool", "tools/msdeploy/msdeploy.exe");
        let inv =
            ToolInvocation::from_options("msdeploy", options, SwitchStyle::DASH, Path::new("/work"))
                .unwrap();

        assert_eq!(inv.program, PathBuf::from("/work/tools/msdeploy/msdeploy.exe"));
        assert!(inv.args.is_empty());
    }

    #[test]
    fn from_options_without_tool_is_a_config_error() {
        let options = OptionMap::new().with("verb", "sync");
        let err =
            ToolInvocation::from_options("msdeploy", options, SwitchStyle::DASH, Path::new("/"))
                .unwrap_err();

        assert_eq!(err.code, ErrorCode::ConfigMissingKey);
        assert_eq!(err.details["key"], "tools.msdeploy");
    }

    #[test]
    fn nonzero_exit_becomes_tool_failure() {
        let inv = ToolInvocation::new("mspec", "/tools/mspec.exe").arg("Shop.Tests.dll");
        let err = run_checked(&FixedExit(3), &inv).unwrap_err();

        assert_eq!(err.code, ErrorCode::ToolInvocationFailed);
        assert_eq!(err.details["exitCode"], 3);
        assert_eq!(err.details["tool"], "mspec");
        assert_eq!(err.details["command"], "/tools/mspec.exe Shop.Tests.dll");
    }

    #[test]
    fn secret_args_are_masked_on_display_only() {
        let inv = ToolInvocation::new("tarantino", "DatabaseDeployer.exe")
            .args(["Rebuild", "db01", "Shop", "scripts", "sa"])
            .secret_arg("hunter2");

        assert_eq!(inv.args.last().map(String::as_str), Some("hunter2"));
        assert_eq!(
            inv.command_line(),
            "DatabaseDeployer.exe Rebuild db01 Shop scripts sa '********'"
        );
    }

    #[test]
    fn zero_exit_passes() {
        let inv = ToolInvocation::new("cloc", "cloc");
        assert!(run_checked(&FixedExit(0), &inv).unwrap().success);
    }

    #[test]
    fn dry_run_records_in_order() {
        let runner = DryRunRunner::new();
        runner.run(&ToolInvocation::new("a", "a").arg("1")).unwrap();
        runner.run(&ToolInvocation::new("b", "b").current_dir("/tmp")).unwrap();

        assert_eq!(runner.command_lines(), vec!["a 1", "b"]);
        assert_eq!(runner.recorded()[1].working_dir, Some(PathBuf::from("/tmp")));
    }

    #[cfg(unix)]
    #[test]
    fn process_runner_reports_exit_code() {
        let inv = ToolInvocation::new("sh", "sh").args(["-c", "exit 3"]);
        let output = ProcessRunner.run(&inv).unwrap();
        assert_eq!(output.exit_code, 3);
        assert!(!output.success);
    }

    #[cfg(unix)]
    #[test]
    fn process_runner_honors_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let inv = ToolInvocation::new("sh", "sh")
            .args(["-c", "test -f marker"])
            .current_dir(dir.path());

        assert_eq!(ProcessRunner.run(&inv).unwrap().exit_code, 1);
        std::fs::write(dir.path().join("marker"), "").unwrap();
        assert_eq!(ProcessRunner.run(&inv).unwrap().exit_code, 0);
    }

    #[test]
    fn missing_program_reports_minus_one() {
        let inv = ToolInvocation::new("ghost", "/definitely/not/here/ghost.exe");
        let err = run_checked(&ProcessRunner, &inv).unwrap_err();
        assert_eq!(err.details["exitCode"], -1);
        assert_eq!(err.message, "ghost could not be run");
    }
}
