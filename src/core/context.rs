//! Shared state handed to every task action.

use serde::Serialize;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::Result;
use crate::invocation::{self, ToolInvocation, ToolOutput, ToolRunner};
use crate::settings::Settings;
use crate::teamcity::BuildStatistics;
use crate::utils::io;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOptions {
    /// Skip clobbering and compile only projects that are out of date.
    pub quick: bool,
    /// Record tool invocations and filesystem changes without performing them.
    pub dry_run: bool,
}

pub struct BuildContext {
    pub settings: Settings,
    pub options: RunOptions,
    runner: Rc<dyn ToolRunner>,
    statistics: RefCell<BuildStatistics>,
}

impl BuildContext {
    pub fn new(settings: Settings, options: RunOptions, runner: Rc<dyn ToolRunner>) -> Self {
        Self {
            settings,
            options,
            runner,
            statistics: RefCell::new(BuildStatistics::default()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.settings.root
    }

    /// A settings path made absolute against the project root.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.settings.path(relative)
    }

    pub fn tool(&self, name: &str) -> Result<PathBuf> {
        self.settings.tool(name)
    }

    /// Run a tool and fail on a nonzero exit.
    pub fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput> {
        invocation::run_checked(self.runner.as_ref(), invocation)
    }

    /// Run a tool whose nonzero exit is a result, not a failure. A tool that
    /// could not be started still fails.
    pub fn run_tolerant(&self, invocation: &ToolInvocation) -> Result<ToolOutput> {
        let output = self.runner.run(invocation)?;
        if output.exit_code < 0 {
            return Err(invocation::failure(invocation, output));
        }
        if !output.success {
            log_status!(
                "run",
                "{} exited with code {} (tolerated)",
                invocation.tool,
                output.exit_code
            );
        }
        Ok(output)
    }

    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }

    pub fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if self.options.dry_run {
            return Ok(());
        }
        io::ensure_dir(dir, "create output directory")
    }

    pub fn remove(&self, path: &Path) -> Result<bool> {
        if self.options.dry_run {
            log_status!("dry-run", "Would remove {}", path.display());
            return Ok(path.exists());
        }

        let removed = io::remove_path(path, "remove build output")?;
        if removed {
            log_status!("clean", "Removed {}", path.display());
        }
        Ok(removed)
    }

    pub fn write(&self, path: &Path, content: &str) -> Result<()> {
        if self.options.dry_run {
            log_status!("dry-run", "Would write {}", path.display());
            return Ok(());
        }

        io::write_file(path, content, "write generated file")?;
        log_status!("generate", "Wrote {}", path.display());
        Ok(())
    }

    pub fn add_statistic(&self, key: impl Into<String>, value: impl Into<String>) {
        self.statistics.borrow_mut().add_statistic(key, value);
    }

    pub fn append_status_text(&self, text: impl Into<String>) {
        self.statistics.borrow_mut().append_status_text(text);
    }

    pub fn statistics(&self) -> BuildStatistics {
        self.statistics.borrow().clone()
    }

    /// Write collected statistics for the CI server, unless this is a dry run.
    pub fn flush_statistics(&self) -> Result<bool> {
        if self.options.dry_run {
            return Ok(false);
        }
        self.statistics.borrow().write(self.root())
    }
}
