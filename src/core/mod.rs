// Public modules
pub mod build;
pub mod clean;
pub mod context;
pub mod error;
pub mod files;
pub mod generate;
pub mod graph;
pub mod invocation;
pub mod options;
pub mod recipe;
pub mod reports;
pub mod settings;
pub mod teamcity;
pub mod tools;

// Internal modules - not part of public API
pub(crate) mod paths;

// Re-export common types for convenience
pub use context::{BuildContext, RunOptions};
pub use error::{Error, ErrorCode, Result};
pub use graph::{TaskGraph, TaskRecord, TaskSpec, TaskSummary};
pub use invocation::{DryRunRunner, ProcessRunner, ToolInvocation, ToolOutput, ToolRunner};
pub use settings::Settings;
