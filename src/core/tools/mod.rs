//! Command lines for the wrapped tools.
//!
//! Each module turns settings-level parameters into a [`ToolInvocation`]
//! and, where the tool writes a report, reads the numbers back out of it.
//! None of them spawn anything; the build context does that.
//!
//! [`ToolInvocation`]: crate::invocation::ToolInvocation

pub mod cloc;
pub mod dbtool;
pub mod fxcop;
pub mod msbuild;
pub mod msdeploy;
pub mod mspec;
pub mod ncover;
pub mod sevenzip;
pub mod sqlpubwiz;
pub mod stylecop;
pub mod tarantino;

/// Keys under `tools:` in `properties.yml`.
pub const MSBUILD: &str = "msbuild";
pub const MSPEC: &str = "mspec";
pub const NCOVER: &str = "ncover";
pub const NCOVER_EXPLORER: &str = "ncoverexplorer";
pub const FXCOP: &str = "fxcop";
pub const STYLECOP: &str = "stylecop";
pub const CLOC: &str = "cloc";
pub const ZIP: &str = "zip";
pub const TARANTINO: &str = "tarantino";
pub const SQLPUBWIZ: &str = "sqlpubwiz";
pub const MSDEPLOY: &str = "msdeploy";
