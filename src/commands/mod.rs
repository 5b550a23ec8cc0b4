use std::path::PathBuf;

pub type CmdResult<T> = kiln::Result<(T, i32)>;

pub(crate) struct GlobalArgs {
    /// Properties file the build reads its settings from.
    pub properties: PathBuf,
}

pub mod config;
pub mod list;
pub mod prereqs;
pub mod run;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (kiln::Result<serde_json::Value>, i32) {
    match command {
        // Commands without global context
        crate::Commands::List(args) => dispatch!(args, list),
        crate::Commands::Prereqs(args) => dispatch!(args, prereqs),

        // Commands with global context
        crate::Commands::Run(args) => {
            crate::tty::status("kiln is working...");
            dispatch!(args, global, run)
        }
        crate::Commands::Config(args) => dispatch!(args, global, config),
    }
}
