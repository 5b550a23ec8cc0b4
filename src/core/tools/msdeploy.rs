use std::path::Path;

use crate::error::Result;
use crate::invocation::{ToolInvocation, TOOL_KEY};
use crate::options::{OptionMap, SwitchStyle};
use crate::paths;

use super::MSDEPLOY;

/// Options for syncing a package to a remote server.
pub fn sync_options(tool: &str, package: &Path, server: &str) -> OptionMap {
    OptionMap::new()
        .with(TOOL_KEY, tool)
        .with("verb", "sync")
        .with("source", OptionMap::new().with("package", paths::display(package)))
        .with(
            "dest",
            OptionMap::new()
                .with("auto", true)
                .with("computerName", server),
        )
}

/// `msdeploy -verb:sync -source:package=<zip> -dest:auto,computerName=<server>`
pub fn sync(options: OptionMap, base: &Path) -> Result<ToolInvocation> {
    ToolInvocation::from_options(MSDEPLOY, options, SwitchStyle::DASH, base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn sync_renders_deployment_switches() {
        let options = sync_options("tools/msdeploy/msdeploy.exe", Path::new("/work/deploy/Shop-1.2.zip"), "web01");
        let inv = sync(options, Path::new("/work")).unwrap();

        assert_eq!(inv.program, PathBuf::from("/work/tools/msdeploy/msdeploy.exe"));
        assert_eq!(
            inv.args,
            vec![
                "-verb:sync",
                "-source:package=/work/deploy/Shop-1.2.zip",
                "-dest:auto,computerName=web01",
            ]
        );
    }

    #[test]
    fn empty_server_drops_the_key() {
        let options = sync_options("msdeploy", Path::new("p.zip"), "");
        let inv = sync(options, Path::new("/")).unwrap();
        assert_eq!(inv.args.last().map(String::as_str), Some("-dest:auto"));
    }
}
