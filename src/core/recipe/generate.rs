use crate::context::BuildContext;
use crate::error::Result;
use crate::generate;
use crate::graph::TaskSpec;

use super::BuildGraph;

pub fn declare(graph: &mut BuildGraph) -> Result<()> {
    graph.namespace("generate", |gen| {
        gen.declare(
            TaskSpec::new("version")
                .describe("Updates the version information for the build")
                .action(|ctx: &BuildContext| generate::write_version_info(ctx).map(|_| ())),
        )?;

        gen.declare(
            TaskSpec::new("config")
                .describe("Updates the configuration files for the build")
                .action(|ctx: &BuildContext| {
                    let written = generate::render_templates(ctx)?;
                    log_status!("generate", "Rendered {} configuration file(s)", written.len());
                    Ok(())
                }),
        )
    })
}
