use crate::context::BuildContext;
use crate::error::{Error, Result};
use crate::graph::TaskSpec;

use super::BuildGraph;

pub const ENVIRONMENTS: &[&str] = &["development", "test", "production"];

pub fn declare(graph: &mut BuildGraph) -> Result<()> {
    graph.namespace("env", |env| {
        for name in ENVIRONMENTS {
            env.declare(
                TaskSpec::new(*name)
                    .describe(format!(
                        "Switches the configuration to the {} environment",
                        name
                    ))
                    .action(move |ctx: &BuildContext| report(ctx, name)),
            )?;
        }
        Ok(())
    })
}

/// Settings are chosen before the run starts; the task only confirms them.
fn report(ctx: &BuildContext, requested: &str) -> Result<()> {
    if ctx.settings.environment != requested {
        return Err(Error::validation_invalid_argument(
            "environment",
            format!(
                "Settings were loaded for '{}', not '{}'",
                ctx.settings.environment, requested
            ),
            Some(requested.to_string()),
            None,
        )
        .with_hint(format!("Request env:{} as a top-level task", requested)));
    }

    log_status!(
        "env",
        "Loaded settings for the '{}' environment",
        ctx.settings.environment
    );
    let shown = serde_json::to_string_pretty(&ctx.settings.redacted())
        .map_err(|e| Error::internal_json(e.to_string(), Some("render settings".to_string())))?;
    log_status!("env", "{}", shown);
    Ok(())
}
