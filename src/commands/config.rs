use clap::Args;
use serde::Serialize;

use kiln::settings::{self, Settings};

use crate::commands::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct ConfigArgs {
    /// Environment section to resolve
    #[arg(long, default_value = settings::DEFAULT_ENVIRONMENT)]
    pub env: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOutput {
    pub environment: String,
    pub root: String,
    pub settings: serde_json::Value,
}

pub fn run(args: ConfigArgs, global: &GlobalArgs) -> CmdResult<ConfigOutput> {
    let settings = Settings::load(&global.properties, &args.env)?;

    Ok((
        ConfigOutput {
            environment: settings.environment.clone(),
            root: settings.root.to_string_lossy().to_string(),
            settings: settings.redacted(),
        },
        0,
    ))
}
