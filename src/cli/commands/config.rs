//! Implementation of the `attainment config` command.

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ConfigOutput {
    pub config: Config,
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.config).unwrap_or_else(|e| format!("<unprintable config: {e}>"))
    }
}

pub fn execute(config: Config, json_mode: bool) -> Result<()> {
    output(&ConfigOutput { config }, json_mode);
    Ok(())
}
