use std::path::Path;

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use validator::Validate;

use crate::domain::{Hub, HubRegistry};
use crate::selection::SelectionConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "CVS__";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub hubs: Vec<Hub>,
    #[serde(default)]
    pub selection: SelectionConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// TOML file overridden by `CVS__`-prefixed environment variables,
    /// e.g. `CVS__SELECTION__VERTEX_COUNT=20`
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let figment = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        let cfg: Config = figment
            .extract()
            .with_context(|| format!("loading configuration from {}", path.display()))?;
        cfg.selection
            .validate()
            .context("invalid selection configuration")?;
        Ok(cfg)
    }

    /// Validated hub registry, in configured order
    pub fn registry(&self) -> Result<HubRegistry> {
        HubRegistry::new(self.hubs.clone()).context("invalid hub registry")
    }
}
