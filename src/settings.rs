use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

const CONFIG_FILE: &str = "ancestry-export";
const ENV_PREFIX: &str = "FS";

pub const DEFAULT_GENERATIONS: u32 = 8;
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Runtime settings: defaults, then `ancestry-export.toml`, then `FS_*` env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api_base: String,
    pub auth_url: String,
    pub token_url: String,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub max_generations: u32,
    /// Persons enriched at once; 0 means no limit.
    pub concurrency: usize,
    pub request_timeout_secs: u64,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true)),
        )
    }

    pub(crate) fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let settings: Settings = with_defaults(builder)?
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_generations == 0 {
            bail!("max_generations must be at least 1");
        }
        if self.api_base.is_empty() {
            bail!("api_base must not be empty");
        }
        Ok(())
    }
}

fn with_defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(builder
        .set_default("api_base", "https://apibeta.familysearch.org")?
        .set_default(
            "auth_url",
            "https://identbeta.familysearch.org/cis-web/oauth2/v3/authorization",
        )?
        .set_default(
            "token_url",
            "https://identbeta.familysearch.org/cis-web/oauth2/v3/token",
        )?
        .set_default("max_generations", i64::from(DEFAULT_GENERATIONS))?
        .set_default("concurrency", DEFAULT_CONCURRENCY as i64)?
        .set_default("request_timeout_secs", 30_i64)?)
}
