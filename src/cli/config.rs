//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliSizeVariant};
use crate::{config::PipelineConfig, query::SizeVariant};
use anyhow::{Context, Result};

/// Environment variable overriding the default provider endpoint
pub(crate) const API_URL_ENV: &str = "STREETSHOT_API_URL";

/// Environment variable supplying the API key when `--api-key` is absent
pub(crate) const API_KEY_ENV: &str = "STREETSHOT_API_KEY";

/// Provider endpoint used when neither flag nor environment names one
pub(crate) const DEFAULT_API_URL: &str = "https://api.streetshot.dev/v4/";

/// Convert CLI arguments to a validated `PipelineConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build `PipelineConfig` from CLI arguments.
    ///
    /// Flags win over environment variables. The API key carries no default;
    /// it must arrive through `--api-key` or `STREETSHOT_API_KEY`.
    pub(crate) fn from_cli(cli: &Cli) -> Result<PipelineConfig> {
        let base_url = cli
            .api_url
            .clone()
            .or_else(|| std::env::var(API_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_key = cli
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .unwrap_or_default();

        let config = PipelineConfig::builder()
            .base_url(base_url)
            .api_key(api_key)
            .timeout_secs(cli.timeout_secs)
            .size_variant(Self::size_variant(cli.size))
            .build()
            .context("Invalid configuration (set STREETSHOT_API_KEY or pass --api-key)")?;

        Ok(config)
    }

    /// Map the CLI size flag onto the library's size variant
    fn size_variant(size: CliSizeVariant) -> SizeVariant {
        match size {
            CliSizeVariant::Tiny => SizeVariant::Tiny,
            CliSizeVariant::Small => SizeVariant::Small,
            CliSizeVariant::Medium => SizeVariant::Medium,
            CliSizeVariant::Large => SizeVariant::Large,
            CliSizeVariant::Native => SizeVariant::Native,
        }
    }
}
