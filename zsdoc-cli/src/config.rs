use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "./zsdoc.toml";

/// Complete configuration that merges CLI args, env vars, config files, and defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DocConfig {
    /// Build configuration
    pub build: BuildConfig,
    /// Site settings, site map and standalone pages
    #[serde(flatten)]
    pub site: zsdoc_core::config::Config,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildConfig {
    /// Template root with pages/, components/ and partials/
    pub templates: String,
    /// Static assets copied into the output directory
    pub data: String,
    /// Output directory for generated pages
    pub output: String,
    /// Optional documentation content JSON
    pub content: Option<String>,
    /// Configuration file path
    pub config: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            templates: "./template".to_string(),
            data: "./data".to_string(),
            output: "./dist".to_string(),
            content: None,
            config: DEFAULT_CONFIG_FILE.to_string(),
        }
    }
}

impl DocConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (ZSDOC_*)
    /// 3. Configuration file
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let config_file = arg(args, "config").unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        builder = builder.add_source(ConfigBuilder::try_from(&Self::default())?);

        // 2. Add configuration file if it exists
        if Path::new(&config_file).exists() {
            builder = builder.add_source(File::from(Path::new(&config_file)));
        } else if arg(args, "config").is_some() {
            anyhow::bail!("Configuration file not found: {config_file}");
        }

        // 3. Add environment variables with ZSDOC_ prefix
        builder = builder.add_source(
            Environment::with_prefix("ZSDOC")
                .prefix_separator("_")
                .separator("__"), // Use double underscore for nested keys
        );

        // 4. Override with CLI arguments (highest priority)
        for key in ["templates", "data", "output", "content", "config"] {
            if let Some(value) = arg(args, key) {
                builder = builder.set_override(format!("build.{key}"), value)?;
            }
        }

        let config: DocConfig = builder.build()?.try_deserialize()?;
        tracing::debug!(file = %config_file, "Loaded configuration");

        Ok(config)
    }

    pub fn templates(&self) -> PathBuf {
        PathBuf::from(&self.build.templates)
    }

    pub fn data(&self) -> PathBuf {
        PathBuf::from(&self.build.data)
    }

    pub fn output(&self) -> PathBuf {
        PathBuf::from(&self.build.output)
    }

    pub fn content(&self) -> Option<PathBuf> {
        self.build.content.as_ref().map(PathBuf::from)
    }

    pub fn config_file(&self) -> PathBuf {
        PathBuf::from(&self.build.config)
    }
}

// Subcommands that don't define an argument report it as absent.
fn arg(args: &ArgMatches, key: &str) -> Option<String> {
    args.try_get_one::<String>(key).ok().flatten().cloned()
}
