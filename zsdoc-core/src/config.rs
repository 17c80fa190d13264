use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::site_map::SiteNode;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parsing(#[from] toml::de::Error),
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    /// Navigation tree of the numbered documentation pages.
    pub site_map: Vec<SiteNode>,
    /// Pages outside the site map (home, install, ...).
    pub pages: Vec<StandalonePage>,
}

impl Config {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&data)?;

        Ok(config)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SiteConfig {
    /// Value of `global_page_name` for every site map page.
    pub global_page_name: String,
    /// Text rendered by the `zname` helper.
    pub product_name: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            global_page_name: "Documentation".into(),
            product_name: "ZScript".into(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StandalonePage {
    pub name: String,
    pub title: String,
    pub global_page_name: String,
    /// Template file stem under `pages/`, defaults to `name`.
    #[serde(default)]
    pub template: Option<String>,
}

impl StandalonePage {
    pub fn template_name(&self) -> &str {
        self.template.as_deref().unwrap_or(&self.name)
    }
}
