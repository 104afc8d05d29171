//! TOML configuration parsing and validation.
//!
//! ```toml
//! [db]
//! path = "./data/olm.sqlite"
//!
//! [site]
//! root_url = "https://example.com"
//!
//! [analysis]
//! post_types = ["post", "page"]
//! min_relevance_score = 50
//! max_suggestions_per_page = 10
//! batch_size = 20
//! exclude_high_link_density = true
//! link_density_threshold = 5
//!
//! [server]
//! bind = "127.0.0.1:7341"
//! ```
//!
//! Only `[db]` and `[site]` are required; everything else has defaults.

use anyhow::{Context, Result};
use orphan_links_core::AnalysisSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub site: SiteConfig,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Prefix stripped from permalinks to get their site-relative form.
    pub root_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7341".to_string()
}

/// Parse config from a TOML string and validate it.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.site.root_url.trim().is_empty() {
        anyhow::bail!("site.root_url must not be empty");
    }

    config.analysis.validate()?;

    if config.analysis.exclude_high_link_density {
        tracing::debug!(
            threshold = config.analysis.link_density_threshold,
            "link-dense candidate sources will be skipped"
        );
    }

    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[db]
path = "./data/olm.sqlite"

[site]
root_url = "https://example.com"
"#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = parse_config(MINIMAL).unwrap();
        assert_eq!(config.analysis, AnalysisSettings::default());
        assert_eq!(config.server.bind, "127.0.0.1:7341");
    }

    #[test]
    fn partial_analysis_section_keeps_other_defaults() {
        let content = format!("{}\n[analysis]\nmin_relevance_score = 70\n", MINIMAL);
        let config = parse_config(&content).unwrap();
        assert_eq!(config.analysis.min_relevance_score, 70);
        assert_eq!(config.analysis.max_suggestions_per_page, 10);
        assert_eq!(config.analysis.post_types, vec!["post", "page"]);
    }

    #[test]
    fn rejects_invalid_ranges() {
        let content = format!("{}\n[analysis]\nmax_suggestions_per_page = 0\n", MINIMAL);
        assert!(parse_config(&content).is_err());

        let content = format!("{}\n[analysis]\nlink_density_threshold = 150\n", MINIMAL);
        assert!(parse_config(&content).is_err());
    }

    #[test]
    fn rejects_empty_site_root() {
        let content = "[db]\npath = \"x.sqlite\"\n\n[site]\nroot_url = \"\"\n";
        assert!(parse_config(content).is_err());
    }

    #[test]
    fn missing_site_section_fails() {
        assert!(parse_config("[db]\npath = \"x.sqlite\"\n").is_err());
    }
}
