//! `gwalink.toml` parsing and session configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gwalink_schema::Layer;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "gwalink.toml";

/// The top-level configuration of a gwalink working directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GwalinkConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub hydrate: HydrateConfig,
}

/// `[session]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Model layer whose keywords drive the processing order.
    #[serde(default)]
    pub layer: Option<Layer>,
}

/// `[hydrate]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HydrateConfig {
    /// Report progress every N records (0 disables).
    #[serde(default)]
    pub progress_every: Option<usize>,
    /// Fail the run when any record is rejected.
    #[serde(default)]
    pub strict: Option<bool>,
}

impl GwalinkConfig {
    /// Search upward from `start_dir` for a `gwalink.toml`, returning it with
    /// the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let config: GwalinkConfig = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((config, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a config from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing gwalink.toml")
    }

    /// Layer to use, with `flag` taking precedence. Defaults to both layers.
    pub fn layer(&self, flag: Option<Layer>) -> Layer {
        flag.or(self.session.layer).unwrap_or(Layer::Both)
    }

    pub fn progress_every(&self, flag: Option<usize>) -> usize {
        flag.or(self.hydrate.progress_every).unwrap_or(0)
    }

    pub fn strict(&self, flag: bool) -> bool {
        flag || self.hydrate.strict.unwrap_or(false)
    }

    /// Generate the default file for `gwalink init`.
    pub fn template(layer: Layer) -> String {
        format!(
            r#"[session]
layer = "{layer}"

[hydrate]
progress_every = 1000
strict = false
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[session]
layer = "analysis"

[hydrate]
progress_every = 250
strict = true
"#;
        let config = GwalinkConfig::from_str(toml_str).unwrap();
        assert_eq!(config.layer(None), Layer::Analysis);
        assert_eq!(config.progress_every(None), 250);
        assert!(config.strict(false));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = GwalinkConfig::from_str("").unwrap();
        assert_eq!(config.layer(None), Layer::Both);
        assert_eq!(config.progress_every(None), 0);
        assert!(!config.strict(false));
    }

    #[test]
    fn flags_override_config() {
        let config = GwalinkConfig::from_str("[session]\nlayer = \"design\"\n[hydrate]\nprogress_every = 10\n").unwrap();
        assert_eq!(config.layer(Some(Layer::Analysis)), Layer::Analysis);
        assert_eq!(config.progress_every(Some(3)), 3);
        assert!(config.strict(true));
    }

    #[test]
    fn reject_unknown_layer() {
        assert!(GwalinkConfig::from_str("[session]\nlayer = \"sideways\"\n").is_err());
    }

    #[test]
    fn template_is_valid_toml() {
        let config = GwalinkConfig::from_str(&GwalinkConfig::template(Layer::Design)).unwrap();
        assert_eq!(config.layer(None), Layer::Design);
        assert_eq!(config.progress_every(None), 1000);
        assert!(!config.strict(false));
    }

    #[test]
    fn find_and_load_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[session]\nlayer = \"design\"\n").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (config, found_dir) = GwalinkConfig::find_and_load(&nested).unwrap().unwrap();
        assert_eq!(config.layer(None), Layer::Design);
        assert_eq!(found_dir, dir.path());
    }

    #[test]
    fn find_and_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "not [[[ toml").unwrap();
        let err = GwalinkConfig::find_and_load(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
    }
}
