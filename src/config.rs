//! Client configuration for the NCBI E-utilities.
//!
//! Settings come from built-in defaults, optionally overlaid by a JSON file
//! (`~/.pubmed_papers.json` unless another path is given).

use crate::error::{PubmedError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// E-utilities base URL
pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Maximum number of identifiers requested from esearch
pub const DEFAULT_RETMAX: usize = 10;

/// Tool name reported to NCBI
pub const DEFAULT_TOOL: &str = "pubmed-papers";

/// Default config file path: `~/.pubmed_papers.json`
pub fn default_config_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|p| p.join(".pubmed_papers.json"))
        .ok_or_else(|| PubmedError::Config("Cannot determine home directory".to_string()))
}

/// Settings for [`crate::eutils::EutilsClient`]
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base URL; `esearch.fcgi` and `efetch.fcgi` are appended
    pub base_url: String,
    /// Contact email sent with every request
    pub email: Option<String>,
    /// NCBI API key
    pub api_key: Option<String>,
    /// Tool name sent with every request
    pub tool: String,
    /// Result cap for the search stage
    pub retmax: usize,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            email: None,
            api_key: None,
            tool: DEFAULT_TOOL.to_string(),
            retmax: DEFAULT_RETMAX,
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load config from `path`.
    ///
    /// Returns defaults if the file doesn't exist or is invalid
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!("Config file not found: {:?}", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Config>(&content) {
                Ok(config) => {
                    info!("Loaded config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Load config from the default location, falling back to defaults
    pub fn load_default() -> Self {
        match default_config_path() {
            Ok(path) => Self::load(&path),
            Err(e) => {
                debug!(error = %e, "No default config location");
                Self::default()
            }
        }
    }

    /// Check values that would produce an unusable request
    pub fn validate(&self) -> Result<()> {
        if self.retmax == 0 {
            return Err(PubmedError::Validation("retmax must be at least 1".to_string()));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| PubmedError::Config(format!("Invalid base URL '{}': {}", self.base_url, e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_missing_file() {
        let config = Config::load(Path::new("/nonexistent/path.json"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let mut temp = NamedTempFile::new()?;
        write!(temp, r#"{{"email": "someone@example.org", "retmax": 5}}"#)?;

        let config = Config::load(temp.path());
        assert_eq!(config.email.as_deref(), Some("someone@example.org"));
        assert_eq!(config.retmax, 5);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.api_key.is_none());
        Ok(())
    }

    #[test]
    fn test_invalid_file_falls_back() -> Result<()> {
        let mut temp = NamedTempFile::new()?;
        write!(temp, "not json")?;
        assert_eq!(Config::load(temp.path()), Config::default());
        Ok(())
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let zero = Config {
            retmax: 0,
            ..Default::default()
        };
        assert!(matches!(zero.validate(), Err(PubmedError::Validation(_))));

        let bad_url = Config {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(bad_url.validate(), Err(PubmedError::Config(_))));
    }
}
