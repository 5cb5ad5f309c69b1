//! Configuration management for repo-ferry
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (FERRY_*)
//! 3. Config file (~/.config/repo-ferry/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;
use crate::{Error, Result};

/// Repositories the jobs read from and write to, in `owner/repo` form
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Repository that scrapers read from
    pub source: Option<String>,

    /// Repository that populate and labelling jobs write to
    pub target: Option<String>,
}

/// Local paths
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the scraped JSON files
    pub data_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("repo-contents"),
        }
    }
}

/// Language model settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model name as understood by the provider
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Network timeout for a single invocation
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.7,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Retry settings for label suggestion
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LabelingConfig {
    /// Total attempts per issue, including the first
    pub max_attempts: u32,

    /// Fixed delay between attempts
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,
}

impl Default for LabelingConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            retry_delay: policy.delay,
        }
    }
}

impl LabelingConfig {
    /// Retry policy described by this section
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.max_attempts, self.retry_delay)
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub source: Option<String>,
    pub target: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub model: Option<String>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Source and target repositories
    pub repos: RepoConfig,

    /// Local paths
    pub paths: PathsConfig,

    /// Language model configuration
    pub llm: LlmConfig,

    /// Label suggestion retry configuration
    pub labeling: LabelingConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/repo-ferry/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("repo-ferry").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - FERRY_SOURCE_REPO: repository to scrape
    /// - FERRY_TARGET_REPO: repository to populate and label
    /// - FERRY_DATA_DIR: directory for scraped JSON files
    /// - FERRY_MODEL: language model name
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(source) = std::env::var("FERRY_SOURCE_REPO") {
            self.repos.source = Some(source);
        }

        if let Ok(target) = std::env::var("FERRY_TARGET_REPO") {
            self.repos.target = Some(target);
        }

        if let Ok(dir) = std::env::var("FERRY_DATA_DIR") {
            self.paths.data_dir = PathBuf::from(dir);
        }

        if let Ok(model) = std::env::var("FERRY_MODEL") {
            self.llm.model = model;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: CliOverrides) -> Self {
        if let Some(source) = overrides.source {
            self.repos.source = Some(source);
        }

        if let Some(target) = overrides.target {
            self.repos.target = Some(target);
        }

        if let Some(dir) = overrides.data_dir {
            self.paths.data_dir = dir;
        }

        if let Some(model) = overrides.model {
            self.llm.model = model;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(overrides: CliOverrides) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(overrides))
    }

    /// The configured source repository, or an error naming the missing setting
    pub fn source_repo(&self) -> Result<&str> {
        self.repos.source.as_deref().ok_or_else(|| {
            Error::Config(
                "No source repository. Use --source, FERRY_SOURCE_REPO or [repos].source"
                    .to_string(),
            )
        })
    }

    /// The configured target repository, or an error naming the missing setting
    pub fn target_repo(&self) -> Result<&str> {
        self.repos.target.as_deref().ok_or_else(|| {
            Error::Config(
                "No target repository. Use --target, FERRY_TARGET_REPO or [repos].target"
                    .to_string(),
            )
        })
    }
}
