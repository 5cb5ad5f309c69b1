//! Secrets management for repo-ferry
//!
//! Secrets live apart from configuration so the config file can be shared.
//! The secrets file is located at `~/.config/repo-ferry/secrets.toml` and must
//! have restrictive permissions (0600 on Unix).
//!
//! Loading priority:
//! 1. Environment variables (GITHUB_TOKEN or GITHUB_PAT, GEMINI_API_KEY)
//! 2. Secrets file (~/.config/repo-ferry/secrets.toml)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Environment variables checked for the GitHub token, in order
const GITHUB_TOKEN_VARS: &[&str] = &["GITHUB_TOKEN", "GITHUB_PAT"];

/// Environment variable holding the Gemini API key
const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    /// GitHub configuration
    pub github: GitHubSecrets,

    /// Gemini configuration
    pub gemini: GeminiSecrets,
}

/// GitHub-related secrets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubSecrets {
    /// GitHub Personal Access Token
    pub token: Option<String>,
}

/// Gemini-related secrets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GeminiSecrets {
    /// Google AI Studio API key
    pub api_key: Option<String>,
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns default (empty) secrets if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_secrets_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load secrets from a specific file with permission checking
    pub fn load_from_file(path: &Path) -> Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mode = std::fs::metadata(path)?.permissions().mode();

            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }

            debug!(path = %path.display(), mode = format!("{:o}", mode & 0o777), "Secrets file permissions OK");
        }

        let contents = std::fs::read_to_string(path)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        if let Some(ref mut token) = secrets.github.token {
            *token = token.trim().to_string();
        }
        if let Some(ref mut key) = secrets.gemini.api_key {
            *key = key.trim().to_string();
        }

        Ok(secrets)
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/repo-ferry/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("repo-ferry").join("secrets.toml"))
    }

    /// Get GitHub token with environment variable override
    pub fn github_token(&self) -> Option<String> {
        for var in GITHUB_TOKEN_VARS {
            if let Some(token) = non_empty_env(var) {
                debug!(var, "Using GitHub token from environment");
                return Some(token);
            }
        }

        non_empty(self.github.token.as_deref())
    }

    /// Get Gemini API key with environment variable override
    pub fn gemini_api_key(&self) -> Option<String> {
        if let Some(key) = non_empty_env(GEMINI_KEY_VAR) {
            debug!(var = GEMINI_KEY_VAR, "Using Gemini API key from environment");
            return Some(key);
        }

        non_empty(self.gemini.api_key.as_deref())
    }

    /// GitHub token, or a fatal error when none is configured
    pub fn require_github_token(&self) -> Result<String> {
        self.github_token().ok_or_else(|| {
            Error::MissingSecret(
                "GitHub token not found. Set GITHUB_TOKEN (or GITHUB_PAT) \
                 or add [github].token to ~/.config/repo-ferry/secrets.toml"
                    .to_string(),
            )
        })
    }

    /// Gemini API key, or a fatal error when none is configured
    pub fn require_gemini_api_key(&self) -> Result<String> {
        self.gemini_api_key().ok_or_else(|| {
            Error::MissingSecret(
                "Gemini API key not found. Set GEMINI_API_KEY \
                 or add [gemini].api_key to ~/.config/repo-ferry/secrets.toml"
                    .to_string(),
            )
        })
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().and_then(|v| non_empty(Some(&v)))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
