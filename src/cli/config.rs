use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Service address baked in at build time (`PAPER_EVAL_BASE_URL`).
pub const DEFAULT_BASE_URL: &str = match option_env!("PAPER_EVAL_BASE_URL") {
    Some(url) => url,
    None => "http://localhost:8000",
};

/// Configuration for talking to the evaluation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base address shared by the upload, log and result endpoints
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whether session cookies are kept and sent with every request
    #[serde(default)]
    pub credentials: CredentialsMode,

    /// Optional bearer token attached to every request
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Connect timeout in seconds. There is no total timeout because the
    /// log stream stays open for the whole evaluation.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Exact log line that marks the evaluation as finished.
    /// When unset, only the end of the stream completes an evaluation.
    #[serde(default)]
    pub completion_line: Option<String>,

    /// Directory the graded PDF is saved into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// How credentials travel with requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialsMode {
    /// No cookies are stored or sent
    #[default]
    Omit,
    /// Cookies set by the service are sent back on every request
    Include,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            credentials: CredentialsMode::default(),
            auth_token: None,
            connect_timeout_secs: default_connect_timeout(),
            completion_line: None,
            output_dir: default_output_dir(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .context(format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: ClientConfig =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .context(format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Base address without a trailing slash
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Generate a sample configuration
    pub fn sample() -> Self {
        Self {
            base_url: "https://grader.example.com".to_string(),
            credentials: CredentialsMode::Include,
            auth_token: None,
            connect_timeout_secs: default_connect_timeout(),
            completion_line: Some("Evaluation completed".to_string()),
            output_dir: PathBuf::from("./graded"),
        }
    }
}
