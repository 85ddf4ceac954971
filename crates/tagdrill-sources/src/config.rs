//! Configuration and source factory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tagdrill_core::session::EXAM_RATIO;
use tagdrill_core::source::TableSource;

use crate::fs::DirectorySource;
use crate::http::HttpSource;

/// Where the reference tables come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    Directory {
        #[serde(default = "default_data_dir")]
        path: PathBuf,
    },
    Http {
        base_url: String,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Directory {
            path: default_data_dir(),
        }
    }
}

impl std::fmt::Display for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceConfig::Directory { path } => write!(f, "directory {}", path.display()),
            SourceConfig::Http { base_url } => write!(f, "http {base_url}"),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

/// Top-level tagdrill configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagdrillConfig {
    #[serde(default)]
    pub source: SourceConfig,
    /// Directory of the on-disk proficiency store.
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
    /// Pause after grading before the next item, in milliseconds.
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
    /// Fraction of each category sampled in exam mode.
    #[serde(default = "default_exam_ratio")]
    pub exam_ratio: f64,
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("./.tagdrill")
}
fn default_pause_ms() -> u64 {
    600
}
fn default_exam_ratio() -> f64 {
    EXAM_RATIO
}

impl Default for TagdrillConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            store_dir: default_store_dir(),
            pause_ms: default_pause_ms(),
            exam_ratio: default_exam_ratio(),
        }
    }
}

impl TagdrillConfig {
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

/// Commented configuration written by `tagdrill init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# tagdrill configuration

# Directory of the proficiency store.
store_dir = "./.tagdrill"

# Pause after grading before the next item, in milliseconds.
pause_ms = 600

# Fraction of each category sampled in exam mode.
exam_ratio = 0.33

# Where the reference tables are read from.
[source]
type = "directory"
path = "./data"
# type = "http"
# base_url = "http://localhost:8080/data"
"#;

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    resolve_vars_with(s, |name| std::env::var(name).ok())
}

fn resolve_vars_with(s: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let name = &rest[start + 2..start + len];
        result.push_str(&lookup(name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(p: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&p.to_string_lossy()))
}

/// Apply `TAGDRILL_*` overrides. A base URL takes precedence over a data dir.
fn apply_overrides(config: &mut TagdrillConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(dir) = lookup("TAGDRILL_DATA_DIR").filter(|v| !v.is_empty()) {
        config.source = SourceConfig::Directory {
            path: PathBuf::from(dir),
        };
    }
    if let Some(url) = lookup("TAGDRILL_BASE_URL").filter(|v| !v.is_empty()) {
        config.source = SourceConfig::Http { base_url: url };
    }
    if let Some(dir) = lookup("TAGDRILL_STORE_DIR").filter(|v| !v.is_empty()) {
        config.store_dir = PathBuf::from(dir);
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `tagdrill.toml` in the current directory
/// 2. `~/.config/tagdrill/config.toml`
///
/// Environment variable overrides: `TAGDRILL_DATA_DIR`, `TAGDRILL_BASE_URL`,
/// `TAGDRILL_STORE_DIR`.
pub fn load_config() -> Result<TagdrillConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<TagdrillConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("tagdrill.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => TagdrillConfig::default(),
    };

    apply_overrides(&mut config, |name| std::env::var(name).ok());
    tracing::debug!(
        path = ?config_path,
        source = %config.source,
        store = %config.store_dir.display(),
        "configuration loaded"
    );
    Ok(config)
}

/// Parse a configuration file and expand `${VAR}` references.
pub fn parse_config(content: &str) -> Result<TagdrillConfig> {
    let mut config: TagdrillConfig = toml::from_str(content)?;
    config.source = match config.source {
        SourceConfig::Directory { path } => SourceConfig::Directory {
            path: resolve_path(&path),
        },
        SourceConfig::Http { base_url } => SourceConfig::Http {
            base_url: resolve_env_vars(&base_url),
        },
    };
    config.store_dir = resolve_path(&config.store_dir);
    if !(config.exam_ratio > 0.0 && config.exam_ratio <= 1.0) {
        anyhow::bail!("exam_ratio must be in (0, 1], got {}", config.exam_ratio);
    }
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("tagdrill"))
}

/// Create a table source from its configuration.
pub fn create_source(config: &SourceConfig) -> Box<dyn TableSource> {
    match config {
        SourceConfig::Directory { path } => Box::new(DirectorySource::new(path.clone())),
        SourceConfig::Http { base_url } => Box::new(HttpSource::new(base_url)),
    }
}
