use crate::{
    semantic::{DEFAULT_MODEL, DEFAULT_THRESHOLD},
    storage::{self, StorageManager},
};
use anyhow::{bail, Context};
use homedir::my_home;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "config.yaml";
const DEFAULT_CATALOG_PATH: &str = "tools.csv";
const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
const DEFAULT_PREVIEW_CHARS: usize = 160;
const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// Configuration for semantic search functionality
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SemanticSearchConfig {
    /// Model name for embeddings (e.g., "all-MiniLM-L6-v2")
    #[serde(default = "default_semantic_model")]
    pub model: String,

    /// Minimum similarity [-1.0, 1.0] for a tool to appear in ranked results
    #[serde(default = "default_semantic_threshold")]
    pub threshold: f32,

    /// Batch size for embedding generation (fastembed default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
}

impl Default for SemanticSearchConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            threshold: DEFAULT_THRESHOLD,
            batch_size: None,
        }
    }
}

fn default_semantic_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_semantic_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Idle time after which a browsing session and its bookmarks are dropped
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

impl WebConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

fn default_session_ttl_secs() -> u64 {
    DEFAULT_SESSION_TTL_SECS
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Tool dataset; relative paths resolve against the base directory.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
    #[serde(default = "default_preview_chars")]
    pub description_preview_chars: usize,
    #[serde(default)]
    pub semantic_search: SemanticSearchConfig,
    #[serde(default)]
    pub web: WebConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            description_preview_chars: default_preview_chars(),
            semantic_search: SemanticSearchConfig::default(),
            web: WebConfig::default(),
            base_path: PathBuf::new(),
        }
    }
}

fn default_catalog_path() -> String {
    DEFAULT_CATALOG_PATH.to_string()
}

fn default_preview_chars() -> usize {
    DEFAULT_PREVIEW_CHARS
}

impl Config {
    fn validate(&self) -> anyhow::Result<()> {
        let sem = &self.semantic_search;
        if !(-1.0..=1.0).contains(&sem.threshold) {
            bail!(
                "semantic_search.threshold must be between -1.0 and 1.0, got {}",
                sem.threshold
            );
        }

        if sem.batch_size == Some(0) {
            bail!("semantic_search.batch_size must be greater than 0");
        }

        if self.description_preview_chars == 0 {
            bail!("description_preview_chars must be greater than 0");
        }

        if self.web.session_ttl_secs == 0 {
            bail!("web.session_ttl_secs must be greater than 0");
        }

        if self.catalog_path.trim().is_empty() {
            bail!("catalog_path must not be empty");
        }

        Ok(())
    }

    /// Load `config.yaml` from `base_path`, writing defaults if it is missing.
    pub fn load_with(base_path: &Path) -> anyhow::Result<Self> {
        let store = storage::BackendLocal::new(base_path)
            .with_context(|| format!("failed to create {}", base_path.display()))?;

        // create new if does not exist
        if !store.exists(CONFIG_FILE) {
            log::info!("writing default config to {}", base_path.join(CONFIG_FILE).display());
            store.write(CONFIG_FILE, serde_yml::to_string(&Self::default())?.as_bytes())?;
        }

        let config_str = String::from_utf8(store.read(CONFIG_FILE)?)
            .context("config file is not valid utf8")?;
        let mut config: Self = serde_yml::from_str(&config_str).context("config is malformed")?;

        config.base_path = base_path.to_path_buf();

        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let store = storage::BackendLocal::new(&self.base_path)?;

        let config_str = serde_yml::to_string(&self)?;
        store.write(CONFIG_FILE, config_str.as_bytes())?;
        Ok(())
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn resolved_catalog_path(&self) -> PathBuf {
        let path = Path::new(&self.catalog_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }
}

/// Base directory: `TOOLHUB_BASE_PATH`, else `~/.local/share/toolhub`.
pub fn base_path() -> anyhow::Result<PathBuf> {
    if let Ok(path) = std::env::var("TOOLHUB_BASE_PATH") {
        return Ok(PathBuf::from(path));
    }

    let home = my_home()
        .context("could not determine home directory")?
        .context("home directory path is empty")?;

    Ok(home.join(".local/share/toolhub"))
}
