//! Persistent configuration
//!
//! Loaded from `~/.localrag/config.toml`, created with defaults on first
//! run. CLI flags override file values per invocation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::errors::{RagError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Model used for /api/generate
    pub generate: String,
    /// Model used for /api/embeddings
    pub embed: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            generate: "llama3.2".to_string(),
            embed: "nomic-embed-text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding collection files
    pub dir: PathBuf,
    /// Default collection name
    pub collection: String,
    /// What to do when the collection already exists: overwrite, append, fail
    pub overwrite_policy: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("db"),
            collection: "local_rag".to_string(),
            overwrite_policy: "overwrite".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 7500,
            overlap: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Chunks retrieved per query variant
    pub top_k: usize,
    /// Paraphrased variants requested from the model
    pub variants: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            variants: 5,
        }
    }
}

impl Config {
    /// Load configuration from file, creating defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }

        let contents = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| RagError::Config(format!("failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| RagError::Config(format!("failed to serialize config: {}", e)))?;

        fs::write(&config_path, toml_string)?;
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| RagError::Config("could not determine home directory".to_string()))?;
        Ok(home.join(".localrag").join("config.toml"))
    }
}
