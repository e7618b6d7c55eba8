//! Configuration surface. Every field here has a sane default so a missing
//! `kindred.toml` still produces a runnable config; only the API key fields
//! are expected to come from the environment in practice.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub openai_api_key: String,
    pub default_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            default_model: "gpt-5-nano".to_string(),
            max_tokens: 1000,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub embedding_model: String,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            embedding_model: "text-embedding-3-small".to_string(),
        }
    }
}

/// Field names are inherited from the system this config surface was
/// distilled from, which persisted through a Chroma-style store; the
/// backing adapter is qdrant-client (see DESIGN.md), not Chroma.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    pub chroma_persist_directory: String,
    pub chroma_collection_name: String,
    pub rag_top_k: usize,
    pub family_top_k: usize,
    pub rag_min_answers: usize,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            chroma_persist_directory: "./data/vectorstore".to_string(),
            chroma_collection_name: "kindred_qa".to_string(),
            rag_top_k: 5,
            family_top_k: 10,
            rag_min_answers: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoveltyPolicy {
    pub max_regeneration: u32,
    pub similarity_threshold: f64,
}

impl Default for NoveltyPolicy {
    fn default() -> Self {
        Self {
            max_regeneration: 3,
            similarity_threshold: 0.9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CorsSettings {
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    pub log_level: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub vector_store: VectorStoreSettings,
    pub novelty: NoveltyPolicy,
    pub cors: CorsSettings,
    pub telemetry: TelemetrySettings,
}

impl AppConfig {
    /// Loads `path` if present, falling back to defaults, then layers
    /// environment overrides for secrets that must never live in a
    /// checked-in file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = fs::read_to_string(path) {
            config = toml::from_str(&raw)?;
        }

        if let Ok(key) = env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                config.llm.openai_api_key = key;
            }
        }

        Ok(config)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let rendered = toml::to_string_pretty(self)?;
        fs::write(path, rendered)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.llm.openai_api_key.trim().is_empty() {
            anyhow::bail!("llm.openai_api_key must be set (OPENAI_API_KEY)");
        }
        if self.novelty.max_regeneration == 0 {
            anyhow::bail!("novelty.max_regeneration must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.novelty.similarity_threshold) {
            anyhow::bail!("novelty.similarity_threshold must be in [0, 1]");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_internally_consistent() {
        let config = AppConfig::default();
        assert_eq!(config.novelty.max_regeneration, 3);
        assert_eq!(config.vector_store.family_top_k, 10);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from("/nonexistent/kindred.toml").unwrap();
        assert_eq!(config.llm.default_model, "gpt-5-nano");
    }

    #[test]
    fn round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kindred.toml");
        let mut config = AppConfig::default();
        config.vector_store.rag_top_k = 7;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.vector_store.rag_top_k, 7);
    }

    #[test]
    fn validate_rejects_missing_api_key() {
        let config = AppConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_threshold() {
        let mut config = AppConfig::default();
        config.llm.openai_api_key = "sk-test".to_string();
        config.novelty.similarity_threshold = 1.5;
        assert!(config.validate().is_err());
    }
}
