//! HTTP client for the Ollama API
//!
//! Covers the two endpoints this pipeline needs: `/api/embeddings` for
//! chunk and query vectors, and `/api/generate` for paraphrase expansion
//! and answer generation. Timeouts live here, not in pipeline logic.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::errors::{RagError, Result};
use crate::ollama::{Embedder, Generator};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

/// Client for a local Ollama instance
///
/// Carries both model identifiers so one client instance serves the whole
/// pipeline: `embed_model` for vectors, `generate_model` for text.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    embed_model: String,
    generate_model: String,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Ollama API base (default: http://127.0.0.1:11434)
    /// * `embed_model` - model for /api/embeddings (e.g. "nomic-embed-text")
    /// * `generate_model` - model for /api/generate (e.g. "llama3.2")
    pub fn new(base_url: Option<String>, embed_model: String, generate_model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            embed_model,
            generate_model,
        }
    }

    /// Base URL this client targets
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the Ollama server is reachable
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        self.client
            .get(&url)
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .is_ok()
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "model": self.embed_model, "prompt": text }))
            .send()
            .await
            .map_err(|e| RagError::EmbeddingService(format!("failed to reach Ollama: {}", e)))?;

        if !response.status().is_success() {
            return Err(RagError::EmbeddingService(format!(
                "Ollama returned {} for model '{}'",
                response.status(),
                self.embed_model
            )));
        }

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| RagError::EmbeddingService(format!("malformed response: {}", e)))?;

        // An empty vector means the model produced nothing usable; surface
        // it as a failure rather than letting it score as all-zero.
        if body.embedding.is_empty() {
            return Err(RagError::EmbeddingService(format!(
                "model '{}' returned an empty embedding",
                self.embed_model
            )));
        }

        Ok(body.embedding)
    }
}

#[async_trait]
impl Generator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "model": self.generate_model,
                "prompt": prompt,
                "stream": false,
            }))
            .send()
            .await
            .map_err(|e| RagError::LlmService(format!("failed to reach Ollama: {}", e)))?;

        if !response.status().is_success() {
            return Err(RagError::LlmService(format!(
                "Ollama returned {} for model '{}'",
                response.status(),
                self.generate_model
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| RagError::LlmService(format!("malformed response: {}", e)))?;

        Ok(body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> OllamaClient {
        OllamaClient::new(
            None,
            "nomic-embed-text".to_string(),
            "llama3.2".to_string(),
        )
    }

    #[test]
    fn test_client_default_url() {
        let client = test_client();
        assert_eq!(client.base_url(), "http://127.0.0.1:11434");
    }

    #[test]
    fn test_client_custom_url() {
        let client = OllamaClient::new(
            Some("http://localhost:8080".to_string()),
            "nomic-embed-text".to_string(),
            "llama3.2".to_string(),
        );
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[tokio::test]
    #[ignore] // Requires Ollama running
    async fn test_embed_integration() {
        let client = test_client();
        let vector = client.embed("hello world").await.unwrap();
        assert!(!vector.is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires Ollama running
    async fn test_generate_integration() {
        let client = test_client();
        let text = client.generate("Say hello.").await.unwrap();
        assert!(!text.is_empty());
    }
}
