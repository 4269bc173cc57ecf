//! Text embeddings for the semantic part of the match score.
//!
//! `Embedder` is the seam: `HttpEmbedder` talks to an OpenAI-compatible
//! `/embeddings` endpoint, `CachedEmbedder` puts Redis in front of any embedder.

pub mod cache;
pub mod similarity;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub use cache::CachedEmbedder;
pub use similarity::cosine_similarity;

const MAX_RETRIES: u32 = 3;
const RETRY_BASE_MS: u64 = 200;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("cannot embed empty text")]
    EmptyText,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("embedding API returned no vector")]
    MissingVector,

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier, used to namespace cached vectors.
    fn model(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embedder backed by an OpenAI-compatible embeddings API.
#[derive(Clone)]
pub struct HttpEmbedder {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl HttpEmbedder {
    pub fn new(api_url: String, api_key: String, model: String) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            api_url,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(EmbeddingError::EmptyText);
        }

        let request_body = EmbeddingRequest {
            model: &self.model,
            input: text,
        };
        let mut last_error: Option<EmbeddingError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // 200ms, 400ms
                let delay = std::time::Duration::from_millis(RETRY_BASE_MS << (attempt - 1));
                warn!(
                    "Embedding attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(&self.api_url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbeddingError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let message = response.text().await.unwrap_or_default();
                warn!("Embedding API returned {}: {}", status, message);
                last_error = Some(EmbeddingError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(EmbeddingError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body: EmbeddingResponse = response.json().await?;
            let vector = body
                .data
                .into_iter()
                .next()
                .map(|d| d.embedding)
                .filter(|v| !v.is_empty())
                .ok_or(EmbeddingError::MissingVector)?;

            debug!("Embedded {} chars into {} dimensions", text.len(), vector.len());
            return Ok(vector);
        }

        Err(last_error.unwrap_or(EmbeddingError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedder(url: String) -> HttpEmbedder {
        HttpEmbedder::new(url, "test-key".to_string(), "test-model".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected_without_request() {
        let e = embedder("http://127.0.0.1:9/embeddings".to_string());
        let err = e.embed("   ").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::EmptyText));
    }

    #[tokio::test]
    async fn test_embed_parses_first_vector() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": [{"embedding": [0.1, 0.2, 0.3], "index": 0}]}"#)
            .create_async()
            .await;

        let e = embedder(format!("{}/embeddings", server.url()));
        let vector = e.embed("Rust developer").await.unwrap();

        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_is_typed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(401)
            .with_body("invalid key")
            .create_async()
            .await;

        let e = embedder(format!("{}/embeddings", server.url()));
        let err = e.embed("Rust developer").await.unwrap_err();

        match err {
            EmbeddingError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings")
            .with_status(503)
            .with_body("overloaded")
            .expect(MAX_RETRIES as usize)
            .create_async()
            .await;

        let e = embedder(format!("{}/embeddings", server.url()));
        let err = e.embed("Rust developer").await.unwrap_err();

        assert!(matches!(err, EmbeddingError::Api { status: 503, .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings")
            .with_status(400)
            .with_body("bad input")
            .expect(1)
            .create_async()
            .await;

        let e = embedder(format!("{}/embeddings", server.url()));
        assert!(e.embed("Rust developer").await.is_err());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_data_is_missing_vector() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": []}"#)
            .create_async()
            .await;

        let e = embedder(format!("{}/embeddings", server.url()));
        let err = e.embed("Rust developer").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::MissingVector));
    }
}
