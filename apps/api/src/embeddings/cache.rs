use std::sync::Arc;

use async_trait::async_trait;
use redis::Client as RedisClient;
use tracing::{trace, warn};
use uuid::Uuid;

use crate::embeddings::{Embedder, EmbeddingError};

/// Redis read-through cache in front of another embedder.
///
/// Cache failures never fail the embedding: a Redis outage only costs an API call.
pub struct CachedEmbedder {
    inner: Arc<dyn Embedder>,
    redis: RedisClient,
    ttl_secs: u64,
}

impl CachedEmbedder {
    pub fn new(inner: Arc<dyn Embedder>, redis: RedisClient, ttl_secs: u64) -> Self {
        Self {
            inner,
            redis,
            ttl_secs,
        }
    }

    async fn lookup(&self, key: &str) -> redis::RedisResult<Option<Vec<f32>>> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let cached: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(cached.and_then(|json| serde_json::from_str(&json).ok()))
    }

    async fn store(&self, key: &str, vector: &[f32]) -> redis::RedisResult<()> {
        let json = match serde_json::to_string(vector) {
            Ok(json) => json,
            Err(_) => return Ok(()),
        };
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        redis::cmd("SET")
            .arg(key)
            .arg(json)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await
    }
}

/// Stable cache key for a (model, text) pair.
pub fn cache_key(model: &str, text: &str) -> String {
    let name = format!("{model}\n{}", text.trim());
    format!(
        "embedding:{}",
        Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
    )
}

#[async_trait]
impl Embedder for CachedEmbedder {
    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let key = cache_key(self.inner.model(), text);

        match self.lookup(&key).await {
            Ok(Some(vector)) => {
                trace!("Embedding cache hit: {key}");
                return Ok(vector);
            }
            Ok(None) => trace!("Embedding cache miss: {key}"),
            Err(e) => warn!("Embedding cache read failed: {e}"),
        }

        let vector = self.inner.embed(text).await?;

        if let Err(e) = self.store(&key, &vector).await {
            warn!("Embedding cache write failed: {e}");
        }

        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        fn model(&self) -> &str {
            "fixed"
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(vec![1.0, 2.0])
        }
    }

    #[test]
    fn test_cache_key_is_stable_and_model_scoped() {
        assert_eq!(cache_key("m", "Rust"), cache_key("m", "  Rust "));
        assert_ne!(cache_key("m", "Rust"), cache_key("other", "Rust"));
        assert_ne!(cache_key("m", "Rust"), cache_key("m", "Go"));
        assert!(cache_key("m", "Rust").starts_with("embedding:"));
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_through_to_inner() {
        // Nothing listens on port 1; every cache call fails and is ignored.
        let redis = RedisClient::open("redis://127.0.0.1:1/").unwrap();
        let cached = CachedEmbedder::new(Arc::new(FixedEmbedder), redis, 60);

        let vector = cached.embed("anything").await.unwrap();
        assert_eq!(vector, vec![1.0, 2.0]);
        assert_eq!(cached.model(), "fixed");
    }
}
