//! Cache manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use archivehub_core::config::cache::CacheConfig;
use archivehub_core::error::AppError;
use archivehub_core::result::AppResult;
use archivehub_core::traits::cache::CacheProvider;

/// Cache manager that wraps the configured cache provider.
#[derive(Debug, Clone)]
pub struct CacheManager {
    inner: Arc<dyn CacheProvider>,
}

impl CacheManager {
    /// Create a new cache manager from configuration.
    pub async fn new(config: &CacheConfig) -> AppResult<Self> {
        let inner: Arc<dyn CacheProvider> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis cache provider");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisCacheProvider::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory cache provider");
                Arc::new(crate::memory::MemoryCacheProvider::new(&config.memory))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown cache provider: '{other}'. Supported: memory, redis, none"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Build the optional cache the hierarchy services consume.
    ///
    /// Returns `None` when the provider is `"none"`, in which case every
    /// tree read rebuilds from the store.
    pub async fn from_config(config: &CacheConfig) -> AppResult<Option<Arc<dyn CacheProvider>>> {
        if config.is_disabled() {
            info!("Cache disabled; tree reads will always rebuild");
            return Ok(None);
        }
        let manager = Self::new(config).await?;
        Ok(Some(Arc::new(manager)))
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_provider_yields_none() {
        let config = CacheConfig {
            provider: "none".to_string(),
            ..CacheConfig::default()
        };
        assert!(CacheManager::from_config(&config).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_provider_is_configuration_error() {
        let config = CacheConfig {
            provider: "memcached".to_string(),
            ..CacheConfig::default()
        };
        let err = CacheManager::new(&config).await.unwrap_err();
        assert_eq!(err.kind, archivehub_core::error::ErrorKind::Configuration);
    }

    #[cfg(feature = "memory")]
    #[tokio::test]
    async fn test_memory_provider_through_manager() {
        let cache = CacheManager::from_config(&CacheConfig::default())
            .await
            .unwrap()
            .expect("memory cache");
        cache
            .set("k", "v", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
    }
}
