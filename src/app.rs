use crate::config::{CacheSettings, Settings};
use crate::core::DistanceProvider;
use crate::error::AppError;
use crate::services::{
    CacheManager, DistanceEstimator, InvitationService, MatchStore, MatchingEngine, PostgresStore,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Matching engine and invitation workflow sharing one store
pub struct MatchingContext<S, D> {
    pub engine: MatchingEngine<S, D>,
    pub invitations: InvitationService<S>,
}

impl<S: MatchStore, D: DistanceProvider> MatchingContext<S, D> {
    pub fn new(store: Arc<S>, distance: D) -> Self {
        Self {
            engine: MatchingEngine::new(Arc::clone(&store), distance),
            invitations: InvitationService::new(store),
        }
    }
}

impl MatchingContext<PostgresStore, DistanceEstimator> {
    /// Connect to PostgreSQL and build the configured distance provider
    pub async fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let cache = Arc::new(build_cache(&settings.cache).await);
        let distance = DistanceEstimator::from_settings(&settings.geocoding, Some(Arc::clone(&cache)))?;

        info!(
            "Distance provider: {:?} (shared geocode cache: {})",
            settings.geocoding.provider,
            cache.has_shared_tier()
        );

        let db = &settings.database;
        let store = PostgresStore::from_settings(
            &db.url,
            db.max_connections,
            db.min_connections,
            db.acquire_timeout_secs,
            db.idle_timeout_secs,
        )
        .await?;

        info!(
            "PostgreSQL store initialized (max: {} connections)",
            db.max_connections.unwrap_or(10)
        );

        Ok(Self::new(Arc::new(store), distance))
    }
}

/// Geocode cache with Redis when reachable, in-process otherwise
async fn build_cache(settings: &CacheSettings) -> CacheManager {
    let Some(redis_url) = settings.redis_url.as_deref() else {
        return CacheManager::in_memory(settings.l1_cache_size, settings.ttl_secs);
    };

    match CacheManager::new(redis_url, settings.l1_cache_size, settings.ttl_secs).await {
        Ok(cache) => {
            info!(
                "Cache manager initialized (L1: {} entries, TTL: {}s)",
                settings.l1_cache_size, settings.ttl_secs
            );
            cache
        }
        Err(e) => {
            warn!("Failed to connect to Redis ({}), caching geocodes in-process only", e);
            CacheManager::in_memory(settings.l1_cache_size, settings.ttl_secs)
        }
    }
}
