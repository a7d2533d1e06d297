use moka::future::Cache;
use sqlx::MySqlPool;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{Config, UnknownItemPolicy};
use crate::error::{AppError, AppResult};
use crate::store::meta;

/// Memoized `item_name -> group` lookups over `salary_item_meta`.
///
/// Misses are cached too, so every metadata write must call [`ItemClassifier::invalidate`]
/// for the affected name. The TTL bounds staleness for writes made by other processes.
#[derive(Clone)]
pub struct ItemClassifier {
    cache: Cache<String, Option<String>>,
    policy: UnknownItemPolicy,
}

impl ItemClassifier {
    pub fn new(capacity: u64, ttl: Duration, policy: UnknownItemPolicy) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
            policy,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.classifier_cache_capacity,
            Duration::from_secs(config.classifier_cache_ttl_secs),
            config.unknown_item_policy.clone(),
        )
    }

    /// Group for `item_name`, or `None` when no metadata entry exists.
    pub async fn lookup(&self, pool: &MySqlPool, item_name: &str) -> AppResult<Option<String>> {
        let pool = pool.clone();
        self.lookup_with(item_name, |name| async move { meta::find_group(&pool, &name).await })
            .await
    }

    pub async fn lookup_with<F, Fut>(&self, item_name: &str, load: F) -> AppResult<Option<String>>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<Option<String>, sqlx::Error>>,
    {
        let key = item_name.to_string();
        self.cache
            .try_get_with(key.clone(), load(key))
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))
    }

    /// Classifies every spreadsheet column, applying the unknown-item policy.
    pub async fn resolve_columns(
        &self,
        pool: &MySqlPool,
        columns: &[String],
    ) -> AppResult<BTreeMap<String, String>> {
        self.resolve_columns_with(columns, |name| {
            let pool = pool.clone();
            async move { meta::find_group(&pool, &name).await }
        })
        .await
    }

    pub async fn resolve_columns_with<F, Fut>(
        &self,
        columns: &[String],
        load: F,
    ) -> AppResult<BTreeMap<String, String>>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<Option<String>, sqlx::Error>>,
    {
        let mut resolved = BTreeMap::new();
        let mut unknown = Vec::new();

        for column in columns {
            match self.lookup_with(column, &load).await? {
                Some(group) => {
                    resolved.insert(column.clone(), group);
                }
                None => match &self.policy {
                    UnknownItemPolicy::Reject => unknown.push(column.clone()),
                    UnknownItemPolicy::Fallback(group) => {
                        warn!(item_name = %column, fallback = %group, "No salary_item_meta entry, using fallback group");
                        resolved.insert(column.clone(), group.clone());
                    }
                },
            }
        }

        if !unknown.is_empty() {
            return Err(AppError::UnknownItems { unknown });
        }

        Ok(resolved)
    }

    pub async fn invalidate(&self, item_name: &str) {
        debug!(item_name, "Invalidating classification");
        self.cache.invalidate(item_name).await;
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}
