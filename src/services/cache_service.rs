use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::AppResult;
use crate::routes::params::MovieSearchQuery;

/// Read-through response cache over Redis. With no Redis URL configured every
/// operation is a no-op and reads go straight to the database; the cache is
/// never a source of truth.
#[derive(Clone)]
pub struct CacheService {
    redis: Option<ConnectionManager>,
    ttl_secs: usize,
}

impl CacheService {
    pub async fn connect(redis_url: Option<&str>, ttl_secs: u64) -> AppResult<Self> {
        let redis = match redis_url {
            Some(url) => {
                let client = redis::Client::open(url)?;
                Some(ConnectionManager::new(client).await?)
            }
            None => None,
        };
        Ok(Self {
            redis,
            ttl_secs: ttl_secs as usize,
        })
    }

    pub fn disabled() -> Self {
        Self {
            redis: None,
            ttl_secs: 0,
        }
    }

    /// Get a cached value. An entry that no longer deserializes is treated
    /// as a miss rather than an error.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let Some(redis) = &self.redis else {
            return Ok(None);
        };
        let mut conn = redis.clone();
        let data: Option<String> = conn.get(key).await?;

        match data {
            Some(json) => Ok(serde_json::from_str(&json).ok()),
            None => Ok(None),
        }
    }

    /// Store a value under the configured TTL.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        let Some(redis) = &self.redis else {
            return Ok(());
        };
        let mut conn = redis.clone();
        let json = serde_json::to_string(value).map_err(anyhow::Error::new)?;
        let _: () = conn.set_ex(key, json, self.ttl_secs).await?;
        Ok(())
    }

    /// Wholesale invalidation: every mutating catalog or favorite operation
    /// clears the whole cache instead of tracking per-key dependencies.
    pub async fn clear_all(&self) -> AppResult<()> {
        let Some(redis) = &self.redis else {
            return Ok(());
        };
        let mut conn = redis.clone();
        redis::cmd("FLUSHDB").query_async::<_, ()>(&mut conn).await?;
        Ok(())
    }

    /// Cache key builders for consistent naming
    pub fn movie_list_key(page: i64, per_page: i64) -> String {
        format!("movies:list:{page}:{per_page}")
    }

    pub fn movie_id_key(id: i32) -> String {
        format!("movie:id:{id}")
    }

    pub fn movie_name_key(name: &str) -> String {
        format!("movie:name:{name}")
    }

    pub fn movie_search_key(query: &MovieSearchQuery) -> String {
        let (page, per_page, _) = query.pagination().normalize();
        format!(
            "movies:search:{}:{}:{}:{}:{}:{}:{}:{}",
            query.name.as_deref().unwrap_or(""),
            query.director.as_deref().unwrap_or(""),
            query.min_rating.map(|v| v.to_string()).unwrap_or_default(),
            query.max_rating.map(|v| v.to_string()).unwrap_or_default(),
            query.popularity.map(|v| v.to_string()).unwrap_or_default(),
            query.genres.as_deref().unwrap_or(""),
            page,
            per_page,
        )
    }
}
