use crate::db::{DbPool, OrmConn};
use crate::services::cache_service::CacheService;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub cache: CacheService,
}
