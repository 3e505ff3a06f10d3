use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn, pool_of},
    favorites::SeaOrmFavoriteStore,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(orm: OrmConn, config: AppConfig) -> Self {
        Self {
            pool: pool_of(&orm),
            orm,
            config: Arc::new(config),
        }
    }

    pub fn favorite_store(&self) -> SeaOrmFavoriteStore {
        SeaOrmFavoriteStore::new(self.orm.clone())
    }
}
