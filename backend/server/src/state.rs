use std::sync::Arc;

use super::{
    config::Config,
    database::{ArticleStore, RedisStore},
    error::AppError,
};

pub struct State {
    pub config: Config,
    pub store: Arc<dyn ArticleStore>,
}

impl State {
    pub fn new(config: Config) -> Result<Arc<Self>, AppError> {
        let store = RedisStore::from_config(&config)?;

        Ok(Self::with_store(config, Arc::new(store)))
    }

    pub fn with_store(config: Config, store: Arc<dyn ArticleStore>) -> Arc<Self> {
        Arc::new(Self { config, store })
    }
}
