use std::{sync::Arc, time::Duration};

use tracing::{info, warn};

use crate::config::{AppConfig, StoreBackend};
use crate::storage::{DiskStorage, StorageClient};
use crate::users::{memory::MemoryUserStore, repo::PgUserStore, repo::UserStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub storage: Arc<dyn StorageClient>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let storage = Arc::new(DiskStorage::new(&config.upload_dir).await?) as Arc<dyn StorageClient>;

        let store = match config.store_backend {
            StoreBackend::Postgres => {
                let pg = PgUserStore::connect(
                    config.database_url.as_deref(),
                    Duration::from_secs(config.db_acquire_timeout_secs),
                )
                .await?;
                if let Err(e) = sqlx::migrate!("./migrations").run(pg.pool()).await {
                    warn!(error = %e, "migration failed; continuing");
                }
                Arc::new(pg) as Arc<dyn UserStore>
            }
            StoreBackend::Memory => {
                info!("using in-memory user store");
                Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>
            }
        };

        Ok(Self {
            store,
            storage,
            config,
        })
    }

    pub fn from_parts(
        store: Arc<dyn UserStore>,
        storage: Arc<dyn StorageClient>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            store,
            storage,
            config,
        }
    }
}
