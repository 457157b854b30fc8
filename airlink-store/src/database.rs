use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};
use std::time::Duration;
use tracing::info;

use airlink_core::repository::StoreError;

use crate::app_config::DatabaseConfig;

pub(crate) fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<MySql>,
}

impl DbClient {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    /// Pool that connects on first use. Lets the router come up (and
    /// storage-free paths serve) without a reachable database.
    pub fn connect_lazy(url: &str) -> Result<Self, sqlx::Error> {
        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(3))
            .connect_lazy(url)?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}
