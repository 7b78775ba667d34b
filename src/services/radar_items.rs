//! Data service for radar items

use sqlx::SqlitePool;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::models::radar_item::{NewRadarItem, RadarItem};

#[derive(Debug, Error)]
pub enum RadarItemsError {
    #[error("Database unavailable")]
    Unavailable,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Timed out closing database pool")]
    ShutdownTimedOut,
}

/// Handle to the radar item store.
///
/// Cloning is cheap; every clone shares the same pool. A service built
/// without a pool is degraded and fails every call with
/// [`RadarItemsError::Unavailable`].
#[derive(Clone, Debug)]
pub struct RadarItemsService {
    pool: Option<SqlitePool>,
}

impl RadarItemsService {
    #[must_use]
    pub const fn new(pool: Option<SqlitePool>) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.pool.is_none()
    }

    fn pool(&self) -> Result<&SqlitePool, RadarItemsError> {
        self.pool.as_ref().ok_or(RadarItemsError::Unavailable)
    }

    pub async fn list_open(&self) -> Result<Vec<RadarItem>, RadarItemsError> {
        Ok(RadarItem::list_open(self.pool()?).await?)
    }

    pub async fn create(&self, item: &NewRadarItem) -> Result<RadarItem, RadarItemsError> {
        Ok(RadarItem::save(item, self.pool()?).await?)
    }

    pub async fn get(&self, id: i64) -> Result<Option<RadarItem>, RadarItemsError> {
        Ok(RadarItem::find(self.pool()?, id).await?)
    }

    pub async fn archive(&self, ids: &[i64]) -> Result<u64, RadarItemsError> {
        Ok(RadarItem::archive(self.pool()?, ids).await?)
    }

    pub async fn delete(&self, id: i64) -> Result<bool, RadarItemsError> {
        Ok(RadarItem::delete(self.pool()?, id).await?)
    }

    /// Round-trips a trivial query.
    pub async fn ping(&self) -> Result<(), RadarItemsError> {
        sqlx::query("SELECT 1").execute(self.pool()?).await?;
        Ok(())
    }

    /// Closes the pool, waiting for checked-out connections until `deadline`.
    pub async fn shutdown(&self, deadline: Instant) -> Result<(), RadarItemsError> {
        let Some(pool) = &self.pool else {
            warn!("Database pool was never opened, nothing to close");
            return Ok(());
        };

        tokio::time::timeout_at(deadline, pool.close())
            .await
            .map_err(|_| RadarItemsError::ShutdownTimedOut)?;
        info!("Database pool closed");
        Ok(())
    }
}
