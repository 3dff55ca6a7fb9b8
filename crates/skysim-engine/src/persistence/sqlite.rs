//! SQLite-backed position store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skysim_core::PositionFix;

use crate::errors::PersistenceError;
use crate::persistence::{Database, PositionStore};

/// Durable position log on SQLite.
#[derive(Clone)]
pub struct SqlitePositionStore {
    db: Database,
}

impl SqlitePositionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PositionStore for SqlitePositionStore {
    async fn last_position(
        &self,
        flight_id: &str,
    ) -> Result<Option<PositionFix>, PersistenceError> {
        let row = sqlx::query_as::<_, PositionRow>(
            "SELECT lat, lng, heading, altitude, speed, recorded_at
             FROM position_log WHERE flight_id = ?1
             ORDER BY id DESC LIMIT 1",
        )
        .bind(flight_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn append_position(
        &self,
        flight_id: &str,
        fix: &PositionFix,
        cap: usize,
    ) -> Result<(), PersistenceError> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            "INSERT INTO position_log (flight_id, lat, lng, heading, altitude, speed, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(flight_id)
        .bind(fix.lat)
        .bind(fix.lng)
        .bind(fix.heading)
        .bind(fix.altitude)
        .bind(fix.speed)
        .bind(fix.timestamp.timestamp_millis())
        .execute(&mut *tx)
        .await?;

        // Trim to the most recent `cap` entries, oldest dropped first.
        sqlx::query(
            "DELETE FROM position_log
             WHERE flight_id = ?1
               AND id NOT IN (
                   SELECT id FROM position_log WHERE flight_id = ?1
                   ORDER BY id DESC LIMIT ?2
               )",
        )
        .bind(flight_id)
        .bind(cap as i64)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn positions(&self, flight_id: &str) -> Result<Vec<PositionFix>, PersistenceError> {
        let rows = sqlx::query_as::<_, PositionRow>(
            "SELECT lat, lng, heading, altitude, speed, recorded_at
             FROM position_log WHERE flight_id = ?1 ORDER BY id ASC",
        )
        .bind(flight_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn positions_between(
        &self,
        flight_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PositionFix>, PersistenceError> {
        let rows = sqlx::query_as::<_, PositionRow>(
            "SELECT lat, lng, heading, altitude, speed, recorded_at
             FROM position_log
             WHERE flight_id = ?1 AND recorded_at >= ?2 AND recorded_at <= ?3
             ORDER BY id ASC",
        )
        .bind(flight_id)
        .bind(from.timestamp_millis())
        .bind(to.timestamp_millis())
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, PersistenceError> {
        let result = sqlx::query("DELETE FROM position_log WHERE recorded_at < ?1")
            .bind(cutoff.timestamp_millis())
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected())
    }
}

// Internal row type for SQLx
#[derive(sqlx::FromRow)]
struct PositionRow {
    lat: f64,
    lng: f64,
    heading: f64,
    altitude: f64,
    speed: f64,
    recorded_at: i64,
}

impl From<PositionRow> for PositionFix {
    fn from(row: PositionRow) -> Self {
        PositionFix {
            lat: row.lat,
            lng: row.lng,
            heading: row.heading,
            altitude: row.altitude,
            speed: row.speed,
            timestamp: DateTime::from_timestamp_millis(row.recorded_at).unwrap_or_else(Utc::now),
        }
    }
}
