use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use crate::repository::{SessionRecord, SessionStore, StorageError};
use guided_core::model::AuthToken;

use super::SqliteRepository;

#[async_trait]
impl SessionStore for SqliteRepository {
    async fn save_session(&self, record: &SessionRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO session (id, token, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                token = excluded.token,
                saved_at = excluded.saved_at
            ",
        )
        .bind(1_i64)
        .bind(record.token.as_str())
        .bind(record.saved_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn load_session(&self) -> Result<Option<SessionRecord>, StorageError> {
        let row = sqlx::query("SELECT token, saved_at FROM session WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let token: String = row
            .try_get("token")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let saved_at: String = row
            .try_get("saved_at")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        let token = AuthToken::new(token)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let saved_at = DateTime::parse_from_rfc3339(&saved_at)
            .map_err(|err| StorageError::Serialization(err.to_string()))?
            .with_timezone(&Utc);

        Ok(Some(SessionRecord::new(token, saved_at)))
    }

    async fn clear_session(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM session WHERE id = 1")
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
