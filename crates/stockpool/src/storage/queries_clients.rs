//! Client queries.

use super::db::{Database, DatabaseError};
use super::models::Client;

impl Database {
    /// Insert a client. A duplicate phone surfaces as
    /// [`DatabaseError::UniqueViolation`].
    pub async fn create_client(
        &self,
        phone: &str,
        name: &str,
        now: i64,
    ) -> Result<Client, DatabaseError> {
        let result = sqlx::query("INSERT INTO clients (phone, name, created_at) VALUES (?, ?, ?)")
            .bind(phone)
            .bind(name)
            .bind(now)
            .execute(self.pool())
            .await?;

        self.get_client(result.last_insert_rowid()).await
    }

    /// Get a client by ID.
    pub async fn get_client(&self, id: i64) -> Result<Client, DatabaseError> {
        sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Client {id}")))
    }

    /// Look a client up by phone number.
    pub async fn get_client_by_phone(&self, phone: &str) -> Result<Option<Client>, DatabaseError> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE phone = ?")
            .bind(phone)
            .fetch_optional(self.pool())
            .await?;

        Ok(client)
    }

    /// Correct a client's display name.
    pub async fn update_client_name(&self, id: i64, name: &str) -> Result<Client, DatabaseError> {
        let result = sqlx::query("UPDATE clients SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Client {id}")));
        }
        self.get_client(id).await
    }
}
