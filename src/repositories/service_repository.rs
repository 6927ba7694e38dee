use super::{RepositoryError, RepositoryResult};
use crate::models::service::{Service, ServiceFields};
use async_trait::async_trait;
use sqlx::SqlitePool;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ServiceRepository: Send + Sync {
    async fn create(&self, fields: &ServiceFields) -> RepositoryResult<Service>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Service>>;
    async fn list(&self) -> RepositoryResult<Vec<Service>>;
    async fn count(&self) -> RepositoryResult<i64>;
    async fn update(&self, id: i64, fields: &ServiceFields) -> RepositoryResult<Service>;
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}

pub struct SqliteServiceRepository {
    pool: SqlitePool,
}

impl SqliteServiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceRepository for SqliteServiceRepository {
    async fn create(&self, fields: &ServiceFields) -> RepositoryResult<Service> {
        let id = sqlx::query(
            r#"
            INSERT INTO services (title, description, duration_days, price, notes)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.duration_days)
        .bind(fields.price)
        .bind(&fields.notes)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Service>> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            SELECT id, title, description, duration_days, price, notes, created_at, updated_at
            FROM services
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(service)
    }

    async fn list(&self) -> RepositoryResult<Vec<Service>> {
        let services = sqlx::query_as::<_, Service>(
            r#"
            SELECT id, title, description, duration_days, price, notes, created_at, updated_at
            FROM services
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(services)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM services")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn update(&self, id: i64, fields: &ServiceFields) -> RepositoryResult<Service> {
        let result = sqlx::query(
            r#"
            UPDATE services
            SET title = ?, description = ?, duration_days = ?, price = ?, notes = ?,
                updated_at = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.duration_days)
        .bind(fields.price)
        .bind(&fields.notes)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM services WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
