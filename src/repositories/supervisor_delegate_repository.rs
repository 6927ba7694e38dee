use super::{map_write_error, RepositoryError, RepositoryResult};
use crate::models::supervisor_delegate::{SupervisorDelegate, SupervisorDelegateView};
use crate::models::user::{User, UserRow};
use async_trait::async_trait;
use sqlx::SqlitePool;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait SupervisorDelegateRepository: Send + Sync {
    async fn create(&self, supervisor_id: i64, delegate_id: i64)
        -> RepositoryResult<SupervisorDelegate>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<SupervisorDelegate>>;
    async fn list_all(&self) -> RepositoryResult<Vec<SupervisorDelegateView>>;
    async fn delegates_of(&self, supervisor_id: i64) -> RepositoryResult<Vec<User>>;
    async fn supervisors_of(&self, delegate_id: i64) -> RepositoryResult<Vec<User>>;
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}

pub struct SqliteSupervisorDelegateRepository {
    pool: SqlitePool,
}

impl SqliteSupervisorDelegateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn linked_users(&self, sql: &str, id: i64) -> RepositoryResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| User::try_from(row).map_err(|e| RepositoryError::Corrupt(e.to_string())))
            .collect()
    }
}

#[async_trait]
impl SupervisorDelegateRepository for SqliteSupervisorDelegateRepository {
    async fn create(
        &self,
        supervisor_id: i64,
        delegate_id: i64,
    ) -> RepositoryResult<SupervisorDelegate> {
        let id = sqlx::query(
            "INSERT INTO supervisor_delegates (supervisor_id, delegate_id) VALUES (?, ?)",
        )
        .bind(supervisor_id)
        .bind(delegate_id)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?
        .last_insert_rowid();

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<SupervisorDelegate>> {
        let link = sqlx::query_as::<_, SupervisorDelegate>(
            "SELECT id, supervisor_id, delegate_id, created_at FROM supervisor_delegates WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(link)
    }

    async fn list_all(&self) -> RepositoryResult<Vec<SupervisorDelegateView>> {
        let links = sqlx::query_as::<_, SupervisorDelegateView>(
            r#"
            SELECT
                sd.id,
                sd.supervisor_id,
                s.name AS supervisor_name,
                s.email AS supervisor_email,
                sd.delegate_id,
                d.name AS delegate_name,
                d.email AS delegate_email,
                sd.created_at
            FROM supervisor_delegates sd
            JOIN users s ON s.id = sd.supervisor_id
            JOIN users d ON d.id = sd.delegate_id
            ORDER BY sd.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    async fn delegates_of(&self, supervisor_id: i64) -> RepositoryResult<Vec<User>> {
        self.linked_users(
            r#"
            SELECT u.id, u.name, u.country, u.phone, u.national_id, u.email, u.password_hash,
                   u.role, u.is_active, u.verification_token, u.email_verified,
                   u.created_at, u.updated_at
            FROM supervisor_delegates sd
            JOIN users u ON u.id = sd.delegate_id
            WHERE sd.supervisor_id = ?
            ORDER BY u.name ASC
            "#,
            supervisor_id,
        )
        .await
    }

    async fn supervisors_of(&self, delegate_id: i64) -> RepositoryResult<Vec<User>> {
        self.linked_users(
            r#"
            SELECT u.id, u.name, u.country, u.phone, u.national_id, u.email, u.password_hash,
                   u.role, u.is_active, u.verification_token, u.email_verified,
                   u.created_at, u.updated_at
            FROM supervisor_delegates sd
            JOIN users u ON u.id = sd.supervisor_id
            WHERE sd.delegate_id = ?
            ORDER BY u.name ASC
            "#,
            delegate_id,
        )
        .await
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM supervisor_delegates WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
