use super::{map_write_error, RepositoryError, RepositoryResult};
use crate::models::user::{NewUser, ProfileFields, Role, User, UserRow};
use async_trait::async_trait;
use sqlx::SqlitePool;

const USER_COLUMNS: &str = "id, name, country, phone, national_id, email, password_hash, role, \
     is_active, verification_token, email_verified, created_at, updated_at";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &NewUser) -> RepositoryResult<User>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;
    async fn find_by_verification_token(&self, token: &str) -> RepositoryResult<Option<User>>;
    async fn list_users(
        &self,
        role: Option<Role>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> RepositoryResult<Vec<User>>;
    async fn count_users(&self) -> RepositoryResult<i64>;
    async fn update_profile(&self, id: i64, fields: &ProfileFields) -> RepositoryResult<()>;
    async fn update_password(&self, id: i64, password_hash: &str) -> RepositoryResult<()>;
    async fn set_verification_token(&self, id: i64, token: &str) -> RepositoryResult<()>;
    async fn mark_email_verified(&self, id: i64) -> RepositoryResult<()>;
    async fn delete_user(&self, id: i64) -> RepositoryResult<()>;
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, clause: &str, value: &str) -> RepositoryResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE {} = ?", USER_COLUMNS, clause);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from)
            .transpose()
            .map_err(|e| RepositoryError::Corrupt(e.to_string()))
    }
}

fn expect_affected(rows: u64) -> RepositoryResult<()> {
    if rows == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create_user(&self, user: &NewUser) -> RepositoryResult<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users
                (name, country, phone, national_id, email, password_hash, role,
                 is_active, email_verified, verification_token)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.name)
        .bind(&user.country)
        .bind(&user.phone)
        .bind(&user.national_id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.email_verified)
        .bind(&user.verification_token)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        let id = result.last_insert_rowid();
        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        self.fetch_one_where("email", email).await
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from)
            .transpose()
            .map_err(|e| RepositoryError::Corrupt(e.to_string()))
    }

    async fn find_by_verification_token(&self, token: &str) -> RepositoryResult<Option<User>> {
        self.fetch_one_where("verification_token", token).await
    }

    async fn list_users(
        &self,
        role: Option<Role>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> RepositoryResult<Vec<User>> {
        let limit = limit.unwrap_or(100);
        let offset = offset.unwrap_or(0);

        let rows = match role {
            Some(role) => {
                let sql = format!(
                    "SELECT {} FROM users WHERE role = ? ORDER BY id DESC LIMIT ? OFFSET ?",
                    USER_COLUMNS
                );
                sqlx::query_as::<_, UserRow>(&sql)
                    .bind(role.as_str())
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM users ORDER BY id DESC LIMIT ? OFFSET ?",
                    USER_COLUMNS
                );
                sqlx::query_as::<_, UserRow>(&sql)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter()
            .map(|row| User::try_from(row).map_err(|e| RepositoryError::Corrupt(e.to_string())))
            .collect()
    }

    async fn count_users(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn update_profile(&self, id: i64, fields: &ProfileFields) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = ?, country = ?, phone = ?, national_id = ?, email = ?,
                role = ?, is_active = ?, updated_at = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.country)
        .bind(&fields.phone)
        .bind(&fields.national_id)
        .bind(&fields.email)
        .bind(fields.role.as_str())
        .bind(fields.is_active)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;
        expect_affected(result.rows_affected())?;

        // Links only hold while each side keeps its role.
        let dropped = sqlx::query(
            r#"
            DELETE FROM supervisor_delegates
            WHERE (supervisor_id = ? AND ? <> 'supervisor')
               OR (delegate_id = ? AND ? <> 'delegate')
            "#,
        )
        .bind(id)
        .bind(fields.role.as_str())
        .bind(id)
        .bind(fields.role.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        if dropped > 0 {
            tracing::info!("Dropped {} supervision link(s) after role change of user {}", dropped, id);
        }
        Ok(())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await?;

        expect_affected(result.rows_affected())
    }

    async fn set_verification_token(&self, id: i64, token: &str) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE users SET verification_token = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(token)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        expect_affected(result.rows_affected())
    }

    async fn mark_email_verified(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email_verified = 1, verification_token = NULL, updated_at = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        expect_affected(result.rows_affected())
    }

    async fn delete_user(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        expect_affected(result.rows_affected())
    }
}
