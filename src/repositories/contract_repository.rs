use super::{map_write_error, RepositoryError, RepositoryResult};
use crate::models::contract::{Contract, NewContract};
use async_trait::async_trait;
use sqlx::SqlitePool;

const CONTRACT_COLUMNS: &str = "id, user_id, service_id, original_name, stored_name, \
     content_type, size_bytes, sha256, created_at";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ContractRepository: Send + Sync {
    async fn create(&self, contract: &NewContract) -> RepositoryResult<Contract>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Contract>>;
    async fn list_all(&self) -> RepositoryResult<Vec<Contract>>;
    async fn list_for_user(&self, user_id: i64) -> RepositoryResult<Vec<Contract>>;
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}

pub struct SqliteContractRepository {
    pool: SqlitePool,
}

impl SqliteContractRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContractRepository for SqliteContractRepository {
    async fn create(&self, contract: &NewContract) -> RepositoryResult<Contract> {
        let id = sqlx::query(
            r#"
            INSERT INTO contracts
                (user_id, service_id, original_name, stored_name, content_type, size_bytes, sha256)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(contract.user_id)
        .bind(contract.service_id)
        .bind(&contract.original_name)
        .bind(&contract.stored_name)
        .bind(&contract.content_type)
        .bind(contract.size_bytes)
        .bind(&contract.sha256)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?
        .last_insert_rowid();

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Contract>> {
        let sql = format!("SELECT {} FROM contracts WHERE id = ?", CONTRACT_COLUMNS);
        let contract = sqlx::query_as::<_, Contract>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(contract)
    }

    async fn list_all(&self) -> RepositoryResult<Vec<Contract>> {
        let sql = format!("SELECT {} FROM contracts ORDER BY id DESC", CONTRACT_COLUMNS);
        let contracts = sqlx::query_as::<_, Contract>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(contracts)
    }

    async fn list_for_user(&self, user_id: i64) -> RepositoryResult<Vec<Contract>> {
        let sql = format!(
            "SELECT {} FROM contracts WHERE user_id = ? ORDER BY id DESC",
            CONTRACT_COLUMNS
        );
        let contracts = sqlx::query_as::<_, Contract>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(contracts)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM contracts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
