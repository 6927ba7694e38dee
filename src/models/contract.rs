use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Index row for an uploaded contract file. The bytes live on disk under
/// the contracts directory as `stored_name`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contract {
    pub id: i64,
    pub user_id: i64,
    pub service_id: Option<i64>,
    pub original_name: String,
    #[serde(skip_serializing)]
    pub stored_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub sha256: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewContract {
    pub user_id: i64,
    pub service_id: Option<i64>,
    pub original_name: String,
    pub stored_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub sha256: String,
}
