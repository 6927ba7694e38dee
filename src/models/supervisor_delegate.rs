use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct SupervisorDelegate {
    pub id: i64,
    pub supervisor_id: i64,
    pub delegate_id: i64,
    pub created_at: String,
}

/// Link joined with both users' names and emails, for listings.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct SupervisorDelegateView {
    pub id: i64,
    pub supervisor_id: i64,
    pub supervisor_name: String,
    pub supervisor_email: String,
    pub delegate_id: i64,
    pub delegate_name: String,
    pub delegate_email: String,
    pub created_at: String,
}
