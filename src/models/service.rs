use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A purchasable offering listed in the catalog.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration_days: i64,
    pub price: f64,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Validated field set written by the repository on insert and update.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceFields {
    pub title: String,
    pub description: String,
    pub duration_days: i64,
    pub price: f64,
    pub notes: Option<String>,
}

impl From<&Service> for ServiceFields {
    fn from(service: &Service) -> Self {
        ServiceFields {
            title: service.title.clone(),
            description: service.description.clone(),
            duration_days: service.duration_days,
            price: service.price,
            notes: service.notes.clone(),
        }
    }
}
