use crate::models::service::{Service, ServiceFields};
use crate::repositories::{RepositoryError, ServiceRepository};
use crate::validation;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum CatalogServiceError {
    #[error("Title is required")]
    MissingTitle,
    #[error("Description is required")]
    MissingDescription,
    #[error("Duration must be at least one day")]
    InvalidDuration,
    #[error("Price must be a non-negative number")]
    InvalidPrice,
    #[error("Service not found")]
    NotFound,
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateServiceRequest {
    pub title: String,
    pub description: String,
    pub duration_days: i64,
    pub price: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update. A blank `notes` value clears the stored notes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateServiceRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_days: Option<i64>,
    pub price: Option<f64>,
    pub notes: Option<String>,
}

pub struct CatalogService {
    repository: Arc<dyn ServiceRepository>,
}

impl CatalogService {
    pub fn new(repository: Arc<dyn ServiceRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(
        &self,
        request: CreateServiceRequest,
    ) -> Result<Service, CatalogServiceError> {
        let fields = validate(ServiceFields {
            title: request.title,
            description: request.description,
            duration_days: request.duration_days,
            price: request.price,
            notes: request.notes,
        })?;

        let service = self.repository.create(&fields).await?;
        tracing::info!("Created service {} ({})", service.id, service.title);
        Ok(service)
    }

    pub async fn get(&self, id: i64) -> Result<Service, CatalogServiceError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(CatalogServiceError::NotFound)
    }

    pub async fn list(&self) -> Result<Vec<Service>, CatalogServiceError> {
        Ok(self.repository.list().await?)
    }

    pub async fn count(&self) -> Result<i64, CatalogServiceError> {
        Ok(self.repository.count().await?)
    }

    pub async fn update(
        &self,
        id: i64,
        request: UpdateServiceRequest,
    ) -> Result<Service, CatalogServiceError> {
        let mut fields = ServiceFields::from(&self.get(id).await?);

        if let Some(title) = request.title {
            fields.title = title;
        }
        if let Some(description) = request.description {
            fields.description = description;
        }
        if let Some(duration_days) = request.duration_days {
            fields.duration_days = duration_days;
        }
        if let Some(price) = request.price {
            fields.price = price;
        }
        if let Some(notes) = request.notes {
            fields.notes = Some(notes);
        }

        let fields = validate(fields)?;

        match self.repository.update(id, &fields).await {
            Ok(service) => Ok(service),
            Err(RepositoryError::NotFound) => Err(CatalogServiceError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, id: i64) -> Result<(), CatalogServiceError> {
        match self.repository.delete(id).await {
            Ok(()) => {
                tracing::info!("Deleted service {}", id);
                Ok(())
            }
            Err(RepositoryError::NotFound) => Err(CatalogServiceError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}

fn validate(fields: ServiceFields) -> Result<ServiceFields, CatalogServiceError> {
    let title = validation::non_blank(&fields.title).ok_or(CatalogServiceError::MissingTitle)?;
    let description = validation::non_blank(&fields.description)
        .ok_or(CatalogServiceError::MissingDescription)?;

    if fields.duration_days < 1 {
        return Err(CatalogServiceError::InvalidDuration);
    }
    if !fields.price.is_finite() || fields.price < 0.0 {
        return Err(CatalogServiceError::InvalidPrice);
    }

    Ok(ServiceFields {
        title,
        description,
        duration_days: fields.duration_days,
        price: fields.price,
        notes: fields.notes.as_deref().and_then(validation::non_blank),
    })
}
