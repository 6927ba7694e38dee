use crate::auth::AuthUser;
use crate::error::Result;
use crate::models::{Role, Service};
use crate::services::{CreateServiceRequest, UpdateServiceRequest};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

/// GET /api/services
pub async fn list_services(State(state): State<AppState>) -> Result<Json<Vec<Service>>> {
    Ok(Json(state.catalog_service.list().await?))
}

/// GET /api/services/{id}
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Service>> {
    Ok(Json(state.catalog_service.get(id).await?))
}

/// POST /api/services
pub async fn create_service(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<CreateServiceRequest>,
) -> Result<impl IntoResponse> {
    auth.require_role(&[Role::Admin])?;

    let service = state.catalog_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// PUT /api/services/{id}
pub async fn update_service(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateServiceRequest>,
) -> Result<Json<Service>> {
    auth.require_role(&[Role::Admin])?;

    Ok(Json(state.catalog_service.update(id, request).await?))
}

/// DELETE /api/services/{id}
pub async fn delete_service(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    auth.require_role(&[Role::Admin])?;

    state.catalog_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
