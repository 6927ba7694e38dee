use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::models::{Role, SupervisorDelegate, SupervisorDelegateView, UserProfile};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub supervisor_id: i64,
    pub delegate_id: i64,
}

/// GET /api/supervisor-delegates
pub async fn list_links(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<SupervisorDelegateView>>> {
    auth.require_role(&[Role::Admin])?;

    Ok(Json(state.supervision_service.list_links().await?))
}

/// POST /api/supervisor-delegates
pub async fn assign(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<AssignRequest>,
) -> Result<impl IntoResponse> {
    auth.require_role(&[Role::Admin])?;

    let link: SupervisorDelegate = state
        .supervision_service
        .assign(request.supervisor_id, request.delegate_id)
        .await?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// DELETE /api/supervisor-delegates/{id}
pub async fn unassign(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    auth.require_role(&[Role::Admin])?;

    state.supervision_service.unassign(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/supervisors/{id}/delegates
pub async fn delegates_of(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(supervisor_id): Path<i64>,
) -> Result<Json<Vec<UserProfile>>> {
    if !auth.is_admin() && !(auth.role == Role::Supervisor && auth.id == supervisor_id) {
        return Err(AppError::Forbidden);
    }

    let delegates = state.supervision_service.delegates_of(supervisor_id).await?;
    Ok(Json(delegates.iter().map(UserProfile::from).collect()))
}

/// GET /api/delegates/{id}/supervisors
pub async fn supervisors_of(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(delegate_id): Path<i64>,
) -> Result<Json<Vec<UserProfile>>> {
    if !auth.is_admin() && !(auth.role == Role::Delegate && auth.id == delegate_id) {
        return Err(AppError::Forbidden);
    }

    let supervisors = state.supervision_service.supervisors_of(delegate_id).await?;
    Ok(Json(supervisors.iter().map(UserProfile::from).collect()))
}
