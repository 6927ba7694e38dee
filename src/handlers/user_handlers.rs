use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::models::{Role, UserProfile};
use crate::services::{CreateUserRequest, UpdateUserRequest};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<Role>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserProfile>>> {
    auth.require_role(&[Role::Admin])?;

    let limit = query.limit.map(|l| l.clamp(1, 500));
    let offset = query.offset.map(|o| o.max(0));
    let users = state
        .user_service
        .list_users(query.role, limit, offset)
        .await?;

    Ok(Json(users.iter().map(UserProfile::from).collect()))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse> {
    auth.require_role(&[Role::Admin])?;

    let user = state.user_service.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(UserProfile::from(user))))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<UserProfile>> {
    auth.require_role(&[Role::Admin])?;

    let user = state.user_service.get_user(id).await?;
    Ok(Json(UserProfile::from(user)))
}

/// PUT /api/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserProfile>> {
    auth.require_role(&[Role::Admin])?;

    if id == auth.id {
        if matches!(request.role, Some(role) if role != Role::Admin) {
            return Err(AppError::Validation(
                "You cannot remove your own admin role".to_string(),
            ));
        }
        if request.is_active == Some(false) {
            return Err(AppError::Validation(
                "You cannot deactivate your own account".to_string(),
            ));
        }
    }

    let user = state.user_service.update_user(id, request).await?;
    tracing::info!("Admin {} updated user {}", auth.id, id);
    Ok(Json(UserProfile::from(user)))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    auth.require_role(&[Role::Admin])?;

    if id == auth.id {
        return Err(AppError::Validation(
            "You cannot delete your own account".to_string(),
        ));
    }

    state.user_service.get_user(id).await?;
    state.contract_service.delete_for_user(id).await?;
    state.user_service.delete_user(id).await?;
    tracing::info!("Admin {} deleted user {}", auth.id, id);
    Ok(StatusCode::NO_CONTENT)
}
