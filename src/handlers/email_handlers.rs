use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::models::Role;
use crate::validation;
use crate::AppState;
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct DriveLinkRequest {
    pub email: String,
    pub name: Option<String>,
    pub drive_link: String,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/send-drive-link
pub async fn send_drive_link(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<DriveLinkRequest>,
) -> Result<Json<JsonResponse>> {
    auth.require_role(&[Role::Admin, Role::Supervisor])?;

    let email = request.email.trim().to_lowercase();
    if !validation::is_valid_email(&email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    let drive_link = request.drive_link.trim();
    if !validation::is_valid_drive_link(drive_link) {
        return Err(AppError::Validation(
            "Link must be a https://drive.google.com or https://docs.google.com URL".to_string(),
        ));
    }

    let name = request.name.as_deref().and_then(validation::non_blank);
    let note = request.note.as_deref().and_then(validation::non_blank);

    state
        .email_service
        .send_drive_link(&email, name.as_deref(), drive_link, note.as_deref())
        .await?;

    tracing::info!("User {} sent a drive link to {}", auth.id, email);

    Ok(Json(JsonResponse {
        success: true,
        message: "تم إرسال الرابط بنجاح".to_string(),
    }))
}
