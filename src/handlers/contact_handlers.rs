use crate::error::{AppError, Result};
use crate::handlers::email_handlers::JsonResponse;
use crate::services::ContactMessage;
use crate::validation;
use crate::AppState;
use axum::{extract::State, Json};
use serde::Deserialize;

const MAX_MESSAGE_CHARS: usize = 5000;

#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

fn validate(form: ContactForm) -> std::result::Result<ContactMessage, AppError> {
    let name = validation::non_blank(&form.name)
        .ok_or_else(|| AppError::Validation("Name is required".to_string()))?;

    let email = form.email.trim().to_lowercase();
    if !validation::is_valid_email(&email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    let phone = match form.phone.as_deref().and_then(validation::non_blank) {
        Some(raw) => Some(validation::normalize_egyptian_mobile(&raw).ok_or_else(|| {
            AppError::Validation("Invalid Egyptian mobile number".to_string())
        })?),
        None => None,
    };

    let message = validation::non_blank(&form.message)
        .ok_or_else(|| AppError::Validation("Message is required".to_string()))?;
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::Validation(format!(
            "Message must be at most {} characters",
            MAX_MESSAGE_CHARS
        )));
    }

    Ok(ContactMessage {
        name,
        email,
        phone,
        message,
    })
}

/// POST /api/contact
pub async fn submit_contact_form(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> Result<Json<JsonResponse>> {
    let contact = validate(form)?;

    state.email_service.send_contact_form(&contact).await?;
    tracing::info!("Contact form submitted by {}", contact.email);

    Ok(Json(JsonResponse {
        success: true,
        message: "شكراً لتواصلك معنا، سنرد عليك قريباً".to_string(),
    }))
}
