use crate::auth::{AuthUser, ACCESS_TOKEN_COOKIE};
use crate::error::Result;
use crate::models::UserProfile;
use crate::services::{LoginRequest, RegisterRequest};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

fn build_access_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let secure_attr = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly{}; Path=/; Max-Age={}; SameSite=Lax",
        ACCESS_TOKEN_COOKIE,
        token,
        secure_attr,
        max_age_secs.max(0)
    )
}

fn cookie_headers(cookie: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(cookie) {
        headers.insert(header::SET_COOKIE, value);
    }
    headers
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "user": UserProfile::from(user),
            "message": "تم إنشاء الحساب. يرجى تأكيد بريدك الإلكتروني من خلال الرابط المرسل إليك.",
        })),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let user = state.auth_service.authenticate(request).await?;
    let token = state.auth_service.issue_token(&user)?;

    let cookie = build_access_cookie(
        &token,
        state.auth_service.token_ttl_seconds(),
        state.config.is_production(),
    );

    Ok((
        cookie_headers(&cookie),
        Json(LoginResponse {
            token,
            user: UserProfile::from(user),
        }),
    ))
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = build_access_cookie("", 0, state.config.is_production());
    (cookie_headers(&cookie), StatusCode::NO_CONTENT)
}

/// GET /api/auth/verify/{token}
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.verify_email_token(&token).await?;

    Ok(Json(json!({
        "message": "تم تأكيد البريد الإلكتروني بنجاح",
        "user": UserProfile::from(user),
    })))
}

/// POST /api/auth/resend-verification
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(request): Json<ResendVerificationRequest>,
) -> Result<impl IntoResponse> {
    state
        .user_service
        .resend_verification(&request.email)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "message": "إذا كان البريد مسجلاً وغير مؤكد فسيصلك رابط تأكيد جديد",
        })),
    ))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let user = state.auth_service.get_user_by_id(auth.id).await?;
    Ok(Json(UserProfile::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_cookie_attributes() {
        let cookie = build_access_cookie("abc", 3600, false);
        assert_eq!(
            cookie,
            "access_token=abc; HttpOnly; Path=/; Max-Age=3600; SameSite=Lax"
        );
        assert!(build_access_cookie("abc", 3600, true).contains("; Secure"));
        assert!(build_access_cookie("", -5, false).contains("Max-Age=0"));
    }
}
