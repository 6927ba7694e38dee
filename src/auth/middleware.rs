use crate::{error::AppError, models::user::Role, services::AuthServiceError, AppState};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Identity attached to the request extensions once the token checks out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
    pub name: String,
}

impl AuthUser {
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, PartialEq, Eq)]
enum TokenSource {
    Missing,
    Malformed,
    Found(String),
}

/// Authorization header first, then the `access_token` cookie set at login.
fn extract_token(headers: &HeaderMap, jar: &CookieJar) -> TokenSource {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let Ok(value) = value.to_str() else {
            return TokenSource::Malformed;
        };
        return match value.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => TokenSource::Found(token.trim().to_string()),
            _ => TokenSource::Malformed,
        };
    }

    match jar.get(ACCESS_TOKEN_COOKIE) {
        Some(cookie) if !cookie.value().is_empty() => TokenSource::Found(cookie.value().to_string()),
        _ => TokenSource::Missing,
    }
}

/// Verifies the token, then reloads the account so deletions, deactivation
/// and role changes apply to tokens that are still within their lifetime.
async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
    jar: &CookieJar,
) -> Result<AuthUser, AppError> {
    let token = match extract_token(headers, jar) {
        TokenSource::Found(token) => token,
        TokenSource::Missing => {
            return Err(AppError::Unauthorized("Authorization token is required".into()))
        }
        TokenSource::Malformed => {
            return Err(AppError::Unauthorized(
                "Authorization header must be 'Bearer <token>'".into(),
            ))
        }
    };

    let claims = state.auth_service.verify_token(&token)?;
    let id = claims.user_id()?;

    let user = match state.auth_service.get_user_by_id(id).await {
        Ok(user) => user,
        Err(AuthServiceError::UserNotFound) => {
            return Err(AppError::Unauthorized("Account no longer exists".into()))
        }
        Err(e) => return Err(e.into()),
    };
    if !user.is_active {
        return Err(AppError::Unauthorized("Account is disabled".into()));
    }

    Ok(AuthUser {
        id: user.id,
        role: user.role,
        name: user.name,
    })
}

/// Identity of the visitor when a valid token is present, for public pages
/// that only adapt their navigation.
pub async fn optional_user(
    state: &AppState,
    headers: &HeaderMap,
    jar: &CookieJar,
) -> Option<AuthUser> {
    authenticate(state, headers, jar).await.ok()
}

/// API guard: a valid token is forwarded with [`AuthUser`] in the request
/// extensions, anything else gets a 401 JSON body.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&state, request.headers(), &jar).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Page guard: same check, but unauthenticated visitors are sent to the
/// login page instead of receiving JSON.
pub async fn require_page_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers(), &jar).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(_) => Redirect::to("/login").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn prefers_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        let jar = CookieJar::new().add(Cookie::new(ACCESS_TOKEN_COOKIE, "from-cookie"));

        assert_eq!(extract_token(&headers, &jar), TokenSource::Found("abc".into()));
    }

    #[test]
    fn falls_back_to_cookie() {
        let jar = CookieJar::new().add(Cookie::new(ACCESS_TOKEN_COOKIE, "from-cookie"));
        assert_eq!(
            extract_token(&HeaderMap::new(), &jar),
            TokenSource::Found("from-cookie".into())
        );
    }

    #[test]
    fn non_bearer_scheme_is_malformed() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert_eq!(extract_token(&headers, &CookieJar::new()), TokenSource::Malformed);
    }

    #[test]
    fn nothing_is_missing() {
        assert_eq!(
            extract_token(&HeaderMap::new(), &CookieJar::new()),
            TokenSource::Missing
        );
    }

    #[test]
    fn role_gate() {
        let user = AuthUser {
            id: 1,
            role: Role::Supervisor,
            name: "x".into(),
        };
        assert!(user.require_role(&[Role::Admin, Role::Supervisor]).is_ok());
        assert!(matches!(
            user.require_role(&[Role::Admin]),
            Err(AppError::Forbidden)
        ));
    }
}
