use crate::auth::{optional_user, AuthUser};
use crate::error::AppError;
use crate::models::{Contract, Role, Service, SupervisorDelegateView, UserProfile};
use crate::services::Requester;
use crate::AppState;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use axum_extra::extract::cookie::CookieJar;

type PageResult = Result<Response, Response>;

#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
struct ErrorTemplate {
    nav_user: Option<String>,
    title: String,
    message: String,
}

/// Renders a failure as an HTML page; internal details only reach the log.
fn error_page(err: impl Into<AppError>) -> Response {
    let err = err.into();
    let status = err.status_code();
    let message = match status {
        StatusCode::NOT_FOUND => "الصفحة أو العنصر المطلوب غير موجود".to_string(),
        StatusCode::FORBIDDEN => "ليس لديك صلاحية للوصول إلى هذه الصفحة".to_string(),
        _ => {
            tracing::error!("Page rendering failed: {}", err);
            "حدث خطأ غير متوقع، يرجى المحاولة لاحقاً".to_string()
        }
    };

    (
        status,
        ErrorTemplate {
            nav_user: None,
            title: "خطأ".to_string(),
            message,
        },
    )
        .into_response()
}

fn require_page_role(auth: &AuthUser, role: Role) -> Result<(), Response> {
    if auth.role == role {
        Ok(())
    } else {
        Err(Redirect::to("/dashboard").into_response())
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
struct IndexTemplate {
    nav_user: Option<String>,
    services: Vec<Service>,
}

/// GET /
pub async fn index(State(state): State<AppState>, headers: HeaderMap, jar: CookieJar) -> PageResult {
    let nav_user = optional_user(&state, &headers, &jar).await.map(|u| u.name);
    let services = state.catalog_service.list().await.map_err(error_page)?;

    Ok(IndexTemplate { nav_user, services }.into_response())
}

#[derive(Template, WebTemplate)]
#[template(path = "service_detail.html")]
struct ServiceDetailTemplate {
    nav_user: Option<String>,
    service: Service,
}

/// GET /services/{id}
pub async fn service_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> PageResult {
    let nav_user = optional_user(&state, &headers, &jar).await.map(|u| u.name);
    let service = state.catalog_service.get(id).await.map_err(error_page)?;

    Ok(ServiceDetailTemplate { nav_user, service }.into_response())
}

#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
struct LoginTemplate {
    nav_user: Option<String>,
}

/// GET /login
pub async fn login_page(State(state): State<AppState>, headers: HeaderMap, jar: CookieJar) -> Response {
    if optional_user(&state, &headers, &jar).await.is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    LoginTemplate { nav_user: None }.into_response()
}

#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
struct RegisterTemplate {
    nav_user: Option<String>,
}

/// GET /register
pub async fn register_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    if optional_user(&state, &headers, &jar).await.is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    RegisterTemplate { nav_user: None }.into_response()
}

#[derive(Template, WebTemplate)]
#[template(path = "verify_result.html")]
struct VerifyResultTemplate {
    nav_user: Option<String>,
    success: bool,
    name: String,
}

/// GET /auth/verify/{token}
pub async fn verify_page(State(state): State<AppState>, Path(token): Path<String>) -> Response {
    match state.user_service.verify_email_token(&token).await {
        Ok(user) => VerifyResultTemplate {
            nav_user: None,
            success: true,
            name: user.name,
        }
        .into_response(),
        Err(e) => {
            tracing::debug!("Verification link rejected: {}", e);
            (
                StatusCode::NOT_FOUND,
                VerifyResultTemplate {
                    nav_user: None,
                    success: false,
                    name: String::new(),
                },
            )
                .into_response()
        }
    }
}

/// GET /dashboard
pub async fn dashboard(Extension(auth): Extension<AuthUser>) -> Redirect {
    Redirect::to(auth.role.home_path())
}

#[derive(Template, WebTemplate)]
#[template(path = "account.html")]
struct AccountTemplate {
    nav_user: Option<String>,
    user: UserProfile,
    contracts: Vec<Contract>,
    services: Vec<Service>,
}

/// GET /account
pub async fn account(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> PageResult {
    let user = state
        .auth_service
        .get_user_by_id(auth.id)
        .await
        .map_err(error_page)?;
    let contracts = state
        .contract_service
        .list_for_user(auth.id)
        .await
        .map_err(error_page)?;
    let services = state.catalog_service.list().await.map_err(error_page)?;

    Ok(AccountTemplate {
        nav_user: Some(auth.name),
        user: UserProfile::from(user),
        contracts,
        services,
    }
    .into_response())
}

#[derive(Template, WebTemplate)]
#[template(path = "admin.html")]
struct AdminTemplate {
    nav_user: Option<String>,
    users: Vec<UserProfile>,
    services: Vec<Service>,
    links: Vec<SupervisorDelegateView>,
    contracts: Vec<Contract>,
    user_count: i64,
}

/// GET /admin
pub async fn admin(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> PageResult {
    require_page_role(&auth, Role::Admin)?;

    let users = state
        .user_service
        .list_users(None, Some(100), None)
        .await
        .map_err(error_page)?;
    let user_count = state.user_service.count_users().await.map_err(error_page)?;
    let services = state.catalog_service.list().await.map_err(error_page)?;
    let links = state
        .supervision_service
        .list_links()
        .await
        .map_err(error_page)?;
    let contracts = state
        .contract_service
        .list_visible(Requester {
            user_id: auth.id,
            is_admin: true,
        })
        .await
        .map_err(error_page)?;

    Ok(AdminTemplate {
        nav_user: Some(auth.name),
        users: users.iter().map(UserProfile::from).collect(),
        services,
        links,
        contracts,
        user_count,
    }
    .into_response())
}

#[derive(Template, WebTemplate)]
#[template(path = "supervisor.html")]
struct SupervisorTemplate {
    nav_user: Option<String>,
    delegates: Vec<UserProfile>,
}

/// GET /supervisor
pub async fn supervisor(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> PageResult {
    require_page_role(&auth, Role::Supervisor)?;

    let delegates = state
        .supervision_service
        .delegates_of(auth.id)
        .await
        .map_err(error_page)?;

    Ok(SupervisorTemplate {
        nav_user: Some(auth.name),
        delegates: delegates.iter().map(UserProfile::from).collect(),
    }
    .into_response())
}

#[derive(Template, WebTemplate)]
#[template(path = "delegate.html")]
struct DelegateTemplate {
    nav_user: Option<String>,
    supervisors: Vec<UserProfile>,
    services: Vec<Service>,
}

/// GET /delegate
pub async fn delegate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> PageResult {
    require_page_role(&auth, Role::Delegate)?;

    let supervisors = state
        .supervision_service
        .supervisors_of(auth.id)
        .await
        .map_err(error_page)?;
    let services = state.catalog_service.list().await.map_err(error_page)?;

    Ok(DelegateTemplate {
        nav_user: Some(auth.name),
        supervisors: supervisors.iter().map(UserProfile::from).collect(),
        services,
    }
    .into_response())
}

/// Fallback for unknown paths outside `/api`.
pub async fn not_found() -> Response {
    error_page(AppError::NotFound("Page not found".to_string()))
}
