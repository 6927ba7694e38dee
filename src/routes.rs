use crate::auth::{require_auth, require_page_auth};
use crate::error::AppError;
use crate::handlers::{
    auth_handlers, contact_handlers, contract_handlers, email_handlers, health_handlers,
    page_handlers, service_handlers, supervision_handlers, user_handlers,
};
use crate::middleware::add_security_headers;
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Room for multipart boundaries and the small text fields next to the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let auth = middleware::from_fn_with_state(state.clone(), require_auth);
    let page_auth = middleware::from_fn_with_state(state.clone(), require_page_auth);
    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    // Catalog reads are public, writes need a token
    let catalog_routes = Router::new()
        .route(
            "/api/services",
            get(service_handlers::list_services)
                .merge(post(service_handlers::create_service).route_layer(auth.clone())),
        )
        .route(
            "/api/services/{id}",
            get(service_handlers::get_service).merge(
                put(service_handlers::update_service)
                    .delete(service_handlers::delete_service)
                    .route_layer(auth.clone()),
            ),
        );

    let public_api = Router::new()
        .route("/api/health", get(health_handlers::health))
        .route("/api/test-db", get(health_handlers::test_db))
        .route("/api/auth/register", post(auth_handlers::register))
        .route("/api/auth/login", post(auth_handlers::login))
        .route("/api/auth/logout", post(auth_handlers::logout))
        .route("/api/auth/verify/{token}", get(auth_handlers::verify_email))
        .route(
            "/api/auth/resend-verification",
            post(auth_handlers::resend_verification),
        )
        .route("/api/contact", post(contact_handlers::submit_contact_form));

    let protected_api = Router::new()
        .route("/api/auth/me", get(auth_handlers::me))
        .route(
            "/api/users",
            get(user_handlers::list_users).post(user_handlers::create_user),
        )
        .route(
            "/api/users/{id}",
            get(user_handlers::get_user)
                .put(user_handlers::update_user)
                .delete(user_handlers::delete_user),
        )
        .route(
            "/api/supervisor-delegates",
            get(supervision_handlers::list_links).post(supervision_handlers::assign),
        )
        .route(
            "/api/supervisor-delegates/{id}",
            delete(supervision_handlers::unassign),
        )
        .route(
            "/api/supervisors/{id}/delegates",
            get(supervision_handlers::delegates_of),
        )
        .route(
            "/api/delegates/{id}/supervisors",
            get(supervision_handlers::supervisors_of),
        )
        .route(
            "/api/contracts/upload",
            post(contract_handlers::upload_contract).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/contracts", get(contract_handlers::list_contracts))
        .route(
            "/api/contracts/{id}/download",
            get(contract_handlers::download_contract),
        )
        .route(
            "/api/contracts/{id}",
            delete(contract_handlers::delete_contract),
        )
        .route(
            "/api/send-drive-link",
            post(email_handlers::send_drive_link),
        )
        .route_layer(auth);

    let api = Router::new()
        .merge(public_api)
        .merge(catalog_routes)
        .merge(protected_api)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let public_pages = Router::new()
        .route("/", get(page_handlers::index))
        .route("/services/{id}", get(page_handlers::service_detail))
        .route("/login", get(page_handlers::login_page))
        .route("/register", get(page_handlers::register_page))
        .route("/auth/verify/{token}", get(page_handlers::verify_page));

    let protected_pages = Router::new()
        .route("/dashboard", get(page_handlers::dashboard))
        .route("/account", get(page_handlers::account))
        .route("/admin", get(page_handlers::admin))
        .route("/supervisor", get(page_handlers::supervisor))
        .route("/delegate", get(page_handlers::delegate))
        .route_layer(page_auth);

    Router::new()
        .merge(api)
        .merge(public_pages)
        .merge(protected_pages)
        .nest_service("/static", ServeDir::new("static"))
        .fallback(fallback)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            add_security_headers,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn fallback(uri: Uri) -> Response {
    if uri.path().starts_with("/api/") {
        AppError::NotFound(format!("No route for {}", uri.path())).into_response()
    } else {
        page_handlers::not_found().await
    }
}
