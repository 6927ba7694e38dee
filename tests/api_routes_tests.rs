use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use taalim::{
    models::Role,
    routes,
    test_utils::test_helpers::{self, TestApp},
};
use tower::ServiceExt;

async fn setup() -> (TestApp, Router) {
    let app = test_helpers::create_test_app().await.unwrap();
    let router = routes::build_router(app.state.clone());
    (app, router)
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> anyhow::Result<Value> {
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&body)?)
}

async fn login(router: &Router, email: &str, password: &str) -> anyhow::Result<String> {
    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": email, "password": password }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    Ok(body["token"].as_str().unwrap_or_default().to_string())
}

async fn user_with_token(
    app: &TestApp,
    router: &Router,
    email: &str,
    role: Role,
) -> anyhow::Result<(i64, String)> {
    let id = test_helpers::insert_test_user(&app.state.pool, email, "password123", role, true).await?;
    let token = login(router, email, "password123").await?;
    Ok((id, token))
}

#[tokio::test]
async fn test_register_then_verify_then_login() -> anyhow::Result<()> {
    let (app, router) = setup().await;

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/auth/register",
            None,
            json!({
                "name": "سارة علي",
                "country": "مصر",
                "phone": "01098765432",
                "national_id": "30001011234567",
                "email": "sara@example.com",
                "password": "password123",
                "password_confirm": "password123"
            }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await?;
    assert_eq!(body["user"]["email"], "sara@example.com");
    assert!(body["user"].get("password_hash").is_none());

    // Unverified accounts cannot log in yet
    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": "sara@example.com", "password": "password123" }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await?["error"], "email_not_verified");

    let sent = app.email.sent();
    assert_eq!(sent.len(), 1);
    let token = sent[0]
        .body
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();

    let response = router
        .clone()
        .oneshot(get_request(&format!("/api/auth/verify/{}", token), None))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let jwt = login(&router, "sara@example.com", "password123").await?;
    let response = router
        .clone()
        .oneshot(get_request("/api/auth/me", Some(&jwt)))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await?;
    assert_eq!(me["name"], "سارة علي");
    assert_eq!(me["email_verified"], true);

    Ok(())
}

#[tokio::test]
async fn test_register_validation_errors() -> anyhow::Result<()> {
    let (_app, router) = setup().await;

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/auth/register",
            None,
            json!({
                "name": "سارة",
                "country": "مصر",
                "phone": "0123",
                "national_id": "30001011234567",
                "email": "sara@example.com",
                "password": "password123"
            }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await?["error"], "validation_error");

    Ok(())
}

#[tokio::test]
async fn test_login_sets_cookie_that_authenticates() -> anyhow::Result<()> {
    let (app, router) = setup().await;
    test_helpers::insert_test_user(&app.state.pool, "cookie@example.com", "password123", Role::User, true)
        .await?;

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": "cookie@example.com", "password": "password123" }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(set_cookie.starts_with("access_token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(!set_cookie.contains("Secure"));

    let cookie_pair = set_cookie.split(';').next().unwrap_or_default();
    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::COOKIE, cookie_pair)
        .body(Body::empty())?;
    let response = router.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/auth/logout")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(cleared.contains("Max-Age=0"));

    Ok(())
}

#[tokio::test]
async fn test_protected_routes_require_token() -> anyhow::Result<()> {
    let (_app, router) = setup().await;

    let response = router.clone().oneshot(get_request("/api/auth/me", None)).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await?["error"], "unauthorized");

    let response = router
        .clone()
        .oneshot(get_request("/api/users", Some("not-a-jwt")))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Catalog writes are guarded while reads stay public
    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/services",
            None,
            json!({ "title": "x", "description": "y", "duration_days": 1, "price": 1.0 }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = router.oneshot(get_request("/api/services", None)).await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_admin_only_routes_forbid_other_roles() -> anyhow::Result<()> {
    let (app, router) = setup().await;
    let (_id, token) = user_with_token(&app, &router, "user@example.com", Role::User).await?;

    for uri in ["/api/users", "/api/supervisor-delegates"] {
        let response = router.clone().oneshot(get_request(uri, Some(&token))).await?;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);
    }

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/services",
            Some(&token),
            json!({ "title": "x", "description": "y", "duration_days": 1, "price": 1.0 }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_service_crud_as_admin() -> anyhow::Result<()> {
    let (app, router) = setup().await;
    let (_id, token) = user_with_token(&app, &router, "admin@example.com", Role::Admin).await?;

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/services",
            Some(&token),
            json!({
                "title": "تحفيظ قرآن",
                "description": "حلقات يومية",
                "duration_days": 90,
                "price": 600.0
            }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await?;
    let id = created["id"].as_i64().unwrap_or_default();

    let response = router
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/services/{}", id),
            Some(&token),
            json!({ "price": 650.0 }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?["price"], 650.0);

    let response = router
        .clone()
        .oneshot(get_request(&format!("/api/services/{}", id), None))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?["title"], "تحفيظ قرآن");

    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/services/{}", id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())?;
    let response = router.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = router
        .oneshot(get_request(&format!("/api/services/{}", id), None))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_user_management_as_admin() -> anyhow::Result<()> {
    let (app, router) = setup().await;
    let (admin_id, token) = user_with_token(&app, &router, "admin@example.com", Role::Admin).await?;

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/users",
            Some(&token),
            json!({
                "name": "مندوب المبيعات",
                "country": "مصر",
                "phone": "01112345678",
                "national_id": "28501011234567",
                "email": "delegate@example.com",
                "password": "password123",
                "role": "delegate"
            }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let delegate = body_json(response).await?;
    assert_eq!(delegate["role"], "delegate");
    assert_eq!(delegate["email_verified"], true);
    let delegate_id = delegate["id"].as_i64().unwrap_or_default();

    let response = router
        .clone()
        .oneshot(get_request("/api/users?role=delegate", Some(&token)))
        .await?;
    let listed = body_json(response).await?;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    // Self-demotion and self-deletion are refused
    let response = router
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/users/{}", admin_id),
            Some(&token),
            json!({ "role": "user" }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/users/{}", admin_id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())?;
    assert_eq!(
        router.clone().oneshot(request).await?.status(),
        StatusCode::BAD_REQUEST
    );

    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/users/{}", delegate_id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())?;
    assert_eq!(
        router.clone().oneshot(request).await?.status(),
        StatusCode::NO_CONTENT
    );

    let response = router
        .oneshot(get_request(&format!("/api/users/{}", delegate_id), Some(&token)))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_supervisor_sees_only_own_delegates() -> anyhow::Result<()> {
    let (app, router) = setup().await;
    let (_admin, admin_token) =
        user_with_token(&app, &router, "admin@example.com", Role::Admin).await?;
    let (supervisor_id, supervisor_token) =
        user_with_token(&app, &router, "sup@example.com", Role::Supervisor).await?;
    let (other_supervisor, _) =
        user_with_token(&app, &router, "sup2@example.com", Role::Supervisor).await?;
    let delegate_id = test_helpers::insert_test_user(
        &app.state.pool,
        "del@example.com",
        "password123",
        Role::Delegate,
        true,
    )
    .await?;

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/supervisor-delegates",
            Some(&admin_token),
            json!({ "supervisor_id": supervisor_id, "delegate_id": delegate_id }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/supervisor-delegates",
            Some(&admin_token),
            json!({ "supervisor_id": supervisor_id, "delegate_id": delegate_id }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = router
        .clone()
        .oneshot(get_request(
            &format!("/api/supervisors/{}/delegates", supervisor_id),
            Some(&supervisor_token),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let delegates = body_json(response).await?;
    assert_eq!(delegates[0]["email"], "del@example.com");

    let response = router
        .oneshot(get_request(
            &format!("/api/supervisors/{}/delegates", other_supervisor),
            Some(&supervisor_token),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_contact_form_mails_admin() -> anyhow::Result<()> {
    let (app, router) = setup().await;

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/contact",
            None,
            json!({
                "name": "ولي أمر",
                "email": "parent@example.com",
                "phone": "01212345678",
                "message": "أريد الاستفسار عن المواعيد"
            }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?["success"], true);

    let sent = app.email.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "admin@taalim.test");
    assert!(sent[0].body.contains("parent@example.com"));

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/contact",
            None,
            json!({ "name": "x", "email": "broken", "message": "hi" }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.email.sent().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_drive_link_requires_supervisor_or_admin() -> anyhow::Result<()> {
    let (app, router) = setup().await;
    let (_sup, supervisor_token) =
        user_with_token(&app, &router, "sup@example.com", Role::Supervisor).await?;
    let (_del, delegate_token) =
        user_with_token(&app, &router, "del@example.com", Role::Delegate).await?;

    let payload = json!({
        "email": "student@example.com",
        "drive_link": "https://drive.google.com/drive/folders/abc123",
        "note": "ملفات الأسبوع الأول"
    });

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/send-drive-link",
            Some(&delegate_token),
            payload.clone(),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/send-drive-link",
            Some(&supervisor_token),
            json!({ "email": "student@example.com", "drive_link": "https://example.com/x" }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/send-drive-link",
            Some(&supervisor_token),
            payload,
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let sent = app.email.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "student@example.com");
    assert!(sent[0].body.contains("https://drive.google.com/drive/folders/abc123"));

    Ok(())
}

fn multipart_upload(token: &str, file_name: &str, content: &[u8], service_id: Option<i64>) -> Request<Body> {
    let boundary = "taalim-test-boundary";
    let mut body = Vec::new();
    if let Some(id) = service_id {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"service_id\"\r\n\r\n{}\r\n",
                boundary, id
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            boundary, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/contracts/upload")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_contract_upload_and_download() -> anyhow::Result<()> {
    let (app, router) = setup().await;
    let (_owner, owner_token) =
        user_with_token(&app, &router, "owner@example.com", Role::User).await?;
    let (_other, other_token) =
        user_with_token(&app, &router, "other@example.com", Role::User).await?;
    let service_id = test_helpers::insert_test_service(&app.state.pool, "متابعة", 300.0).await?;

    let response = router
        .clone()
        .oneshot(multipart_upload(&owner_token, "contract.pdf", b"%PDF-1.4 signed", Some(service_id)))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let contract = body_json(response).await?;
    assert_eq!(contract["original_name"], "contract.pdf");
    assert_eq!(contract["service_id"], service_id);
    let id = contract["id"].as_i64().unwrap_or_default();

    // Admin is told about the upload
    let sent = app.email.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "admin@taalim.test");
    assert!(sent[0].body.contains("contract.pdf"));

    let response = router
        .clone()
        .oneshot(get_request(&format!("/api/contracts/{}/download", id), Some(&owner_token)))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("application/pdf")
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&bytes[..], b"%PDF-1.4 signed");

    let response = router
        .clone()
        .oneshot(get_request(&format!("/api/contracts/{}/download", id), Some(&other_token)))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = router
        .clone()
        .oneshot(get_request("/api/contracts", Some(&other_token)))
        .await?;
    assert_eq!(body_json(response).await?.as_array().map(Vec::len), Some(0));

    let response = router
        .oneshot(multipart_upload(&owner_token, "virus.exe", b"MZ", None))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected() -> anyhow::Result<()> {
    let (app, router) = setup().await;
    let (_owner, token) = user_with_token(&app, &router, "owner@example.com", Role::User).await?;

    let oversized = vec![b'a'; app.state.config.max_upload_bytes + 1];
    let response = router
        .oneshot(multipart_upload(&token, "big.pdf", &oversized, None))
        .await?;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    Ok(())
}

#[tokio::test]
async fn test_pages_and_fallbacks() -> anyhow::Result<()> {
    let (app, router) = setup().await;
    test_helpers::insert_test_service(&app.state.pool, "دورة اللغة العربية", 250.0).await?;

    let response = router.clone().oneshot(get_request("/", None)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-frame-options"));
    let html = String::from_utf8(to_bytes(response.into_body(), usize::MAX).await?.to_vec())?;
    assert!(html.contains("dir=\"rtl\""));
    assert!(html.contains("دورة اللغة العربية"));

    let response = router.clone().oneshot(get_request("/admin", None)).await?;
    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
        Some("/login")
    );

    let response = router.clone().oneshot(get_request("/api/nothing-here", None)).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await?["error"], "not_found");

    let response = router.oneshot(get_request("/nothing-here", None)).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_role_dashboard_redirect() -> anyhow::Result<()> {
    let (app, router) = setup().await;
    let (_id, token) = user_with_token(&app, &router, "sup@example.com", Role::Supervisor).await?;

    let response = router
        .clone()
        .oneshot(get_request("/dashboard", Some(&token)))
        .await?;
    assert_eq!(
        response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
        Some("/supervisor")
    );

    let response = router.oneshot(get_request("/supervisor", Some(&token))).await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_token_of_deleted_account_is_rejected() -> anyhow::Result<()> {
    let (app, router) = setup().await;
    let (admin_id, token) = user_with_token(&app, &router, "admin@example.com", Role::Admin).await?;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(admin_id)
        .execute(&app.state.pool)
        .await?;

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/services",
            Some(&token),
            json!({
                "title": "خدمة جديدة",
                "description": "وصف",
                "duration_days": 30,
                "price": 100.0
            }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_token_of_disabled_account_is_rejected() -> anyhow::Result<()> {
    let (app, router) = setup().await;
    let (user_id, token) = user_with_token(&app, &router, "user@example.com", Role::User).await?;

    let response = router
        .clone()
        .oneshot(get_request("/api/auth/me", Some(&token)))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
        .bind(user_id)
        .execute(&app.state.pool)
        .await?;

    let response = router
        .oneshot(get_request("/api/auth/me", Some(&token)))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_demoted_admin_loses_admin_routes() -> anyhow::Result<()> {
    let (app, router) = setup().await;
    let (admin_id, token) = user_with_token(&app, &router, "admin@example.com", Role::Admin).await?;

    sqlx::query("UPDATE users SET role = 'user' WHERE id = ?")
        .bind(admin_id)
        .execute(&app.state.pool)
        .await?;

    let response = router
        .clone()
        .oneshot(get_request("/api/users", Some(&token)))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Still a valid session, just with the stored role
    let response = router
        .oneshot(get_request("/api/auth/me", Some(&token)))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?["role"], "user");

    Ok(())
}

#[tokio::test]
async fn test_deleting_user_removes_their_contract_files() -> anyhow::Result<()> {
    let (app, router) = setup().await;
    let (_admin, admin_token) =
        user_with_token(&app, &router, "admin@example.com", Role::Admin).await?;
    let (owner_id, owner_token) =
        user_with_token(&app, &router, "owner@example.com", Role::User).await?;

    let response = router
        .clone()
        .oneshot(multipart_upload(&owner_token, "contract.pdf", b"%PDF-1.4 signed", None))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(app.contracts_dir.path().read_dir()?.next().is_some());

    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/users/{}", owner_id))
        .header(header::AUTHORIZATION, format!("Bearer {}", admin_token))
        .body(Body::empty())?;
    assert_eq!(
        router.clone().oneshot(request).await?.status(),
        StatusCode::NO_CONTENT
    );

    assert!(app.contracts_dir.path().read_dir()?.next().is_none());
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contracts")
        .fetch_one(&app.state.pool)
        .await?;
    assert_eq!(remaining, 0);

    Ok(())
}
