use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use solardesk::config::Config;
use tower::ServiceExt;

/// Seeded by the initial migration
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin@123";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();

    let state = solardesk::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    solardesk::api::router(state).await
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Attempt a login and return the raw response.
async fn try_login(app: &Router, username: &str, password: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    json!({ "username": username, "password": password }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Log in and return the session cookie for subsequent requests.
async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = try_login(app, username, password).await;
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");

    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn get(app: &Router, cookie: &str, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn post_json(app: &Router, cookie: &str, uri: &str, payload: &Value) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::COOKIE, cookie)
                .header("Content-Type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Create a staff account through the admin API and return its username.
async fn create_staff(app: &Router, admin_cookie: &str, username: &str, password: &str) {
    let response = post_json(
        app,
        admin_cookie,
        "/api/users",
        &json!({ "username": username, "password": password, "role": "staff" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

async fn generate_document(
    app: &Router,
    cookie: &str,
    customer_name: &str,
    phone: &str,
    capacity: f64,
) -> Value {
    let response = post_json(
        app,
        cookie,
        "/api/documents",
        &json!({
            "customer_name": customer_name,
            "phone": phone,
            "address": "12 Lakeside Road",
            "consumer_no": "CN-1001",
            "subdivision": "North",
            "capacity": capacity,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test]
async fn unauthenticated_requests_are_rejected() {
    let app = spawn_app().await;

    for uri in [
        "/api/invoices",
        "/api/agreements",
        "/api/documents/next-refs",
        "/api/system/status",
        "/api/analytics/kpis",
        "/api/users",
    ] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn admin_can_login_and_check_status() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let response = get(&app, &cookie, "/api/system/status").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["database"], "ok");

    let response = get(&app, &cookie, "/api/auth/me").await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["username"], "admin");
    assert_eq!(body["data"]["role"], "admin");
}

#[tokio::test]
async fn wrong_password_is_an_opaque_unauthorized() {
    let app = spawn_app().await;

    let response = try_login(&app, ADMIN_USERNAME, "nope").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Unknown usernames answer identically
    let response = try_login(&app, "no-such-user", "nope").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn three_failures_lock_the_account_until_admin_unlock() {
    let app = spawn_app().await;
    let admin_cookie = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    create_staff(&app, &admin_cookie, "bob", "correct-horse").await;

    for _ in 0..3 {
        let response = try_login(&app, "bob", "wrong-password").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Correct password no longer helps: the account is locked
    let response = try_login(&app, "bob", "correct-horse").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The security page shows the lock
    let response = get(&app, &admin_cookie, "/api/users").await;
    let body = body_json(response).await;
    let bob = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["username"] == "bob")
        .expect("bob should be listed")
        .clone();
    assert_eq!(bob["locked"], true);
    assert_eq!(bob["failed_attempts"], 3);

    // Admin unlock clears both fields
    let bob_id = bob["id"].as_i64().unwrap();
    let response = post_json(
        &app,
        &admin_cookie,
        &format!("/api/users/{bob_id}/unlock"),
        &json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["locked"], false);
    assert_eq!(body["data"]["failed_attempts"], 0);

    // And the account works again
    let cookie = login(&app, "bob", "correct-horse").await;
    let response = get(&app, &cookie, "/api/auth/me").await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["username"], "bob");
}

#[tokio::test]
async fn generation_derives_phase_amount_and_sequential_refs() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let body = generate_document(&app, &cookie, "Alice Kumar", "555-1234", 5.0).await;
    assert_eq!(body["data"]["phase"], "Three Phase");
    assert_eq!(body["data"]["amount"], json!(350_000.0));
    let invoice_ref = body["data"]["invoice_ref"].as_str().unwrap();
    let agreement_no = body["data"]["agreement_no"].as_str().unwrap();
    assert!(invoice_ref.starts_with("BE/KNG/PMSG/QTN/"));
    assert!(invoice_ref.ends_with("/0001"));
    assert!(agreement_no.starts_with("AG/SG/APDCL/"));
    assert!(agreement_no.ends_with("/0001"));

    let body = generate_document(&app, &cookie, "Ravi Das", "666-2222", 3.0).await;
    assert_eq!(body["data"]["phase"], "Single Phase");
    assert_eq!(body["data"]["amount"], json!(210_000.0));
    assert!(body["data"]["invoice_ref"].as_str().unwrap().ends_with("/0002"));
    assert!(body["data"]["agreement_no"].as_str().unwrap().ends_with("/0002"));
}

#[tokio::test]
async fn generation_requires_customer_name_and_phone() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let response = post_json(
        &app,
        &cookie,
        "/api/documents",
        &json!({ "customer_name": "", "phone": "555-1234", "capacity": 3.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        &app,
        &cookie,
        "/api/documents",
        &json!({ "customer_name": "Alice", "phone": "  ", "capacity": 3.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn next_refs_preview_does_not_consume_numbers() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let first = body_json(get(&app, &cookie, "/api/documents/next-refs").await).await;
    let second = body_json(get(&app, &cookie, "/api/documents/next-refs").await).await;
    assert_eq!(first["data"]["invoice_ref"], second["data"]["invoice_ref"]);

    let generated = generate_document(&app, &cookie, "Alice Kumar", "555-1234", 3.0).await;
    assert_eq!(
        generated["data"]["invoice_ref"],
        first["data"]["invoice_ref"]
    );
}

#[tokio::test]
async fn history_is_role_scoped_and_searchable() {
    let app = spawn_app().await;
    let admin_cookie = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    create_staff(&app, &admin_cookie, "bob", "bob-password").await;
    create_staff(&app, &admin_cookie, "carol", "carol-password").await;

    let bob_cookie = login(&app, "bob", "bob-password").await;
    let carol_cookie = login(&app, "carol", "carol-password").await;

    generate_document(&app, &bob_cookie, "Alice Kumar", "555-1234", 5.0).await;
    generate_document(&app, &carol_cookie, "Zed Borah", "777-0000", 3.0).await;

    // Staff only see their own rows
    let body = body_json(get(&app, &bob_cookie, "/api/invoices").await).await;
    assert_eq!(body["data"]["total_count"], 1);
    assert_eq!(body["data"]["data"][0]["created_by"], "bob");
    assert_eq!(body["data"]["totals"]["count"], 1);
    assert_eq!(body["data"]["totals"]["total_amount"], json!(350_000.0));

    // Admin sees everything
    let body = body_json(get(&app, &admin_cookie, "/api/invoices").await).await;
    assert_eq!(body["data"]["total_count"], 2);

    // Substring search on phone
    let body = body_json(get(&app, &bob_cookie, "/api/invoices?search=555").await).await;
    assert_eq!(body["data"]["total_count"], 1);
    assert_eq!(body["data"]["data"][0]["phone"], "555-1234");

    // Case-insensitive search on customer name
    let body = body_json(get(&app, &admin_cookie, "/api/invoices?search=alice").await).await;
    assert_eq!(body["data"]["total_count"], 1);

    // Role scoping wins over a matching search term
    let body = body_json(get(&app, &carol_cookie, "/api/invoices?search=555").await).await;
    assert_eq!(body["data"]["total_count"], 0);

    // Agreements behave the same way
    let body = body_json(get(&app, &carol_cookie, "/api/agreements").await).await;
    assert_eq!(body["data"]["total_count"], 1);
    assert_eq!(body["data"]["data"][0]["created_by"], "carol");
}

#[tokio::test]
async fn analytics_require_admin_role() {
    let app = spawn_app().await;
    let admin_cookie = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    create_staff(&app, &admin_cookie, "bob", "bob-password").await;
    let bob_cookie = login(&app, "bob", "bob-password").await;

    let response = get(&app, &bob_cookie, "/api/analytics/kpis").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get(&app, &bob_cookie, "/api/users").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn analytics_shapes_hold_for_empty_and_populated_ranges() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    // Empty: average is exactly 0, both phase labels present
    let body = body_json(get(&app, &cookie, "/api/analytics/kpis").await).await;
    assert_eq!(body["data"]["total_invoices"], 0);
    assert_eq!(body["data"]["avg_value"], json!(0.0));

    let body = body_json(get(&app, &cookie, "/api/analytics/phase-split").await).await;
    assert_eq!(body["data"]["Single Phase"], 0);
    assert_eq!(body["data"]["Three Phase"], 0);

    generate_document(&app, &cookie, "Alice Kumar", "555-1234", 5.0).await;

    let body = body_json(get(&app, &cookie, "/api/analytics/kpis").await).await;
    assert_eq!(body["data"]["total_revenue"], json!(350_000.0));
    assert_eq!(body["data"]["total_invoices"], 1);
    assert_eq!(body["data"]["avg_value"], json!(350_000.0));

    let body = body_json(get(&app, &cookie, "/api/analytics/phase-split").await).await;
    assert_eq!(body["data"]["Single Phase"], 0);
    assert_eq!(body["data"]["Three Phase"], 1);

    let body = body_json(get(&app, &cookie, "/api/analytics/capacity-distribution").await).await;
    assert_eq!(body["data"]["5"], 1);

    let body = body_json(get(&app, &cookie, "/api/analytics/staff-performance").await).await;
    assert_eq!(body["data"]["admin"], json!(350_000.0));

    let body = body_json(get(&app, &cookie, "/api/analytics/daily-revenue").await).await;
    let series = body["data"].as_array().unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0]["revenue"], json!(350_000.0));

    // Login and generation both left audit entries
    let body = body_json(get(&app, &cookie, "/api/analytics/activity-timeline").await).await;
    let timeline = body["data"].as_array().unwrap();
    assert_eq!(timeline.len(), 1);
    assert!(timeline[0]["events"].as_u64().unwrap() >= 2);
}

#[tokio::test]
async fn analytics_date_bounds_are_inclusive() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    generate_document(&app, &cookie, "Alice Kumar", "555-1234", 3.0).await;

    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();

    // A bare end date still covers rows created later the same day
    let body = body_json(
        get(
            &app,
            &cookie,
            &format!("/api/analytics/kpis?start_date={today}&end_date={today}"),
        )
        .await,
    )
    .await;
    assert_eq!(body["data"]["total_invoices"], 1);

    // A range in the past matches nothing
    let body = body_json(
        get(
            &app,
            &cookie,
            "/api/analytics/kpis?start_date=2000-01-01&end_date=2000-12-31",
        )
        .await,
    )
    .await;
    assert_eq!(body["data"]["total_invoices"], 0);
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let response = post_json(&app, &cookie, "/api/auth/logout", &json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, &cookie, "/api/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_usernames_are_rejected() {
    let app = spawn_app().await;
    let admin_cookie = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    create_staff(&app, &admin_cookie, "bob", "bob-password").await;

    let response = post_json(
        &app,
        &admin_cookie,
        "/api/users",
        &json!({ "username": "bob", "password": "other-password", "role": "staff" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
