mod common;

use axum::http::StatusCode;
use common::{
    body_text, location, set_cookie, TestApp, ADMIN_TOKEN, PASSWORD, USER_TOKEN,
};

#[tokio::test]
async fn protected_pages_send_guests_to_login() {
    let app = TestApp::start().await;

    for path in ["/user", "/admin", "/admin/add-photo", "/admin/add-album"] {
        let response = app.get(path, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", path);
        assert_eq!(location(&response), "/login", "{}", path);
    }
}

#[tokio::test]
async fn admin_pages_send_members_home() {
    let app = TestApp::start().await;

    let response = app.get("/admin", Some(USER_TOKEN)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = app.get("/admin", Some(ADMIN_TOKEN)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Admin Panel"));
}

#[tokio::test]
async fn login_sets_http_only_session_cookie() {
    let app = TestApp::start().await;

    let body = format!("email=uma%40example.com&password={}", PASSWORD);
    let response = app.post_form("/login", None, &body).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let cookie = set_cookie(&response);
    assert!(cookie.starts_with("folio_token=user-token;"), "{}", cookie);
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains(&format!("Max-Age={}", 720 * 3600)));
}

#[tokio::test]
async fn login_rewrites_bad_credentials_message() {
    let app = TestApp::start().await;

    let response = app
        .post_form("/login", None, "email=uma%40example.com&password=wrong")
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let html = body_text(response).await;
    assert!(html.contains("Invalid email or password. Please try again."));
    assert!(html.contains("uma@example.com"));
}

#[tokio::test]
async fn login_validates_before_calling_backend() {
    let app = TestApp::start().await;

    let response = app.post_form("/login", None, "email=not-an-email&password=").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Please enter a valid email address"));
    assert!(html.contains("Password is required"));
}

#[tokio::test]
async fn signed_in_users_skip_guest_pages() {
    let app = TestApp::start().await;

    for path in ["/login", "/register"] {
        let response = app.get(path, Some(USER_TOKEN)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", path);
        assert_eq!(location(&response), "/");
    }
}

#[tokio::test]
async fn stale_token_is_cleared_on_login_page() {
    let app = TestApp::start().await;

    let response = app.get("/login", Some("expired")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with("folio_token=;"), "{}", cookie);
    assert!(cookie.contains("Max-Age=0"));

    let response = app.get("/login", None).await;
    assert!(set_cookie(&response).is_empty());
}

#[tokio::test]
async fn register_reports_field_errors() {
    let app = TestApp::start().await;

    let response = app
        .post_form(
            "/register",
            None,
            "first_name=&last_name=Lange&username=a&email=x%40y.io&password=short",
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("First name is required"));
    assert!(html.contains("Username must be 3-50 characters"));
    assert!(html.contains("Password must be at least 8 characters"));
    assert!(html.contains("Lange"));
}

#[tokio::test]
async fn logout_expires_cookie() {
    let app = TestApp::start().await;

    let response = app.post_form("/logout", Some(USER_TOKEN), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(set_cookie(&response).contains("Max-Age=0"));
}

#[tokio::test]
async fn profile_lists_details_and_favorites() {
    let app = TestApp::start().await;

    let response = app.get("/user", Some(USER_TOKEN)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Uma User"));
    assert!(html.contains("uma@example.com"));
    assert!(html.contains("Member"));
    assert!(html.contains("Salt Flats"));

    let html = body_text(app.get("/user?edit=lastName", Some(USER_TOKEN)).await).await;
    assert!(html.contains(r#"name="field" value="lastName""#));
}

#[tokio::test]
async fn password_change_checks_confirmation_locally() {
    let app = TestApp::start().await;

    let response = app
        .post_form(
            "/user/password",
            Some(USER_TOKEN),
            "current_password=old&new_password=Secret456&confirm_password=Secret789",
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("New passwords do not match"));
}

#[tokio::test]
async fn favorite_toggle_flips_state_and_returns() {
    let app = TestApp::start().await;

    let response = app
        .post_form("/favorites/toggle", Some(USER_TOKEN), "id=p2&back=%2Fgallery")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/gallery");
    assert!(app.log.contains("PUT /api/users/me/favorites p2"));

    let response = app
        .post_form("/favorites/toggle", Some(USER_TOKEN), "id=p1")
        .await;
    assert_eq!(location(&response), "/photo/p1");
    assert!(app.log.contains("DELETE /api/users/me/favorites/p1"));
}

#[tokio::test]
async fn favorite_toggle_ignores_offsite_return_path() {
    let app = TestApp::start().await;

    let response = app
        .post_form(
            "/favorites/toggle",
            Some(USER_TOKEN),
            "id=p2&back=%2F%2Fevil.example",
        )
        .await;
    assert_eq!(location(&response), "/");

    let response = app.post_form("/favorites/toggle", None, "id=p2").await;
    assert_eq!(location(&response), "/login");
}
