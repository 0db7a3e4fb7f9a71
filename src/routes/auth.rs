use askama::Template;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;

use crate::access::{Decision, RouteGuard};
use crate::api::auth::RegisterRequest;
use crate::extractors::{clear_session_cookie, session_cookie, Viewer};
use crate::forms::{login_error_message, register_conflict, FieldErrors, LoginForm, RegisterForm};
use crate::models::AuthSession;
use crate::routes::home::Html;
use crate::routes::views::Nav;
use crate::state::AppState;

#[derive(Template, Default)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub nav: Nav,
    pub email: String,
    pub email_error: String,
    pub password_error: String,
    pub error: String,
}

#[derive(Template, Default)]
#[template(path = "pages/register.html")]
pub struct RegisterTemplate {
    pub nav: Nav,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub first_name_error: String,
    pub last_name_error: String,
    pub username_error: String,
    pub email_error: String,
    pub password_error: String,
    pub error: String,
}

/// Redirect signed-in visitors away from the guest-only pages.
fn guest_redirect(viewer: &Viewer) -> Option<Response> {
    match RouteGuard::GuestOnly.decide(viewer.user()) {
        Decision::Allow => None,
        decision => decision
            .location()
            .map(|to| Redirect::to(to).into_response()),
    }
}

/// Render a guest page, dropping a token the backend no longer accepts.
fn guest_page<T: Template>(state: &AppState, viewer: &Viewer, status: StatusCode, page: T) -> Response {
    if viewer.has_stale_token() {
        let cookie = clear_session_cookie(&state.config.auth.cookie_name);
        (status, [(header::SET_COOKIE, cookie)], Html(page)).into_response()
    } else {
        (status, Html(page)).into_response()
    }
}

fn signed_in(state: &AppState, session: &AuthSession) -> Response {
    let auth = &state.config.auth;
    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/".to_string()),
            (
                header::SET_COOKIE,
                session_cookie(&auth.cookie_name, &session.token, auth.session_hours),
            ),
        ],
    )
        .into_response()
}

/// GET /login
pub async fn login_page(State(state): State<AppState>, viewer: Viewer) -> Response {
    if let Some(redirect) = guest_redirect(&viewer) {
        return redirect;
    }
    let page = LoginTemplate {
        nav: Nav::new(&viewer, "login"),
        ..LoginTemplate::default()
    };
    guest_page(&state, &viewer, StatusCode::OK, page)
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    viewer: Viewer,
    Form(form): Form<LoginForm>,
) -> Response {
    if let Some(redirect) = guest_redirect(&viewer) {
        return redirect;
    }
    let page = LoginTemplate {
        nav: Nav::new(&viewer, "login"),
        email: form.email.clone(),
        ..LoginTemplate::default()
    };

    if let Err(errors) = form.validate() {
        let page = LoginTemplate {
            email_error: errors.message("email"),
            password_error: errors.message("password"),
            ..page
        };
        return guest_page(&state, &viewer, StatusCode::UNPROCESSABLE_ENTITY, page);
    }

    match state.api.auth().login(form.email.trim(), &form.password).await {
        Ok(session) => {
            tracing::info!("User logged in");
            signed_in(&state, &session)
        }
        Err(e) => {
            tracing::warn!("Login failed: {}", e);
            let page = LoginTemplate {
                error: login_error_message(&e.to_string()),
                ..page
            };
            guest_page(&state, &viewer, StatusCode::UNAUTHORIZED, page)
        }
    }
}

/// GET /register
pub async fn register_page(State(state): State<AppState>, viewer: Viewer) -> Response {
    if let Some(redirect) = guest_redirect(&viewer) {
        return redirect;
    }
    let page = RegisterTemplate {
        nav: Nav::new(&viewer, "register"),
        ..RegisterTemplate::default()
    };
    guest_page(&state, &viewer, StatusCode::OK, page)
}

fn with_field_errors(page: RegisterTemplate, errors: &FieldErrors) -> RegisterTemplate {
    RegisterTemplate {
        first_name_error: errors.message("first_name"),
        last_name_error: errors.message("last_name"),
        username_error: errors.message("username"),
        email_error: errors.message("email"),
        password_error: errors.message("password"),
        ..page
    }
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    viewer: Viewer,
    Form(form): Form<RegisterForm>,
) -> Response {
    if let Some(redirect) = guest_redirect(&viewer) {
        return redirect;
    }
    let page = RegisterTemplate {
        nav: Nav::new(&viewer, "register"),
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        username: form.username.clone(),
        email: form.email.clone(),
        ..RegisterTemplate::default()
    };

    if let Err(errors) = form.validate() {
        let page = with_field_errors(page, &errors);
        return guest_page(&state, &viewer, StatusCode::UNPROCESSABLE_ENTITY, page);
    }

    let request = RegisterRequest {
        username: form.username.trim(),
        first_name: form.first_name.trim(),
        last_name: form.last_name.trim(),
        email: form.email.trim(),
        password: &form.password,
    };
    match state.api.auth().register(&request).await {
        Ok(session) => {
            tracing::info!(username = %request.username, "User registered");
            signed_in(&state, &session)
        }
        Err(e) => {
            tracing::warn!("Registration failed: {}", e);
            let message = e.to_string();
            let page = match register_conflict(&message) {
                Some(errors) => with_field_errors(page, &errors),
                None => RegisterTemplate {
                    error: message,
                    ..page
                },
            };
            guest_page(&state, &viewer, StatusCode::UNPROCESSABLE_ENTITY, page)
        }
    }
}

/// POST /logout
pub async fn logout(State(state): State<AppState>) -> Response {
    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/".to_string()),
            (
                header::SET_COOKIE,
                clear_session_cookie(&state.config.auth.cookie_name),
            ),
        ],
    )
        .into_response()
}
