use std::time::Instant;

use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Form;

use crate::contact::wait_message;
use crate::extractors::{ClientKey, Viewer};
use crate::forms::ContactForm;
use crate::routes::home::Html;
use crate::routes::views::Nav;
use crate::state::AppState;

#[derive(Template, Default)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub nav: Nav,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub name_error: String,
    pub email_error: String,
    pub subject_error: String,
    pub message_error: String,
    pub error: String,
    pub sent: bool,
}

impl ContactTemplate {
    fn filled(nav: Nav, form: &ContactForm) -> Self {
        Self {
            nav,
            name: form.name.clone(),
            email: form.email.clone(),
            subject: form.subject.clone(),
            message: form.message.clone(),
            ..Self::default()
        }
    }
}

/// GET /contact-us
pub async fn page(viewer: Viewer) -> Html<ContactTemplate> {
    Html(ContactTemplate {
        nav: Nav::new(&viewer, "contact"),
        ..ContactTemplate::default()
    })
}

/// POST /contact-us
pub async fn send(
    State(state): State<AppState>,
    viewer: Viewer,
    ClientKey(client): ClientKey,
    Form(form): Form<ContactForm>,
) -> Response {
    let nav = Nav::new(&viewer, "contact");

    if let Err(errors) = form.validate() {
        let page = ContactTemplate {
            name_error: errors.message("name"),
            email_error: errors.message("email"),
            subject_error: errors.message("subject"),
            message_error: errors.message("message"),
            ..ContactTemplate::filled(nav, &form)
        };
        return (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response();
    }

    let acquired = state
        .contact_limiter
        .lock()
        .await
        .try_acquire(&client, Instant::now());
    if let Err(wait) = acquired {
        let page = ContactTemplate {
            error: wait_message(wait),
            ..ContactTemplate::filled(nav, &form)
        };
        return (StatusCode::TOO_MANY_REQUESTS, Html(page)).into_response();
    }

    match state.mailer.send(&form).await {
        Ok(()) => Html(ContactTemplate {
            nav,
            sent: true,
            ..ContactTemplate::default()
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Contact form error: {}", e);
            state.contact_limiter.lock().await.release(&client);
            let page = ContactTemplate {
                error: "Failed to send message. Please try again later.".to_string(),
                ..ContactTemplate::filled(nav, &form)
            };
            (StatusCode::BAD_GATEWAY, Html(page)).into_response()
        }
    }
}
