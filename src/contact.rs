//! Contact form delivery and per-client rate limiting.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;

use crate::config::ContactConfig;
use crate::forms::ContactForm;

/// Remembers when each client last sent a message.
pub struct ContactLimiter {
    window: Duration,
    last_sent: HashMap<String, Instant>,
}

impl ContactLimiter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_sent: HashMap::new(),
        }
    }

    /// Time `client` still has to wait, if any.
    pub fn remaining(&self, client: &str, now: Instant) -> Option<Duration> {
        let sent = self.last_sent.get(client)?;
        let elapsed = now.saturating_duration_since(*sent);
        (elapsed < self.window).then(|| self.window - elapsed)
    }

    /// Record a send unless the client is still inside the window.
    pub fn try_acquire(&mut self, client: &str, now: Instant) -> Result<(), Duration> {
        self.clear_stale(now);
        if let Some(wait) = self.remaining(client, now) {
            return Err(wait);
        }
        self.last_sent.insert(client.to_string(), now);
        Ok(())
    }

    /// Forget a send that failed so the client can retry straight away.
    pub fn release(&mut self, client: &str) {
        self.last_sent.remove(client);
    }

    fn clear_stale(&mut self, now: Instant) {
        let window = self.window;
        self.last_sent
            .retain(|_, sent| now.saturating_duration_since(*sent) < window);
    }
}

/// "Please wait N seconds..." with N rounded up.
pub fn wait_message(wait: Duration) -> String {
    let secs = wait.as_millis().div_ceil(1000);
    format!(
        "Please wait {} seconds before sending another message.",
        secs
    )
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Failed to send message: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to send message: {status} {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, form: &ContactForm) -> Result<(), MailError>;
}

#[derive(Serialize)]
struct TemplateParams<'a> {
    from_name: &'a str,
    from_email: &'a str,
    subject: &'a str,
    message: &'a str,
    reply_to: &'a str,
    to_email: &'a str,
}

#[derive(Serialize)]
struct EmailJsRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

/// Sends through the EmailJS REST endpoint.
pub struct EmailJsMailer {
    http: reqwest::Client,
    url: String,
    service_id: String,
    template_id: String,
    public_key: String,
    to_email: String,
}

impl EmailJsMailer {
    /// `None` unless every EmailJS id is configured.
    pub fn from_config(config: &ContactConfig, http: reqwest::Client) -> Option<Self> {
        Some(Self {
            http,
            url: config.emailjs_url.clone(),
            service_id: config.emailjs_service_id.clone()?,
            template_id: config.emailjs_template_id.clone()?,
            public_key: config.emailjs_public_key.clone()?,
            to_email: config.to_email.clone(),
        })
    }
}

#[async_trait]
impl Mailer for EmailJsMailer {
    async fn send(&self, form: &ContactForm) -> Result<(), MailError> {
        let email = form.email.trim();
        let body = EmailJsRequest {
            service_id: &self.service_id,
            template_id: &self.template_id,
            user_id: &self.public_key,
            template_params: TemplateParams {
                from_name: form.name.trim(),
                from_email: email,
                subject: form.subject.trim(),
                message: form.message.trim(),
                reply_to: email,
                to_email: &self.to_email,
            },
        };
        let response = self.http.post(&self.url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        tracing::info!(subject = %form.subject.trim(), "Contact message sent");
        Ok(())
    }
}

/// Logs messages instead of delivering them.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, form: &ContactForm) -> Result<(), MailError> {
        tracing::info!(
            from = %form.email.trim(),
            subject = %form.subject.trim(),
            "Contact message received (no mail service configured): {}",
            form.message.trim()
        );
        Ok(())
    }
}

pub fn mailer_from_config(config: &ContactConfig) -> Arc<dyn Mailer> {
    match EmailJsMailer::from_config(config, reqwest::Client::new()) {
        Some(mailer) => Arc::new(mailer),
        None => {
            tracing::warn!("EmailJS is not configured; contact messages will only be logged");
            Arc::new(LogMailer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_message_inside_window_is_refused() {
        let mut limiter = ContactLimiter::new(Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.try_acquire("1.2.3.4", start).is_ok());
        let wait = limiter
            .try_acquire("1.2.3.4", start + Duration::from_secs(15))
            .unwrap_err();
        assert_eq!(wait, Duration::from_secs(45));
    }

    #[test]
    fn clients_are_limited_independently() {
        let mut limiter = ContactLimiter::new(Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.try_acquire("a", now).is_ok());
        assert!(limiter.try_acquire("b", now).is_ok());
    }

    #[test]
    fn window_expires() {
        let mut limiter = ContactLimiter::new(Duration::from_secs(60));
        let start = Instant::now();
        limiter.try_acquire("a", start).unwrap();
        assert!(limiter
            .try_acquire("a", start + Duration::from_secs(60))
            .is_ok());
    }

    #[test]
    fn release_allows_immediate_retry() {
        let mut limiter = ContactLimiter::new(Duration::from_secs(60));
        let now = Instant::now();
        limiter.try_acquire("a", now).unwrap();
        limiter.release("a");
        assert!(limiter.remaining("a", now).is_none());
    }

    #[test]
    fn wait_message_rounds_up() {
        assert_eq!(
            wait_message(Duration::from_millis(44_100)),
            "Please wait 45 seconds before sending another message."
        );
        assert_eq!(
            wait_message(Duration::from_secs(45)),
            "Please wait 45 seconds before sending another message."
        );
    }

    #[test]
    fn emailjs_requires_every_id() {
        let mut config = ContactConfig::default();
        assert!(EmailJsMailer::from_config(&config, reqwest::Client::new()).is_none());
        config.emailjs_service_id = Some("svc".into());
        config.emailjs_template_id = Some("tpl".into());
        assert!(EmailJsMailer::from_config(&config, reqwest::Client::new()).is_none());
        config.emailjs_public_key = Some("key".into());
        assert!(EmailJsMailer::from_config(&config, reqwest::Client::new()).is_some());
    }

    #[test]
    fn emailjs_body_shape() {
        let body = EmailJsRequest {
            service_id: "svc",
            template_id: "tpl",
            user_id: "key",
            template_params: TemplateParams {
                from_name: "Ansel",
                from_email: "ansel@example.com",
                subject: "Prints",
                message: "Do you sell prints?",
                reply_to: "ansel@example.com",
                to_email: "studio@example.com",
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["user_id"], "key");
        assert_eq!(value["template_params"]["reply_to"], "ansel@example.com");
        assert_eq!(value["template_params"]["to_email"], "studio@example.com");
    }
}
