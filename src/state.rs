use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api::ApiClient;
use crate::config::Config;
use crate::contact::{mailer_from_config, ContactLimiter, Mailer};
use crate::imaging::{CompressionOptions, UploadLimits};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub api: ApiClient,
    pub contact_limiter: Arc<Mutex<ContactLimiter>>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, crate::api::ApiError> {
        let api = ApiClient::new(&config.api.base_url, config.api_timeout())?;
        let mailer = mailer_from_config(&config.contact);
        Ok(Self::with_mailer(config, api, mailer))
    }

    pub fn with_mailer(config: Config, api: ApiClient, mailer: Arc<dyn Mailer>) -> Self {
        let limiter = ContactLimiter::new(config.rate_limit());
        Self {
            config,
            api,
            contact_limiter: Arc::new(Mutex::new(limiter)),
            mailer,
        }
    }

    pub fn upload_limits(&self) -> UploadLimits {
        let upload = &self.config.upload;
        UploadLimits {
            max_bytes: upload.max_bytes,
            compress_over_bytes: upload.compress_over_bytes,
            compression: CompressionOptions {
                max_width: upload.max_width,
                max_height: upload.max_height,
                quality: upload.jpeg_quality,
            },
        }
    }
}
