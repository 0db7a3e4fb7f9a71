use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "folio", about = "A photography portfolio front-end")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Base URL of the portfolio REST backend
    #[arg(long)]
    pub api_url: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub gallery: GalleryConfig,
    pub upload: UploadConfig,
    pub contact: ContactConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Trust `X-Forwarded-For` for the client address. Only set this when
    /// a reverse proxy in front of the server overwrites the header.
    pub behind_proxy: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub cookie_name: String,
    pub session_hours: u64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GalleryConfig {
    pub photos_per_page: u32,
    pub albums_per_page: u32,
    pub featured_limit: u32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct UploadConfig {
    pub max_bytes: usize,
    pub compress_over_bytes: usize,
    pub max_width: u32,
    pub max_height: u32,
    pub jpeg_quality: u8,
}

/// Contact form delivery. Messages are only logged unless all three
/// EmailJS ids are set.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ContactConfig {
    pub rate_limit_secs: u64,
    pub to_email: String,
    pub emailjs_url: String,
    pub emailjs_service_id: Option<String>,
    pub emailjs_template_id: Option<String>,
    pub emailjs_public_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            behind_proxy: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "folio_token".to_string(),
            session_hours: 720,
        }
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            photos_per_page: 12,
            albums_per_page: 8,
            featured_limit: 4,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: crate::imaging::MAX_UPLOAD_BYTES,
            compress_over_bytes: crate::imaging::COMPRESS_OVER_BYTES,
            max_width: 2560,
            max_height: 1920,
            jpeg_quality: 92,
        }
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            rate_limit_secs: 60,
            to_email: "contact@example.com".to_string(),
            emailjs_url: "https://api.emailjs.com/api/v1.0/email/send".to_string(),
            emailjs_service_id: None,
            emailjs_template_id: None,
            emailjs_public_key: None,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = cli.config.clone().or_else(Self::default_path);

        let mut config = match config_path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)?;
                tracing::info!("Loaded config from {}", path.display());
                toml::from_str(&content)?
            }
            _ => Config::default(),
        };

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(ref api_url) = cli.api_url {
            config.api.base_url = api_url.clone();
        }

        Ok(config)
    }

    /// `~/.folio/config.toml`, when a home directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".folio").join("config.toml"))
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn rate_limit(&self) -> Duration {
        Duration::from_secs(self.contact.rate_limit_secs)
    }
}
