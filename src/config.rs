// src/config.rs
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STATIC_DIR: &str = "dist/client";
const ALTERNATE_STATIC_DIRS: [&str; 3] = ["dist/client", "client/dist", "dist/public"];

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Development,
    Production,
}

impl Mode {
    pub fn is_production(self) -> bool {
        self == Mode::Production
    }

    pub fn bind_host(self) -> &'static str {
        match self {
            Mode::Production => "0.0.0.0",
            Mode::Development => "127.0.0.1",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub mode: Mode,
    pub on_render: bool,
    pub static_dir: PathBuf,
    pub openai: OpenAiConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
}

/// SMTP settings. `from` and `to` fall back to the login user.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl EmailConfig {
    pub fn has_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let on_render = get("RENDER").as_deref() == Some("true");
        let mode = if on_render || get("NODE_ENV").as_deref() == Some("production") {
            Mode::Production
        } else {
            Mode::Development
        };

        let port = get("PORT").and_then(|p| p.parse().ok()).unwrap_or(DEFAULT_PORT);

        let static_dir = get("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

        let openai = OpenAiConfig {
            api_key: get("OPENAI_API_KEY"),
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            api_url: get("OPENAI_API_URL").unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string()),
        };

        let username = get("EMAIL_USER");
        let email = EmailConfig {
            host: get("EMAIL_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
            port: get("EMAIL_PORT").and_then(|p| p.parse().ok()).unwrap_or(587),
            password: get("EMAIL_PASS"),
            from: get("EMAIL_FROM").or_else(|| username.clone()),
            to: get("EMAIL_TO").or_else(|| username.clone()),
            username,
        };

        Self { port, mode, on_render, static_dir, openai, email }
    }

    /// Directory holding the built SPA, probing the usual build outputs
    /// when the configured one is missing.
    pub fn resolve_static_dir(&self) -> Option<PathBuf> {
        resolve_static_dir(&self.static_dir, Path::new("."))
    }
}

pub fn resolve_static_dir(configured: &Path, base: &Path) -> Option<PathBuf> {
    let primary = base.join(configured);
    if primary.is_dir() {
        return Some(primary);
    }
    tracing::warn!(path = %primary.display(), "static directory does not exist, probing alternatives");
    ALTERNATE_STATIC_DIRS
        .iter()
        .map(|alt| base.join(alt))
        .find(|p| p.is_dir())
}
