use std::time::Duration;

use anyhow::{ensure, Context, Result};

use crate::preview::templates::TemplateId;
use crate::session::SessionSettings;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub transition_fade_ms: u64,
    pub save_latency_ms: u64,
    /// 0 disables toast auto-dismiss.
    pub toast_ttl_ms: u64,
    /// Must be a free template: every new session starts on the free plan.
    pub default_template: TemplateId,
    /// Sessions untouched this long are evicted. 0 keeps them until deleted.
    pub session_idle_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            transition_fade_ms: parse_env("TRANSITION_FADE_MS", 150)?,
            save_latency_ms: parse_env("SAVE_LATENCY_MS", 600)?,
            toast_ttl_ms: parse_env("TOAST_TTL_MS", 4000)?,
            default_template: parse_default_template(std::env::var("DEFAULT_TEMPLATE").ok())?,
            session_idle_ttl_secs: parse_env("SESSION_IDLE_TTL_SECS", 1800)?,
        })
    }

    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session_idle_ttl_secs)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            transition_fade: Duration::from_millis(self.transition_fade_ms),
            save_latency: Duration::from_millis(self.save_latency_ms),
            toast_ttl: Duration::from_millis(self.toast_ttl_ms),
            default_template: self.default_template,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            transition_fade_ms: 150,
            save_latency_ms: 600,
            toast_ttl_ms: 4000,
            default_template: TemplateId::default(),
            session_idle_ttl_secs: 1800,
        }
    }
}

fn parse_default_template(raw: Option<String>) -> Result<TemplateId> {
    let Some(name) = raw else {
        return Ok(TemplateId::default());
    };
    let template: TemplateId = name
        .parse()
        .with_context(|| format!("DEFAULT_TEMPLATE '{name}' is not a known template"))?;
    ensure!(
        !template.is_premium(),
        "DEFAULT_TEMPLATE '{template}' is premium-only and cannot be the default for new sessions"
    );
    Ok(template)
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
