//! Environment configuration.

use std::time::Duration;

use thiserror::Error;

use crate::infrastructure::stripe::DEFAULT_API_BASE;
use crate::services::{CheckoutSettings, ReconcileSettings};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable '{0}'")]
    Missing(&'static str),

    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub stripe_secret_key: String,
    pub stripe_api_base: String,
    pub public_base_url: String,
    pub admin_emails: Vec<String>,
    pub currency: String,
    pub shipping_countries: Vec<String>,
    pub session_page_size: u32,
    pub lookup_timeout: Duration,
    pub nats_url: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("stripe_api_base", &self.stripe_api_base)
            .field("public_base_url", &self.public_base_url)
            .field("admin_emails", &self.admin_emails.len())
            .field("currency", &self.currency)
            .field("shipping_countries", &self.shipping_countries)
            .field("session_page_size", &self.session_page_size)
            .field("lookup_timeout", &self.lookup_timeout)
            .field("nats", &self.nats_url.is_some())
            .finish_non_exhaustive()
    }
}

fn list(raw: Option<String>) -> Vec<String> {
    raw.unwrap_or_default().split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));
        let number = |name: &'static str, default: u64| -> Result<u64, ConfigError> {
            get(name)
                .map(|v| v.parse::<u64>().map_err(|e| ConfigError::Invalid { name, reason: e.to_string() }))
                .transpose()
                .map(|v| v.unwrap_or(default))
        };

        let port = u16::try_from(number("PORT", 8083)?)
            .map_err(|_| ConfigError::Invalid { name: "PORT", reason: "out of range".into() })?;
        let session_page_size = number("GATEWAY_SESSION_PAGE_SIZE", 100)?;
        if !(1..=100).contains(&session_page_size) {
            return Err(ConfigError::Invalid { name: "GATEWAY_SESSION_PAGE_SIZE", reason: "must be between 1 and 100".into() });
        }
        let lookup_ms = number("PRODUCT_LOOKUP_TIMEOUT_MS", 3000)?;
        if lookup_ms == 0 {
            return Err(ConfigError::Invalid { name: "PRODUCT_LOOKUP_TIMEOUT_MS", reason: "must be positive".into() });
        }

        let public_base_url = required("PUBLIC_BASE_URL")?;
        if !(public_base_url.starts_with("http://") || public_base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid { name: "PUBLIC_BASE_URL", reason: "must be an http(s) URL".into() });
        }
        let shipping_countries: Vec<String> = match get("SHIPPING_COUNTRIES") {
            Some(raw) => list(Some(raw)).into_iter().map(|c| c.to_uppercase()).collect(),
            None => vec!["US".to_string()],
        };
        if let Some(bad) = shipping_countries.iter().find(|c| c.len() != 2 || !c.chars().all(|ch| ch.is_ascii_alphabetic())) {
            return Err(ConfigError::Invalid { name: "SHIPPING_COUNTRIES", reason: format!("'{bad}' is not a two-letter country code") });
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port,
            stripe_secret_key: required("STRIPE_SECRET_KEY")?,
            stripe_api_base: get("STRIPE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            admin_emails: list(get("ADMIN_EMAILS")),
            currency: get("CHECKOUT_CURRENCY").unwrap_or_else(|| "usd".to_string()).to_lowercase(),
            shipping_countries,
            session_page_size: session_page_size as u32,
            lookup_timeout: Duration::from_millis(lookup_ms),
            nats_url: get("NATS_URL"),
        })
    }

    pub fn checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            public_base_url: self.public_base_url.clone(),
            currency: self.currency.clone(),
            allowed_countries: self.shipping_countries.clone(),
        }
    }

    pub fn reconcile_settings(&self) -> ReconcileSettings {
        ReconcileSettings { page_size: self.session_page_size, lookup_timeout: self.lookup_timeout }
    }
}
