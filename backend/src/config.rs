//! # Configuration
//!
//! Process-wide settings loaded once at startup from environment variables.
//! Every variable has a default; a value that is present but cannot be parsed
//! aborts startup instead of being silently replaced.

use std::{env, fmt::Display, net::SocketAddr, str::FromStr};

use anyhow::{anyhow, Result};
use chrono::FixedOffset;
use tracing::info;

pub const DATABASE_URL_VAR: &str = "PORTAL_DATABASE_URL";
pub const BIND_ADDR_VAR: &str = "PORTAL_BIND_ADDR";
pub const CORS_ORIGIN_VAR: &str = "PORTAL_CORS_ORIGIN";
pub const WEEK_OFFSET_VAR: &str = "PORTAL_WEEK_UTC_OFFSET_MINUTES";
pub const ATOMIC_PROCEDURES_VAR: &str = "PORTAL_ATOMIC_PROCEDURES";
pub const EMAIL_DOMAIN_VAR: &str = "PORTAL_USER_EMAIL_DOMAIN";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub cors_origin: String,
    /// Civil time reference for the Saturday reset, as minutes east of UTC
    pub week_utc_offset_minutes: i32,
    /// Whether the store exposes its single-statement increment/decrement procedures
    pub atomic_procedures: bool,
    /// Domain used for placeholder emails of members created without one
    pub user_email_domain: String,
}

impl Config {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            database_url: try_load(&lookup, DATABASE_URL_VAR, "sqlite:portal.db")?,
            bind_addr: try_load(&lookup, BIND_ADDR_VAR, "127.0.0.1:3000")?,
            cors_origin: try_load(&lookup, CORS_ORIGIN_VAR, "http://localhost:8080")?,
            week_utc_offset_minutes: try_load(&lookup, WEEK_OFFSET_VAR, "0")?,
            atomic_procedures: try_load(&lookup, ATOMIC_PROCEDURES_VAR, "true")?,
            user_email_domain: try_load(&lookup, EMAIL_DOMAIN_VAR, "users.artass.local")?,
        };

        // Validate eagerly so a bad offset fails at startup, not on the first request
        config.week_offset()?;

        Ok(config)
    }

    /// Fixed offset used to truncate and compare accounting week boundaries
    pub fn week_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.week_utc_offset_minutes * 60).ok_or_else(|| {
            anyhow!(
                "{} out of range: {}",
                WEEK_OFFSET_VAR,
                self.week_utc_offset_minutes
            )
        })
    }
}

fn try_load<T, F>(lookup: &F, key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim()
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value {raw:?}: {e}"))
}
