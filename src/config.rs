// src/config.rs
use std::net::{IpAddr, Ipv4Addr};

use chrono::FixedOffset;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub jwt_secret: String,
    pub db_max_connections: u32,
    /// Offset applied when turning a calendar date into a day window.
    pub business_utc_offset_minutes: i32,
    /// Handovers whose |discrepancy| exceeds this are reported as alerts.
    pub large_discrepancy_threshold: Decimal,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup so it can be exercised without touching the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let config = AppConfig {
            database_url,
            host: parse_or(&lookup, "HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port: parse_or(&lookup, "PORT", 3000)?,
            jwt_secret,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            business_utc_offset_minutes: parse_or(&lookup, "BUSINESS_UTC_OFFSET_MINUTES", 0)?,
            large_discrepancy_threshold: parse_or(
                &lookup,
                "LARGE_DISCREPANCY_THRESHOLD",
                Decimal::new(50000, 2),
            )?,
        };

        if config.business_offset().is_none() {
            return Err(ConfigError::Invalid {
                key: "BUSINESS_UTC_OFFSET_MINUTES",
                value: config.business_utc_offset_minutes.to_string(),
            });
        }
        if config.large_discrepancy_threshold.is_sign_negative() {
            return Err(ConfigError::Invalid {
                key: "LARGE_DISCREPANCY_THRESHOLD",
                value: config.large_discrepancy_threshold.to_string(),
            });
        }

        Ok(config)
    }

    pub fn business_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.business_utc_offset_minutes.checked_mul(60)?)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
