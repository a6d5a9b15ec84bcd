// ABOUTME: Server configuration read from the environment
// ABOUTME: Parses ports, paths, pricing and order policies, failing fast on bad values

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use storefront_api::ApiSettings;
use storefront_config::constants::*;
use storefront_core::PricingPolicy;
use storefront_orders::CancellationPolicy;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(String),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("{var} must be a decimal amount, got '{value}'")]
    InvalidAmount { var: &'static str, value: String },
    #[error("{var} must be a positive whole number, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var} must be true or false, got '{value}'")]
    InvalidFlag { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: PathBuf,
    pub cors_origin: String,
    pub pricing: PricingPolicy,
    pub submit_timeout: Duration,
    pub cancellation: CancellationPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_port()?;

        let database_path = non_empty_var(STOREFRONT_DATABASE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(storefront_core::database_file);

        let cors_origin =
            non_empty_var(CORS_ORIGIN).unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());

        let defaults = PricingPolicy::default();
        let pricing = PricingPolicy {
            shipping_fee: parse_amount(STOREFRONT_SHIPPING_FEE)?.unwrap_or(defaults.shipping_fee),
            free_shipping_threshold: parse_amount(STOREFRONT_FREE_SHIPPING_THRESHOLD)?,
            tolerance: parse_amount(STOREFRONT_TOTAL_TOLERANCE)?.unwrap_or(defaults.tolerance),
        };

        let submit_timeout = match non_empty_var(STOREFRONT_SUBMIT_TIMEOUT_SECS) {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        var: STOREFRONT_SUBMIT_TIMEOUT_SECS,
                        value,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_SUBMIT_TIMEOUT_SECS),
        };

        let restock = match non_empty_var(STOREFRONT_RESTOCK_ON_CANCEL) {
            Some(value) => parse_flag(&value).ok_or(ConfigError::InvalidFlag {
                var: STOREFRONT_RESTOCK_ON_CANCEL,
                value,
            })?,
            None => false,
        };

        Ok(Config {
            port,
            database_path,
            cors_origin,
            pricing,
            submit_timeout,
            cancellation: CancellationPolicy::from_restock_flag(restock),
        })
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            pricing: self.pricing.clone(),
            cancellation: self.cancellation,
            submit_timeout: self.submit_timeout,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_port() -> Result<u16, ConfigError> {
    let Some(raw) = non_empty_var(STOREFRONT_API_PORT).or_else(|| non_empty_var(PORT)) else {
        return Ok(DEFAULT_API_PORT);
    };

    let port = raw
        .parse::<u16>()
        .map_err(|_| ConfigError::InvalidPort(raw.clone()))?;
    if port == 0 {
        return Err(ConfigError::PortOutOfRange(port));
    }
    Ok(port)
}

fn parse_amount(var: &'static str) -> Result<Option<Decimal>, ConfigError> {
    let Some(value) = non_empty_var(var) else {
        return Ok(None);
    };
    match Decimal::from_str(&value) {
        Ok(amount) if !amount.is_sign_negative() => Ok(Some(amount)),
        _ => Err(ConfigError::InvalidAmount { var, value }),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
