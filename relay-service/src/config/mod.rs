use secrecy::Secret;
use service_core::config::{self as core_config, get_env, is_production};
use service_core::error::AppError;
use std::env;

/// Twilio's shared WhatsApp sandbox sender.
pub const DEFAULT_WHATSAPP_FROM: &str = "+14155238886";
pub const DEFAULT_TWILIO_API_BASE_URL: &str = "https://api.twilio.com";

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub common: core_config::Config,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub twilio: TwilioConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Secret<String>,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: Secret<String>,
    /// Sender number without the channel prefix.
    pub whatsapp_from: String,
    pub api_base_url: String,
    pub enabled: bool,
}

impl RelayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = is_production();

        let account_sid = get_env("TWILIO_ACCOUNT_SID", Some(""), is_prod)?;
        let auth_token = get_env("TWILIO_AUTH_TOKEN", Some(""), is_prod)?;
        let has_credentials = !account_sid.is_empty() && !auth_token.is_empty();

        Ok(RelayConfig {
            common: common_config,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            database: DatabaseConfig {
                host: get_env("DATABASE_HOST", Some("localhost"), is_prod)?,
                port: parse_port(
                    "DATABASE_PORT",
                    &get_env("DATABASE_PORT", Some("3306"), is_prod)?,
                )?,
                user: get_env("DATABASE_USER", Some("root"), is_prod)?,
                password: Secret::new(get_env("DATABASE_PASSWORD", Some(""), is_prod)?),
                name: get_env("DATABASE_NAME", Some("sensors"), is_prod)?,
            },
            twilio: TwilioConfig {
                account_sid,
                auth_token: Secret::new(auth_token),
                whatsapp_from: env::var("TWILIO_WHATSAPP_FROM")
                    .unwrap_or_else(|_| DEFAULT_WHATSAPP_FROM.to_string()),
                api_base_url: env::var("TWILIO_API_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_TWILIO_API_BASE_URL.to_string()),
                enabled: env::var("TWILIO_ENABLED")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(has_credentials),
            },
        })
    }
}

fn parse_port(key: &str, raw: &str) -> Result<u16, AppError> {
    raw.trim().parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("{} must be a valid port, got '{}': {}", key, raw, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_port() {
        assert_eq!(parse_port("DATABASE_PORT", "3306").unwrap(), 3306);
        assert_eq!(parse_port("DATABASE_PORT", " 33060 ").unwrap(), 33060);
    }

    #[test]
    fn malformed_port_is_a_config_error() {
        for raw in ["mysql", "", "70000", "-1"] {
            let err = parse_port("DATABASE_PORT", raw).unwrap_err();
            assert!(matches!(err, AppError::ConfigError(_)), "raw: {raw}");
            assert!(err.to_string().contains("DATABASE_PORT"));
        }
    }
}
