use anyhow::{Context, Result};

use super::config_model::{AuthSecret, BackendServer, Database, DotEnvyConfig, Stripe, Twilio};

const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_CURRENCY: &str = "inr";
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 15;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    load_from(|key| std::env::var(key).ok())
}

/// Builds the config from any key lookup; `load` passes the process environment.
pub fn load_from<F>(lookup: F) -> Result<DotEnvyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &str| -> Result<String> {
        lookup(key)
            .filter(|value| !value.trim().is_empty())
            .with_context(|| format!("{key} is invalid"))
    };
    let parsed = |key: &str| -> Result<u64> {
        let raw = required(key)?;
        raw.trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {raw:?}"))
    };
    let parsed_or = |key: &str, default: u64| -> Result<u64> {
        match lookup(key) {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse()
                .with_context(|| format!("{key} must be a number, got {raw:?}")),
            _ => Ok(default),
        }
    };

    let backend_server = BackendServer {
        port: parsed("SERVER_PORT_BACKEND")?
            .try_into()
            .context("SERVER_PORT_BACKEND is out of range")?,
        body_limit: parsed("SERVER_BODY_LIMIT")?,
        timeout: parsed("SERVER_TIMEOUT")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        pool_size: parsed_or("DATABASE_POOL_SIZE", DEFAULT_POOL_SIZE.into())?
            .try_into()
            .context("DATABASE_POOL_SIZE is out of range")?,
    };

    let auth = AuthSecret {
        jwt_secret: required("JWT_SECRET")?,
    };

    let stripe = Stripe {
        secret_key: required("STRIPE_SECRET_KEY")?,
        webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
        success_url: required("STRIPE_SUCCESS_URL")?,
        cancel_url: required("STRIPE_CANCEL_URL")?,
        currency: lookup("PAYMENT_CURRENCY")
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        timeout_secs: parsed_or("PAYMENT_GATEWAY_TIMEOUT_SECS", DEFAULT_GATEWAY_TIMEOUT_SECS)?,
    };

    let twilio = Twilio {
        account_sid: required("TWILIO_ACCOUNT_SID")?,
        auth_token: required("TWILIO_AUTH_TOKEN")?,
        from_phone_number: required("TWILIO_FROM_PHONE_NUMBER")?,
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        auth,
        stripe,
        twilio,
    })
}
