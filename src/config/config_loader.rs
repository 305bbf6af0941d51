use anyhow::{Context, Result, bail};
use chrono::FixedOffset;

use super::{
    config_model::{Database, DotEnvyConfig, OrangeMoney, Payments, Quota, Server, Supabase, Wave},
    stage::Stage,
};

const ORANGE_SANDBOX_API_URL: &str = "https://api.orange.com/orange-money-webpay/dev/v1";
const ORANGE_LIVE_API_URL: &str = "https://api.orange.com/orange-money-webpay/prod/v1";
const WAVE_API_URL: &str = "https://api.wave.com/v1";

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    from_lookup(|key| std::env::var(key).ok())
}

/// Builds the configuration from any key lookup so it can be exercised without
/// touching the process environment.
pub fn from_lookup<F>(lookup: F) -> Result<DotEnvyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &str| -> Result<String> {
        lookup(key)
            .filter(|value| !value.trim().is_empty())
            .with_context(|| format!("{key} is invalid"))
    };

    let server = Server {
        port: required("SERVER_PORT")?
            .parse()
            .context("SERVER_PORT is invalid")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        max_connections: lookup("DATABASE_MAX_CONNECTIONS")
            .map(|value| value.parse())
            .transpose()
            .context("DATABASE_MAX_CONNECTIONS is invalid")?
            .unwrap_or(10),
    };

    let supabase = Supabase {
        jwt_secret: required("SUPABASE_JWT_SECRET")?,
    };

    let offset_minutes: i32 = lookup("QUOTA_UTC_OFFSET_MINUTES")
        .map(|value| value.parse())
        .transpose()
        .context("QUOTA_UTC_OFFSET_MINUTES is invalid")?
        .unwrap_or(0);
    let Some(utc_offset) = FixedOffset::east_opt(offset_minutes * 60) else {
        bail!("QUOTA_UTC_OFFSET_MINUTES is out of range: {offset_minutes}");
    };
    let quota = Quota { utc_offset };

    let stage = Stage::try_from(&lookup("STAGE").unwrap_or_default()).unwrap_or_default();

    let orange_sandbox = lookup("ORANGE_SANDBOX")
        .map(|value| parse_flag(&value))
        .unwrap_or(!stage.is_production());
    let orange_money = OrangeMoney {
        api_url: lookup("ORANGE_API_URL").unwrap_or_else(|| {
            if orange_sandbox {
                ORANGE_SANDBOX_API_URL.to_string()
            } else {
                ORANGE_LIVE_API_URL.to_string()
            }
        }),
        token: lookup("ORANGE_TOKEN").unwrap_or_default(),
        merchant_key: lookup("ORANGE_MERCHANT_KEY").unwrap_or_default(),
        sandbox: orange_sandbox,
    };

    let wave = Wave {
        api_url: lookup("WAVE_API_URL").unwrap_or_else(|| WAVE_API_URL.to_string()),
        api_key: lookup("WAVE_API_KEY").unwrap_or_default(),
    };

    let payments = Payments {
        app_url: required("APP_URL")?.trim_end_matches('/').to_string(),
        webhook_secret: lookup("PAYMENT_WEBHOOK_SECRET").filter(|secret| !secret.is_empty()),
        orange_money,
        wave,
    };

    Ok(DotEnvyConfig {
        server,
        database,
        supabase,
        quota,
        payments,
        stage,
    })
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
