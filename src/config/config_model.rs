use chrono::FixedOffset;

use super::stage::Stage;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub supabase: Supabase,
    pub quota: Quota,
    pub payments: Payments,
    pub stage: Stage,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct Supabase {
    pub jwt_secret: String,
}

#[derive(Debug, Clone)]
pub struct Quota {
    /// Time zone in which daily counters reset and login streaks are counted.
    pub utc_offset: FixedOffset,
}

#[derive(Debug, Clone)]
pub struct Payments {
    /// Public base URL used to build return, cancel and notification URLs.
    pub app_url: String,
    pub webhook_secret: Option<String>,
    pub orange_money: OrangeMoney,
    pub wave: Wave,
}

#[derive(Debug, Clone)]
pub struct OrangeMoney {
    pub api_url: String,
    pub token: String,
    pub merchant_key: String,
    pub sandbox: bool,
}

#[derive(Debug, Clone)]
pub struct Wave {
    pub api_url: String,
    pub api_key: String,
}
