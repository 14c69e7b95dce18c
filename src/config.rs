use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    // None means the webhook is open
    pub webhook_secret: Option<String>,

    pub trade_script: PathBuf,
    pub trade_interpreter: Option<String>,
    pub trade_timeout: Duration,

    // larger webhook bodies are acked and dropped unread
    pub max_body_bytes: usize,
}

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Reads the process environment. `main` loads `.env` before calling this.
pub fn load() -> Settings {
    from_lookup(|key| env::var(key).ok())
}

/// Builds settings from any key lookup. `load` feeds it the process
/// environment; tests feed it a closure over a fixed table.
pub fn from_lookup<F>(lookup: F) -> Settings
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let host = non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

    let port = match non_empty("PORT") {
        Some(raw) => raw.trim().parse::<u16>().unwrap_or_else(|_| {
            tracing::warn!(value = %raw, "invalid PORT, using default {}", DEFAULT_PORT);
            DEFAULT_PORT
        }),
        None => DEFAULT_PORT,
    };

    let webhook_secret = non_empty("WEBHOOK_SECRET");

    let trade_script = non_empty("TRADE_SCRIPT")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("execute_trade.py"));

    let trade_interpreter = non_empty("TRADE_INTERPRETER");

    let trade_timeout = non_empty("TRADE_TIMEOUT_SECS")
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

    let max_body_bytes = non_empty("WEBHOOK_MAX_BODY_BYTES")
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_MAX_BODY_BYTES);

    Settings {
        host,
        port,
        webhook_secret,
        trade_script,
        trade_interpreter,
        trade_timeout,
        max_body_bytes,
    }
}
