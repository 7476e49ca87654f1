use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;

/// Runtime configuration loaded once from the environment (and a `.env`
/// file when present).
#[derive(Debug)]
pub struct Config {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Tracing filter directive, e.g. `info` or `hisaab=debug`.
    pub log_level: String,
    /// Currency recorded on expenses that do not specify one.
    pub default_currency: String,
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        Config {
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(3000),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            default_currency: env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| "INR".to_string()),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
