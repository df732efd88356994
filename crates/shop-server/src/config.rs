use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "secret",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SHOP_JWT_SECRET is unset or still a placeholder; set it in your .env file")]
    MissingSecret,

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub token_ttl: chrono::Duration,
    pub seed_demo: bool,
}

impl Config {
    /// Read `SHOP_*` variables. Call after loading `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = get("SHOP_JWT_SECRET").unwrap_or_default();
        if jwt_secret.trim().is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            return Err(ConfigError::MissingSecret);
        }

        let db_path = get("SHOP_DB_PATH").unwrap_or_else(|| "shop.db".into()).into();
        let host = get("SHOP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse(&get, "SHOP_PORT", 3000)?;
        let addr = format!("{}:{}", host, port)
            .parse()
            .map_err(|_| ConfigError::Invalid { name: "SHOP_HOST", value: host })?;
        let ttl_hours: i64 = parse(&get, "SHOP_TOKEN_TTL_HOURS", 24)?;
        if ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                name: "SHOP_TOKEN_TTL_HOURS",
                value: ttl_hours.to_string(),
            });
        }
        let seed_demo = parse(&get, "SHOP_SEED_DEMO", false)?;

        Ok(Self {
            jwt_secret,
            db_path,
            addr,
            token_ttl: chrono::Duration::hours(ttl_hours),
            seed_demo,
        })
    }
}

fn parse<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
