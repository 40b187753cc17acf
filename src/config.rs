use serde::Deserialize;

use crate::accounts::password::DEFAULT_COST;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        Ok(Self::from_parts(
            database_url,
            std::env::var("DATABASE_MAX_CONNECTIONS").ok(),
            std::env::var("BCRYPT_COST").ok(),
        ))
    }

    /// Unparsable optional values fall back to their defaults.
    fn from_parts(
        database_url: String,
        max_connections: Option<String>,
        bcrypt_cost: Option<String>,
    ) -> Self {
        Self {
            database_url,
            max_connections: max_connections
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            bcrypt_cost: bcrypt_cost
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(DEFAULT_COST),
        }
    }
}
