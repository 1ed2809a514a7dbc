use anyhow::Context;

const DEFAULT_ORIGINS: &str = "http://localhost:3000,http://localhost:3001";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
        let database_url = var("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://pairchat.db?mode=rwc".to_owned());
        let max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(n) => n.parse().context("DATABASE_MAX_CONNECTIONS must be a number")?,
            None => 16,
        };
        let port = match var("PORT") {
            Some(port) => port.parse().context("PORT must be a port number")?,
            None => 5000,
        };
        let allowed_origins = var("ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ORIGINS.to_owned())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_owned)
            .collect();

        Ok(Config {
            database_url,
            max_connections,
            port,
            allowed_origins,
        })
    }
}
