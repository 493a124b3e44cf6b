use std::env;
use std::time::Duration;

use config::builder::DefaultState;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgSslMode;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub catalog: CatalogConfig,
    pub cors: CorsConfig,
}

/// Connection settings for the user store.
///
/// A full `url` takes precedence over the discrete parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub ssl_mode: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    pub trusted_proxies: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, DATABASE__URL, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{RUN_MODE}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults
    ///
    /// Fails if the signing secret is empty.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let builder = Self::with_defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(
                Environment::default()
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.trusted_proxies")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            );

        Self::finish(builder)
    }

    fn with_defaults() -> Result<config::builder::ConfigBuilder<DefaultState>, ConfigError> {
        ConfigBuilder::builder()
            .set_default("database.host", "localhost")?
            .set_default("database.port", 5432)?
            .set_default("database.user", "postgres")?
            .set_default("database.password", "password")?
            .set_default("database.name", "mobile_shop")?
            .set_default("database.ssl_mode", "disable")?
            .set_default("database.max_connections", 5)?
            .set_default("server.http_port", 8080)?
            .set_default(
                "server.trusted_proxies",
                vec![
                    "127.0.0.1",
                    "::1",
                    "10.0.0.0/8",
                    "172.16.0.0/12",
                    "192.168.0.0/16",
                ],
            )?
            .set_default("jwt.secret", "")?
            .set_default("jwt.expiration_hours", 24)?
            .set_default("catalog.base_url", "https://dummyjson.com")?
            .set_default("catalog.timeout_secs", 10)?
            .set_default(
                "cors.allowed_origins",
                vec![
                    "http://localhost:3000",
                    "http://localhost:5173",
                    "http://localhost:5174",
                ],
            )
    }

    fn finish(builder: config::builder::ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "jwt.secret is empty; set JWT__SECRET".to_string(),
            ));
        }
        if !(1..=auth::MAX_TOKEN_LIFETIME_HOURS).contains(&self.jwt.expiration_hours) {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_hours must be between 1 and {}",
                auth::MAX_TOKEN_LIFETIME_HOURS
            )));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    /// Build connection options from either the URL or the discrete parameters.
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        match self.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.parse::<PgConnectOptions>(),
            _ => Ok(PgConnectOptions::new()
                .host(&self.host)
                .port(self.port)
                .username(&self.user)
                .password(&self.password)
                .database(&self.name)
                .ssl_mode(self.ssl_mode.parse::<PgSslMode>()?)),
        }
    }

    /// Where the pool connects, without credentials.
    pub fn describe(&self) -> String {
        match self.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => "url".to_string(),
            _ => format!("{}:{}/{}", self.host, self.port, self.name),
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
