use std::fmt;

use config::{ConfigError, Environment};

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    /// Server-level connection, used to create throwaway test databases
    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Access token signing settings
///
/// Token lifetimes are fixed constants, only the secret is configurable.
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
}

impl fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"[redacted]")
            .finish()
    }
}

impl Settings {
    fn validate(self) -> Result<Self, ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".to_string()));
        }
        Ok(self)
    }
}

/// Load settings from `configuration.{yaml,toml,json}` in the working
/// directory, overridden by `APP__SECTION__KEY` environment variables
/// (e.g. `APP__JWT__SECRET`).
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8080)?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;
    settings.try_deserialize::<Settings>()?.validate()
}
