//! Runtime configuration, read from the environment (and `.env`, if present).

use std::env;

use tracing::level_filters::LevelFilter;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://yatube.db?mode=rwc";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("{0} must be a port number, got {1:?}")]
	Port(&'static str, String),
	#[error("{0} must be one of off, error, warn, info, debug or trace, got {1:?}")]
	LogLevel(&'static str, String),
	#[error("ADMIN_USERNAME and ADMIN_PASSWORD must be set together")]
	Admin,
}

/// Credentials of a staff account created on startup.
#[derive(Debug, Clone)]
pub struct AdminAccount {
	pub username: String,
	pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
	pub database_url: String,
	pub host: String,
	pub port: u16,
	pub log_level: LevelFilter,
	pub admin: Option<AdminAccount>,
}

impl Config {
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let port = match lookup("PORT") {
			Some(port) => port.parse().map_err(|_| ConfigError::Port("PORT", port))?,
			None => 3000,
		};

		let log_level = match lookup("LOG_LEVEL") {
			Some(level) => level
				.parse()
				.map_err(|_| ConfigError::LogLevel("LOG_LEVEL", level))?,
			None => LevelFilter::INFO,
		};

		let admin = match (lookup("ADMIN_USERNAME"), lookup("ADMIN_PASSWORD")) {
			(Some(username), Some(password)) => Some(AdminAccount { username, password }),
			(None, None) => None,
			_ => return Err(ConfigError::Admin),
		};

		Ok(Self {
			database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
			host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".into()),
			port,
			log_level,
			admin,
		})
	}
}
