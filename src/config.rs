use std::env;
use std::fmt::Display;
use std::str::FromStr;
use log::info;
use crate::error::{ReportError, Result};

const DEFAULT_DATABASE_URL: &str = "sqlite:ballot_reports.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACTOR: &str = "system";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    /// Recorded in the audit log when no `--actor` is given.
    pub default_actor: String,
}

impl Config {
    /// Reads `DATABASE_URL`, `DB_MAX_CONNECTIONS` and `REPORT_ACTOR`. Call after `dotenvy::dotenv()`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(ReportError::InvalidArgument("DB_MAX_CONNECTIONS must be at least 1".into()));
        }
        let default_actor = lookup("REPORT_ACTOR").unwrap_or_else(|| DEFAULT_ACTOR.to_string());

        Ok(Self { database_url, max_connections, default_actor })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ReportError::InvalidArgument(format!("{}={:?}: {}", key, raw, e))),
        None => {
            info!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}
