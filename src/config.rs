use crate::accounts::DEFAULT_ITERATIONS;
use crate::errors::ConfigError;
use crate::rates::{DEFAULT_RATES, RevenueRateTable};
use std::{env, path::PathBuf};

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub records_path: PathBuf,
    pub rates: RevenueRateTable,
    pub password_iterations: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; a bad rate table fails here,
    /// before the server starts.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };
        let records_path = lookup("RECORDS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/records.json"));
        let rates = RevenueRateTable::parse(
            lookup("REVENUE_RATES").as_deref().unwrap_or(DEFAULT_RATES),
        )?;

        let password_iterations = match lookup("PASSWORD_ITERATIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|iterations| *iterations > 0)
                .ok_or(ConfigError::InvalidIterations(raw))?,
            None => DEFAULT_ITERATIONS,
        };

        Ok(Self {
            port,
            records_path,
            rates,
            password_iterations,
        })
    }
}
