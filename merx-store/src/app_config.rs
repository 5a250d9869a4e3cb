use merx_catalog::region::RegionCurrencyMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub kafka: KafkaConfig,
    pub confirmation: ConfirmationConfig,
    /// Region -> accepted currency codes. Falls back to the built-in market
    /// table when absent.
    #[serde(default)]
    pub regions: Option<HashMap<String, Vec<String>>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfirmationConfig {
    pub base_url: String,
    /// Upper bound on a confirmation round trip; beyond this the order is
    /// treated as failed and rolled back.
    #[serde(default = "default_confirmation_timeout")]
    pub timeout_seconds: u64,
}

fn default_confirmation_timeout() -> u64 {
    10
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("MERX").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Immutable market table for the surrounding services, either from the
    /// `regions` section or the shipped defaults.
    pub fn region_currency_map(&self) -> RegionCurrencyMap {
        match &self.regions {
            Some(entries) => RegionCurrencyMap::new(
                entries
                    .iter()
                    .map(|(region, currencies)| (region.clone(), currencies.clone())),
            ),
            None => RegionCurrencyMap::builtin(),
        }
    }
}
