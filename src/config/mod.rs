use chrono::Duration;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::services::{InventorySettings, ReservationSettings};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub inventory: InventoryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    /// `json` switches the log output to JSON lines.
    pub log_format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

// Redis опционален: без REDIS_URL кеш мест просто выключен
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: Option<String>,
    pub seat_cache_ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InventoryConfig {
    pub safety_cap: usize,
    pub rebuild_batch_size: usize,
    pub hold_ttl_seconds: i64,
    pub max_hold_ttl_seconds: i64,
    pub lock_ttl_seconds: i64,
}

impl InventoryConfig {
    pub fn inventory_settings(&self) -> InventorySettings {
        InventorySettings {
            safety_cap: self.safety_cap,
            batch_size: self.rebuild_batch_size,
        }
    }

    pub fn reservation_settings(&self) -> ReservationSettings {
        ReservationSettings {
            default_hold_ttl: Duration::seconds(self.hold_ttl_seconds),
            max_hold_ttl: Duration::seconds(self.max_hold_ttl_seconds),
            lock_ttl: Duration::seconds(self.lock_ttl_seconds),
        }
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        let inventory = InventorySettings::default();
        let reservations = ReservationSettings::default();
        Self {
            safety_cap: inventory.safety_cap,
            rebuild_batch_size: inventory.batch_size,
            hold_ttl_seconds: reservations.default_hold_ttl.num_seconds(),
            max_hold_ttl_seconds: reservations.max_hold_ttl.num_seconds(),
            lock_ttl_seconds: reservations.lock_ttl.num_seconds(),
        }
    }
}

fn var_or(name: &'static str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

fn positive<T: FromStr + PartialOrd + Default>(name: &'static str, default: T) -> Result<T, ConfigError> {
    let value = parsed(name, default)?;
    if value <= T::default() {
        return Err(ConfigError::Invalid {
            name,
            value: env::var(name).unwrap_or_default(),
        });
    }
    Ok(value)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = InventoryConfig::default();

        Ok(Config {
            app: AppConfig {
                host: var_or("HOST", "0.0.0.0"),
                port: parsed("PORT", 8000)?,
                environment: var_or("ENVIRONMENT", "development"),
                rust_log: var_or("RUST_LOG", "seat_inventory=debug,tower_http=debug"),
                log_format: var_or("LOG_FORMAT", "text"),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
                pool_size: positive("DB_POOL_SIZE", 20)?,
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").ok().filter(|u| !u.trim().is_empty()),
                seat_cache_ttl_seconds: positive("SEAT_CACHE_TTL_SECONDS", 86_400)?,
            },
            inventory: InventoryConfig {
                safety_cap: positive("SEAT_SAFETY_CAP", defaults.safety_cap)?,
                rebuild_batch_size: positive("REBUILD_BATCH_SIZE", defaults.rebuild_batch_size)?,
                hold_ttl_seconds: positive("HOLD_TTL_SECONDS", defaults.hold_ttl_seconds)?,
                max_hold_ttl_seconds: positive("MAX_HOLD_TTL_SECONDS", defaults.max_hold_ttl_seconds)?,
                lock_ttl_seconds: positive("LOCK_TTL_SECONDS", defaults.lock_ttl_seconds)?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_defaults_match_service_defaults() {
        let config = InventoryConfig::default();
        assert_eq!(config.inventory_settings(), InventorySettings::default());
        assert_eq!(config.reservation_settings(), ReservationSettings::default());
    }
}
