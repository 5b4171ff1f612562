use serde::Deserialize;
use std::env;
use wayfare_core::{CurrencyCode, CurrencyConverter, Locale, RateTable};

const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub currency: CurrencyConfig,
    pub search: SearchConfig,
    pub checkout: CheckoutConfig,
    pub locale: LocaleConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding the persisted client state
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CurrencyConfig {
    pub reference: CurrencyCode,
    pub pivot: CurrencyCode,
    pub display: CurrencyCode,
    #[serde(default)]
    pub rates: Option<RateTable>,
}

impl CurrencyConfig {
    pub fn converter(&self) -> CurrencyConverter {
        let rates = self.rates.clone().unwrap_or_else(RateTable::builtin);
        CurrencyConverter::new(rates, self.reference, self.pivot, self.display)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub latency_min_ms: u64,
    pub latency_max_ms: u64,
    pub page_size: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CheckoutConfig {
    pub draft_ttl_hours: i64,
    #[serde(default = "default_purge_interval")]
    pub purge_interval_seconds: u64,
}

fn default_purge_interval() -> u64 {
    600
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocaleConfig {
    #[serde(default)]
    pub default: Locale,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(environment())
            .build()?;

        s.try_deserialize()
    }

    /// The defaults compiled into the binary, without files or environment.
    pub fn builtin() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

/// `WAYFARE_` prefix, `__` between nested keys: `WAYFARE_SERVER__PORT=9000`.
fn environment() -> config::Environment {
    config::Environment::with_prefix("WAYFARE")
        .prefix_separator("_")
        .separator("__")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_config() {
        let config = Config::builtin().unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.locale.default, Locale::En);
        assert_eq!(config.checkout.draft_ttl_hours, 72);

        let converter = config.currency.converter();
        assert_eq!(converter.reference(), CurrencyCode::JPY);
        assert_eq!(converter.selected(), CurrencyCode::USD);
        assert_eq!(converter.rate(&CurrencyCode::JPY), 150.0);
    }

    #[test]
    fn test_environment_overrides_nested_keys() {
        let mut vars = config::Map::new();
        vars.insert("WAYFARE_SERVER__PORT".to_string(), "9000".to_string());
        vars.insert("WAYFARE_CHECKOUT__DRAFT_TTL_HOURS".to_string(), "24".to_string());

        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(environment().source(Some(vars)))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.checkout.draft_ttl_hours, 24);
    }
}
