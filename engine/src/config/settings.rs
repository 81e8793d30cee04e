// Engine settings, loaded from JSON with the embedded defaults as a base
use crate::error::EngineError;
use crate::strategy::StrategyParams;
use serde::Deserialize;
use shared::models::TimeFrame;
use shared::utils::DEFAULT_LATEST_SETUPS;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = include_str!("../../config/default.json");

/// Environment variable naming an override config file.
pub const CONFIG_ENV_VAR: &str = "SCANNER_CONFIG";

/// Upper bound for `refresh_secs`; one week.
pub const MAX_REFRESH_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceSettings {
    Binance {
        #[serde(default)]
        base_url: Option<String>,
    },
    Csv {
        path: PathBuf,
    },
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineSettings {
    pub host: String,
    pub port: u16,
    pub symbol: String,
    pub interval: TimeFrame,
    /// Candles requested per refresh.
    pub lookback: usize,
    pub refresh_secs: u64,
    /// Must be shorter than `refresh_secs` so each tick fetches a new window.
    pub cache_ttl_secs: u64,
    pub latest_setups: usize,
    /// Root directory `AnalyzeCsv` requests are resolved against.
    pub data_dir: PathBuf,
    pub source: SourceSettings,
    pub strategy: StrategyParams,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            host: "[::1]".to_string(),
            port: 50051,
            symbol: "BTCUSDT".to_string(),
            interval: TimeFrame::Minute15,
            lookback: 200,
            refresh_secs: 900,
            cache_ttl_secs: 840,
            latest_setups: DEFAULT_LATEST_SETUPS,
            data_dir: PathBuf::from("data"),
            source: SourceSettings::Binance { base_url: None },
            strategy: StrategyParams::default(),
        }
    }
}

impl EngineSettings {
    /// The settings shipped in `config/default.json`.
    pub fn load_default() -> Result<Self, EngineError> {
        Self::from_json(DEFAULT_CONFIG)
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let settings: EngineSettings = serde_json::from_str(json)
            .map_err(|e| EngineError::ConfigError(format!("Invalid settings JSON: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| EngineError::ConfigError(format!("Cannot read '{}': {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Explicit path first, then `SCANNER_CONFIG`, then the embedded defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, EngineError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match std::env::var_os(CONFIG_ENV_VAR) {
                Some(env_path) => Self::from_file(Path::new(&env_path)),
                None => Self::load_default(),
            },
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.symbol.trim().is_empty() {
            return Err(EngineError::ConfigError("symbol must not be empty".to_string()));
        }
        if self.refresh_secs == 0 || self.refresh_secs > MAX_REFRESH_SECS {
            return Err(EngineError::ConfigError(format!(
                "refresh_secs must be between 1 and {}",
                MAX_REFRESH_SECS
            )));
        }
        if self.cache_ttl_secs >= self.refresh_secs {
            return Err(EngineError::ConfigError(format!(
                "cache_ttl_secs ({}) must be shorter than refresh_secs ({})",
                self.cache_ttl_secs, self.refresh_secs
            )));
        }
        if self.lookback < self.strategy.min_series_len() {
            return Err(EngineError::ConfigError(format!(
                "lookback ({}) must cover at least {} candles",
                self.lookback,
                self.strategy.min_series_len()
            )));
        }
        self.strategy.validate()
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
