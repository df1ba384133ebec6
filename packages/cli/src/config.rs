//! Configuration file and defaults

use anyhow::{Context, Result};
use farmcalc_sdk::{Decimal, NetworkParams, MAX_TOKEN_DECIMALS};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Everything deployment-specific. Every field has a default, so an empty (or
/// absent) file is valid.
///
/// ```toml
/// [network]
/// block_time_seconds = 30
/// lp_token_decimals = 6
/// reward_token_decimals = 8
/// apr_denomination = "token"
///
/// [pool]
/// base_symbol = "XTZ"
/// token_symbol = "CVZA"
///
/// [swap]
/// max_slippage = "0.005"
///
/// [watch]
/// interval_secs = 10
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkParams,
    pub pool:    PoolDisplay,
    pub swap:    SwapConfig,
    pub watch:   WatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolDisplay {
    pub base_symbol:    String,
    pub token_symbol:   String,
    pub base_decimals:  u32,
    pub token_decimals: u32,
}

impl Default for PoolDisplay {
    fn default() -> Self {
        Self {
            base_symbol:    "XTZ".to_string(),
            token_symbol:   "TOKEN".to_string(),
            base_decimals:  6,
            token_decimals: 8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SwapConfig {
    /// Slippage tolerance as a ratio (`0.005` = 0.5%). Write it as a string.
    pub max_slippage: Decimal,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self { max_slippage: Decimal::new(5, 3) }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { interval_secs: 10 }
    }
}

impl Config {
    /// Load from `path`. No path, or a path that does not exist, gives the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            log::debug!("no config file given; using defaults");
            return Ok(Self::default());
        };
        if !path.exists() {
            log::warn!("config file {} not found; using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.network.block_time_seconds == 0 {
            anyhow::bail!("network.block_time_seconds must be greater than zero");
        }
        if self.watch.interval_secs == 0 {
            anyhow::bail!("watch.interval_secs must be greater than zero");
        }
        for (key, decimals) in [
            ("network.lp_token_decimals", self.network.lp_token_decimals),
            ("network.reward_token_decimals", self.network.reward_token_decimals),
            ("pool.base_decimals", self.pool.base_decimals),
            ("pool.token_decimals", self.pool.token_decimals),
        ] {
            if decimals > MAX_TOKEN_DECIMALS {
                anyhow::bail!("{key} must be at most {MAX_TOKEN_DECIMALS}");
            }
        }
        if self.swap.max_slippage.is_negative() || self.swap.max_slippage > Decimal::one() {
            anyhow::bail!("swap.max_slippage must be a ratio between 0 and 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmcalc_sdk::AprDenomination;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_file() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.network.block_time_seconds, 30);
        assert_eq!(config.swap.max_slippage, "0.005".parse().unwrap());
        assert_eq!(config.watch.interval_secs, 10);
        assert_eq!(config.pool.base_symbol, "XTZ");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let file = write_config(
            r#"
            [network]
            block_time_seconds = 60
            apr_denomination = "token"

            [swap]
            max_slippage = "0.01"
            "#,
        );
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.network.block_time_seconds, 60);
        assert_eq!(config.network.apr_denomination, AprDenomination::Token);
        assert_eq!(config.network.lp_token_decimals, 6);
        assert_eq!(config.swap.max_slippage, "0.01".parse().unwrap());
        assert_eq!(config.pool.token_decimals, 8);
    }

    #[test]
    fn rejects_invalid_values() {
        let file = write_config("[network]\nblock_time_seconds = 0\n");
        assert!(Config::load(Some(file.path())).is_err());

        let file = write_config("[swap]\nmax_slippage = \"1.5\"\n");
        assert!(Config::load(Some(file.path())).is_err());

        let file = write_config("[swap]\nmax_slippage = 0.5\n");
        assert!(Config::load(Some(file.path())).is_err());

        let file = write_config("[pool]\ntoken_decimals = 2147483648\n");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("pool.token_decimals"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/farmcalc.toml"))).unwrap();
        assert_eq!(config.network.block_time_seconds, 30);
    }

    #[test]
    fn malformed_file_names_the_path() {
        let file = write_config("[network\n");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn bundled_demo_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/farmcalc.toml");
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.pool.token_symbol, "CVZA");
        assert_eq!(config.network.apr_denomination, AprDenomination::Base);
    }
}
