use crate::engine::{SubmittedPricePolicy, SubmittedPriceRounding, SubmittedPriceScale};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub rpc_url: String,
    /// Canonical chain name, after alias normalisation.
    pub chain: String,
    pub chain_aliases: HashMap<String, String>,
    pub metadata_gateway_url: String,
    pub submitted_price: SubmittedPricePolicy,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let rpc_url = env_map
            .get("RPC_URL")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("RPC_URL".to_string()))?;

        let chain_aliases = parse_chain_aliases(
            env_map
                .get("CHAIN_ALIASES")
                .map(|s| s.as_str())
                .unwrap_or(""),
        )?;

        let chain = env_map
            .get("CHAIN")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingEnv("CHAIN".to_string()))?;
        let chain = normalize_chain(&chain_aliases, chain);

        let metadata_gateway_url = env_map
            .get("METADATA_GATEWAY_URL")
            .cloned()
            .unwrap_or_else(|| "https://ipfs.io/ipfs".to_string());

        let submitted_price_rounding = env_map
            .get("SUBMITTED_PRICE_ROUNDING")
            .map(|s| s.as_str())
            .unwrap_or("round_up_one")
            .parse::<SubmittedPriceRounding>()
            .map_err(|e| ConfigError::InvalidValue("SUBMITTED_PRICE_ROUNDING".to_string(), e))?;

        let submitted_price_scale = env_map
            .get("SUBMITTED_PRICE_SCALE")
            .map(|s| s.as_str())
            .unwrap_or("quote_decimals")
            .parse::<SubmittedPriceScale>()
            .map_err(|e| ConfigError::InvalidValue("SUBMITTED_PRICE_SCALE".to_string(), e))?;

        Ok(Config {
            port,
            database_path,
            rpc_url,
            chain,
            chain_aliases,
            metadata_gateway_url,
            submitted_price: SubmittedPricePolicy::new(
                submitted_price_rounding,
                submitted_price_scale,
            ),
        })
    }
}

/// Parse `alias=canonical,...`. Names are compared lowercase.
fn parse_chain_aliases(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((alias, canonical)) if !alias.trim().is_empty() && !canonical.trim().is_empty() => {
                Ok((
                    alias.trim().to_ascii_lowercase(),
                    canonical.trim().to_ascii_lowercase(),
                ))
            }
            _ => Err(ConfigError::InvalidValue(
                "CHAIN_ALIASES".to_string(),
                format!("expected alias=canonical, got {}", entry),
            )),
        })
        .collect()
}

/// Map a chain name to its canonical form. Unknown names pass through
/// lowercased.
pub fn normalize_chain(aliases: &HashMap<String, String>, name: &str) -> String {
    let name = name.trim().to_ascii_lowercase();
    aliases.get(&name).cloned().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("DATABASE_PATH".to_string(), "/tmp/test.db".to_string());
        map.insert("RPC_URL".to_string(), "http://localhost:8545".to_string());
        map.insert("CHAIN".to_string(), "base-sepolia".to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.chain, "base-sepolia");
        assert_eq!(config.metadata_gateway_url, "https://ipfs.io/ipfs");
        assert_eq!(
            config.submitted_price,
            SubmittedPricePolicy::new(
                SubmittedPriceRounding::RoundUpOneUnit,
                SubmittedPriceScale::QuoteDecimals
            )
        );
    }

    #[test]
    fn test_missing_database_path() {
        let mut env_map = setup_required_env();
        env_map.remove("DATABASE_PATH");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "DATABASE_PATH"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_missing_rpc_url() {
        let mut env_map = setup_required_env();
        env_map.remove("RPC_URL");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "RPC_URL"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_missing_chain() {
        let mut env_map = setup_required_env();
        env_map.insert("CHAIN".to_string(), "  ".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "CHAIN"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_rounding() {
        let mut env_map = setup_required_env();
        env_map.insert("SUBMITTED_PRICE_ROUNDING".to_string(), "ceil".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "SUBMITTED_PRICE_ROUNDING"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_truncate_rounding() {
        let mut env_map = setup_required_env();
        env_map.insert("SUBMITTED_PRICE_ROUNDING".to_string(), "truncate".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(
            config.submitted_price.rounding,
            SubmittedPriceRounding::Truncate
        );
    }

    #[test]
    fn test_price_scale() {
        let mut env_map = setup_required_env();
        env_map.insert("SUBMITTED_PRICE_SCALE".to_string(), "base_decimals".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.submitted_price.scale, SubmittedPriceScale::BaseDecimals);

        let mut env_map = setup_required_env();
        env_map.insert("SUBMITTED_PRICE_SCALE".to_string(), "whole".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "SUBMITTED_PRICE_SCALE"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_chain_alias_applied() {
        let mut env_map = setup_required_env();
        env_map.insert("CHAIN".to_string(), "Blast-Mainnet".to_string());
        env_map.insert(
            "CHAIN_ALIASES".to_string(),
            "blast-mainnet=blast, arbitrum-one=arbitrum".to_string(),
        );
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.chain, "blast");
        assert_eq!(config.chain_aliases.len(), 2);
    }

    #[test]
    fn test_malformed_chain_aliases() {
        let mut env_map = setup_required_env();
        env_map.insert("CHAIN_ALIASES".to_string(), "blast-mainnet".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "CHAIN_ALIASES"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_normalize_chain_passes_unknown_through() {
        let aliases = HashMap::from([("mainnet".to_string(), "ethereum".to_string())]);
        assert_eq!(normalize_chain(&aliases, "MAINNET"), "ethereum");
        assert_eq!(normalize_chain(&aliases, " Base "), "base");
    }
}
