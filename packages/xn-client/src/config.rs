//! Client configuration.
//!
//! Loaded from an optional `xn.toml` next to the working directory, then
//! overridden by `XN_*` environment variables (`XN_API_URL`, `XN_PEM_PATH`, ...).

use serde::Deserialize;
use std::time::Duration;

use crate::Error;

/// Configuration for the registry client.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::api_url")]
    pub api_url: String,

    #[serde(default = "defaults::contract_address")]
    pub contract_address: String,

    #[serde(default = "defaults::chain_id")]
    pub chain_id: String,

    #[serde(default = "defaults::pem_path")]
    pub pem_path: String,

    /// Contract ABI; when set, outbound arguments are checked against it.
    #[serde(default)]
    pub abi_path: Option<String>,

    #[serde(default = "defaults::reservations_path")]
    pub reservations_path: String,

    #[serde(default = "defaults::gas_limit")]
    pub gas_limit: u64,

    #[serde(default = "defaults::gas_price")]
    pub gas_price: u64,

    #[serde(default = "defaults::request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "defaults::poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "defaults::completion_timeout_secs")]
    pub completion_timeout_secs: u64,

    #[serde(default = "defaults::top_level_domains")]
    pub top_level_domains: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: defaults::api_url(),
            contract_address: defaults::contract_address(),
            chain_id: defaults::chain_id(),
            pem_path: defaults::pem_path(),
            abi_path: None,
            reservations_path: defaults::reservations_path(),
            gas_limit: defaults::gas_limit(),
            gas_price: defaults::gas_price(),
            request_timeout_secs: defaults::request_timeout_secs(),
            poll_interval_secs: defaults::poll_interval_secs(),
            completion_timeout_secs: defaults::completion_timeout_secs(),
            top_level_domains: defaults::top_level_domains(),
        }
    }
}

impl Config {
    /// Read `{file}.toml` (if present) and `XN_*` overrides.
    pub fn load(file: &str) -> Result<Self, Error> {
        config::Config::builder()
            .add_source(config::File::with_name(file).required(false))
            .add_source(
                config::Environment::with_prefix("XN")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("top_level_domains"),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::Config(e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }
}

mod defaults {
    fn network() -> String {
        std::env::var("XN_NETWORK").unwrap_or_else(|_| "devnet".into())
    }

    pub fn api_url() -> String {
        match network().as_str() {
            "mainnet" => "https://api.multiversx.com".into(),
            "testnet" => "https://testnet-api.multiversx.com".into(),
            _ => "https://devnet-api.multiversx.com".into(),
        }
    }

    pub fn chain_id() -> String {
        match network().as_str() {
            "mainnet" => "1".into(),
            "testnet" => "T".into(),
            _ => "D".into(),
        }
    }

    pub fn contract_address() -> String {
        "erd1qqqqqqqqqqqqqpgqev7w2j8e54tvnzc2rtj6v7mxqdy5lam0vycseduvnh".into()
    }

    pub fn pem_path() -> String {
        "./wallet.pem".into()
    }

    pub fn reservations_path() -> String {
        "./reservations.json".into()
    }

    pub fn gas_limit() -> u64 {
        50_000_000
    }

    pub fn gas_price() -> u64 {
        1_000_000_000
    }

    pub fn request_timeout_secs() -> u64 {
        60
    }

    pub fn poll_interval_secs() -> u64 {
        6
    }

    pub fn completion_timeout_secs() -> u64 {
        90
    }

    pub fn top_level_domains() -> Vec<String> {
        xn_types::name::DEFAULT_TOP_LEVEL_DOMAINS
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}
