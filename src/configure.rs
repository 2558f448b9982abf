use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// JSON-RPC endpoint for chain reads and transaction submission
    pub rpc_url: String,
    pub chain_id: u64,

    /// Deployed contract addresses
    pub usdc_address: String,
    pub vault_address: String,

    /// Private key for the signing wallet; absent for read-only use
    pub wallet_key: Option<String>,

    /// Hosted datastore (read-only)
    pub supabase_url: String,
    pub supabase_anon_key: String,

    /// Balance poll period
    pub balance_poll_ms: u64,
    /// Receipt poll period while awaiting confirmation
    pub receipt_poll_ms: u64,

    pub log_level: String,
    pub log_to_file: bool,
    pub log_file: String,
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
    let s = Config::builder()
        // Set defaults
        .set_default("rpc_url", "https://rpc.sepolia.org")?
        .set_default("chain_id", 11155111_i64)?
        .set_default("usdc_address", "0x5C159EC2e979F7e2ddff8b5BDd23e7846133CcA3")?
        .set_default("vault_address", "")?
        .set_default("supabase_url", "")?
        .set_default("supabase_anon_key", "")?
        .set_default("balance_poll_ms", 5000_i64)?
        .set_default("receipt_poll_ms", 2000_i64)?
        .set_default("log_level", "info")?
        .set_default("log_to_file", false)?
        .set_default("log_file", "log/entiendo_vault.log")?
        // Add configuration from a file
        .add_source(File::with_name("config/config").required(false))
        // Add configuration from environment variables
        .add_source(config::Environment::with_prefix("APP"))
        .build()?;

    s.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load() {
        let config = load_config().unwrap();
        assert_eq!(config.chain_id, 11155111);
        assert_eq!(config.balance_poll_ms, 5000);
        assert!(!config.log_to_file);
    }
}
