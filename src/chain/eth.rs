//! Ethers-backed wallet connector and chain reader

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, U256, U64};
use tokio::time::sleep;

use crate::chain::contracts::{DefiVault, MockUsdc};
use crate::chain::traits::{ChainReader, WalletConnector};
use crate::chain::types::{ContractAddresses, TxHandle, TxOutcome, UserStats, VaultTotals};
use crate::configure::AppConfig;
use crate::flow::errors::FlowError;

type EthClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Classify a submission error by its message.
///
/// Providers do not expose a structured distinction between a declined
/// signature, an estimation-time revert, and a transport failure, so this
/// is string-based.
fn classify_send_error(msg: String) -> FlowError {
    let lower = msg.to_lowercase();
    if lower.contains("rejected") || lower.contains("denied") {
        FlowError::SignerRejected(msg)
    } else if lower.contains("revert") {
        FlowError::Reverted(Some(msg))
    } else {
        FlowError::Provider(msg)
    }
}

/// Wallet connector backed by a local private-key signer
pub struct EthWallet {
    client: Arc<EthClient>,
    account: Address,
    token: MockUsdc<EthClient>,
    vault: DefiVault<EthClient>,
    receipt_poll: Duration,
}

impl EthWallet {
    pub fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .with_context(|| format!("invalid rpc url: {}", config.rpc_url))?;

        let key = config
            .wallet_key
            .as_deref()
            .ok_or_else(|| anyhow!("wallet key not configured (set APP_WALLET_KEY)"))?;
        let signer = key
            .parse::<LocalWallet>()
            .context("invalid wallet key")?
            .with_chain_id(config.chain_id);
        let account = signer.address();

        let addresses = ContractAddresses::parse(&config.usdc_address, &config.vault_address)
            .map_err(anyhow::Error::msg)?;

        let client = Arc::new(SignerMiddleware::new(provider, signer));
        let token = MockUsdc::new(addresses.token, client.clone());
        let vault = DefiVault::new(addresses.vault, client.clone());

        log::info!("wallet connected: account={:?} chain_id={}", account, config.chain_id);

        Ok(Self {
            client,
            account,
            token,
            vault,
            receipt_poll: Duration::from_millis(config.receipt_poll_ms),
        })
    }

    /// Test-token faucet: `mint(to, amount)` on the mock stablecoin.
    pub async fn mint(&self, to: Address, amount: U256) -> Result<TxHandle, FlowError> {
        // The pending transaction borrows the call, so the call must
        // outlive the hash read.
        let call = self.token.mint(to, amount);
        let pending = call
            .send()
            .await
            .map_err(|e| classify_send_error(e.to_string()))?;
        Ok(TxHandle::new(*pending))
    }
}

#[async_trait]
impl WalletConnector for EthWallet {
    fn account(&self) -> Option<Address> {
        Some(self.account)
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHandle, FlowError> {
        let call = self.token.approve(spender, amount);
        let pending = call
            .send()
            .await
            .map_err(|e| classify_send_error(e.to_string()))?;
        Ok(TxHandle::new(*pending))
    }

    async fn deposit(&self, amount: U256, receiver: Address) -> Result<TxHandle, FlowError> {
        let call = self.vault.deposit(amount, receiver);
        let pending = call
            .send()
            .await
            .map_err(|e| classify_send_error(e.to_string()))?;
        Ok(TxHandle::new(*pending))
    }

    async fn withdraw(
        &self,
        amount: U256,
        receiver: Address,
        owner: Address,
    ) -> Result<TxHandle, FlowError> {
        let call = self.vault.withdraw(amount, receiver, owner);
        let pending = call
            .send()
            .await
            .map_err(|e| classify_send_error(e.to_string()))?;
        Ok(TxHandle::new(*pending))
    }

    async fn await_receipt(&self, handle: TxHandle) -> Result<TxOutcome, FlowError> {
        // No deadline: the flow stays in its awaiting phase until the
        // provider answers or errors.
        loop {
            match self.client.get_transaction_receipt(handle.hash()).await {
                Ok(Some(receipt)) => {
                    let success = receipt.status == Some(U64::from(1));
                    if success {
                        return Ok(TxOutcome::success());
                    }
                    // The receipt does not carry a revert reason.
                    return Ok(TxOutcome::reverted(None));
                }
                Ok(None) => sleep(self.receipt_poll).await,
                Err(e) => return Err(FlowError::Provider(e.to_string())),
            }
        }
    }

    fn name(&self) -> &str {
        "eth-wallet"
    }
}

/// Read-only chain access over a plain HTTP provider
pub struct EthReader {
    token: MockUsdc<Provider<Http>>,
    vault: DefiVault<Provider<Http>>,
}

impl EthReader {
    pub fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let provider = Arc::new(
            Provider::<Http>::try_from(config.rpc_url.as_str())
                .with_context(|| format!("invalid rpc url: {}", config.rpc_url))?,
        );

        let addresses = ContractAddresses::parse(&config.usdc_address, &config.vault_address)
            .map_err(anyhow::Error::msg)?;

        Ok(Self {
            token: MockUsdc::new(addresses.token, provider.clone()),
            vault: DefiVault::new(addresses.vault, provider),
        })
    }
}

#[async_trait]
impl ChainReader for EthReader {
    async fn token_balance(&self, account: Address) -> Result<U256, FlowError> {
        self.token
            .balance_of(account)
            .call()
            .await
            .map_err(|e| FlowError::Provider(e.to_string()))
    }

    async fn vault_totals(&self) -> Result<VaultTotals, FlowError> {
        let total_assets = self
            .vault
            .total_assets()
            .call()
            .await
            .map_err(|e| FlowError::Provider(e.to_string()))?;
        let total_yield = self
            .vault
            .total_yield_generated()
            .call()
            .await
            .map_err(|e| FlowError::Provider(e.to_string()))?;
        let total_donated = self
            .vault
            .total_donated_to_public_goods()
            .call()
            .await
            .map_err(|e| FlowError::Provider(e.to_string()))?;
        let apy_bps = self
            .vault
            .estimated_apy()
            .call()
            .await
            .map_err(|e| FlowError::Provider(e.to_string()))?;

        Ok(VaultTotals {
            total_assets,
            total_yield,
            total_donated,
            apy_bps,
        })
    }

    async fn user_stats(&self, account: Address) -> Result<UserStats, FlowError> {
        let (deposited, current_value, yield_contribution, education_level, days_active, shares) =
            self.vault
                .get_user_stats(account)
                .call()
                .await
                .map_err(|e| FlowError::Provider(e.to_string()))?;

        Ok(UserStats {
            deposited,
            current_value,
            yield_contribution,
            education_level: education_level.low_u64(),
            days_active: days_active.low_u64(),
            shares_owned: shares,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(wallet_key: Option<&str>) -> AppConfig {
        AppConfig {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: 31337,
            usdc_address: "0x5C159EC2e979F7e2ddff8b5BDd23e7846133CcA3".to_string(),
            vault_address: "0x0000000000000000000000000000000000000001".to_string(),
            wallet_key: wallet_key.map(str::to_string),
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            balance_poll_ms: 5000,
            receipt_poll_ms: 2000,
            log_level: "info".to_string(),
            log_to_file: false,
            log_file: String::new(),
        }
    }

    #[test]
    fn test_wallet_connect_derives_account_from_key() {
        // Well-known hardhat development key, never funded on a real chain
        let key = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
        let wallet = EthWallet::connect(&test_config(Some(key))).unwrap();
        assert_eq!(
            wallet.account(),
            Some("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap())
        );
    }

    #[test]
    fn test_wallet_connect_requires_key() {
        assert!(EthWallet::connect(&test_config(None)).is_err());
    }

    #[test]
    fn test_classify_send_error() {
        assert!(matches!(
            classify_send_error("User rejected the request.".to_string()),
            FlowError::SignerRejected(_)
        ));
        assert!(matches!(
            classify_send_error("execution reverted: ERC20: insufficient allowance".to_string()),
            FlowError::Reverted(Some(_))
        ));
        assert!(matches!(
            classify_send_error("connection refused".to_string()),
            FlowError::Provider(_)
        ));
    }
}
