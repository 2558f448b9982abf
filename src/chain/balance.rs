//! Balance poller
//!
//! Periodically reads the token balance of the connected account and
//! publishes it through a watch channel. The task is tied to the handle's
//! lifetime: dropping or stopping the handle cancels the poll loop, so a
//! torn-down view never leaves a free-running timer behind.

use std::sync::Arc;
use std::time::Duration;

use ethers::types::{Address, U256};
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;

use crate::chain::traits::{BalanceRefresh, ChainReader};

pub struct BalancePoller {
    latest: watch::Receiver<U256>,
    refresh: Arc<Notify>,
    task: JoinHandle<()>,
}

impl BalancePoller {
    /// Spawn the poll loop. The first read happens immediately, then once
    /// per interval, and additionally whenever a refresh is requested.
    pub fn spawn(reader: Arc<dyn ChainReader>, account: Address, interval: Duration) -> Self {
        let (tx, rx) = watch::channel(U256::zero());
        let refresh = Arc::new(Notify::new());
        let wakeup = refresh.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = wakeup.notified() => {}
                }
                match reader.token_balance(account).await {
                    Ok(balance) => {
                        if tx.send(balance).is_err() {
                            // Receiver gone, view torn down
                            return;
                        }
                    }
                    Err(e) => log::warn!("balance poll failed: {}", e),
                }
            }
        });

        Self {
            latest: rx,
            refresh,
            task,
        }
    }

    /// Most recently observed balance
    pub fn latest(&self) -> U256 {
        *self.latest.borrow()
    }

    /// Subscribe to balance updates
    pub fn subscribe(&self) -> watch::Receiver<U256> {
        self.latest.clone()
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl BalanceRefresh for BalancePoller {
    fn request_refresh(&self) {
        self.refresh.notify_one();
    }
}

impl Drop for BalancePoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}
