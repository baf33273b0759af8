use anyhow::Result;
use async_trait::async_trait;
use ethers::types::U256;
use std::fmt;

pub mod eth;

use crate::address::EvmAddress;
use crate::tokens::Token;
use crate::types::TransferReceipt;

/// The connected wallet account.
pub trait WalletConnection: Send + Sync {
    /// Address payments are sent from and requested to
    fn address(&self) -> EvmAddress;

    /// Chain id of the network the wallet is currently on
    fn chain_id(&self) -> u64;

    /// Whether the wallet session is still usable
    fn is_connected(&self) -> bool;
}

#[async_trait]
pub trait BalanceReader: Send + Sync {
    /// Token balance of `owner` in the token's smallest unit
    async fn balance_of(&self, owner: &EvmAddress, token: &Token) -> Result<U256>;
}

#[async_trait]
pub trait TransferWriter: Send + Sync {
    /// Submit a token transfer and return as soon as the network accepted it.
    ///
    /// `amount` is in the token's smallest unit.
    async fn transfer(&self, recipient: &EvmAddress, amount: U256, token: &Token) -> Result<TransferReceipt>;
}

impl fmt::Display for dyn WalletConnection + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Address: {}\nChain: {}\nConnected: {}",
            self.address(),
            self.chain_id(),
            if self.is_connected() { "yes" } else { "no" }
        )
    }
}
