use super::{BalanceReader, TransferWriter, WalletConnection};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ethers::{
    contract::abigen,
    core::k256::ecdsa::SigningKey,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{coins_bip39::English, MnemonicBuilder, Signer, Wallet},
    types::U256,
};
use std::sync::Arc;

use crate::address::EvmAddress;
use crate::tokens::Token;
use crate::types::{TransferReceipt, TransferStatus};

abigen!(
    Erc20,
    r#"[
        function balanceOf(address owner) external view returns (uint256)
        function transfer(address to, uint256 amount) external returns (bool)
    ]"#
);

type Client = SignerMiddleware<Provider<Http>, Wallet<SigningKey>>;

/// An EVM account derived from a seed phrase and bound to one RPC endpoint.
pub struct EthereumCard {
    account: u32,
    address: EvmAddress,
    derivation_path: String,
    chain_id: u64,
    client: Arc<Client>,
}

impl EthereumCard {
    /// Derive the account and ask the node which chain it serves.
    pub async fn connect(rpc_url: &str, seed_phrase: &str, account: u32) -> Result<Self> {
        let (wallet, derivation_path) = derive_wallet(seed_phrase, account)?;

        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| anyhow!("Failed to create provider: {}", e))?;
        let chain_id = provider.get_chainid().await?;
        if chain_id > U256::from(u64::MAX) {
            return Err(anyhow!("Node reported an out of range chain id: {}", chain_id));
        }
        let chain_id = chain_id.as_u64();

        let wallet = wallet.with_chain_id(chain_id);
        let address = EvmAddress::from(wallet.address());
        tracing::info!("Connected {} on chain {} via {}", address, chain_id, rpc_url);

        Ok(Self {
            account,
            address,
            derivation_path,
            chain_id,
            client: Arc::new(SignerMiddleware::new(provider, wallet)),
        })
    }

    /// The receiving address for a seed phrase, without touching the network.
    pub fn derive_address(seed_phrase: &str, account: u32) -> Result<EvmAddress> {
        let (wallet, _) = derive_wallet(seed_phrase, account)?;
        Ok(EvmAddress::from(wallet.address()))
    }

    pub fn account(&self) -> u32 {
        self.account
    }

    pub fn derivation_path(&self) -> &str {
        &self.derivation_path
    }

    fn erc20(&self, token: &Token) -> Erc20<Client> {
        Erc20::new(token.contract, self.client.clone())
    }
}

fn derive_wallet(seed_phrase: &str, account: u32) -> Result<(Wallet<SigningKey>, String)> {
    // m/44'/60'/account'/0/0
    let path = format!("m/44'/60'/{}'/0/0", account);

    let wallet = MnemonicBuilder::<English>::default()
        .phrase(seed_phrase)
        .derivation_path(&path)
        .map_err(|e| anyhow!("Invalid derivation path {}: {}", path, e))?
        .build()
        .map_err(|e| anyhow!("Failed to create wallet: {}", e))?;

    Ok((wallet, path))
}

impl WalletConnection for EthereumCard {
    fn address(&self) -> EvmAddress {
        self.address
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn is_connected(&self) -> bool {
        true
    }
}

#[async_trait]
impl BalanceReader for EthereumCard {
    async fn balance_of(&self, owner: &EvmAddress, token: &Token) -> Result<U256> {
        let balance = self.erc20(token).balance_of((*owner).into()).call().await?;
        tracing::debug!("{} balance of {}: {}", token.symbol, owner, balance);
        Ok(balance)
    }
}

#[async_trait]
impl TransferWriter for EthereumCard {
    async fn transfer(&self, recipient: &EvmAddress, amount: U256, token: &Token) -> Result<TransferReceipt> {
        let contract = self.erc20(token);
        let call = contract.transfer((*recipient).into(), amount);
        let pending = call.send().await?;
        let tx_hash = format!("{:#x}", pending.tx_hash());
        tracing::info!("Submitted {} {} to {}: {}", amount, token.symbol, recipient, tx_hash);

        Ok(TransferReceipt {
            tx_hash,
            status: TransferStatus::Pending,
        })
    }
}
