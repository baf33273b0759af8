use anyhow::{anyhow, Result};
use std::str::FromStr;
use url::Url;

use crate::address::EvmAddress;
use crate::tokens::Token;

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: Option<Url>,
    pub chain_id: u64,
    pub token_symbol: String,
    pub merchant_name: String,
    pub account: u32,
    pub seed_phrase: Option<String>,
    /// A token not in the built-in registry, e.g. on a test network.
    pub custom_token: Option<Token>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; `from_env` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_url = lookup("MONADERO_RPC_URL")
            .map(|url| Url::parse(&url).map_err(|e| anyhow!("Invalid MONADERO_RPC_URL: {}", e)))
            .transpose()?;

        let chain_id: u64 = lookup("MONADERO_CHAIN_ID")
            .unwrap_or_else(|| "1".to_string())
            .parse()
            .map_err(|e| anyhow!("Invalid MONADERO_CHAIN_ID: {}", e))?;
        if chain_id == 0 {
            return Err(anyhow!("MONADERO_CHAIN_ID must be positive"));
        }

        let token_symbol = lookup("MONADERO_TOKEN")
            .unwrap_or_else(|| "USDC".to_string())
            .trim()
            .to_uppercase();

        let custom_token = match lookup("MONADERO_TOKEN_CONTRACT") {
            Some(contract) => {
                let contract = EvmAddress::from_str(contract.trim())
                    .map_err(|e| anyhow!("Invalid MONADERO_TOKEN_CONTRACT: {}", e))?;
                let decimals: u8 = lookup("MONADERO_TOKEN_DECIMALS")
                    .unwrap_or_else(|| "18".to_string())
                    .parse()
                    .map_err(|e| anyhow!("Invalid MONADERO_TOKEN_DECIMALS: {}", e))?;
                Some(Token {
                    symbol: token_symbol.clone(),
                    chain_id,
                    contract,
                    decimals,
                })
            }
            None => None,
        };

        Ok(Config {
            rpc_url,
            chain_id,
            token_symbol,
            merchant_name: lookup("MONADERO_MERCHANT_NAME")
                .unwrap_or_else(|| "Monadero".to_string()),
            account: lookup("MONADERO_ACCOUNT")
                .unwrap_or_else(|| "0".to_string())
                .parse()
                .map_err(|e| anyhow!("Invalid MONADERO_ACCOUNT: {}", e))?,
            seed_phrase: lookup("MONADERO_SEED_PHRASE"),
            custom_token,
        })
    }

    pub fn require_rpc_url(&self) -> Result<&Url> {
        self.rpc_url
            .as_ref()
            .ok_or_else(|| anyhow!("MONADERO_RPC_URL not set"))
    }

    pub fn require_seed_phrase(&self) -> Result<&str> {
        self.seed_phrase
            .as_deref()
            .ok_or_else(|| anyhow!("MONADERO_SEED_PHRASE not set"))
    }
}
