use lazy_static::lazy_static;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::address::EvmAddress;

/// An ERC-20 contract that payments can be settled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub symbol: String,
    pub chain_id: u64,
    pub contract: EvmAddress,
    pub decimals: u8,
}

pub const ETHEREUM_MAINNET: u64 = 1;
pub const BASE_MAINNET: u64 = 8453;

const WELL_KNOWN: [(u64, &str, &str, u8); 4] = [
    (ETHEREUM_MAINNET, "USDC", "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", 6),
    (ETHEREUM_MAINNET, "DAI", "0x6B175474E89094C44Da98b954EedeAC495271d0F", 18),
    (BASE_MAINNET, "USDC", "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913", 6),
    (BASE_MAINNET, "DAI", "0x50c5725949A6F0c72E6C4a641F24049A917DB0Cb", 18),
];

type Registry = HashMap<(u64, String), Token>;

lazy_static! {
    static ref TOKENS: RwLock<Registry> = {
        let mut m = HashMap::new();
        for (chain_id, symbol, contract, decimals) in WELL_KNOWN {
            if let Ok(contract) = EvmAddress::from_str(contract) {
                m.insert(
                    (chain_id, symbol.to_string()),
                    Token {
                        symbol: symbol.to_string(),
                        chain_id,
                        contract,
                        decimals,
                    },
                );
            }
        }
        RwLock::new(m)
    };
}

fn key(chain_id: u64, symbol: &str) -> (u64, String) {
    (chain_id, symbol.trim().to_uppercase())
}

// A panic while holding the lock cannot leave a half-written entry, so a
// poisoned registry is still usable.
fn read_registry(lock: &RwLock<Registry>) -> RwLockReadGuard<'_, Registry> {
    lock.read().unwrap_or_else(|poisoned| {
        tracing::warn!("Token registry lock was poisoned, reading anyway");
        poisoned.into_inner()
    })
}

fn write_registry(lock: &RwLock<Registry>) -> RwLockWriteGuard<'_, Registry> {
    lock.write().unwrap_or_else(|poisoned| {
        tracing::warn!("Token registry lock was poisoned, writing anyway");
        poisoned.into_inner()
    })
}

/// The contract for `symbol` on `chain_id`, if one is known.
pub fn token_for(chain_id: u64, symbol: &str) -> Option<Token> {
    read_registry(&TOKENS).get(&key(chain_id, symbol)).cloned()
}

/// Add or replace a token, typically one configured for a test network.
pub fn register(token: Token) {
    insert(&TOKENS, token);
}

fn insert(lock: &RwLock<Registry>, token: Token) {
    tracing::info!(
        "Registered {} on chain {} at {}",
        token.symbol,
        token.chain_id,
        token.contract
    );
    write_registry(lock).insert(key(token.chain_id, &token.symbol), token);
}

pub fn tokens_on(chain_id: u64) -> Vec<Token> {
    let mut found: Vec<Token> = read_registry(&TOKENS)
        .values()
        .filter(|token| token.chain_id == chain_id)
        .cloned()
        .collect();
    found.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    found
}
