use bigdecimal::BigDecimal;
use thiserror::Error;

/// Raised by the payee side before a payment code is generated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidIntent {
    #[error("payee address is empty")]
    EmptyAddress,
    #[error("payee address is malformed: {0}")]
    MalformedAddress(String),
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(BigDecimal),
    #[error("amount is out of range: {0}")]
    AmountOutOfRange(String),
    #[error("chain id must be a positive integer")]
    ZeroChainId,
    #[error("token symbol is empty")]
    EmptyTokenSymbol,
}

/// Failures while reading a scanned payment code.
///
/// The three variants never overlap: `Syntax` means the text is not a JSON
/// object at all, `Schema` means a field is missing or has the wrong type,
/// and `Validation` means every field is present but one of them is not an
/// acceptable value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("payment code is not well-formed: {0}")]
    Syntax(String),
    #[error("payment code has a missing or mistyped field: {0}")]
    Schema(String),
    #[error("payment code is invalid: {0}")]
    Validation(#[from] InvalidIntent),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TipError {
    #[error("custom tip is empty")]
    Empty,
    #[error("custom tip is not a number: {0:?}")]
    NonNumeric(String),
    #[error("tip percentage cannot be negative: {0}")]
    Negative(BigDecimal),
    #[error("{0}% is not one of the preset tips (0, 10, 15, 20)")]
    NotAPreset(u32),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettlementError {
    #[error("invalid tip: {0}")]
    InvalidTip(#[from] TipError),
    #[error("base amount must be greater than zero, got {0}")]
    InvalidBaseAmount(BigDecimal),
    #[error("insufficient balance: {required} required, {available} available")]
    InsufficientBalance {
        required: BigDecimal,
        available: BigDecimal,
    },
}

/// Everything that can stop a checkout, surfaced to the user as one notice.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error(transparent)]
    Intent(#[from] InvalidIntent),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Settlement(#[from] SettlementError),
    #[error("wallet is not connected")]
    WalletDisconnected,
    #[error("payment requests chain {expected} but the wallet is on chain {active}")]
    ChainMismatch { expected: u64, active: u64 },
    #[error("no {symbol} contract is known on chain {chain_id}")]
    UnsupportedToken { symbol: String, chain_id: u64 },
    #[error("amount {0} cannot be represented in the token's smallest unit")]
    UnrepresentableAmount(BigDecimal),
    /// Wallet, RPC and signer failures, passed through untouched.
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}
