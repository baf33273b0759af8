//! Payment intents: what the payee puts in the QR code and the payer scans.
//!
//! The payload is a JSON object read by field name, so key order does not
//! matter and unknown keys are ignored:
//!
//! ```json
//! {"version":1,"address":"0x…","amount":"50.00","billAccount":"A-17",
//!  "merchant":"Tacos El Güero","token":"USDC","chainId":8453,
//!  "createdAt":"2026-10-18T19:04:11.52Z"}
//! ```
//!
//! Payloads written before tokens were introduced carry only `address`,
//! `amount`, `billAccount` and `merchant`; they decode as
//! [`ScannedIntent::Legacy`].

use bigdecimal::{BigDecimal, Signed, Zero};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::{json, Value};
use std::str::FromStr;

use crate::address::EvmAddress;
use crate::errors::{DecodeError, InvalidIntent};

pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntent {
    payee_address: EvmAddress,
    amount: BigDecimal,
    bill_reference: String,
    merchant_name: String,
    token_symbol: String,
    chain_id: u64,
    created_at: Option<DateTime<Utc>>,
}

impl PaymentIntent {
    /// Build a new intent stamped with the current time.
    pub fn new(
        address: &str,
        amount: BigDecimal,
        bill_reference: &str,
        merchant_name: &str,
        token_symbol: &str,
        chain_id: u64,
    ) -> Result<Self, InvalidIntent> {
        let payee_address = EvmAddress::from_str(address)?;
        Self::from_parts(
            payee_address,
            amount,
            bill_reference.to_string(),
            merchant_name.to_string(),
            token_symbol.to_string(),
            chain_id,
            Some(Utc::now()),
        )
    }

    fn from_parts(
        payee_address: EvmAddress,
        amount: BigDecimal,
        bill_reference: String,
        merchant_name: String,
        token_symbol: String,
        chain_id: u64,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<Self, InvalidIntent> {
        check_amount(&amount)?;
        if chain_id == 0 {
            return Err(InvalidIntent::ZeroChainId);
        }
        if token_symbol.trim().is_empty() {
            return Err(InvalidIntent::EmptyTokenSymbol);
        }

        Ok(Self {
            payee_address,
            amount,
            bill_reference,
            merchant_name,
            token_symbol,
            chain_id,
            created_at,
        })
    }

    pub fn payee_address(&self) -> &EvmAddress {
        &self.payee_address
    }

    pub fn amount(&self) -> &BigDecimal {
        &self.amount
    }

    pub fn bill_reference(&self) -> &str {
        &self.bill_reference
    }

    pub fn merchant_name(&self) -> &str {
        &self.merchant_name
    }

    pub fn token_symbol(&self) -> &str {
        &self.token_symbol
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Serialize to the text embedded in the QR code.
    pub fn encode(&self) -> String {
        let mut payload = json!({
            "version": CURRENT_VERSION,
            "address": self.payee_address.to_checksum(),
            "amount": self.amount.to_string(),
            "billAccount": self.bill_reference,
            "merchant": self.merchant_name,
            "token": self.token_symbol,
            "chainId": self.chain_id,
        });
        if let Some(created_at) = self.created_at {
            payload["createdAt"] =
                Value::String(created_at.to_rfc3339_opts(SecondsFormat::AutoSi, true));
        }
        payload.to_string()
    }
}

/// A payload from before tokens and chains were part of the code.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyIntent {
    pub payee_address: EvmAddress,
    pub amount: BigDecimal,
    pub bill_reference: String,
    pub merchant_name: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl LegacyIntent {
    /// Pin the legacy request to the token and chain the payer is using.
    pub fn assume(self, token_symbol: &str, chain_id: u64) -> Result<PaymentIntent, InvalidIntent> {
        PaymentIntent::from_parts(
            self.payee_address,
            self.amount,
            self.bill_reference,
            self.merchant_name,
            token_symbol.to_string(),
            chain_id,
            self.created_at,
        )
    }
}

/// The result of reading a QR code, resolved once at decode time.
#[derive(Debug, Clone, PartialEq)]
pub enum ScannedIntent {
    Token(PaymentIntent),
    Legacy(LegacyIntent),
}

impl ScannedIntent {
    pub fn payee_address(&self) -> &EvmAddress {
        match self {
            ScannedIntent::Token(intent) => intent.payee_address(),
            ScannedIntent::Legacy(legacy) => &legacy.payee_address,
        }
    }

    pub fn amount(&self) -> &BigDecimal {
        match self {
            ScannedIntent::Token(intent) => intent.amount(),
            ScannedIntent::Legacy(legacy) => &legacy.amount,
        }
    }

    pub fn bill_reference(&self) -> &str {
        match self {
            ScannedIntent::Token(intent) => intent.bill_reference(),
            ScannedIntent::Legacy(legacy) => &legacy.bill_reference,
        }
    }

    pub fn merchant_name(&self) -> &str {
        match self {
            ScannedIntent::Token(intent) => intent.merchant_name(),
            ScannedIntent::Legacy(legacy) => &legacy.merchant_name,
        }
    }

    /// Turn the scan into a payable intent. Legacy codes take the payer's
    /// token and chain; current codes keep their own.
    pub fn resolve(self, token_symbol: &str, chain_id: u64) -> Result<PaymentIntent, InvalidIntent> {
        match self {
            ScannedIntent::Token(intent) => Ok(intent),
            ScannedIntent::Legacy(legacy) => legacy.assume(token_symbol, chain_id),
        }
    }
}

/// Build and serialize a payment intent in one step.
pub fn encode(
    address: &str,
    amount: &BigDecimal,
    bill_reference: &str,
    merchant_name: &str,
    token_symbol: &str,
    chain_id: u64,
) -> Result<String, InvalidIntent> {
    let intent = PaymentIntent::new(
        address,
        amount.clone(),
        bill_reference,
        merchant_name,
        token_symbol,
        chain_id,
    )?;
    Ok(intent.encode())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePayload {
    version: Option<u32>,
    address: String,
    /// Kept as raw JSON so numeric amounts never pass through `f64`.
    amount: Box<RawValue>,
    bill_account: String,
    merchant: String,
    token: Option<String>,
    chain_id: Option<u64>,
    created_at: Option<DateTime<Utc>>,
}

fn amount_from_raw(raw: &RawValue) -> Result<BigDecimal, DecodeError> {
    let text = raw.get();
    let digits = if text.starts_with('"') {
        serde_json::from_str::<String>(text)
            .map_err(|e| DecodeError::Schema(e.to_string()))?
            .trim()
            .to_string()
    } else {
        text.to_string()
    };
    BigDecimal::from_str(&digits)
        .map_err(|_| DecodeError::Schema(format!("amount is not a number: {}", text)))
}

/// Read a scanned payment code. The input is untrusted.
pub fn decode(raw: &str) -> Result<ScannedIntent, DecodeError> {
    let raw = raw.trim();
    serde_json::from_str::<IgnoredAny>(raw).map_err(|e| {
        tracing::debug!("Rejected payment code that is not JSON: {}", e);
        DecodeError::Syntax(e.to_string())
    })?;
    if !raw.starts_with('{') {
        return Err(DecodeError::Syntax("expected a JSON object".to_string()));
    }

    let wire: WirePayload =
        serde_json::from_str(raw).map_err(|e| DecodeError::Schema(e.to_string()))?;

    if let Some(version) = wire.version {
        if version > CURRENT_VERSION {
            return Err(DecodeError::Schema(format!(
                "unsupported payload version {}",
                version
            )));
        }
    }

    let amount = amount_from_raw(&wire.amount)?;
    let payee_address = EvmAddress::from_str(&wire.address)?;

    let scanned = match (wire.token, wire.chain_id) {
        (Some(token), Some(chain_id)) => ScannedIntent::Token(PaymentIntent::from_parts(
            payee_address,
            amount,
            wire.bill_account,
            wire.merchant,
            token,
            chain_id,
            wire.created_at,
        )?),
        (None, None) => {
            check_amount(&amount)?;
            ScannedIntent::Legacy(LegacyIntent {
                payee_address,
                amount,
                bill_reference: wire.bill_account,
                merchant_name: wire.merchant,
                created_at: wire.created_at,
            })
        }
        (Some(_), None) => {
            return Err(DecodeError::Schema("token given without chainId".to_string()))
        }
        (None, Some(_)) => {
            return Err(DecodeError::Schema("chainId given without token".to_string()))
        }
    };

    tracing::debug!(
        "Decoded payment code for {} ({})",
        scanned.payee_address(),
        if matches!(scanned, ScannedIntent::Legacy(_)) { "legacy" } else { "token" }
    );
    Ok(scanned)
}

/// Most fractional digits an amount may carry.
const MAX_AMOUNT_SCALE: i64 = 36;
/// Most digits before the decimal point.
const MAX_AMOUNT_INTEGER_DIGITS: i64 = 30;

fn check_amount(amount: &BigDecimal) -> Result<(), InvalidIntent> {
    if amount.is_zero() || amount.is_negative() {
        return Err(InvalidIntent::NonPositiveAmount(amount.clone()));
    }
    // Exponent notation can describe numbers whose plain form has
    // billions of digits; refuse them before any arithmetic.
    let (_, scale) = amount.as_bigint_and_exponent();
    let integer_digits = amount.digits() as i64 - scale;
    if scale > MAX_AMOUNT_SCALE || integer_digits > MAX_AMOUNT_INTEGER_DIGITS {
        return Err(InvalidIntent::AmountOutOfRange(format!(
            "{} digits before and {} after the decimal point",
            integer_digits.max(0),
            scale.max(0)
        )));
    }
    Ok(())
}
