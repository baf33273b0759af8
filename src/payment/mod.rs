use anyhow::{anyhow, Result};
use bigdecimal::{BigDecimal, RoundingMode, Signed, Zero};
use ethers::types::U256;
use std::str::FromStr;

pub mod intent;

pub use intent::{decode, encode, LegacyIntent, PaymentIntent, ScannedIntent};

/// Places shown to people. Transfers always use the token's own precision.
pub const DISPLAY_DECIMALS: i64 = 2;

/// Parse what the payee typed in the amount field.
///
/// Anything that is not a digit or a decimal point is dropped first, so
/// `"$1,250.50"` and `"1250.50"` are the same amount.
pub fn parse_amount_input(text: &str) -> Result<BigDecimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.is_empty() || cleaned == "." {
        return Err(anyhow!("Amount is empty"));
    }
    if cleaned.matches('.').count() > 1 {
        return Err(anyhow!("Amount has more than one decimal point: {}", text));
    }

    BigDecimal::from_str(&cleaned).map_err(|e| anyhow!("Invalid amount {}: {}", text, e))
}

/// Round half-up to cents for display. Never feed the result to a transfer.
pub fn round_for_display(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(DISPLAY_DECIMALS, RoundingMode::HalfUp)
}

/// `$1,250.50` style rendering.
pub fn format_fiat(amount: &BigDecimal) -> String {
    let rounded = round_for_display(amount);
    let sign = if rounded.is_negative() { "-" } else { "" };
    let text = rounded.abs().to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}${}.{}", sign, grouped, fraction)
}

/// Convert a token amount to its smallest unit (wei for 18-decimal tokens).
///
/// Digits beyond the token's precision are truncated toward zero.
pub fn to_smallest_unit(amount: &BigDecimal, decimals: u8) -> Result<U256> {
    if amount.is_negative() {
        return Err(anyhow!("Cannot transfer a negative amount: {}", amount));
    }
    let (units, _) = amount
        .with_scale_round(decimals as i64, RoundingMode::Down)
        .into_bigint_and_exponent();
    U256::from_dec_str(&units.to_string())
        .map_err(|e| anyhow!("Amount {} does not fit in 256 bits: {}", amount, e))
}

pub fn from_smallest_unit(units: U256, decimals: u8) -> BigDecimal {
    // U256 always prints as plain decimal digits.
    match BigDecimal::from_str(&units.to_string()) {
        Ok(whole) => {
            let (mantissa, _) = whole.into_bigint_and_exponent();
            BigDecimal::new(mantissa, decimals as i64)
        }
        Err(_) => BigDecimal::zero(),
    }
}
