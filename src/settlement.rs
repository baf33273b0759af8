use bigdecimal::{BigDecimal, Signed, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{SettlementError, TipError};
use crate::payment::{format_fiat, round_for_display};

/// The tip buttons offered on the pay screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixedTip {
    NoTip,
    Ten,
    Fifteen,
    Twenty,
}

impl FixedTip {
    pub const ALL: [FixedTip; 4] = [FixedTip::NoTip, FixedTip::Ten, FixedTip::Fifteen, FixedTip::Twenty];

    pub fn percent(self) -> u32 {
        match self {
            FixedTip::NoTip => 0,
            FixedTip::Ten => 10,
            FixedTip::Fifteen => 15,
            FixedTip::Twenty => 20,
        }
    }
}

impl TryFrom<u32> for FixedTip {
    type Error = TipError;

    fn try_from(percent: u32) -> Result<Self, Self::Error> {
        FixedTip::ALL
            .into_iter()
            .find(|tip| tip.percent() == percent)
            .ok_or(TipError::NotAPreset(percent))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TipSelection {
    Fixed(FixedTip),
    /// Raw text from the custom tip field, checked at submit time.
    Custom(String),
}

impl TipSelection {
    pub fn none() -> Self {
        TipSelection::Fixed(FixedTip::NoTip)
    }

    pub fn percent(&self) -> Result<BigDecimal, TipError> {
        match self {
            TipSelection::Fixed(tip) => Ok(BigDecimal::from(tip.percent())),
            TipSelection::Custom(text) => parse_custom_tip(text),
        }
    }
}

/// Most fractional digits a custom tip may carry.
pub const MAX_TIP_DECIMALS: usize = 18;

fn parse_custom_tip(text: &str) -> Result<BigDecimal, TipError> {
    let trimmed = text.trim().trim_end_matches('%').trim();
    if trimmed.is_empty() {
        return Err(TipError::Empty);
    }

    // Plain decimal notation only: no exponent, no sign other than a leading minus.
    let unsigned = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let plain = !(whole.is_empty() && fraction.is_empty())
        && whole.chars().all(|c| c.is_ascii_digit())
        && fraction.chars().all(|c| c.is_ascii_digit())
        && fraction.len() <= MAX_TIP_DECIMALS;
    if !plain {
        return Err(TipError::NonNumeric(text.to_string()));
    }

    let percent =
        BigDecimal::from_str(trimmed).map_err(|_| TipError::NonNumeric(text.to_string()))?;
    if percent.is_negative() {
        return Err(TipError::Negative(percent));
    }
    Ok(percent)
}

/// What the payer owes for one payment attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub base_amount: BigDecimal,
    pub tip_percent: BigDecimal,
    pub tip_amount: BigDecimal,
    /// Full precision. This is the value that gets transferred.
    pub total_amount: BigDecimal,
}

impl Settlement {
    pub fn display_tip(&self) -> BigDecimal {
        round_for_display(&self.tip_amount)
    }

    pub fn display_total(&self) -> BigDecimal {
        round_for_display(&self.total_amount)
    }
}

impl fmt::Display for Settlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Amount: {}\nTip ({}%): {}\nTotal: {}",
            format_fiat(&self.base_amount),
            trim_zeros(&self.tip_percent),
            format_fiat(&self.tip_amount),
            format_fiat(&self.total_amount)
        )
    }
}

fn trim_zeros(value: &BigDecimal) -> String {
    let text = value.to_string();
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// Work out tip and total and check them against the payer's balance.
///
/// Fails closed: no settlement exists for a total the balance cannot cover.
pub fn compute_settlement(
    base_amount: &BigDecimal,
    tip: &TipSelection,
    current_balance: &BigDecimal,
) -> Result<Settlement, SettlementError> {
    let tip_percent = tip.percent()?;
    if base_amount.is_zero() || base_amount.is_negative() {
        return Err(SettlementError::InvalidBaseAmount(base_amount.clone()));
    }

    let tip_amount = base_amount * &tip_percent / BigDecimal::from(100);
    let total_amount = base_amount + &tip_amount;

    if &total_amount > current_balance {
        tracing::info!(
            "Settlement of {} exceeds available balance {}",
            total_amount,
            current_balance
        );
        return Err(SettlementError::InsufficientBalance {
            required: total_amount,
            available: current_balance.clone(),
        });
    }

    Ok(Settlement {
        base_amount: base_amount.clone(),
        tip_percent,
        tip_amount,
        total_amount,
    })
}
