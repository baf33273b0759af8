use bigdecimal::BigDecimal;
use ethers::types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::address::EvmAddress;
use crate::payment::format_fiat;
use crate::settlement::Settlement;
use crate::tokens::Token;

/// A transfer that passed every check and may be handed to the wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub attempt_id: Uuid,
    pub recipient: EvmAddress,
    /// `settlement.total_amount` in the token's smallest unit.
    pub amount: U256,
    pub token: Token,
    pub settlement: Settlement,
    pub bill_reference: String,
    pub merchant_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Success,
}

/// The wallet's acknowledgement of a submitted transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub tx_hash: String,
    pub status: TransferStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    pub smallest_unit: U256,
    pub decimal: BigDecimal,
}

/// The ticket shown after a payment was submitted.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub merchant_name: String,
    pub bill_reference: String,
    pub total: BigDecimal,
    pub token_symbol: String,
    pub tx_hash: String,
}

impl PaymentConfirmation {
    pub fn new(request: &TransferRequest, receipt: &TransferReceipt) -> Self {
        Self {
            merchant_name: request.merchant_name.clone(),
            bill_reference: request.bill_reference.clone(),
            total: request.settlement.total_amount.clone(),
            token_symbol: request.token.symbol.clone(),
            tx_hash: receipt.tx_hash.clone(),
        }
    }

    /// `0x1234...abcd` style id for narrow screens.
    pub fn short_id(&self) -> String {
        let chars: Vec<char> = self.tx_hash.chars().collect();
        if chars.len() <= 13 {
            return self.tx_hash.clone();
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl fmt::Display for PaymentConfirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bill = if self.bill_reference.is_empty() {
            "N/A"
        } else {
            self.bill_reference.as_str()
        };
        write!(
            f,
            "Merchant: {}\nAmount: {} {}\nBill account: {}\nId: {}",
            self.merchant_name,
            format_fiat(&self.total),
            self.token_symbol,
            bill,
            self.short_id()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_confirmation_ticket() {
        let confirmation = PaymentConfirmation {
            merchant_name: "Tacos El Güero".to_string(),
            bill_reference: String::new(),
            total: BigDecimal::from_str("57.5").unwrap(),
            token_symbol: "USDC".to_string(),
            tx_hash: format!("0x{}", "ab".repeat(32)),
        };
        assert_eq!(confirmation.short_id(), "0xabab...abab");
        assert_eq!(
            confirmation.to_string(),
            "Merchant: Tacos El Güero\nAmount: $57.50 USDC\nBill account: N/A\nId: 0xabab...abab"
        );
    }

    #[test]
    fn test_short_id_counts_characters() {
        let confirmation = PaymentConfirmation {
            merchant_name: "Kiosk".to_string(),
            bill_reference: "7".to_string(),
            total: BigDecimal::from(1),
            token_symbol: "DAI".to_string(),
            tx_hash: "0xñññññññññññ€€€€".to_string(),
        };
        assert_eq!(confirmation.short_id(), "0xññññ...€€€€");

        let short = PaymentConfirmation {
            tx_hash: "0xabc".to_string(),
            ..confirmation
        };
        assert_eq!(short.short_id(), "0xabc");
    }
}
