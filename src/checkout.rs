//! The payer's side of a payment: from a scanned intent to a submitted
//! transfer.
//!
//! Every collaborator call is a single await with no retry. Checks run in
//! this order and stop at the first failure:
//!
//! 1. the tip text is a usable percentage
//! 2. the wallet is connected and on the intent's chain
//! 3. the token has a known contract on that chain
//! 4. the balance covers base + tip
//!
//! Only then is a [`TransferRequest`] produced, and only a `TransferRequest`
//! can reach [`TransferWriter::transfer`].

use tracing::Instrument;
use uuid::Uuid;

use crate::cards::{BalanceReader, TransferWriter, WalletConnection};
use crate::errors::{PaymentError, SettlementError};
use crate::payment::{from_smallest_unit, to_smallest_unit, PaymentIntent, ScannedIntent};
use crate::settlement::{compute_settlement, TipSelection};
use crate::tokens::token_for;
use crate::types::{PaymentConfirmation, TransferReceipt, TransferRequest};

/// Pick the intent to pay from a scan. Legacy codes are paid in
/// `fallback_token` on whatever chain the wallet is on.
pub fn resolve_scan(
    scanned: ScannedIntent,
    wallet: &dyn WalletConnection,
    fallback_token: &str,
) -> Result<PaymentIntent, PaymentError> {
    if let ScannedIntent::Legacy(_) = &scanned {
        tracing::warn!(
            "Payment code has no token or chain, assuming {} on chain {}",
            fallback_token,
            wallet.chain_id()
        );
    }
    Ok(scanned.resolve(fallback_token, wallet.chain_id())?)
}

pub async fn authorize(
    intent: &PaymentIntent,
    tip: &TipSelection,
    wallet: &dyn WalletConnection,
    balances: &dyn BalanceReader,
) -> Result<TransferRequest, PaymentError> {
    let attempt_id = Uuid::new_v4();
    authorize_attempt(attempt_id, intent, tip, wallet, balances)
        .instrument(tracing::info_span!("checkout", %attempt_id))
        .await
}

async fn authorize_attempt(
    attempt_id: Uuid,
    intent: &PaymentIntent,
    tip: &TipSelection,
    wallet: &dyn WalletConnection,
    balances: &dyn BalanceReader,
) -> Result<TransferRequest, PaymentError> {
    tip.percent().map_err(SettlementError::from)?;

    if !wallet.is_connected() {
        return Err(PaymentError::WalletDisconnected);
    }
    let active = wallet.chain_id();
    if intent.chain_id() != active {
        return Err(PaymentError::ChainMismatch {
            expected: intent.chain_id(),
            active,
        });
    }

    let token = token_for(intent.chain_id(), intent.token_symbol()).ok_or_else(|| {
        PaymentError::UnsupportedToken {
            symbol: intent.token_symbol().to_string(),
            chain_id: intent.chain_id(),
        }
    })?;

    let payer = wallet.address();
    let raw_balance = balances.balance_of(&payer, &token).await?;
    let available = from_smallest_unit(raw_balance, token.decimals);
    tracing::debug!("{} has {} {} available", payer, available, token.symbol);

    let settlement = compute_settlement(intent.amount(), tip, &available)?;

    let amount = to_smallest_unit(&settlement.total_amount, token.decimals)
        .map_err(|_| PaymentError::UnrepresentableAmount(settlement.total_amount.clone()))?;
    if amount.is_zero() {
        return Err(PaymentError::UnrepresentableAmount(settlement.total_amount.clone()));
    }

    tracing::info!(
        "Authorized {} {} to {} (base {}, tip {}%)",
        settlement.total_amount,
        token.symbol,
        intent.payee_address(),
        settlement.base_amount,
        settlement.tip_percent
    );

    Ok(TransferRequest {
        attempt_id,
        recipient: *intent.payee_address(),
        amount,
        token,
        settlement,
        bill_reference: intent.bill_reference().to_string(),
        merchant_name: intent.merchant_name().to_string(),
    })
}

/// Hand an authorized transfer to the wallet. Wallet errors come back as-is.
pub async fn submit(
    request: &TransferRequest,
    writer: &dyn TransferWriter,
) -> Result<TransferReceipt, PaymentError> {
    let receipt = writer
        .transfer(&request.recipient, request.amount, &request.token)
        .instrument(tracing::info_span!("checkout", attempt_id = %request.attempt_id))
        .await
        .map_err(|e| {
            tracing::error!("Transfer for attempt {} failed: {}", request.attempt_id, e);
            PaymentError::Collaborator(e)
        })?;

    tracing::info!(
        "Attempt {} submitted as {}",
        request.attempt_id,
        receipt.tx_hash
    );
    Ok(receipt)
}

/// Authorize and submit in one go.
pub async fn pay(
    intent: &PaymentIntent,
    tip: &TipSelection,
    wallet: &dyn WalletConnection,
    balances: &dyn BalanceReader,
    writer: &dyn TransferWriter,
) -> Result<PaymentConfirmation, PaymentError> {
    let request = authorize(intent, tip, wallet, balances).await?;
    let receipt = submit(&request, writer).await?;
    Ok(PaymentConfirmation::new(&request, &receipt))
}
