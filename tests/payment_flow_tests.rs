use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use ethers::types::U256;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use monadero::address::EvmAddress;
use monadero::cards::{BalanceReader, TransferWriter, WalletConnection};
use monadero::checkout::{authorize, pay, resolve_scan, submit};
use monadero::errors::{PaymentError, SettlementError, TipError};
use monadero::payment::{decode, encode, to_smallest_unit, PaymentIntent};
use monadero::settlement::{FixedTip, TipSelection};
use monadero::tokens::{token_for, Token, ETHEREUM_MAINNET};
use monadero::types::{TransferReceipt, TransferStatus};

const PAYEE: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
const PAYER: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

struct TestWallet {
    chain_id: u64,
    connected: bool,
}

impl WalletConnection for TestWallet {
    fn address(&self) -> EvmAddress {
        EvmAddress::from_str(PAYER).unwrap()
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Holds a fixed balance and counts how often it was asked.
struct TestBalances {
    balance: U256,
    calls: Arc<Mutex<u32>>,
}

#[async_trait]
impl BalanceReader for TestBalances {
    async fn balance_of(&self, _owner: &EvmAddress, _token: &Token) -> Result<U256> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.balance)
    }
}

struct FailingBalances;

#[async_trait]
impl BalanceReader for FailingBalances {
    async fn balance_of(&self, _owner: &EvmAddress, _token: &Token) -> Result<U256> {
        Err(anyhow!("rpc timed out"))
    }
}

#[derive(Default)]
struct RecordingWriter {
    transfers: Arc<Mutex<Vec<(EvmAddress, U256, String)>>>,
    fail_with: Option<String>,
}

#[async_trait]
impl TransferWriter for RecordingWriter {
    async fn transfer(&self, recipient: &EvmAddress, amount: U256, token: &Token) -> Result<TransferReceipt> {
        if let Some(message) = &self.fail_with {
            return Err(anyhow!(message.clone()));
        }
        self.transfers
            .lock()
            .unwrap()
            .push((*recipient, amount, token.symbol.clone()));
        Ok(TransferReceipt {
            tx_hash: format!("0x{}", "12".repeat(32)),
            status: TransferStatus::Pending,
        })
    }
}

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

fn dai_units(amount: &str) -> U256 {
    to_smallest_unit(&dec(amount), 18).unwrap()
}

fn mainnet_wallet() -> TestWallet {
    TestWallet {
        chain_id: ETHEREUM_MAINNET,
        connected: true,
    }
}

fn balances(amount: &str) -> (TestBalances, Arc<Mutex<u32>>) {
    let calls = Arc::new(Mutex::new(0));
    (
        TestBalances {
            balance: dai_units(amount),
            calls: calls.clone(),
        },
        calls,
    )
}

fn dinner_intent() -> PaymentIntent {
    PaymentIntent::new(PAYEE, dec("50"), "Mesa 4", "Tacos El Güero", "DAI", ETHEREUM_MAINNET).unwrap()
}

#[tokio::test]
async fn test_fifteen_percent_tip_is_transferred_in_full() {
    let intent = dinner_intent();
    let (balances, _) = balances("100");
    let writer = RecordingWriter::default();

    let confirmation = pay(
        &intent,
        &TipSelection::Fixed(FixedTip::Fifteen),
        &mainnet_wallet(),
        &balances,
        &writer,
    )
    .await
    .unwrap();

    assert_eq!(confirmation.total, dec("57.5"));
    assert_eq!(confirmation.token_symbol, "DAI");
    assert_eq!(confirmation.bill_reference, "Mesa 4");

    let transfers = writer.transfers.lock().unwrap();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].0, EvmAddress::from_str(PAYEE).unwrap());
    assert_eq!(transfers[0].1, dai_units("57.5"));
    assert_eq!(transfers[0].2, "DAI");
}

#[tokio::test]
async fn test_insufficient_balance_never_reaches_the_writer() {
    let intent = dinner_intent();
    let (balances, _) = balances("40");
    let writer = RecordingWriter::default();

    let err = pay(&intent, &TipSelection::none(), &mainnet_wallet(), &balances, &writer)
        .await
        .unwrap_err();

    match err {
        PaymentError::Settlement(SettlementError::InsufficientBalance { required, available }) => {
            assert_eq!(required, dec("50"));
            assert_eq!(available, dec("40"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(writer.transfers.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_exact_balance_is_enough() {
    let intent = dinner_intent();
    let (balances, _) = balances("60");

    let request = authorize(
        &intent,
        &TipSelection::Fixed(FixedTip::Twenty),
        &mainnet_wallet(),
        &balances,
    )
    .await
    .unwrap();

    assert_eq!(request.settlement.total_amount, dec("60"));
    assert_eq!(request.amount, dai_units("60"));
}

#[tokio::test]
async fn test_invalid_custom_tip_is_rejected_before_any_lookup() {
    let intent = dinner_intent();
    let (balances, calls) = balances("100");

    let err = authorize(
        &intent,
        &TipSelection::Custom("abc".to_string()),
        &mainnet_wallet(),
        &balances,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        PaymentError::Settlement(SettlementError::InvalidTip(TipError::NonNumeric(_)))
    ));
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_custom_tip_keeps_full_precision() {
    let intent = dinner_intent();
    let (balances, _) = balances("100");

    let request = authorize(
        &intent,
        &TipSelection::Custom("12.5%".to_string()),
        &mainnet_wallet(),
        &balances,
    )
    .await
    .unwrap();

    assert_eq!(request.settlement.tip_amount, dec("6.25"));
    assert_eq!(request.settlement.total_amount, dec("56.25"));
    assert_eq!(request.amount, dai_units("56.25"));
}

#[tokio::test]
async fn test_chain_mismatch() {
    let intent = dinner_intent();
    let (balances, calls) = balances("100");
    let wallet = TestWallet {
        chain_id: 8453,
        connected: true,
    };

    let err = authorize(&intent, &TipSelection::none(), &wallet, &balances)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PaymentError::ChainMismatch {
            expected: 1,
            active: 8453
        }
    ));
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_disconnected_wallet() {
    let intent = dinner_intent();
    let (balances, _) = balances("100");
    let wallet = TestWallet {
        chain_id: ETHEREUM_MAINNET,
        connected: false,
    };

    let err = authorize(&intent, &TipSelection::none(), &wallet, &balances)
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::WalletDisconnected));
}

#[tokio::test]
async fn test_unknown_token() {
    let intent = PaymentIntent::new(PAYEE, dec("50"), "", "Tacos", "PESO", ETHEREUM_MAINNET).unwrap();
    let (balances, _) = balances("100");

    let err = authorize(&intent, &TipSelection::none(), &mainnet_wallet(), &balances)
        .await
        .unwrap_err();

    match err {
        PaymentError::UnsupportedToken { symbol, chain_id } => {
            assert_eq!(symbol, "PESO");
            assert_eq!(chain_id, ETHEREUM_MAINNET);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_balance_errors_pass_through() {
    let intent = dinner_intent();

    let err = authorize(&intent, &TipSelection::none(), &mainnet_wallet(), &FailingBalances)
        .await
        .unwrap_err();

    assert!(matches!(err, PaymentError::Collaborator(_)));
    assert_eq!(err.to_string(), "rpc timed out");
}

#[tokio::test]
async fn test_writer_errors_pass_through() {
    let intent = dinner_intent();
    let (balances, _) = balances("100");
    let request = authorize(&intent, &TipSelection::none(), &mainnet_wallet(), &balances)
        .await
        .unwrap();

    let writer = RecordingWriter {
        fail_with: Some("user rejected the request".to_string()),
        ..Default::default()
    };
    let err = submit(&request, &writer).await.unwrap_err();
    assert_eq!(err.to_string(), "user rejected the request");
}

#[tokio::test]
async fn test_amount_below_smallest_unit_is_refused() {
    // USDC has 6 decimals
    let usdc = token_for(ETHEREUM_MAINNET, "USDC").unwrap();
    assert_eq!(usdc.decimals, 6);

    let intent =
        PaymentIntent::new(PAYEE, dec("0.0000001"), "", "Tacos", "USDC", ETHEREUM_MAINNET).unwrap();
    let balances = TestBalances {
        balance: U256::from(1_000_000u64),
        calls: Arc::new(Mutex::new(0)),
    };

    let err = authorize(&intent, &TipSelection::none(), &mainnet_wallet(), &balances)
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::UnrepresentableAmount(_)));
}

#[tokio::test]
async fn test_scanned_code_to_confirmation() {
    let payload = encode(PAYEE, &dec("50"), "Mesa 4", "Tacos El Güero", "DAI", ETHEREUM_MAINNET).unwrap();
    let wallet = mainnet_wallet();
    let intent = resolve_scan(decode(&payload).unwrap(), &wallet, "USDC").unwrap();
    assert_eq!(intent.token_symbol(), "DAI");

    let (balances, _) = balances("100");
    let writer = RecordingWriter::default();
    let confirmation = pay(
        &intent,
        &TipSelection::Fixed(FixedTip::Ten),
        &wallet,
        &balances,
        &writer,
    )
    .await
    .unwrap();

    assert_eq!(
        confirmation.to_string(),
        "Merchant: Tacos El Güero\nAmount: $55.00 DAI\nBill account: Mesa 4\nId: 0x1212...1212"
    );
}

#[tokio::test]
async fn test_legacy_code_uses_wallet_chain() {
    let payload = format!(
        r#"{{"address":"{}","amount":"12.00","billAccount":"","merchant":"Café"}}"#,
        PAYEE
    );
    let wallet = mainnet_wallet();
    let intent = resolve_scan(decode(&payload).unwrap(), &wallet, "DAI").unwrap();

    assert_eq!(intent.chain_id(), ETHEREUM_MAINNET);
    assert_eq!(intent.token_symbol(), "DAI");
    assert_eq!(intent.amount(), &dec("12.00"));

    let (balances, _) = balances("12");
    let request = authorize(&intent, &TipSelection::none(), &wallet, &balances)
        .await
        .unwrap();
    assert_eq!(request.amount, dai_units("12"));
}
