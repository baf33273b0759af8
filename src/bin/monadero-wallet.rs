use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use monadero::cards::eth::EthereumCard;
use monadero::cards::{BalanceReader, WalletConnection};
use monadero::checkout::{authorize, resolve_scan, submit};
use monadero::config::Config;
use monadero::errors::PaymentError;
use monadero::payment::{format_fiat, from_smallest_unit, parse_amount_input, PaymentIntent, ScannedIntent};
use monadero::places::{default_region, places, places_in, Place};
use monadero::qr::{QrCodeRenderer, QrOptions, QrRenderer};
use monadero::scan::ScanSession;
use monadero::settlement::{FixedTip, TipSelection};
use monadero::tokens::{self, token_for};
use monadero::types::{Balance, PaymentConfirmation};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// BIP39 seed phrase (or set MONADERO_SEED_PHRASE env var)
    #[arg(long, env = "MONADERO_SEED_PHRASE", hide_env_values = true)]
    seed_phrase: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a payment code for a customer to scan
    Request {
        /// Amount to charge, e.g. 50 or $1,250.50
        amount: String,

        /// Bill or table reference shown on the ticket
        #[arg(long, default_value = "")]
        bill_account: String,

        /// Merchant name (defaults to MONADERO_MERCHANT_NAME)
        #[arg(long)]
        merchant: Option<String>,

        /// Receiving address (defaults to the wallet's own address)
        #[arg(long)]
        address: Option<String>,

        /// Print an SVG document instead of terminal art
        #[arg(long)]
        svg: bool,
    },

    /// Decode a scanned payment code without paying it
    Inspect {
        /// The scanned payment code
        payload: String,
    },

    /// Pay a scanned payment code
    Pay {
        /// The scanned payment code
        payload: String,

        /// Preset tip percentage (0, 10, 15 or 20)
        #[arg(long, default_value = "0", conflicts_with = "custom_tip")]
        tip: u32,

        /// Any other tip percentage, e.g. 12.5
        #[arg(long)]
        custom_tip: Option<String>,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Show the wallet's token balance
    Balance,

    /// List the places on the merchant map
    Places {
        /// Include places outside the default map view
        #[arg(long)]
        all: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if args.seed_phrase.is_some() {
        config.seed_phrase = args.seed_phrase;
    }
    if let Some(token) = config.custom_token.clone() {
        tokens::register(token);
    }

    match args.command {
        Commands::Request {
            amount,
            bill_account,
            merchant,
            address,
            svg,
        } => {
            let address = match address {
                Some(address) => address,
                None => EthereumCard::derive_address(config.require_seed_phrase()?, config.account)?
                    .to_string(),
            };
            let amount = parse_amount_input(&amount)?;
            let merchant = merchant.unwrap_or_else(|| config.merchant_name.clone());

            let intent = PaymentIntent::new(
                &address,
                amount,
                &bill_account,
                &merchant,
                &config.token_symbol,
                config.chain_id,
            )?;
            let payload = intent.encode();

            let options = if svg { QrOptions::svg(256) } else { QrOptions::terminal() };
            let code = QrCodeRenderer::new(options).render(&payload)?;

            if svg {
                println!("{}", code);
            } else {
                println!("\n🧾 Payment request for {} {}", format_fiat(intent.amount()), intent.token_symbol());
                println!("{}", code);
                println!("{}", payload);
            }
            Ok(())
        }

        Commands::Inspect { payload } => {
            let mut session = ScanSession::new();
            session.on_scan(&payload);
            let scanned = session
                .decode()
                .ok_or_else(|| anyhow!("Nothing was scanned"))??;

            println!("\n📄 Payment Code:");
            println!("Merchant: {}", scanned.merchant_name());
            println!("Pay to: {}", scanned.payee_address());
            println!("Amount: {}", format_fiat(scanned.amount()));
            println!(
                "Bill account: {}",
                if scanned.bill_reference().is_empty() { "N/A" } else { scanned.bill_reference() }
            );
            match &scanned {
                ScannedIntent::Token(intent) => {
                    println!("Token: {} on chain {}", intent.token_symbol(), intent.chain_id());
                    if let Some(created_at) = intent.created_at() {
                        println!("Created: {}", created_at.to_rfc3339());
                    }
                }
                ScannedIntent::Legacy(_) => {
                    println!("Token: not specified, {} will be assumed", config.token_symbol);
                }
            }
            Ok(())
        }

        Commands::Pay {
            payload,
            tip,
            custom_tip,
            yes,
        } => {
            let tip = match custom_tip {
                Some(text) => TipSelection::Custom(text),
                None => TipSelection::Fixed(FixedTip::try_from(tip)?),
            };

            let card = connect(&config).await?;

            let mut session = ScanSession::new();
            session.on_scan(&payload);
            let scanned = session
                .decode()
                .ok_or_else(|| anyhow!("Nothing was scanned"))?
                .map_err(PaymentError::from)?;
            let intent = resolve_scan(scanned, &card, &config.token_symbol)?;

            let request = authorize(&intent, &tip, &card, &card).await?;

            println!("\n💳 Payment to {}:", request.merchant_name);
            println!("{}", request.settlement);
            println!(
                "\nPay {} {} to {} from {}? (y/N)",
                format_fiat(&request.settlement.total_amount),
                request.token.symbol,
                request.recipient,
                card.address()
            );

            if !yes {
                let mut input = String::new();
                std::io::stdin().read_line(&mut input)?;
                if input.trim().to_lowercase() != "y" {
                    println!("Payment cancelled");
                    return Ok(());
                }
            }

            let receipt = submit(&request, &card).await?;
            let confirmation = PaymentConfirmation::new(&request, &receipt);
            println!("✅ Payment sent successfully!");
            println!("{}", confirmation);
            Ok(())
        }

        Commands::Balance => {
            let card = connect(&config).await?;
            let token = token_for(card.chain_id(), &config.token_symbol).ok_or_else(|| {
                PaymentError::UnsupportedToken {
                    symbol: config.token_symbol.clone(),
                    chain_id: card.chain_id(),
                }
            })?;

            let smallest_unit = card.balance_of(&card.address(), &token).await?;
            let balance = Balance {
                smallest_unit,
                decimal: from_smallest_unit(smallest_unit, token.decimals),
            };

            let wallet: &dyn WalletConnection = &card;
            println!("\n💰 Wallet:");
            println!("{}", wallet);
            println!("Path: {}", card.derivation_path());
            println!("Balance: {} {}", balance.decimal, token.symbol);
            Ok(())
        }

        Commands::Places { all } => {
            let listed: Vec<&Place> = if all {
                places().iter().collect()
            } else {
                places_in(&default_region())
            };
            println!("\n📍 Places:");
            for place in listed {
                println!(
                    "{}. {} ({:.4}, {:.4}): {}",
                    place.id,
                    place.title,
                    place.coordinate.latitude,
                    place.coordinate.longitude,
                    place.description
                );
            }
            Ok(())
        }
    }
}

async fn connect(config: &Config) -> Result<EthereumCard> {
    EthereumCard::connect(
        config.require_rpc_url()?.as_str(),
        config.require_seed_phrase()?,
        config.account,
    )
    .await
}
