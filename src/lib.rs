pub mod address;
pub mod cards;
pub mod checkout;
pub mod config;
pub mod errors;
pub mod payment;
pub mod places;
pub mod qr;
pub mod scan;
pub mod settlement;
pub mod tokens;
pub mod types;
