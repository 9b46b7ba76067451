//! Payment gateway abstraction for Rust.
//!
//! This crate provides one contract, the [`Gateway`](gateway::Gateway)
//! trait, that any number of heterogeneous payment-processor integrations
//! implement, so calling code can authorize, capture, purchase, credit,
//! refund, void, and vault payment instruments without knowing which
//! concrete processor is behind the call.
//!
//! # Overview
//!
//! Every backend reduces its processor's wire semantics to one
//! [`Response`](response::Response) shape and one
//! [`GatewayError`](error::GatewayError) taxonomy. The split between the two
//! is load-bearing: a declined or invalid transaction is a *failed
//! `Response`* the caller handles on every call, while contract misuse and
//! transport trouble are *raised errors*. Callers hold `Arc<dyn Gateway>`
//! and never name a concrete backend.
//!
//! The crate ships one concrete backend: [`BogusGateway`](bogus::BogusGateway),
//! a deterministic simulation that maps documented literal reference values
//! onto every success/failure/error branch of the contract. It exists so
//! integration code can be tested without network access against the full
//! state space: issued authorization tokens, vault lifecycles, declines,
//! and contract violations. Real network adapters implement the same trait
//! in their own crates.
//!
//! # Modules
//!
//! - [`amount`] — Money in integer minor currency units; no floats anywhere.
//! - [`card`] — CreditCard, card number masking, brand detection, Luhn.
//! - [`address`] — structured postal addresses for AVS.
//! - [`response`] — the normalized operation outcome.
//! - [`error`] — the raised-failure taxonomy.
//! - [`gateway`] — the `Gateway` trait, payment references, per-call options.
//! - [`config`] — opaque backend credentials and sandbox/live mode.
//! - [`bogus`] — the deterministic simulation backend.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use paygate::amount::Money;
//! use paygate::bogus::BogusGateway;
//! use paygate::card::{CardNumber, CreditCard, ExpiryDate};
//! use paygate::config::GatewayConfig;
//! use paygate::gateway::{Gateway, GatewayOptions, PaymentRef};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway: Arc<dyn Gateway> =
//!     Arc::new(BogusGateway::new(GatewayConfig::new("bogus", "bogus")));
//!
//! let card = CreditCard::new(
//!     CardNumber::new(BogusGateway::APPROVED)?,
//!     ExpiryDate::new(9, 2030)?,
//!     "Longbob",
//!     "Longsen",
//! );
//! let response = gateway
//!     .purchase(Money::usd(1000), &PaymentRef::from(card), &GatewayOptions::new())
//!     .await?;
//! assert!(response.success);
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod amount;
pub mod bogus;
pub mod card;
pub mod config;
pub mod error;
pub mod gateway;
pub mod response;
