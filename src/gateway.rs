//! Core trait defining the operation set every payment backend implements.
//!
//! Implementors of [`Gateway`] are responsible for moving money (authorize,
//! capture, purchase, void, credit, refund) and for vaulting payment
//! instruments (store, update, unstore) against whatever processor they
//! front, returning the normalized [`Response`] shape or raising one of the
//! [`GatewayError`] kinds. Callers hold `Arc<dyn Gateway>` and never name a
//! concrete backend type.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Display;
use std::sync::Arc;

use crate::address::Address;
use crate::amount::Money;
use crate::card::{CardBrand, CreditCard};
use crate::error::GatewayError;
use crate::response::Response;

/// An opaque token returned by a successful authorize/purchase, owned by the
/// caller thereafter. Required input to a matching capture or void. Valid
/// until captured, voided, or expired by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorizationToken(String);

impl AuthorizationToken {
    pub fn new(token: impl Into<String>) -> Self {
        AuthorizationToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AuthorizationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AuthorizationToken {
    fn from(token: &str) -> Self {
        AuthorizationToken(token.to_string())
    }
}

/// A reference to a specific prior transaction, used by refund. A backend's
/// own authorization tokens are always valid transaction references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionRef(String);

impl TransactionRef {
    pub fn new(reference: impl Into<String>) -> Self {
        TransactionRef(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TransactionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TransactionRef {
    fn from(reference: &str) -> Self {
        TransactionRef(reference.to_string())
    }
}

impl From<&AuthorizationToken> for TransactionRef {
    fn from(token: &AuthorizationToken) -> Self {
        TransactionRef(token.as_str().to_string())
    }
}

/// An opaque identifier referencing a payment instrument persisted in a
/// backend's vault (`customer_vault_id` in processor terms).
///
/// Numeric and string forms of the same identifier resolve to the same
/// stored instrument: `VaultToken::from(947110)` equals
/// `VaultToken::new("947110")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VaultToken(String);

impl VaultToken {
    pub fn new(token: impl Into<String>) -> Self {
        VaultToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for VaultToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VaultToken {
    fn from(token: &str) -> Self {
        VaultToken(token.to_string())
    }
}

impl From<u64> for VaultToken {
    fn from(token: u64) -> Self {
        VaultToken(token.to_string())
    }
}

/// Either a raw credit card or a vault token referencing a stored one.
/// Funds-moving operations accept both interchangeably.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentRef {
    Card(CreditCard),
    Vault(VaultToken),
}

impl From<CreditCard> for PaymentRef {
    fn from(card: CreditCard) -> Self {
        PaymentRef::Card(card)
    }
}

impl From<VaultToken> for PaymentRef {
    fn from(token: VaultToken) -> Self {
        PaymentRef::Vault(token)
    }
}

impl From<u64> for PaymentRef {
    fn from(token: u64) -> Self {
        PaymentRef::Vault(VaultToken::from(token))
    }
}

/// Whether a purchase should also vault the instrument as a side effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StoreAction {
    /// Do not vault.
    #[default]
    None,
    /// Vault under a backend-generated identifier.
    Store,
    /// Vault under this caller-chosen identifier, returned verbatim.
    StoreWithId(String),
}

/// Recognized per-call options. Backends echo what they support and ignore
/// the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatewayOptions {
    /// Free-form merchant reference, echoed back in the transaction payload
    /// when the backend supports it.
    pub order_id: Option<String>,
    pub description: Option<String>,
    /// Subject to format validation by backends that support it.
    pub email: Option<String>,
    pub billing_address: Option<Address>,
    pub shipping_address: Option<Address>,
    pub store: StoreAction,
}

impl GatewayOptions {
    pub fn new() -> Self {
        GatewayOptions::default()
    }

    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_billing_address(mut self, address: Address) -> Self {
        self.billing_address = Some(address);
        self
    }

    pub fn with_shipping_address(mut self, address: Address) -> Self {
        self.shipping_address = Some(address);
        self
    }

    pub fn with_store(mut self, store: StoreAction) -> Self {
        self.store = store;
        self
    }
}

/// Trait defining the asynchronous interface every payment backend
/// implements.
///
/// Operations are call-per-operation: each one is awaited to completion and
/// yields a [`Response`] or a raised [`GatewayError`]; none is
/// fire-and-forget. Implementations must not silently retry funds-moving
/// operations (authorize, purchase, credit). Retry belongs to the caller.
///
/// Capability metadata ([`Gateway::supported_countries`],
/// [`Gateway::supported_brands`]) is pure data, queried without any network
/// or simulated call.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Machine-friendly backend identifier, e.g. `"bogus"`.
    fn name(&self) -> &'static str;

    /// Human-friendly backend name, e.g. `"Bogus"`.
    fn display_name(&self) -> &'static str;

    /// ISO country codes this backend can charge in.
    fn supported_countries(&self) -> &'static [&'static str];

    /// Card brands this backend accepts.
    fn supported_brands(&self) -> &'static [CardBrand];

    /// Reserves funds against `payment` without settling.
    ///
    /// On success, [`Response::authorization`] carries the token required to
    /// capture or void the reservation.
    ///
    /// # Errors
    ///
    /// Raises [`GatewayError`] for contract misuse or (real adapters only)
    /// transport failure. A decline is a failed `Response`, not an error.
    async fn authorize(
        &self,
        amount: Money,
        payment: &PaymentRef,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError>;

    /// Settles a previously authorized reservation.
    ///
    /// # Errors
    ///
    /// Raises [`GatewayError::Contract`] if the token was never issued by
    /// this backend or is already captured/voided.
    async fn capture(
        &self,
        amount: Money,
        authorization: &AuthorizationToken,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError>;

    /// Authorize and capture in one step. Accepts a card or a vault token
    /// interchangeably; numeric and string forms of a vault token resolve to
    /// the same stored instrument.
    async fn purchase(
        &self,
        amount: Money,
        payment: &PaymentRef,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError>;

    /// Cancels an authorized or submitted-for-settlement transaction.
    ///
    /// # Errors
    ///
    /// Raises [`GatewayError::Contract`] if the transaction is in a terminal
    /// state. Void is not idempotent.
    async fn void(
        &self,
        authorization: &AuthorizationToken,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError>;

    /// Moves funds *to* the payment instrument, independent of any prior
    /// transaction.
    async fn credit(
        &self,
        amount: Money,
        payment: &PaymentRef,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError>;

    /// Reverses a specific prior transaction by reference.
    async fn refund(
        &self,
        amount: Money,
        reference: &TransactionRef,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError>;

    /// Persists a payment instrument. The response payload carries the new
    /// vault token under `"customer_vault_id"`; `options.store` may request
    /// a caller-chosen identifier instead of a generated one.
    async fn store(
        &self,
        card: &CreditCard,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError>;

    /// Replaces the stored instrument under an existing vault token. Token
    /// identity is preserved.
    ///
    /// # Errors
    ///
    /// Raises [`GatewayError::Contract`] if the token is unknown.
    async fn update(
        &self,
        vault: &VaultToken,
        card: &CreditCard,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError>;

    /// Deletes the stored instrument. Idempotency is backend-defined and
    /// must be documented by each implementation.
    async fn unstore(&self, vault: &VaultToken) -> Result<Response, GatewayError>;
}

#[async_trait]
impl<T: Gateway + ?Sized> Gateway for Arc<T> {
    fn name(&self) -> &'static str {
        self.as_ref().name()
    }

    fn display_name(&self) -> &'static str {
        self.as_ref().display_name()
    }

    fn supported_countries(&self) -> &'static [&'static str] {
        self.as_ref().supported_countries()
    }

    fn supported_brands(&self) -> &'static [CardBrand] {
        self.as_ref().supported_brands()
    }

    async fn authorize(
        &self,
        amount: Money,
        payment: &PaymentRef,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError> {
        self.as_ref().authorize(amount, payment, options).await
    }

    async fn capture(
        &self,
        amount: Money,
        authorization: &AuthorizationToken,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError> {
        self.as_ref().capture(amount, authorization, options).await
    }

    async fn purchase(
        &self,
        amount: Money,
        payment: &PaymentRef,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError> {
        self.as_ref().purchase(amount, payment, options).await
    }

    async fn void(
        &self,
        authorization: &AuthorizationToken,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError> {
        self.as_ref().void(authorization, options).await
    }

    async fn credit(
        &self,
        amount: Money,
        payment: &PaymentRef,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError> {
        self.as_ref().credit(amount, payment, options).await
    }

    async fn refund(
        &self,
        amount: Money,
        reference: &TransactionRef,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError> {
        self.as_ref().refund(amount, reference, options).await
    }

    async fn store(
        &self,
        card: &CreditCard,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError> {
        self.as_ref().store(card, options).await
    }

    async fn update(
        &self,
        vault: &VaultToken,
        card: &CreditCard,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError> {
        self.as_ref().update(vault, card, options).await
    }

    async fn unstore(&self, vault: &VaultToken) -> Result<Response, GatewayError> {
        self.as_ref().unstore(vault).await
    }
}
