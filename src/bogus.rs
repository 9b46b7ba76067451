//! The deterministic simulation backend.
//!
//! [`BogusGateway`] implements the full [`Gateway`] contract by pattern
//! matching on the literal value of the payment reference, so integration
//! code can be exercised against every contract branch without network
//! access. The behavior table is a pure function of (operation, reference
//! value, recorded state):
//!
//! | reference               | outcome                                      |
//! |-------------------------|----------------------------------------------|
//! | `"1"` ([`BogusGateway::APPROVED`])            | success `Response`     |
//! | `"3"` ([`BogusGateway::ALTERNATE_APPROVED`])  | success `Response`     |
//! | `"2"` ([`BogusGateway::DECLINED`])            | failed `Response`      |
//! | anything else           | `Err(GatewayError::Contract)`                |
//!
//! Card-keyed operations (authorize, purchase, credit, store, update) key on
//! the card number; token-keyed operations (capture, void, refund, unstore)
//! key on the reference literal. Two recognized success values rather than
//! one catch integrations that special-case a single success literal.
//!
//! On top of the literals, the backend records its own output: a token
//! returned by a successful authorize/purchase is always a valid input to a
//! later capture or void on the same instance, and vault tokens returned by
//! store resolve until unstore destroys them. State is per-instance, never
//! process-global.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use rand::{Rng, rng};
use regex::Regex;
use serde_json::{Value, json};
use tracing::instrument;

use crate::address::Address;
use crate::amount::Money;
use crate::card::{CardBrand, CreditCard};
use crate::config::{GatewayConfig, GatewayMode};
use crate::error::GatewayError;
use crate::gateway::{
    AuthorizationToken, Gateway, GatewayOptions, PaymentRef, StoreAction, TransactionRef,
    VaultToken,
};
use crate::response::{AvsResult, CvvResult, Response};

/// Lifecycle of an issued authorization token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthorizationState {
    Authorized,
    Captured,
    Voided,
}

/// Three-way classification of a reference literal.
enum Fixture {
    Approve,
    Decline,
    Unknown,
}

static EMAIL_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));

/// Deterministic simulation backend.
///
/// Construct one per test; issued tokens and vaulted instruments live and
/// die with the instance. Shared-instance use is safe: state transitions go
/// through per-entry locking, so two concurrent captures of the same token
/// cannot both succeed.
#[derive(Debug, Default)]
pub struct BogusGateway {
    mode: GatewayMode,
    authorizations: DashMap<String, AuthorizationState>,
    vault: DashMap<String, CreditCard>,
}

impl BogusGateway {
    /// The accepted success reference (SUCCESS_A).
    pub const APPROVED: &'static str = "1";
    /// The accepted alternate success reference (SUCCESS_B).
    pub const ALTERNATE_APPROVED: &'static str = "3";
    /// The rejected reference: a decline, not an error.
    pub const DECLINED: &'static str = "2";

    const SUCCESS_MESSAGE: &'static str = "Bogus Gateway: Forced success";
    const FAILURE_MESSAGE: &'static str = "Bogus Gateway: Forced failure";
    const USAGE: &'static str =
        "Bogus Gateway: Use reference 1 or 3 for success, 2 for failure; anything else is a contract violation";

    pub fn new(config: GatewayConfig) -> Self {
        BogusGateway {
            mode: config.mode,
            authorizations: DashMap::new(),
            vault: DashMap::new(),
        }
    }

    fn fixture(reference: &str) -> Fixture {
        match reference {
            Self::APPROVED | Self::ALTERNATE_APPROVED => Fixture::Approve,
            Self::DECLINED => Fixture::Decline,
            _ => Fixture::Unknown,
        }
    }

    fn response(&self, response: Response) -> Response {
        response.with_test(self.mode == GatewayMode::Test)
    }

    /// Generates a fresh 5-digit authorization token and records it.
    fn issue_authorization(&self, state: AuthorizationState) -> AuthorizationToken {
        loop {
            let candidate = rng().random_range(10_000u32..=99_999).to_string();
            if Self::fixture(&candidate).is_unknown()
                && !self.authorizations.contains_key(&candidate)
            {
                self.authorizations.insert(candidate.clone(), state);
                return AuthorizationToken::new(candidate);
            }
        }
    }

    /// Generates a fresh 6-7 digit vault identifier.
    fn generate_vault_id(&self) -> String {
        loop {
            let candidate = rng().random_range(100_000u32..=9_999_999).to_string();
            if !self.vault.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    /// Resolves a payment reference to a concrete card, plus the vault id it
    /// came from, if any.
    ///
    /// String and numeric vault token forms canonicalize to the same key.
    fn resolve_card(
        &self,
        payment: &PaymentRef,
    ) -> Result<(CreditCard, Option<String>), GatewayError> {
        match payment {
            PaymentRef::Card(card) => Ok((card.clone(), None)),
            PaymentRef::Vault(token) => {
                let key = canonical_vault_key(token);
                let card = self
                    .vault
                    .get(&key)
                    .map(|entry| entry.value().clone())
                    .ok_or_else(|| {
                        GatewayError::contract(format!(
                            "Bogus Gateway: no vault entry under {}",
                            key
                        ))
                    })?;
                Ok((card, Some(key)))
            }
        }
    }

    /// Failed response for an email that does not look like an email, the
    /// way real processors surface it.
    fn check_email(&self, options: &GatewayOptions) -> Option<Response> {
        let email = options.email.as_deref()?;
        if EMAIL_FORMAT.is_match(email) {
            None
        } else {
            tracing::debug!(email, "rejecting malformed email");
            Some(self.response(Response::failure("Email is an invalid format")))
        }
    }

    /// Vaults `card` on behalf of a funds-moving operation when
    /// `options.store` asks for it. Returns the vault id used.
    fn store_side_effect(&self, card: &CreditCard, options: &GatewayOptions) -> Option<String> {
        let id = match &options.store {
            StoreAction::None => return None,
            StoreAction::Store => self.generate_vault_id(),
            StoreAction::StoreWithId(id) => id.clone(),
        };
        self.vault.insert(canonical_vault_id(&id), card.clone());
        Some(id)
    }

    fn avs_for(&self, options: &GatewayOptions) -> Option<AvsResult> {
        let address = options.billing_address.as_ref()?;
        if address.is_empty() {
            return None;
        }
        Some(simulate_avs(address))
    }

    fn cvv_for(&self, card: &CreditCard) -> Option<CvvResult> {
        let value = card.verification_value()?;
        Some(match value {
            "400" => CvvResult::matched(),
            "200" => CvvResult::no_match(),
            _ => CvvResult {
                code: Some("I".to_string()),
                message: Some(String::new()),
            },
        })
    }

    /// The `bogus_transaction` sub-object attached to successful
    /// funds-moving responses.
    fn transaction_json(
        &self,
        status: &str,
        amount: Money,
        options: &GatewayOptions,
        vault_id: Option<&str>,
    ) -> Value {
        let mut transaction = json!({
            "status": status,
            "amount": amount.minor_units(),
            "currency": amount.currency().as_str(),
        });
        let object = transaction.as_object_mut().expect("object literal");
        if let Some(order_id) = &options.order_id {
            object.insert("order_id".to_string(), json!(order_id));
        }
        let mut customer_details = serde_json::Map::new();
        if let Some(id) = vault_id {
            customer_details.insert("id".to_string(), json!(id));
        }
        if let Some(email) = &options.email {
            customer_details.insert("email".to_string(), json!(email));
        }
        if !customer_details.is_empty() {
            object.insert("customer_details".to_string(), Value::Object(customer_details));
        }
        transaction
    }

    /// The `bogus_customer` sub-object attached to successful vault
    /// responses: the derived fields callers read back after store/update.
    fn customer_json(card: &CreditCard, options: &GatewayOptions) -> Value {
        let mut customer = json!({
            "first_name": card.first_name(),
            "last_name": card.last_name(),
            "credit_cards": [{
                "bin": card.number().bin(),
                "brand": card.brand().to_string(),
                "expiration_date": card.expiry().to_string(),
                "last_4": card.number().last_four(),
            }],
        });
        if let Some(email) = &options.email {
            customer
                .as_object_mut()
                .expect("object literal")
                .insert("email".to_string(), json!(email));
        }
        customer
    }

    /// Shared success path for authorize/purchase.
    fn funds_success(
        &self,
        status: &str,
        amount_key: &str,
        amount: Money,
        card: &CreditCard,
        options: &GatewayOptions,
        vault_id: Option<String>,
        state: AuthorizationState,
    ) -> Response {
        let vault_id = vault_id.or_else(|| self.store_side_effect(card, options));
        let token = self.issue_authorization(state);
        let mut response = Response::success(Self::SUCCESS_MESSAGE)
            .with_param(amount_key, json!(amount.minor_units()))
            .with_authorization(token)
            .with_transaction(
                "bogus_transaction",
                self.transaction_json(status, amount, options, vault_id.as_deref()),
            );
        if let Some(id) = vault_id {
            response = response.with_param("customer_vault_id", json!(id));
        }
        if let Some(avs) = self.avs_for(options) {
            response = response.with_avs_result(avs);
        }
        if let Some(cvv) = self.cvv_for(card) {
            response = response.with_cvv_result(cvv);
        }
        self.response(response)
    }

    /// Shared path for token-keyed operations against the literal table.
    fn reference_outcome(
        &self,
        reference: &str,
        status: &str,
        detail: Value,
    ) -> Result<Response, GatewayError> {
        match Self::fixture(reference) {
            Fixture::Approve => {
                let mut transaction = json!({ "status": status });
                if !detail.is_null() {
                    transaction
                        .as_object_mut()
                        .expect("object literal")
                        .insert("detail".to_string(), detail);
                }
                Ok(self.response(
                    Response::success(Self::SUCCESS_MESSAGE)
                        .with_transaction("bogus_transaction", transaction),
                ))
            }
            Fixture::Decline => {
                Ok(self.response(Response::failure(Self::FAILURE_MESSAGE)))
            }
            Fixture::Unknown => Err(GatewayError::contract(Self::USAGE)),
        }
    }
}

impl Fixture {
    fn is_unknown(&self) -> bool {
        matches!(self, Fixture::Unknown)
    }
}

/// Canonical map key for a vault token: numeric forms collapse onto the
/// plain decimal string, so `VaultToken::from(947110)` and
/// `VaultToken::new("947110")` hit the same entry.
fn canonical_vault_key(token: &VaultToken) -> String {
    canonical_vault_id(token.as_str())
}

/// Insertion and lookup both pass through here. A caller-chosen id such as
/// `"0123456"` is stored under `"123456"` and still returned verbatim, so
/// every later reference to the returned id resolves.
fn canonical_vault_id(id: &str) -> String {
    match id.parse::<u64>() {
        Ok(numeric) => numeric.to_string(),
        Err(_) => id.to_string(),
    }
}

/// Street matches on the one magic street, postal on the one magic zip.
fn simulate_avs(address: &Address) -> AvsResult {
    let street_match = match address.street1.as_deref() {
        Some("1 E Main St") => "M",
        Some(_) => "N",
        None => return AvsResult::default(),
    };
    let postal_match = match address.postal_code.as_deref() {
        Some("60622") => "M",
        _ => "N",
    };
    AvsResult {
        code: None,
        message: None,
        street_match: Some(street_match.to_string()),
        postal_match: Some(postal_match.to_string()),
    }
}

#[async_trait::async_trait]
impl Gateway for BogusGateway {
    fn name(&self) -> &'static str {
        "bogus"
    }

    fn display_name(&self) -> &'static str {
        "Bogus"
    }

    fn supported_countries(&self) -> &'static [&'static str] {
        &["US"]
    }

    fn supported_brands(&self) -> &'static [CardBrand] {
        &[CardBrand::Bogus]
    }

    #[instrument(skip_all, err, fields(gateway = "bogus", amount = %amount))]
    async fn authorize(
        &self,
        amount: Money,
        payment: &PaymentRef,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError> {
        if let Some(failure) = self.check_email(options) {
            return Ok(failure);
        }
        let (card, vault_id) = self.resolve_card(payment)?;
        match Self::fixture(card.number().as_str()) {
            Fixture::Approve => Ok(self.funds_success(
                "authorized",
                "authorized_amount",
                amount,
                &card,
                options,
                vault_id,
                AuthorizationState::Authorized,
            )),
            Fixture::Decline => {
                tracing::debug!("forced decline");
                Ok(self.response(Response::failure(Self::FAILURE_MESSAGE)))
            }
            Fixture::Unknown => Err(GatewayError::contract(Self::USAGE)),
        }
    }

    #[instrument(skip_all, err, fields(gateway = "bogus", amount = %amount, authorization = %authorization))]
    async fn capture(
        &self,
        amount: Money,
        authorization: &AuthorizationToken,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError> {
        // Issued tokens first; the per-entry lock makes the transition
        // atomic, so only one of two racing captures observes `Authorized`.
        if let Some(mut entry) = self.authorizations.get_mut(authorization.as_str()) {
            return match *entry.value() {
                AuthorizationState::Authorized => {
                    *entry.value_mut() = AuthorizationState::Captured;
                    Ok(self.response(
                        Response::success(Self::SUCCESS_MESSAGE)
                            .with_param("paid_amount", json!(amount.minor_units()))
                            .with_transaction(
                                "bogus_transaction",
                                self.transaction_json("captured", amount, options, None),
                            ),
                    ))
                }
                AuthorizationState::Captured => Err(GatewayError::contract(format!(
                    "Bogus Gateway: authorization {} already captured",
                    authorization
                ))),
                AuthorizationState::Voided => Err(GatewayError::contract(format!(
                    "Bogus Gateway: authorization {} already voided",
                    authorization
                ))),
            };
        }
        self.reference_outcome(
            authorization.as_str(),
            "captured",
            json!({ "paid_amount": amount.minor_units() }),
        )
    }

    #[instrument(skip_all, err, fields(gateway = "bogus", amount = %amount))]
    async fn purchase(
        &self,
        amount: Money,
        payment: &PaymentRef,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError> {
        if let Some(failure) = self.check_email(options) {
            return Ok(failure);
        }
        let (card, vault_id) = self.resolve_card(payment)?;
        match Self::fixture(card.number().as_str()) {
            Fixture::Approve => Ok(self.funds_success(
                "submitted_for_settlement",
                "paid_amount",
                amount,
                &card,
                options,
                vault_id,
                AuthorizationState::Captured,
            )),
            Fixture::Decline => {
                tracing::debug!("forced decline");
                Ok(self.response(Response::failure(Self::FAILURE_MESSAGE)))
            }
            Fixture::Unknown => Err(GatewayError::contract(Self::USAGE)),
        }
    }

    #[instrument(skip_all, err, fields(gateway = "bogus", authorization = %authorization))]
    async fn void(
        &self,
        authorization: &AuthorizationToken,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError> {
        if let Some(mut entry) = self.authorizations.get_mut(authorization.as_str()) {
            return match *entry.value() {
                // Authorized and submitted-for-settlement transactions can
                // both be voided; a terminal (voided) one cannot.
                AuthorizationState::Authorized | AuthorizationState::Captured => {
                    *entry.value_mut() = AuthorizationState::Voided;
                    Ok(self.response(
                        Response::success(Self::SUCCESS_MESSAGE).with_transaction(
                            "bogus_transaction",
                            json!({ "status": "voided" }),
                        ),
                    ))
                }
                AuthorizationState::Voided => Err(GatewayError::contract(format!(
                    "Bogus Gateway: authorization {} already voided",
                    authorization
                ))),
            };
        }
        let _ = options;
        self.reference_outcome(authorization.as_str(), "voided", Value::Null)
    }

    #[instrument(skip_all, err, fields(gateway = "bogus", amount = %amount))]
    async fn credit(
        &self,
        amount: Money,
        payment: &PaymentRef,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError> {
        if let Some(failure) = self.check_email(options) {
            return Ok(failure);
        }
        let (card, vault_id) = self.resolve_card(payment)?;
        match Self::fixture(card.number().as_str()) {
            Fixture::Approve => Ok(self.response(
                Response::success(Self::SUCCESS_MESSAGE)
                    .with_param("paid_amount", json!(amount.minor_units()))
                    .with_transaction(
                        "bogus_transaction",
                        self.transaction_json("credited", amount, options, vault_id.as_deref()),
                    ),
            )),
            Fixture::Decline => Ok(self.response(Response::failure(Self::FAILURE_MESSAGE))),
            Fixture::Unknown => Err(GatewayError::contract(Self::USAGE)),
        }
    }

    #[instrument(skip_all, err, fields(gateway = "bogus", amount = %amount, reference = %reference))]
    async fn refund(
        &self,
        amount: Money,
        reference: &TransactionRef,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError> {
        let _ = options;
        // The backend's own prior output is always a valid reference.
        if self.authorizations.contains_key(reference.as_str()) {
            return Ok(self.response(
                Response::success(Self::SUCCESS_MESSAGE)
                    .with_param("refunded_amount", json!(amount.minor_units()))
                    .with_transaction("bogus_transaction", json!({ "status": "refunded" })),
            ));
        }
        self.reference_outcome(
            reference.as_str(),
            "refunded",
            json!({ "refunded_amount": amount.minor_units() }),
        )
    }

    #[instrument(skip_all, err, fields(gateway = "bogus"))]
    async fn store(
        &self,
        card: &CreditCard,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError> {
        if let Some(failure) = self.check_email(options) {
            return Ok(failure);
        }
        match Self::fixture(card.number().as_str()) {
            Fixture::Approve => {
                let vault_id = match &options.store {
                    StoreAction::StoreWithId(id) => id.clone(),
                    _ => self.generate_vault_id(),
                };
                self.vault.insert(canonical_vault_id(&vault_id), card.clone());
                tracing::debug!(vault_id = %vault_id, "stored instrument");
                Ok(self.response(
                    Response::success(Self::SUCCESS_MESSAGE)
                        .with_param("customer_vault_id", json!(vault_id))
                        .with_param("bogus_customer", Self::customer_json(card, options)),
                ))
            }
            Fixture::Decline => Ok(self.response(Response::failure(Self::FAILURE_MESSAGE))),
            Fixture::Unknown => Err(GatewayError::contract(Self::USAGE)),
        }
    }

    #[instrument(skip_all, err, fields(gateway = "bogus", vault = %vault))]
    async fn update(
        &self,
        vault: &VaultToken,
        card: &CreditCard,
        options: &GatewayOptions,
    ) -> Result<Response, GatewayError> {
        if let Some(failure) = self.check_email(options) {
            return Ok(failure);
        }
        let key = canonical_vault_key(vault);
        let Some(mut entry) = self.vault.get_mut(&key) else {
            return Err(GatewayError::contract(format!(
                "Bogus Gateway: no vault entry under {}",
                key
            )));
        };
        match Self::fixture(card.number().as_str()) {
            Fixture::Approve => {
                *entry.value_mut() = card.clone();
                Ok(self.response(
                    Response::success(Self::SUCCESS_MESSAGE)
                        .with_param("customer_vault_id", json!(key))
                        .with_param("bogus_customer", Self::customer_json(card, options)),
                ))
            }
            // Stored instrument stays untouched on a decline.
            Fixture::Decline => Ok(self.response(Response::failure(Self::FAILURE_MESSAGE))),
            Fixture::Unknown => Err(GatewayError::contract(Self::USAGE)),
        }
    }

    /// Non-idempotent delete: the first unstore succeeds, a second one (or
    /// any reference to a never-created token outside the literal table)
    /// raises [`GatewayError::Contract`].
    #[instrument(skip_all, err, fields(gateway = "bogus", vault = %vault))]
    async fn unstore(&self, vault: &VaultToken) -> Result<Response, GatewayError> {
        let key = canonical_vault_key(vault);
        if self.vault.remove(&key).is_some() {
            tracing::debug!(vault_id = %key, "destroyed instrument");
            return Ok(self.response(Response::success(Self::SUCCESS_MESSAGE)));
        }
        match Self::fixture(&key) {
            Fixture::Approve => Ok(self.response(Response::success(Self::SUCCESS_MESSAGE))),
            Fixture::Decline => Ok(self.response(Response::failure(Self::FAILURE_MESSAGE))),
            Fixture::Unknown => Err(GatewayError::contract(format!(
                "Bogus Gateway: no vault entry under {}",
                key
            ))),
        }
    }
}
