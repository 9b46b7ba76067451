//! The normalized outcome of a gateway operation.
//!
//! Every backend, real or simulated, reduces its wire response to this one
//! shape. A caller inspecting only [`Response::success`] and
//! [`Response::message`] can handle any processor's decline without knowing
//! which processor was used. That normalization is the contract the whole
//! crate exists to provide.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::gateway::AuthorizationToken;

/// Address Verification System result. All fields nullable; real processors
/// omit whatever their network did not report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvsResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_match: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_match: Option<String>,
}

/// Card verification value match result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvvResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CvvResult {
    pub fn matched() -> Self {
        CvvResult {
            code: Some("M".to_string()),
            message: Some(String::new()),
        }
    }

    pub fn no_match() -> Self {
        CvvResult {
            code: Some("N".to_string()),
            message: Some(String::new()),
        }
    }
}

/// Normalized result of a gateway operation.
///
/// Declines and business failures are `Response`s with `success == false`;
/// they are never raised. The processor-specific detail lives in `params`,
/// namespaced under the processor's own key (e.g. `"bogus_transaction"`).
///
/// Invariant: a failed response carries no transaction sub-object in
/// `params`; callers never need to inspect transaction detail on failure.
/// [`Response::with_transaction`] enforces this structurally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    pub message: String,
    /// Free-form, processor-namespaced key/value payload.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
    /// Set on successful authorize/purchase; required input to capture/void.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization: Option<AuthorizationToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avs_result: Option<AvsResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvv_result: Option<CvvResult>,
    /// Whether the response came from a test/sandbox path.
    pub test: bool,
}

impl Response {
    pub fn success(message: impl Into<String>) -> Self {
        Response {
            success: true,
            message: message.into(),
            params: Map::new(),
            authorization: None,
            avs_result: None,
            cvv_result: None,
            test: false,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Response {
            success: false,
            message: message.into(),
            params: Map::new(),
            authorization: None,
            avs_result: None,
            cvv_result: None,
            test: false,
        }
    }

    pub fn with_authorization(mut self, authorization: AuthorizationToken) -> Self {
        self.authorization = Some(authorization);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Attaches the processor transaction sub-object under `key`
    /// (e.g. `"bogus_transaction"`). Ignored on a failed response: failure
    /// implies the transaction sub-object is absent.
    pub fn with_transaction(mut self, key: impl Into<String>, transaction: Value) -> Self {
        if self.success {
            self.params.insert(key.into(), transaction);
        }
        self
    }

    pub fn with_avs_result(mut self, avs_result: AvsResult) -> Self {
        self.avs_result = Some(avs_result);
        self
    }

    pub fn with_cvv_result(mut self, cvv_result: CvvResult) -> Self {
        self.cvv_result = Some(cvv_result);
        self
    }

    pub fn with_test(mut self, test: bool) -> Self {
        self.test = test;
        self
    }

    /// Convenience accessor for a string-valued param.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }
}
