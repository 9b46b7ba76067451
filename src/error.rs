//! The gateway error taxonomy.
//!
//! A declined or invalid transaction is a *failed [`Response`]*, not an
//! error. `GatewayError` is reserved for the two kinds of failure a caller
//! cannot treat as a business outcome: contract misuse and infrastructure
//! trouble. The core never recovers from either; both always propagate.
//!
//! [`Response`]: crate::response::Response

/// Represents all raised failures a gateway operation can produce.
#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    /// Malformed caller input that should have been caught before calling:
    /// a structurally invalid card, a bad email format, a zero-length
    /// identifier.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// Transport-level failure reaching a real processor. Never produced by
    /// the simulation backend.
    #[error("Connection failed: {message}")]
    Connection { message: String },

    /// An input that corresponds to no known processor state: a token that
    /// was never issued by this backend, an unrecognized fixture reference,
    /// a vault entry that has been destroyed. Distinct from a decline.
    #[error("Contract violation: {message}")]
    Contract { message: String },
}

impl GatewayError {
    pub fn validation(message: impl Into<String>) -> Self {
        GatewayError::Validation {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        GatewayError::Connection {
            message: message.into(),
        }
    }

    pub fn contract(message: impl Into<String>) -> Self {
        GatewayError::Contract {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = GatewayError::contract("no transaction under reference 99");
        assert_eq!(
            err.to_string(),
            "Contract violation: no transaction under reference 99"
        );
        let err = GatewayError::validation("card number must be digits");
        assert!(err.to_string().starts_with("Validation failed:"));
    }
}
