//! Backend construction configuration.
//!
//! Credentials and endpoint selection arrive as one opaque object passed to
//! backend construction. The core does not parse or validate credential
//! formats; a backend forwards them to its processor as-is. Deserializable
//! with serde so hosts can load it from whatever configuration source they
//! already use.

use serde::Deserialize;
use std::fmt;
use std::fmt::Debug;

/// Sandbox vs. live endpoint selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    /// Sandbox/test endpoint; responses carry `test == true`.
    #[default]
    Test,
    Live,
}

/// Opaque backend credentials plus mode.
#[derive(Clone, Deserialize)]
pub struct GatewayConfig {
    pub login: String,
    pub password: String,
    #[serde(default)]
    pub mode: GatewayMode,
}

impl GatewayConfig {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        GatewayConfig {
            login: login.into(),
            password: password.into(),
            mode: GatewayMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: GatewayMode) -> Self {
        self.mode = mode;
        self
    }
}

impl Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Password never lands in logs.
        f.debug_struct("GatewayConfig")
            .field("login", &self.login)
            .field("password", &"********")
            .field("mode", &self.mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_defaults_to_test() {
        let config = GatewayConfig::new("bogus", "bogus");
        assert_eq!(config.mode, GatewayMode::Test);
    }

    #[test]
    fn test_deserialize_from_json() {
        let config: GatewayConfig =
            serde_json::from_str(r#"{"login":"merchant","password":"s3cret","mode":"live"}"#)
                .unwrap();
        assert_eq!(config.login, "merchant");
        assert_eq!(config.mode, GatewayMode::Live);
    }

    #[test]
    fn test_debug_masks_password() {
        let config = GatewayConfig::new("merchant", "s3cret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("merchant"));
    }
}
