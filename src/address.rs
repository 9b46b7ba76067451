//! Structured postal addresses.
//!
//! Every field is optional; an entirely empty address is valid. Backends use
//! an address for AVS only when the relevant fields are present.

use serde::{Deserialize, Serialize};

/// A billing or shipping address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Address {
    pub fn new() -> Self {
        Address::default()
    }

    pub fn with_street1(mut self, street1: impl Into<String>) -> Self {
        self.street1 = Some(street1.into());
        self
    }

    pub fn with_street2(mut self, street2: impl Into<String>) -> Self {
        self.street2 = Some(street2.into());
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.street1.is_none()
            && self.street2.is_none()
            && self.company.is_none()
            && self.city.is_none()
            && self.region.is_none()
            && self.postal_code.is_none()
            && self.country.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_address_is_valid() {
        let address = Address::new();
        assert!(address.is_empty());
    }

    #[test]
    fn test_builder_chain() {
        let address = Address::new()
            .with_street1("1 E Main St")
            .with_city("Chicago")
            .with_postal_code("60622")
            .with_country("US");
        assert!(!address.is_empty());
        assert_eq!(address.street1.as_deref(), Some("1 E Main St"));
        assert_eq!(address.postal_code.as_deref(), Some("60622"));
    }

    #[test]
    fn test_serde_skips_absent_fields() {
        let address = Address::new().with_city("Chicago");
        let json = serde_json::to_value(&address).unwrap();
        assert_eq!(json, serde_json::json!({ "city": "Chicago" }));
    }
}
