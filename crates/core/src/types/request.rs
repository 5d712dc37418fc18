//! Subscription signup form.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Country used when the form does not send one.
pub const DEFAULT_COUNTRY: &str = "AR";

/// Errors that can occur when validating a [`SubscriptionRequest`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more required fields are missing or blank.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// Raw signup form as posted by the storefront.
///
/// Every field is optional at this stage. Values are coerced leniently:
/// strings, numbers and booleans become trimmed strings; `null`, arrays,
/// objects and blank strings count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubscriptionRequest {
    #[serde(deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub first_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub last_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub address1: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub address2: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub province: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub zip: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub country: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub plan: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub categoria: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub price: Option<String>,
}

/// A validated signup: every required field is present and non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// Customer email. Format is left to Shopify to judge.
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Phone exactly as entered; normalized when the payload is built.
    pub phone: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    /// Province exactly as entered; mapped when the payload is built.
    pub province: String,
    pub zip: String,
    /// Country code, [`DEFAULT_COUNTRY`] when absent.
    pub country: String,
    pub plan: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
}

impl SubscriptionRequest {
    /// Parse a request body. An empty body is treated as an empty form.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not empty and not a JSON object.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
    }

    /// Check the required fields and produce a [`Subscription`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] listing every missing
    /// required field, in form order.
    pub fn validate(self) -> Result<Subscription, ValidationError> {
        let mut missing = Vec::new();
        let mut require = |name: &'static str, value: Option<String>| {
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default()
        };

        let email = require("email", self.email);
        let first_name = require("firstName", self.first_name);
        let last_name = require("lastName", self.last_name);
        let phone = require("phone", self.phone);
        let address1 = require("address1", self.address1);
        let city = require("city", self.city);
        let province = require("province", self.province);
        let zip = require("zip", self.zip);

        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        Ok(Subscription {
            email,
            first_name,
            last_name,
            phone,
            address1,
            address2: self.address2,
            city,
            province,
            zip,
            country: self
                .country
                .map_or_else(|| DEFAULT_COUNTRY.to_string(), |c| c.to_uppercase()),
            plan: self.plan,
            category: self.categoria,
            price: self.price,
        })
    }
}

/// Deserialize any JSON scalar into a trimmed, non-blank string.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let text = match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Null | Value::Array(_) | Value::Object(_)) | None => return Ok(None),
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}
