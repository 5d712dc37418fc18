//! Transport-neutral customer types shared by the REST and GraphQL clients.

use chrono::{DateTime, Utc};
use mixperfume_core::{
    NormalizedPhone, Subscription, compose_note, compose_tags, resolve_province,
};
use serde::Serialize;
use serde_json::Value;

/// Customer data sent to Shopify on create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerPayload {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: NormalizedPhone,
    pub address: AddressPayload,
    pub tags: Vec<String>,
    pub note: String,
}

/// The single mailing address attached to a signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressPayload {
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    /// Canonical province name, or the raw input when unresolved.
    pub province: String,
    /// Shopify province code, only when the province was resolved.
    pub province_code: Option<String>,
    pub zip: String,
    pub country_code: String,
    pub phone: NormalizedPhone,
}

impl CustomerPayload {
    /// Build the outbound payload for a validated signup.
    ///
    /// Normalizes the phone, maps the province for Argentine addresses and
    /// composes the marker tags and note.
    #[must_use]
    pub fn from_subscription(
        subscription: &Subscription,
        marker_tag: &str,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let phone = NormalizedPhone::parse(&subscription.phone);
        let province = resolve_province(&subscription.country, &subscription.province);
        let plan = subscription.plan.as_deref();
        let category = subscription.category.as_deref();

        Self {
            email: subscription.email.clone(),
            first_name: subscription.first_name.clone(),
            last_name: subscription.last_name.clone(),
            phone: phone.clone(),
            address: AddressPayload {
                address1: subscription.address1.clone(),
                address2: subscription.address2.clone(),
                city: subscription.city.clone(),
                province: province.name().to_string(),
                province_code: province.code().map(String::from),
                zip: subscription.zip.clone(),
                country_code: subscription.country.clone(),
                phone,
            },
            tags: compose_tags(marker_tag, plan, category),
            note: compose_note(plan, category, subscription.price.as_deref(), submitted_at),
        }
    }

    /// Same payload with the tag list replaced.
    #[must_use]
    pub fn with_tags(&self, tags: Vec<String>) -> Self {
        Self {
            tags,
            ..self.clone()
        }
    }

    /// Whether the province was mapped to a canonical code.
    #[must_use]
    pub const fn province_resolved(&self) -> bool {
        self.address.province_code.is_some()
    }
}

/// Customer fields echoed back to the signup form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    /// Shopify ID (numeric for REST, `gid://` for GraphQL).
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub tags: Vec<String>,
}

/// The part of an existing customer the update path needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingCustomer {
    pub id: String,
    /// Comma-joined tags currently on the customer.
    pub tags: String,
}

/// A field-level validation problem reported by Shopify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserError {
    /// Path to the offending input field (e.g. `["email"]`).
    pub field: Vec<String>,
    pub message: String,
}

/// One upstream request/response pair, kept verbatim for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exchange {
    /// Outbound request body (or query parameters for searches).
    pub request: Value,
    /// What Shopify answered.
    pub response: UpstreamResponse,
}

/// HTTP status and parsed body of an upstream response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamResponse {
    pub status: u16,
    /// JSON body; non-JSON bodies are kept as a JSON string.
    pub body: Value,
}

impl UpstreamResponse {
    /// Parse a raw response body, keeping non-JSON text as a string value.
    #[must_use]
    pub fn from_text(status: u16, text: &str) -> Self {
        let body = serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()));
        Self { status, body }
    }
}

/// How a uniqueness conflict on email was recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictDetection {
    /// Shopify's structured error code or field name said so.
    Structured,
    /// Substring match on the serialized error body.
    Heuristic,
}

/// Create was refused because the email is already taken.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub detection: ConflictDetection,
    pub exchange: Exchange,
}

/// Result of a create call.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Created(CustomerSummary),
    Conflict(Conflict),
    /// Field-level validation errors to relay to the caller.
    Rejected(Vec<UserError>),
    Failed(Exchange),
}

/// Result of a search-by-email call.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(ExistingCustomer),
    NotFound(Exchange),
}

/// Result of an update call.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(CustomerSummary),
    Rejected(Vec<UserError>),
    Failed(Exchange),
}

/// Read a Shopify ID that may be a JSON number (REST) or string (GraphQL).
#[must_use]
pub fn id_to_string(id: &Value) -> Option<String> {
    match id {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use mixperfume_core::SUBSCRIPTION_TAG;
    use serde_json::json;

    use super::*;

    fn subscription(country: &str, province: &str) -> Subscription {
        Subscription {
            email: "ana@example.com".to_string(),
            first_name: "Ana".to_string(),
            last_name: "García".to_string(),
            phone: "11 2345-6789".to_string(),
            address1: "Av. Corrientes 1234".to_string(),
            address2: Some("3B".to_string()),
            city: "Buenos Aires".to_string(),
            province: province.to_string(),
            zip: "C1043".to_string(),
            country: country.to_string(),
            plan: Some("Mensual".to_string()),
            category: None,
            price: Some("25000".to_string()),
        }
    }

    fn submitted_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 17, 5, 9).unwrap()
    }

    #[test]
    fn test_payload_maps_argentine_province() {
        let payload = CustomerPayload::from_subscription(
            &subscription("AR", "caba"),
            SUBSCRIPTION_TAG,
            submitted_at(),
        );

        assert!(payload.province_resolved());
        assert_eq!(payload.address.province_code.as_deref(), Some("C"));
        assert_eq!(payload.address.province, "Ciudad Autónoma de Buenos Aires");
        assert_eq!(payload.phone.as_str(), "+541123456789");
        assert_eq!(payload.address.phone, payload.phone);
        assert_eq!(payload.tags, vec![SUBSCRIPTION_TAG, "Plan: Mensual"]);
        assert!(payload.note.contains("Price: 25000"));
        assert!(payload.note.ends_with("18/10/2026, 14:05:09"));
    }

    #[test]
    fn test_payload_passes_unknown_province_through() {
        let payload = CustomerPayload::from_subscription(
            &subscription("AR", "Unknown Place"),
            SUBSCRIPTION_TAG,
            submitted_at(),
        );

        assert!(!payload.province_resolved());
        assert_eq!(payload.address.province, "Unknown Place");
    }

    #[test]
    fn test_payload_skips_mapping_for_other_countries() {
        let payload = CustomerPayload::from_subscription(
            &subscription("UY", "caba"),
            SUBSCRIPTION_TAG,
            submitted_at(),
        );

        assert_eq!(payload.address.province, "caba");
        assert_eq!(payload.address.province_code, None);
        assert_eq!(payload.address.country_code, "UY");
    }

    #[test]
    fn test_with_tags_keeps_everything_else() {
        let payload = CustomerPayload::from_subscription(
            &subscription("AR", "Mendoza"),
            SUBSCRIPTION_TAG,
            submitted_at(),
        );
        let updated = payload.with_tags(vec!["A".to_string()]);

        assert_eq!(updated.tags, vec!["A"]);
        assert_eq!(updated.email, payload.email);
        assert_eq!(updated.address, payload.address);
    }

    #[test]
    fn test_upstream_response_from_text() {
        let response = UpstreamResponse::from_text(422, r#"{"errors":{"email":["taken"]}}"#);
        assert_eq!(response.body["errors"]["email"][0], "taken");

        let response = UpstreamResponse::from_text(502, "Bad Gateway");
        assert_eq!(response.body, json!("Bad Gateway"));
    }

    #[test]
    fn test_id_to_string() {
        assert_eq!(id_to_string(&json!(207_119_551)), Some("207119551".to_string()));
        assert_eq!(
            id_to_string(&json!("gid://shopify/Customer/1")),
            Some("gid://shopify/Customer/1".to_string())
        );
        assert_eq!(id_to_string(&json!("")), None);
        assert_eq!(id_to_string(&Value::Null), None);
    }
}
