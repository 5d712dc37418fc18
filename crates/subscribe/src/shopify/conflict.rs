//! Recognising "email already taken" in Shopify error responses.
//!
//! Shopify has no dedicated duplicate-customer status. The structured signal
//! is checked first: a GraphQL user error whose field path ends in `email`,
//! or a REST 422 whose `errors.email` entries say "taken". When
//! neither matches, a substring search over the serialized error body is
//! used as a last resort.

use reqwest::StatusCode;
use serde_json::Value;

use super::types::{ConflictDetection, UserError};

/// Phrases Shopify uses for a uniqueness violation (lowercase).
const TAKEN_PHRASES: &[&str] = &["taken", "already exists", "already in use"];

/// Detect an email conflict in a REST create response.
#[must_use]
pub fn detect_rest_conflict(status: StatusCode, body: &Value) -> Option<ConflictDetection> {
    if !status.is_client_error() {
        return None;
    }

    let structured = status == StatusCode::UNPROCESSABLE_ENTITY
        && body
            .pointer("/errors/email")
            .and_then(Value::as_array)
            .is_some_and(|messages| {
                messages
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|m| m.to_lowercase().contains("taken"))
            });

    if structured {
        return Some(ConflictDetection::Structured);
    }

    mentions_email_taken(&body.to_string()).then_some(ConflictDetection::Heuristic)
}

/// Detect an email conflict in GraphQL `userErrors`.
#[must_use]
pub fn detect_graphql_conflict(user_errors: &[UserError]) -> Option<ConflictDetection> {
    let structured = user_errors.iter().any(|e| {
        e.field.last().is_some_and(|f| f == "email") && says_taken(&e.message)
    });

    if structured {
        return Some(ConflictDetection::Structured);
    }

    let serialized = serde_json::to_string(user_errors).unwrap_or_default();
    mentions_email_taken(&serialized).then_some(ConflictDetection::Heuristic)
}

/// Case-insensitive check for "email" plus a taken-equivalent phrase.
#[must_use]
pub fn mentions_email_taken(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("email") && says_taken(&lower)
}

fn says_taken(text: &str) -> bool {
    let lower = text.to_lowercase();
    TAKEN_PHRASES.iter().any(|p| lower.contains(p))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn user_error(field: &[&str], message: &str) -> UserError {
        UserError {
            field: field.iter().map(ToString::to_string).collect(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_rest_structured_conflict() {
        let body = json!({"errors": {"email": ["has already been taken"]}});
        assert_eq!(
            detect_rest_conflict(StatusCode::UNPROCESSABLE_ENTITY, &body),
            Some(ConflictDetection::Structured)
        );
    }

    #[test]
    fn test_rest_heuristic_conflict() {
        // Non-standard shape: only the serialized text gives it away
        let body = json!({"errors": "Email HAS ALREADY BEEN TAKEN"});
        assert_eq!(
            detect_rest_conflict(StatusCode::UNPROCESSABLE_ENTITY, &body),
            Some(ConflictDetection::Heuristic)
        );

        let body = json!({"errors": {"base": ["Customer with this email already exists"]}});
        assert_eq!(
            detect_rest_conflict(StatusCode::BAD_REQUEST, &body),
            Some(ConflictDetection::Heuristic)
        );
    }

    #[test]
    fn test_rest_other_validation_errors_are_not_conflicts() {
        let body = json!({"errors": {"phone": ["is invalid"]}});
        assert_eq!(detect_rest_conflict(StatusCode::UNPROCESSABLE_ENTITY, &body), None);

        let body = json!({"errors": {"email": ["is invalid"]}});
        assert_eq!(detect_rest_conflict(StatusCode::UNPROCESSABLE_ENTITY, &body), None);
    }

    #[test]
    fn test_rest_server_errors_are_not_conflicts() {
        let body = json!({"errors": {"email": ["has already been taken"]}});
        assert_eq!(detect_rest_conflict(StatusCode::INTERNAL_SERVER_ERROR, &body), None);
        assert_eq!(detect_rest_conflict(StatusCode::CREATED, &body), None);
    }

    #[test]
    fn test_graphql_structured_conflict() {
        let errors = [user_error(&["email"], "Email has already been taken")];
        assert_eq!(
            detect_graphql_conflict(&errors),
            Some(ConflictDetection::Structured)
        );

        let errors = [user_error(&["input", "email"], "Email has already been taken")];
        assert_eq!(
            detect_graphql_conflict(&errors),
            Some(ConflictDetection::Structured)
        );
    }

    #[test]
    fn test_graphql_heuristic_conflict() {
        // No field path, only the message text gives it away
        let errors = [user_error(&[], "Customer with this email already exists")];
        assert_eq!(
            detect_graphql_conflict(&errors),
            Some(ConflictDetection::Heuristic)
        );
    }

    #[test]
    fn test_graphql_invalid_email_is_not_a_conflict() {
        let errors = [user_error(&["email"], "Email is invalid")];
        assert_eq!(detect_graphql_conflict(&errors), None);
    }

    #[test]
    fn test_graphql_taken_phone_is_not_an_email_conflict() {
        let errors = [user_error(&["phone"], "Phone has already been taken")];
        assert_eq!(detect_graphql_conflict(&errors), None);

        let errors = [user_error(&["firstName"], "First name is too long")];
        assert_eq!(detect_graphql_conflict(&errors), None);
    }

    #[test]
    fn test_mentions_email_taken() {
        assert!(mentions_email_taken("EMAIL has already been TAKEN"));
        assert!(mentions_email_taken(r#"{"email":["already in use"]}"#));
        assert!(!mentions_email_taken("phone has already been taken"));
        assert!(!mentions_email_taken("email is invalid"));
    }
}
