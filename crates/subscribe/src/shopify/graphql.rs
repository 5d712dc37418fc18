//! Shopify Admin GraphQL API customer client.
//!
//! Operations live in `graphql/customers.graphql` and are sent as standard
//! `graphql_client` query bodies to `admin/api/{version}/graphql.json`.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::instrument;
use url::Url;

use crate::config::ShopifyAdminConfig;

use super::{
    CustomerStore, ShopifyError, admin_url,
    conflict::detect_graphql_conflict,
    types::{
        Conflict, CreateOutcome, CustomerPayload, CustomerSummary, Exchange, ExistingCustomer,
        LookupOutcome, UpdateOutcome, UpstreamResponse, UserError,
    },
};

const CUSTOMERS_DOCUMENT: &str = include_str!("../../graphql/customers.graphql");

/// Shopify Admin GraphQL API client for customers.
#[derive(Clone)]
pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: Url,
}

// =============================================================================
// Variables
// =============================================================================

#[derive(Debug, Serialize)]
struct InputVariables<'a> {
    input: CustomerInput<'a>,
}

#[derive(Debug, Serialize)]
struct SearchVariables {
    query: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomerInput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    tags: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
    addresses: [MailingAddressInput<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MailingAddressInput<'a> {
    address1: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    address2: Option<&'a str>,
    city: &'a str,
    /// Free-text province, only when no code could be resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    province: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    province_code: Option<&'a str>,
    zip: &'a str,
    country_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
}

impl<'a> CustomerInput<'a> {
    fn new(payload: &'a CustomerPayload) -> Self {
        let address = &payload.address;
        let province_code = address.province_code.as_deref();
        Self {
            id: None,
            email: &payload.email,
            first_name: &payload.first_name,
            last_name: &payload.last_name,
            phone: payload.phone.non_empty(),
            tags: &payload.tags,
            note: Some(&payload.note),
            addresses: [MailingAddressInput {
                address1: &address.address1,
                address2: address.address2.as_deref(),
                city: &address.city,
                province: province_code.is_none().then_some(address.province.as_str()),
                province_code,
                zip: &address.zip,
                country_code: &address.country_code,
                phone: address.phone.non_empty(),
            }],
        }
    }

    fn for_update(id: &'a str, payload: &'a CustomerPayload) -> Self {
        Self {
            id: Some(id),
            note: None,
            ..Self::new(payload)
        }
    }
}

// =============================================================================
// Response data
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerCreateData {
    customer_create: Option<CustomerMutationPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerUpdateData {
    customer_update: Option<CustomerMutationPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerMutationPayload {
    customer: Option<CustomerNode>,
    #[serde(default)]
    user_errors: Vec<UserErrorNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerNode {
    id: String,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct UserErrorNode {
    #[serde(default)]
    field: Option<Vec<String>>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct FindCustomerData {
    customers: Connection,
}

#[derive(Debug, Deserialize)]
struct Connection {
    edges: Vec<Edge>,
}

#[derive(Debug, Deserialize)]
struct Edge {
    node: CustomerNode,
}

impl From<CustomerNode> for CustomerSummary {
    fn from(node: CustomerNode) -> Self {
        Self {
            id: node.id,
            email: node.email,
            first_name: node.first_name,
            last_name: node.last_name,
            tags: node.tags,
        }
    }
}

impl From<UserErrorNode> for UserError {
    fn from(node: UserErrorNode) -> Self {
        Self {
            field: node.field.unwrap_or_default(),
            message: node.message,
        }
    }
}

/// Decoded answer to a single GraphQL operation.
struct Answer<T> {
    status: StatusCode,
    data: Option<T>,
    has_errors: bool,
    exchange: Exchange,
}

impl GraphQlClient {
    /// Create a GraphQL client from a pre-authenticated HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL cannot be built from the config.
    pub fn new(http: reqwest::Client, config: &ShopifyAdminConfig) -> Result<Self, ShopifyError> {
        let endpoint = admin_url(&config.base_url, &config.api_version, "graphql.json")?;
        Ok(Self { http, endpoint })
    }

    /// Execute one operation from the customers document.
    ///
    /// Non-JSON bodies, HTTP errors and top-level `errors` are all reported
    /// in the returned [`Answer`] rather than as `Err`.
    async fn execute<V, T>(
        &self,
        operation_name: &'static str,
        variables: V,
    ) -> Result<Answer<T>, ShopifyError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let body = graphql_client::QueryBody {
            variables,
            query: CUSTOMERS_DOCUMENT,
            operation_name,
        };
        let request = serde_json::to_value(&body)?;

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        let decoded = serde_json::from_str::<graphql_client::Response<T>>(&text).ok();
        let (data, has_errors) = match decoded {
            Some(decoded) => (
                decoded.data,
                decoded.errors.is_some_and(|errors| !errors.is_empty()),
            ),
            None => (None, true),
        };

        if has_errors {
            tracing::warn!(operation_name, status = status.as_u16(), "GraphQL request failed");
        }

        Ok(Answer {
            status,
            data,
            has_errors,
            exchange: Exchange {
                request,
                response: UpstreamResponse::from_text(status.as_u16(), &text),
            },
        })
    }
}

impl<T> Answer<T> {
    /// Data of a successful response, or the exchange when it failed.
    fn into_data(self) -> Result<T, Exchange> {
        match self.data {
            Some(data) if self.status == StatusCode::OK && !self.has_errors => Ok(data),
            _ => Err(self.exchange),
        }
    }
}

impl CustomerStore for GraphQlClient {
    #[instrument(skip(self, payload), fields(email = %payload.email))]
    async fn create_customer(
        &self,
        payload: &CustomerPayload,
    ) -> Result<CreateOutcome, ShopifyError> {
        let variables = InputVariables {
            input: CustomerInput::new(payload),
        };
        let answer = self
            .execute::<_, CustomerCreateData>("CustomerCreate", variables)
            .await?;
        let exchange = answer.exchange.clone();

        let Some(result) = answer.into_data().ok().and_then(|d| d.customer_create) else {
            return Ok(CreateOutcome::Failed(exchange));
        };

        let user_errors: Vec<UserError> = result.user_errors.into_iter().map(Into::into).collect();
        if !user_errors.is_empty() {
            if let Some(detection) = detect_graphql_conflict(&user_errors) {
                tracing::info!(?detection, "Customer email already taken");
                return Ok(CreateOutcome::Conflict(Conflict {
                    detection,
                    exchange,
                }));
            }
            tracing::info!(count = user_errors.len(), "Customer create rejected");
            return Ok(CreateOutcome::Rejected(user_errors));
        }

        match result.customer {
            Some(customer) => {
                tracing::info!(customer_id = %customer.id, "Customer created");
                Ok(CreateOutcome::Created(customer.into()))
            }
            None => Ok(CreateOutcome::Failed(exchange)),
        }
    }

    #[instrument(skip(self))]
    async fn find_customer_by_email(&self, email: &str) -> Result<LookupOutcome, ShopifyError> {
        let variables = SearchVariables {
            query: format!("email:{email}"),
        };
        let answer = self
            .execute::<_, FindCustomerData>("FindCustomerByEmail", variables)
            .await?;
        let exchange = answer.exchange.clone();

        let node = answer
            .into_data()
            .ok()
            .and_then(|data| matching_node(data.customers.edges, email));

        Ok(match node {
            Some(node) => LookupOutcome::Found(ExistingCustomer {
                id: node.id,
                tags: node.tags.join(", "),
            }),
            None => LookupOutcome::NotFound(exchange),
        })
    }

    #[instrument(skip(self, payload), fields(email = %payload.email))]
    async fn update_customer(
        &self,
        id: &str,
        payload: &CustomerPayload,
    ) -> Result<UpdateOutcome, ShopifyError> {
        let variables = InputVariables {
            input: CustomerInput::for_update(id, payload),
        };
        let answer = self
            .execute::<_, CustomerUpdateData>("CustomerUpdate", variables)
            .await?;
        let exchange = answer.exchange.clone();

        let Some(result) = answer.into_data().ok().and_then(|d| d.customer_update) else {
            return Ok(UpdateOutcome::Failed(exchange));
        };

        if !result.user_errors.is_empty() {
            let user_errors = result.user_errors.into_iter().map(Into::into).collect();
            return Ok(UpdateOutcome::Rejected(user_errors));
        }

        match result.customer {
            Some(customer) => {
                tracing::info!(customer_id = %customer.id, "Customer updated");
                Ok(UpdateOutcome::Updated(customer.into()))
            }
            None => Ok(UpdateOutcome::Failed(exchange)),
        }
    }
}

/// Prefer the edge whose email matches exactly, else the first one.
fn matching_node(edges: Vec<Edge>, email: &str) -> Option<CustomerNode> {
    let index = edges
        .iter()
        .position(|edge| {
            edge.node
                .email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(email))
        })
        .unwrap_or(0);
    edges.into_iter().nth(index).map(|edge| edge.node)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use mixperfume_core::NormalizedPhone;
    use serde_json::json;

    use super::*;
    use crate::shopify::types::{AddressPayload, ConflictDetection};

    fn payload(province_code: Option<&str>) -> CustomerPayload {
        let phone = NormalizedPhone::parse("+5491123456789");
        CustomerPayload {
            email: "ana@example.com".to_string(),
            first_name: "Ana".to_string(),
            last_name: "García".to_string(),
            phone: phone.clone(),
            address: AddressPayload {
                address1: "San Martín 50".to_string(),
                address2: Some("PB".to_string()),
                city: "Mendoza".to_string(),
                province: "Mendoza".to_string(),
                province_code: province_code.map(String::from),
                zip: "5500".to_string(),
                country_code: "AR".to_string(),
                phone,
            },
            tags: vec!["Suscripción MixPerfume".to_string()],
            note: "Web subscription".to_string(),
        }
    }

    #[test]
    fn test_document_declares_every_operation() {
        for name in ["CustomerCreate", "FindCustomerByEmail", "CustomerUpdate"] {
            assert!(CUSTOMERS_DOCUMENT.contains(name), "missing {name}");
        }
    }

    #[test]
    fn test_customer_input_with_province_code() {
        let payload = payload(Some("M"));
        let input = serde_json::to_value(CustomerInput::new(&payload)).unwrap();

        assert_eq!(input["firstName"], "Ana");
        assert_eq!(input["tags"], json!(["Suscripción MixPerfume"]));
        assert_eq!(input["note"], "Web subscription");
        let address = &input["addresses"][0];
        assert_eq!(address["provinceCode"], "M");
        assert_eq!(address["countryCode"], "AR");
        assert!(address.get("province").is_none());
    }

    #[test]
    fn test_customer_input_keeps_raw_province_when_unresolved() {
        let payload = payload(None);
        let input = serde_json::to_value(CustomerInput::new(&payload)).unwrap();
        let address = &input["addresses"][0];

        assert_eq!(address["province"], "Mendoza");
        assert!(address.get("provinceCode").is_none());
    }

    #[test]
    fn test_update_input_carries_id_without_note() {
        let payload = payload(Some("M"));
        let input =
            serde_json::to_value(CustomerInput::for_update("gid://shopify/Customer/7", &payload))
                .unwrap();

        assert_eq!(input["id"], "gid://shopify/Customer/7");
        assert!(input.get("note").is_none());
    }

    #[test]
    fn test_mutation_payload_deserializes_user_errors() {
        let data: CustomerCreateData = serde_json::from_value(json!({
            "customerCreate": {
                "customer": null,
                "userErrors": [{"field": ["email"], "message": "Email has already been taken"}]
            }
        }))
        .unwrap();

        let result = data.customer_create.unwrap();
        assert!(result.customer.is_none());
        let errors: Vec<UserError> = result.user_errors.into_iter().map(Into::into).collect();
        assert_eq!(errors[0].field, vec!["email"]);
        assert_eq!(errors[0].message, "Email has already been taken");
        assert_eq!(
            detect_graphql_conflict(&errors),
            Some(ConflictDetection::Structured)
        );
    }

    #[test]
    fn test_lookup_prefers_exact_email_match() {
        let data: FindCustomerData = serde_json::from_value(json!({
            "customers": {"edges": [
                {"node": {"id": "gid://shopify/Customer/1", "email": "ana.maria@example.com", "tags": []}},
                {"node": {"id": "gid://shopify/Customer/2", "email": "ANA@example.com", "tags": ["VIP"]}}
            ]}
        }))
        .unwrap();

        let node = matching_node(data.customers.edges, "ana@example.com").unwrap();
        assert_eq!(node.id, "gid://shopify/Customer/2");
    }

    #[test]
    fn test_lookup_falls_back_to_first_result() {
        let data: FindCustomerData = serde_json::from_value(json!({
            "customers": {"edges": [
                {"node": {"id": "gid://shopify/Customer/1", "email": null, "tags": []}},
                {"node": {"id": "gid://shopify/Customer/2", "email": "other@example.com"}}
            ]}
        }))
        .unwrap();

        let node = matching_node(data.customers.edges, "ana@example.com").unwrap();
        assert_eq!(node.id, "gid://shopify/Customer/1");
        assert!(matching_node(Vec::new(), "ana@example.com").is_none());
    }

    #[test]
    fn test_answer_into_data() {
        let exchange = Exchange {
            request: json!({}),
            response: UpstreamResponse::from_text(200, r#"{"data":{"x":1}}"#),
        };
        let ok = Answer {
            status: StatusCode::OK,
            data: Some(1),
            has_errors: false,
            exchange: exchange.clone(),
        };
        assert_eq!(ok.into_data().unwrap(), 1);

        let errored = Answer {
            status: StatusCode::OK,
            data: Some(1),
            has_errors: true,
            exchange: exchange.clone(),
        };
        assert_eq!(errored.into_data().unwrap_err(), exchange);

        let throttled: Answer<i32> = Answer {
            status: StatusCode::TOO_MANY_REQUESTS,
            data: None,
            has_errors: false,
            exchange: exchange.clone(),
        };
        assert!(throttled.into_data().is_err());
    }
}
