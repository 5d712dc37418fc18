//! Shopify Admin REST API customer client.

use mixperfume_core::{join_tags, split_tags};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::instrument;
use url::Url;

use crate::config::ShopifyAdminConfig;

use super::{
    CustomerStore, ShopifyError, admin_url,
    conflict::detect_rest_conflict,
    types::{
        Conflict, CreateOutcome, CustomerPayload, CustomerSummary, Exchange, ExistingCustomer,
        LookupOutcome, UpdateOutcome, UpstreamResponse, id_to_string,
    },
};

/// Shopify Admin REST API client for customers.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    api_version: String,
}

/// `customer` object of a create/update request body.
#[derive(Debug, Serialize)]
struct CustomerBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    tags: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
    addresses: [AddressBody<'a>; 1],
}

#[derive(Debug, Serialize)]
struct AddressBody<'a> {
    address1: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    address2: Option<&'a str>,
    city: &'a str,
    province: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    province_code: Option<&'a str>,
    zip: &'a str,
    country_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
}

impl<'a> CustomerBody<'a> {
    fn new(payload: &'a CustomerPayload) -> Self {
        let address = &payload.address;
        Self {
            id: None,
            email: &payload.email,
            first_name: &payload.first_name,
            last_name: &payload.last_name,
            phone: payload.phone.non_empty(),
            tags: join_tags(&payload.tags),
            note: Some(&payload.note),
            addresses: [AddressBody {
                address1: &address.address1,
                address2: address.address2.as_deref(),
                city: &address.city,
                province: &address.province,
                province_code: address.province_code.as_deref(),
                zip: &address.zip,
                country_code: &address.country_code,
                phone: address.phone.non_empty(),
            }],
        }
    }

    /// Update bodies carry the id and leave the existing note alone.
    fn for_update(id: &str, payload: &'a CustomerPayload) -> Self {
        let id = id
            .parse::<u64>()
            .map_or_else(|_| Value::String(id.to_string()), Value::from);
        Self {
            id: Some(id),
            note: None,
            ..Self::new(payload)
        }
    }
}

impl RestClient {
    /// Create a REST client from a pre-authenticated HTTP client.
    #[must_use]
    pub fn new(http: reqwest::Client, config: &ShopifyAdminConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            api_version: config.api_version.clone(),
        }
    }

    fn url(&self, path: &str) -> Result<Url, ShopifyError> {
        admin_url(&self.base_url, &self.api_version, path)
    }

    /// Send a request and keep the full exchange for diagnostics.
    async fn exchange(
        &self,
        request: reqwest::RequestBuilder,
        request_body: Value,
    ) -> Result<(StatusCode, Exchange), ShopifyError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        Ok((
            status,
            Exchange {
                request: request_body,
                response: UpstreamResponse::from_text(status.as_u16(), &text),
            },
        ))
    }
}

impl CustomerStore for RestClient {
    #[instrument(skip(self, payload), fields(email = %payload.email))]
    async fn create_customer(
        &self,
        payload: &CustomerPayload,
    ) -> Result<CreateOutcome, ShopifyError> {
        let url = self.url("customers.json")?;
        let body = json!({ "customer": CustomerBody::new(payload) });

        let (status, exchange) = self
            .exchange(self.http.post(url).json(&body), body)
            .await?;

        if status == StatusCode::CREATED
            && let Some(customer) = customer_summary(&exchange.response.body)
        {
            tracing::info!(customer_id = %customer.id, "Customer created");
            return Ok(CreateOutcome::Created(customer));
        }

        if let Some(detection) = detect_rest_conflict(status, &exchange.response.body) {
            tracing::info!(?detection, "Customer email already taken");
            return Ok(CreateOutcome::Conflict(Conflict {
                detection,
                exchange,
            }));
        }

        tracing::warn!(status = status.as_u16(), "Customer create failed");
        Ok(CreateOutcome::Failed(exchange))
    }

    #[instrument(skip(self))]
    async fn find_customer_by_email(&self, email: &str) -> Result<LookupOutcome, ShopifyError> {
        let query = format!("email:{email}");
        let mut url = self.url("customers/search.json")?;
        url.query_pairs_mut()
            .append_pair("query", &query)
            .append_pair("fields", "id,email,tags");

        let (status, exchange) = self
            .exchange(self.http.get(url), json!({ "query": query }))
            .await?;

        if status != StatusCode::OK {
            tracing::warn!(status = status.as_u16(), "Customer search failed");
            return Ok(LookupOutcome::NotFound(exchange));
        }

        match existing_customer(&exchange.response.body, email) {
            Some(customer) => Ok(LookupOutcome::Found(customer)),
            None => Ok(LookupOutcome::NotFound(exchange)),
        }
    }

    #[instrument(skip(self, payload), fields(email = %payload.email))]
    async fn update_customer(
        &self,
        id: &str,
        payload: &CustomerPayload,
    ) -> Result<UpdateOutcome, ShopifyError> {
        let url = self.url(&format!("customers/{id}.json"))?;
        let body = json!({ "customer": CustomerBody::for_update(id, payload) });

        let (status, exchange) = self.exchange(self.http.put(url).json(&body), body).await?;

        if matches!(status, StatusCode::OK | StatusCode::CREATED)
            && let Some(customer) = customer_summary(&exchange.response.body)
        {
            tracing::info!(customer_id = %customer.id, "Customer updated");
            return Ok(UpdateOutcome::Updated(customer));
        }

        tracing::warn!(status = status.as_u16(), "Customer update failed");
        Ok(UpdateOutcome::Failed(exchange))
    }
}

/// Read `{"customer": {...}}` from a create/update response.
fn customer_summary(body: &Value) -> Option<CustomerSummary> {
    let customer = body.get("customer")?;
    let text = |key: &str| customer.get(key).and_then(Value::as_str).map(String::from);

    Some(CustomerSummary {
        id: id_to_string(customer.get("id")?)?,
        email: text("email"),
        first_name: text("first_name"),
        last_name: text("last_name"),
        tags: customer
            .get("tags")
            .and_then(Value::as_str)
            .map(|tags| split_tags(tags).map(String::from).collect())
            .unwrap_or_default(),
    })
}

/// Pick the searched customer out of `{"customers": [...]}`.
///
/// Search is fuzzy, so an exact email match wins over the first result.
fn existing_customer(body: &Value, email: &str) -> Option<ExistingCustomer> {
    let customers = body.get("customers")?.as_array()?;
    let exact = customers.iter().find(|c| {
        c.get("email")
            .and_then(Value::as_str)
            .is_some_and(|e| e.eq_ignore_ascii_case(email))
    });
    let customer = exact.or_else(|| customers.first())?;

    Some(ExistingCustomer {
        id: id_to_string(customer.get("id")?)?,
        tags: customer
            .get("tags")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}
