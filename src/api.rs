//! REST invoice service.

use reqwest::{StatusCode, Url};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::auth::TokenSource;
use crate::dashboard::DashboardData;
use crate::error::ApiError;
use crate::model::InvoiceSummary;
use crate::payload::ApiInvoiceDocument;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SequenceReservation {
    pub sequence: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CreatedInvoice {
    pub id: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Invoice operations the form and CLI depend on.
pub trait InvoiceApi {
    fn reserve_sequence(&self) -> Result<SequenceReservation, ApiError>;

    fn create_invoice(&self, payload: &ApiInvoiceDocument) -> Result<CreatedInvoice, ApiError>;

    fn list_invoices(&self, status: Option<&str>) -> Result<Vec<InvoiceSummary>, ApiError>;

    fn get_invoice(&self, id: &str) -> Result<serde_json::Value, ApiError>;

    fn update_invoice(&self, id: &str, partial: &serde_json::Value) -> Result<serde_json::Value, ApiError>;

    fn delete_invoice(&self, id: &str) -> Result<(), ApiError>;

    /// Dashboard figures; derived from the full list unless the backend serves them.
    fn dashboard(&self) -> Result<DashboardData, ApiError> {
        Ok(DashboardData::from_invoices(&self.list_invoices(None)?))
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<serde_json::Value>,
}

/// Picks the most useful message out of an error response body.
fn error_message(status: StatusCode, text: &str) -> String {
    if let Ok(body) = serde_json::from_str::<ErrorBody>(text) {
        if let Some(message) = body.message.filter(|m| !m.is_empty()) {
            return message;
        }
        match body.error {
            Some(serde_json::Value::String(s)) if !s.is_empty() => return s,
            Some(serde_json::Value::Object(obj)) => {
                if let Some(serde_json::Value::String(s)) = obj.get("message") {
                    return s.clone();
                }
            }
            _ => {}
        }
    }
    format!("Request failed with status code {}", status.as_u16())
}

pub struct HttpInvoiceService<T: TokenSource> {
    client: Client,
    base_url: Url,
    auth: T,
}

impl<T: TokenSource> HttpInvoiceService<T> {
    pub fn new(base_url: &str, timeout_secs: u64, auth: T) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { client, base_url, auth })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn auth(&self) -> &T {
        &self.auth
    }

    /// Appends each segment percent-encoded, so ids can't escape their path slot.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.auth.id_token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn check(&self, response: Response, context: &str) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text()?;
        let message = error_message(status, &text);
        tracing::warn!(context, status = status.as_u16(), %message, "API request failed");
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized(message));
        }
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    fn send<R: DeserializeOwned>(&self, req: RequestBuilder, context: &str) -> Result<R, ApiError> {
        let response = self.check(self.authorize(req).send()?, context)?;
        response
            .json()
            .map_err(|e| ApiError::InvalidResponse(format!("{context}: {e}")))
    }
}

impl<T: TokenSource> InvoiceApi for HttpInvoiceService<T> {
    fn reserve_sequence(&self) -> Result<SequenceReservation, ApiError> {
        if self.auth.id_token().is_none() {
            return Err(ApiError::Unauthenticated);
        }
        let req = self
            .client
            .post(self.url(&["invoices", "reserve-global-sequence"]))
            .json(&serde_json::json!({}));
        self.send(req, "reserveInvoiceSequence")
    }

    fn create_invoice(&self, payload: &ApiInvoiceDocument) -> Result<CreatedInvoice, ApiError> {
        if let Ok(body) = serde_json::to_string_pretty(payload) {
            tracing::debug!(payload = %body, "create invoice payload");
        }
        let req = self.client.post(self.url(&["invoices"])).json(payload);
        let created: CreatedInvoice = self.send(req, "createInvoice")?;
        tracing::info!(id = %created.id, "invoice created");
        Ok(created)
    }

    fn list_invoices(&self, status: Option<&str>) -> Result<Vec<InvoiceSummary>, ApiError> {
        let mut req = self.client.get(self.url(&["invoices"]));
        if let Some(status) = status.filter(|s| !s.is_empty()) {
            req = req.query(&[("status", status)]);
        }
        self.send(req, "getInvoices")
    }

    fn get_invoice(&self, id: &str) -> Result<serde_json::Value, ApiError> {
        let req = self.client.get(self.url(&["invoices", id]));
        self.send(req, "getInvoiceById")
    }

    fn update_invoice(&self, id: &str, partial: &serde_json::Value) -> Result<serde_json::Value, ApiError> {
        let req = self.client.put(self.url(&["invoices", id])).json(partial);
        self.send(req, "updateInvoice")
    }

    fn delete_invoice(&self, id: &str) -> Result<(), ApiError> {
        let req = self.client.delete(self.url(&["invoices", id]));
        self.check(self.authorize(req).send()?, "deleteInvoice")?;
        Ok(())
    }

    fn dashboard(&self) -> Result<DashboardData, ApiError> {
        let req = self.client.get(self.url(&["dashboard"]));
        match self.send(req, "getDashboardData") {
            Err(ApiError::Status { status: 404, .. }) => {
                tracing::debug!("no dashboard endpoint, deriving from invoice list");
                Ok(DashboardData::from_invoices(&self.list_invoices(None)?))
            }
            other => other,
        }
    }
}
