//! Adapter between an HTTP-like serverless event and the gateway.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Gateway;

/// Inbound event. Every field is optional except `headers`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportEvent {
    #[serde(default)]
    pub raw_path: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub request_context: Option<RequestContext>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Either a JSON string or an already decoded JSON value
    #[serde(default)]
    pub body: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub http: Option<HttpContext>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpContext {
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl TransportEvent {
    pub fn method(&self) -> &str {
        self.request_context
            .as_ref()
            .and_then(|ctx| ctx.http.as_ref())
            .map(|http| http.method.as_str())
            .or(self.http_method.as_deref())
            .unwrap_or("POST")
    }

    pub fn path(&self) -> &str {
        self.raw_path
            .as_deref()
            .or(self.path.as_deref())
            .unwrap_or("/")
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn body_bytes(&self) -> Vec<u8> {
        match &self.body {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(raw)) => raw.as_bytes().to_vec(),
            Some(other) => other.to_string().into_bytes(),
        }
    }
}

/// Run one event through the gateway and render the response envelope.
pub async fn handle_event(gateway: &Gateway, event: TransportEvent) -> TransportResponse {
    tracing::info!(method = %event.method(), path = %event.path(), "handling transport event");

    let api_key = event.header(gateway.guard().header());
    let (status_code, payload) = match gateway.handle(api_key, &event.body_bytes()).await {
        Ok(data) => (200, data),
        Err(error) => (error.status().as_u16(), error.to_body()),
    };

    match serde_json::to_string(&payload) {
        Ok(body) => respond(status_code, body),
        Err(e) => {
            tracing::error!(error = %e, "failed to render transport response");
            respond(
                500,
                json!({
                    "errors": [{
                        "message": format!("Internal server error: {}", e),
                        "extensions": {"code": "INTERNAL_SERVER_ERROR"}
                    }]
                })
                .to_string(),
            )
        }
    }
}

fn respond(status_code: u16, body: String) -> TransportResponse {
    let mut headers = BTreeMap::new();
    headers.insert("content-type".to_string(), "application/json".to_string());
    TransportResponse {
        status_code,
        headers,
        body,
    }
}
