//! Scripted in-memory transport shared by the integration tests.
//!
//! Responses are queued up front and handed out in order; every request the
//! client sends is recorded so tests can assert on counts, URLs and bodies.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use facturapi::{Client, Config, FacturapiError, HttpRequest, HttpResponse, Transport};
use serde_json::Value;

#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response.
    pub fn push_json(&self, status: u16, body: Value) {
        self.push_raw(status, serde_json::to_vec(&body).unwrap());
    }

    /// Queue a raw-bytes response.
    pub fn push_raw(&self, status: u16, body: Vec<u8>) {
        self.responses.lock().unwrap().push_back(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        });
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, FacturapiError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| FacturapiError::Transport("no scripted response left".to_string()))
    }
}

pub const BASE: &str = "https://www.facturapi.io/v2";

pub fn client() -> Client<ScriptedTransport> {
    Client::with_transport(Config::new("sk_test_key"), ScriptedTransport::new())
}

/// Decoded JSON body of a recorded request.
pub fn body_json(request: &HttpRequest) -> Value {
    serde_json::from_slice(request.body.as_deref().expect("request has a body")).unwrap()
}

pub fn customer_json(id: &str, legal_name: &str) -> Value {
    serde_json::json!({
        "id": id,
        "created_at": "2024-05-01T17:00:00.000Z",
        "livemode": false,
        "legal_name": legal_name,
        "tax_id": "VAUR631216M55",
        "email": "remedios@varo.com",
        "tax_system": "625",
        "address": {"zip": "06700"},
        "organization": "org_1",
    })
}

pub fn invoice_json(id: &str, status: &str) -> Value {
    serde_json::json!({
        "id": id,
        "created_at": "2024-05-01T17:00:00.000Z",
        "livemode": false,
        "status": status,
        "cancellation_status": "none",
        "type": "I",
        "customer": {"id": "CUSTOMER01", "legal_name": "Remedios Varo", "tax_id": "VAUR631216M55"},
        "total": 84.1,
        "uuid": "2d2b9fd4-4b4c-4f45-9b8d-5d1e7b8f7f01",
        "payment_form": "04",
        "items": [{"quantity": 2, "product": "PRODUCT01"}],
        "currency": "MXN",
        "exchange": 1,
    })
}

pub fn page_json(data: Vec<Value>, total_pages: u32) -> Value {
    serde_json::json!({"page": 1, "total_pages": total_pages, "total_results": data.len(), "data": data})
}
