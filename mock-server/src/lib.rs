//! In-memory emulation of the Facturapi endpoints the client library uses.
//!
//! Every route lives under `/v2` and requires HTTP Basic auth with the API
//! key as user name and an empty password. Keys starting with `sk_live`
//! produce `livemode: true` resources. State is lost when the process exits.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use base64::Engine as _;
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Largest page size accepted by list routes.
pub const MAX_LIMIT: u32 = 50;

/// Price charged for items that reference a product by ID only.
pub const DEFAULT_UNIT_PRICE: f64 = 100.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub livemode: bool,
    pub organization: String,
    pub legal_name: String,
    pub tax_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub livemode: bool,
    pub status: String,
    pub cancellation_status: String,
    pub verification_url: String,
    #[serde(rename = "type")]
    pub invoice_type: String,
    /// Embedded `{id, legal_name, tax_id}` of the receiver.
    pub customer: Value,
    pub total: f64,
    pub uuid: Uuid,
    pub payment_form: String,
    pub payment_method: String,
    #[serde(rename = "use")]
    pub cfdi_use: String,
    pub items: Vec<Value>,
    pub currency: String,
    pub exchange: f64,
    pub folio_number: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateCustomer {
    pub legal_name: String,
    pub tax_id: String,
    pub email: String,
    pub tax_system: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Value>,
}

#[derive(Deserialize)]
pub struct UpdateCustomer {
    pub legal_name: Option<String>,
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub tax_system: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Value>,
}

#[derive(Deserialize)]
pub struct CreateInvoice {
    /// Existing customer ID or inline customer data.
    pub customer: Value,
    pub items: Vec<Value>,
    pub payment_form: String,
    pub payment_method: Option<String>,
    #[serde(rename = "use")]
    pub cfdi_use: Option<String>,
    #[serde(rename = "type")]
    pub invoice_type: Option<String>,
    pub currency: Option<String>,
    pub exchange: Option<f64>,
    pub folio_number: Option<u64>,
    pub series: Option<String>,
}

/// One page of a list response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListPage<T> {
    pub page: u32,
    pub total_pages: u32,
    pub total_results: usize,
    pub data: Vec<T>,
}

#[derive(Default)]
pub struct Store {
    customers: Vec<Customer>,
    invoices: Vec<Invoice>,
    next_folio: u64,
}

pub type Db = Arc<RwLock<Store>>;

/// API key of the authenticated request.
#[derive(Clone, Debug)]
pub struct ApiKey(pub String);

impl ApiKey {
    fn livemode(&self) -> bool {
        self.0.starts_with("sk_live")
    }
}

/// Error body shaped like the real API: `{"message": ..., "status": ...}`.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    NotFound(&'static str),
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Invalid API key. Use HTTP Basic auth with your secret key as user name".to_string(),
            ),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
        };
        let body = json!({ "message": message, "status": status.as_u16() });
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store {
        next_folio: 1,
        ..Store::default()
    }));
    let api = Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/{id}", get(get_customer).put(update_customer))
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route("/invoices/{id}", get(get_invoice).delete(cancel_invoice))
        .route("/invoices/{id}/{format}", get(download_invoice))
        .route_layer(middleware::from_fn(require_api_key))
        .with_state(db);
    Router::new().nest("/v2", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Extract the key from `Authorization: Basic base64(key:)`.
pub fn parse_basic_auth(value: &str) -> Option<String> {
    let token = value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD.decode(token.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (key, _password) = decoded.split_once(':')?;
    (!key.is_empty()).then(|| key.to_string())
}

async fn require_api_key(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let key = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_basic_auth)
        .ok_or(ApiError::Unauthorized)?;
    request.extensions_mut().insert(ApiKey(key));
    Ok(next.run(request).await)
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Parsed `q`, `limit`, `page` and `date[op]` parameters.
#[derive(Debug, Default, PartialEq)]
pub struct ListParams {
    pub q: Option<String>,
    pub limit: u32,
    pub page: u32,
    pub date: Vec<(String, DateTime<FixedOffset>)>,
}

impl ListParams {
    pub fn parse(raw: &HashMap<String, String>) -> Result<Self, ApiError> {
        let number = |name: &str, default: u32| -> Result<u32, ApiError> {
            match raw.get(name) {
                None => Ok(default),
                Some(value) => value
                    .parse()
                    .map_err(|_| ApiError::BadRequest(format!("{name} must be a positive integer"))),
            }
        };
        let limit = number("limit", MAX_LIMIT)?;
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(ApiError::BadRequest(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        let page = number("page", 1)?;
        if page < 1 {
            return Err(ApiError::BadRequest("page must be at least 1".to_string()));
        }

        let mut date = Vec::new();
        for op in ["gt", "gte", "lt", "lte"] {
            if let Some(value) = raw.get(&format!("date[{op}]")) {
                let bound = DateTime::parse_from_rfc3339(value)
                    .map_err(|_| ApiError::BadRequest(format!("date[{op}] must be ISO 8601")))?;
                date.push((op.to_string(), bound));
            }
        }

        Ok(Self {
            q: raw.get("q").filter(|q| !q.is_empty()).cloned(),
            limit,
            page,
            date,
        })
    }

    fn matches_date(&self, created_at: DateTime<Utc>) -> bool {
        self.date.iter().all(|(op, bound)| {
            let bound = bound.with_timezone(&Utc);
            match op.as_str() {
                "gt" => created_at > bound,
                "gte" => created_at >= bound,
                "lt" => created_at < bound,
                _ => created_at <= bound,
            }
        })
    }

    fn matches_text(&self, fields: &[&str]) -> bool {
        let Some(q) = &self.q else {
            return true;
        };
        let q = q.to_lowercase();
        fields.iter().any(|field| field.to_lowercase().contains(&q))
    }
}

/// Slice `items` into the page `params` selects.
pub fn paginate<T: Clone>(items: &[T], params: &ListParams) -> ListPage<T> {
    let limit = params.limit as usize;
    let total_results = items.len();
    let total_pages = total_results.div_ceil(limit) as u32;
    let start = (params.page as usize - 1).saturating_mul(limit);
    let data = items.iter().skip(start).take(limit).cloned().collect();
    ListPage {
        page: params.page,
        total_pages,
        total_results,
        data,
    }
}

fn object_id() -> String {
    Uuid::new_v4().simple().to_string()[..24].to_string()
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

fn new_customer(input: CreateCustomer, livemode: bool) -> Customer {
    Customer {
        id: object_id(),
        created_at: Utc::now(),
        livemode,
        organization: "mock_organization".to_string(),
        legal_name: input.legal_name,
        tax_id: input.tax_id,
        email: input.email,
        tax_system: input.tax_system,
        phone: input.phone,
        address: input.address,
    }
}

async fn list_customers(
    State(db): State<Db>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<ListPage<Customer>>, ApiError> {
    let params = ListParams::parse(&raw)?;
    let store = db.read().await;
    let matching: Vec<Customer> = store
        .customers
        .iter()
        .filter(|c| params.matches_text(&[c.legal_name.as_str(), c.tax_id.as_str(), c.email.as_str()]))
        .filter(|c| params.matches_date(c.created_at))
        .cloned()
        .collect();
    Ok(Json(paginate(&matching, &params)))
}

async fn create_customer(
    State(db): State<Db>,
    Extension(key): Extension<ApiKey>,
    input: Result<Json<CreateCustomer>, JsonRejection>,
) -> Result<Json<Customer>, ApiError> {
    let Json(input) = input?;
    let customer = new_customer(input, key.livemode());
    tracing::debug!(id = %customer.id, "customer created");
    db.write().await.customers.push(customer.clone());
    Ok(Json(customer))
}

async fn get_customer(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Customer>, ApiError> {
    let store = db.read().await;
    store
        .customers
        .iter()
        .find(|c| c.id == id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::NotFound("Customer"))
}

async fn update_customer(
    State(db): State<Db>,
    Path(id): Path<String>,
    input: Result<Json<UpdateCustomer>, JsonRejection>,
) -> Result<Json<Customer>, ApiError> {
    let Json(input) = input?;
    let mut store = db.write().await;
    let customer = store
        .customers
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or(ApiError::NotFound("Customer"))?;
    if let Some(legal_name) = input.legal_name {
        customer.legal_name = legal_name;
    }
    if let Some(tax_id) = input.tax_id {
        customer.tax_id = tax_id;
    }
    if let Some(email) = input.email {
        customer.email = email;
    }
    if input.tax_system.is_some() {
        customer.tax_system = input.tax_system;
    }
    if input.phone.is_some() {
        customer.phone = input.phone;
    }
    if input.address.is_some() {
        customer.address = input.address;
    }
    Ok(Json(customer.clone()))
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

/// `quantity * price - discount`, with `price` read from an inline product.
fn item_amount(item: &Value) -> f64 {
    let quantity = item.get("quantity").and_then(Value::as_f64).unwrap_or(1.0);
    let discount = item.get("discount").and_then(Value::as_f64).unwrap_or(0.0);
    let price = item
        .get("product")
        .and_then(|p| p.get("price"))
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_UNIT_PRICE);
    quantity * price - discount
}

async fn list_invoices(
    State(db): State<Db>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<ListPage<Invoice>>, ApiError> {
    let params = ListParams::parse(&raw)?;
    let store = db.read().await;
    let matching: Vec<Invoice> = store
        .invoices
        .iter()
        .filter(|i| {
            let name = i.customer["legal_name"].as_str().unwrap_or_default();
            let tax_id = i.customer["tax_id"].as_str().unwrap_or_default();
            params.matches_text(&[name, tax_id, i.id.as_str()])
        })
        .filter(|i| params.matches_date(i.created_at))
        .cloned()
        .collect();
    Ok(Json(paginate(&matching, &params)))
}

async fn create_invoice(
    State(db): State<Db>,
    Extension(key): Extension<ApiKey>,
    input: Result<Json<CreateInvoice>, JsonRejection>,
) -> Result<Json<Invoice>, ApiError> {
    let Json(input) = input?;
    if input.items.is_empty() {
        return Err(ApiError::BadRequest("items must not be empty".to_string()));
    }

    let mut store = db.write().await;
    let customer = match input.customer {
        Value::String(id) => store
            .customers
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(ApiError::NotFound("Customer"))?,
        inline @ Value::Object(_) => {
            let data: CreateCustomer = serde_json::from_value(inline)
                .map_err(|err| ApiError::BadRequest(format!("customer: {err}")))?;
            let customer = new_customer(data, key.livemode());
            store.customers.push(customer.clone());
            customer
        }
        _ => {
            return Err(ApiError::BadRequest(
                "customer must be an ID or an object".to_string(),
            ))
        }
    };

    let uuid = Uuid::new_v4();
    let folio_number = input.folio_number.unwrap_or(store.next_folio);
    store.next_folio = folio_number.saturating_add(1);
    let invoice = Invoice {
        id: object_id(),
        created_at: Utc::now(),
        livemode: key.livemode(),
        status: "valid".to_string(),
        cancellation_status: "none".to_string(),
        verification_url: format!(
            "https://verificacfdi.facturaelectronica.sat.gob.mx/default.aspx?id={uuid}"
        ),
        invoice_type: input.invoice_type.unwrap_or_else(|| "I".to_string()),
        customer: json!({
            "id": customer.id,
            "legal_name": customer.legal_name,
            "tax_id": customer.tax_id,
        }),
        total: input.items.iter().map(item_amount).sum(),
        uuid,
        payment_form: input.payment_form,
        payment_method: input.payment_method.unwrap_or_else(|| "PUE".to_string()),
        cfdi_use: input.cfdi_use.unwrap_or_else(|| "G01".to_string()),
        items: input.items,
        currency: input.currency.unwrap_or_else(|| "MXN".to_string()),
        exchange: input.exchange.unwrap_or(1.0),
        folio_number,
        series: input.series,
    };
    tracing::debug!(id = %invoice.id, total = invoice.total, "invoice created");
    store.invoices.push(invoice.clone());
    Ok(Json(invoice))
}

async fn get_invoice(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Invoice>, ApiError> {
    let store = db.read().await;
    store
        .invoices
        .iter()
        .find(|i| i.id == id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::NotFound("Invoice"))
}

#[derive(Deserialize)]
pub struct CancelParams {
    pub motive: Option<String>,
    pub substitution: Option<String>,
}

async fn cancel_invoice(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<CancelParams>,
) -> Result<Json<Invoice>, ApiError> {
    let motive = params
        .motive
        .ok_or_else(|| ApiError::BadRequest("motive is required".to_string()))?;
    if !["01", "02", "03", "04"].contains(&motive.as_str()) {
        return Err(ApiError::BadRequest(format!("unknown motive {motive:?}")));
    }
    if motive == "01" && params.substitution.is_none() {
        return Err(ApiError::BadRequest(
            "motive 01 requires a substitution invoice".to_string(),
        ));
    }

    let mut store = db.write().await;
    let invoice = store
        .invoices
        .iter_mut()
        .find(|i| i.id == id)
        .ok_or(ApiError::NotFound("Invoice"))?;
    invoice.status = "canceled".to_string();
    invoice.cancellation_status = "accepted".to_string();
    tracing::debug!(%id, %motive, "invoice canceled");
    Ok(Json(invoice.clone()))
}

/// Fake file contents for `format`, or `None` for unknown formats.
pub fn rendition(invoice: &Invoice, format: &str) -> Option<(&'static str, Vec<u8>)> {
    let stamped = invoice.created_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    match format {
        "pdf" => Some((
            "application/pdf",
            format!("%PDF-1.4\n% invoice {} {}\n%%EOF\n", invoice.id, invoice.uuid).into_bytes(),
        )),
        "xml" => Some((
            "application/xml",
            format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<cfdi:Comprobante Folio=\"{}\" Fecha=\"{stamped}\" Total=\"{:.2}\" UUID=\"{}\"/>\n",
                invoice.folio_number, invoice.total, invoice.uuid
            )
            .into_bytes(),
        )),
        "zip" => {
            let mut bytes = b"PK\x03\x04".to_vec();
            bytes.extend_from_slice(invoice.id.as_bytes());
            Some(("application/zip", bytes))
        }
        _ => None,
    }
}

async fn download_invoice(
    State(db): State<Db>,
    Path((id, format)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let store = db.read().await;
    let invoice = store
        .invoices
        .iter()
        .find(|i| i.id == id)
        .ok_or(ApiError::NotFound("Invoice"))?;
    let (content_type, bytes) = rendition(invoice, &format)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown format {format:?}")))?;
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}
