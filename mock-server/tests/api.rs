use axum::http::{self, Request, StatusCode};
use axum::Router;
use facturapi_mock::{app, Customer, Invoice, ListPage};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

/// `base64("sk_test_key:")`
const TEST_AUTH: &str = "Basic c2tfdGVzdF9rZXk6";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, TEST_AUTH)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, TEST_AUTH)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

async fn send(app: &Router, req: Request<String>) -> axum::response::Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn create_customer(app: &Router, legal_name: &str) -> Customer {
    let body = json!({
        "legal_name": legal_name,
        "tax_id": "KAHF070706AB1",
        "email": "frida@kahlo.mx",
    });
    let resp = send(app, json_request("POST", "/v2/customers", &body.to_string())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

async fn create_invoice(app: &Router, customer_id: &str) -> Invoice {
    let body = json!({
        "customer": customer_id,
        "items": [{"quantity": 2, "product": "64130a0b1c2d3e4f50617283"}],
        "payment_form": "03",
    });
    let resp = send(app, json_request("POST", "/v2/invoices", &body.to_string())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

// --- auth ---

#[tokio::test]
async fn missing_auth_returns_401_json() {
    let resp = app()
        .oneshot(Request::builder().uri("/v2/customers").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], 401);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn empty_key_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/v2/invoices")
                .header(http::header::AUTHORIZATION, "Basic Og==")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn routes_live_under_v2() {
    let resp = app().oneshot(request("GET", "/customers")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- customers ---

#[tokio::test]
async fn list_customers_empty() {
    let resp = app().oneshot(request("GET", "/v2/customers")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: ListPage<Customer> = body_json(resp).await;
    assert!(page.data.is_empty());
    assert_eq!(page.total_pages, 0);
    assert_eq!(page.page, 1);
}

#[tokio::test]
async fn create_customer_echoes_fields_and_adds_server_ones() {
    let app = app();
    let customer = create_customer(&app, "Frida Kahlo").await;

    assert_eq!(customer.legal_name, "Frida Kahlo");
    assert_eq!(customer.id.len(), 24);
    assert!(!customer.livemode);
    assert!(!customer.organization.is_empty());
}

#[tokio::test]
async fn create_customer_missing_field_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/v2/customers", r#"{"legal_name":"Nadie"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn live_key_creates_livemode_resources() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v2/customers")
                // "sk_live_key:"
                .header(http::header::AUTHORIZATION, "Basic c2tfbGl2ZV9rZXk6")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(r#"{"legal_name":"A","tax_id":"B","email":"c@d.mx"}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    let customer: Customer = body_json(resp).await;
    assert!(customer.livemode);
}

#[tokio::test]
async fn update_customer_changes_only_given_fields() {
    let app = app();
    let created = create_customer(&app, "Frida Kahlo").await;

    let uri = format!("/v2/customers/{}", created.id);
    let resp = send(&app, json_request("PUT", &uri, r#"{"phone":"5512345678"}"#)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Customer = body_json(resp).await;
    assert_eq!(updated.phone.as_deref(), Some("5512345678"));
    assert_eq!(updated.legal_name, "Frida Kahlo");

    let fetched: Customer = body_json(send(&app, request("GET", &uri)).await).await;
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn get_customer_not_found() {
    let resp = app()
        .oneshot(request("GET", "/v2/customers/000000000000000000000000"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- listing ---

#[tokio::test]
async fn list_paginates_and_searches() {
    let app = app();
    for name in ["Frida Kahlo", "Diego Rivera", "Remedios Varo"] {
        create_customer(&app, name).await;
    }

    let resp = send(&app, request("GET", "/v2/customers?limit=2&page=2")).await;
    let page: ListPage<Customer> = body_json(resp).await;
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.total_results, 3);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].legal_name, "Remedios Varo");

    let resp = send(&app, request("GET", "/v2/customers?q=diego")).await;
    let page: ListPage<Customer> = body_json(resp).await;
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].legal_name, "Diego Rivera");
}

#[tokio::test]
async fn list_rejects_out_of_range_limit() {
    for uri in ["/v2/invoices?limit=51", "/v2/invoices?limit=0", "/v2/invoices?page=0"] {
        let resp = app().oneshot(request("GET", uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn list_filters_by_date() {
    let app = app();
    let customer = create_customer(&app, "Frida Kahlo").await;
    create_invoice(&app, &customer.id).await;

    let resp = send(&app, request("GET", "/v2/invoices?date%5Blt%5D=2000-01-01T00%3A00%3A00%2B00%3A00")).await;
    let page: ListPage<Invoice> = body_json(resp).await;
    assert!(page.data.is_empty());

    let resp = send(&app, request("GET", "/v2/invoices?date%5Bgte%5D=2000-01-01T00%3A00%3A00%2B00%3A00")).await;
    let page: ListPage<Invoice> = body_json(resp).await;
    assert_eq!(page.data.len(), 1);
}

// --- invoices ---

#[tokio::test]
async fn create_invoice_embeds_customer_and_defaults() {
    let app = app();
    let customer = create_customer(&app, "Frida Kahlo").await;
    let invoice = create_invoice(&app, &customer.id).await;

    assert_eq!(invoice.status, "valid");
    assert_eq!(invoice.customer["id"], customer.id.as_str());
    assert_eq!(invoice.customer["legal_name"], "Frida Kahlo");
    assert_eq!(invoice.payment_method, "PUE");
    assert_eq!(invoice.cfdi_use, "G01");
    assert_eq!(invoice.currency, "MXN");
    assert_eq!(invoice.total, 200.0);
    assert_eq!(invoice.folio_number, 1);
}

#[tokio::test]
async fn create_invoice_with_inline_customer_registers_it() {
    let app = app();
    let body = json!({
        "customer": {"legal_name": "Remedios Varo", "tax_id": "VAUR631216M55", "email": "r@v.mx"},
        "items": [{"product": {"description": "Oleo", "product_key": "60121000", "price": 1500.5}}],
        "payment_form": "28",
    });
    let resp = send(&app, json_request("POST", "/v2/invoices", &body.to_string())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let invoice: Invoice = body_json(resp).await;
    assert_eq!(invoice.total, 1500.5);

    let customer_id = invoice.customer["id"].as_str().unwrap();
    let resp = send(&app, request("GET", &format!("/v2/customers/{customer_id}"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_invoice_for_unknown_customer_returns_404() {
    let body = r#"{"customer":"nope","items":[{"product":"p"}],"payment_form":"01"}"#;
    let resp = app()
        .oneshot(json_request("POST", "/v2/invoices", body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancel_invoice_requires_valid_motive() {
    let app = app();
    let customer = create_customer(&app, "Frida Kahlo").await;
    let invoice = create_invoice(&app, &customer.id).await;
    let uri = format!("/v2/invoices/{}", invoice.id);

    for query in ["", "?motive=09", "?motive=01"] {
        let resp = send(&app, request("DELETE", &format!("{uri}{query}"))).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{query}");
    }

    let resp = send(&app, request("DELETE", &format!("{uri}?motive=02"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let canceled: Invoice = body_json(resp).await;
    assert_eq!(canceled.status, "canceled");
    assert_eq!(canceled.cancellation_status, "accepted");

    let fetched: Invoice = body_json(send(&app, request("GET", &uri)).await).await;
    assert_eq!(fetched.status, "canceled");
}

#[tokio::test]
async fn download_invoice_files() {
    let app = app();
    let customer = create_customer(&app, "Frida Kahlo").await;
    let invoice = create_invoice(&app, &customer.id).await;

    for (format, content_type, magic) in [
        ("pdf", "application/pdf", &b"%PDF"[..]),
        ("xml", "application/xml", &b"<?xml"[..]),
        ("zip", "application/zip", &b"PK"[..]),
    ] {
        let resp = send(&app, request("GET", &format!("/v2/invoices/{}/{format}", invoice.id))).await;
        assert_eq!(resp.status(), StatusCode::OK, "{format}");
        assert_eq!(resp.headers()[http::header::CONTENT_TYPE], content_type);
        assert!(body_bytes(resp).await.starts_with(magic), "{format}");
    }

    let resp = send(&app, request("GET", &format!("/v2/invoices/{}/docx", invoice.id))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn folio_counter_saturates_at_max() {
    let app = app();
    let customer = create_customer(&app, "Frida Kahlo").await;

    let body = json!({
        "customer": customer.id,
        "items": [{"product": "64130a0b1c2d3e4f50617283"}],
        "payment_form": "03",
        "folio_number": u64::MAX,
    });
    let resp = send(&app, json_request("POST", "/v2/invoices", &body.to_string())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let invoice: Invoice = body_json(resp).await;
    assert_eq!(invoice.folio_number, u64::MAX);

    let next = create_invoice(&app, &customer.id).await;
    assert_eq!(next.folio_number, u64::MAX);
}
