//! Invoice resource, its items and its request objects.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::Client;
use crate::error::Result;
use crate::http::Transport;
use crate::resources::base::{
    retrieve_related, Creatable, Deletable, Downloadable, Queryable, Resource, ResourceUri,
    Retrievable,
};
use crate::resources::customers::{Customer, CustomerRequest};
use crate::sanitize::{mapping, CatalogCode, Map, Sanitize, ToMapping, Value};
use crate::sanitize_mapping;
use crate::types::{
    CancellationMotive, CustomerBasicInfo, InvoiceRelation, InvoiceType, InvoiceUse, ItemPart,
    Namespace, PaymentForm, PaymentMethod, ProductBasicInfo, ProductRequest,
};

/// An issued (or cancelled) CFDI.
///
/// The embedded customer is kept as a relation: `customer_uri` points at the
/// customer resource and `customer_info` holds what the server embedded.
/// [`Invoice::customer`] fetches the full customer on demand.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub created_at: DateTime<FixedOffset>,
    pub livemode: bool,
    pub status: String,
    pub cancellation_status: Option<String>,
    pub verification_url: Option<String>,
    #[serde(rename = "type")]
    pub invoice_type: Option<InvoiceType>,
    pub customer_info: CustomerBasicInfo,
    pub customer_uri: ResourceUri,
    pub total: f64,
    /// Folio fiscal assigned by the SAT.
    pub uuid: Uuid,
    pub payment_form: PaymentForm,
    pub payment_method: Option<PaymentMethod>,
    #[serde(rename = "use")]
    pub cfdi_use: Option<InvoiceUse>,
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
    pub currency: String,
    pub exchange: f64,
    pub folio_number: Option<u64>,
    pub series: Option<String>,
    pub related: Option<Vec<String>>,
    pub relation: Option<InvoiceRelation>,
}

impl Invoice {
    /// Cancel the invoice with `DELETE /invoices/<id>`.
    ///
    /// Returns the invoice as the server reports it after the cancellation
    /// request.
    pub fn cancel<T: Transport>(
        client: &Client<T>,
        invoice_id: &str,
        request: &CancelRequest,
    ) -> Result<Self> {
        Self::delete_with(client, invoice_id, &request.to_params())
    }

    /// Fetch the customer this invoice was issued to.
    ///
    /// Each call is one `GET /customers/<id>` round-trip.
    pub fn customer<T: Transport>(&self, client: &Client<T>) -> Result<Customer> {
        retrieve_related(client, &self.customer_uri)
    }
}

impl Resource for Invoice {
    const RESOURCE: &'static str = "invoices";
    const RELATIONS: &'static [&'static str] = &["customer"];

    fn id(&self) -> &str {
        &self.id
    }
}

impl Retrievable for Invoice {}

impl Queryable for Invoice {}

impl Deletable for Invoice {}

impl Downloadable for Invoice {}

impl Creatable for Invoice {
    type CreateRequest = InvoiceRequest;
}

impl ToMapping for Invoice {
    fn to_mapping(&self) -> Map<String, Value> {
        mapping! {
            "id" => self.id,
            "created_at" => self.created_at,
            "livemode" => self.livemode,
            "status" => self.status,
            "cancellation_status" => self.cancellation_status,
            "verification_url" => self.verification_url,
            "type" => self.invoice_type,
            "customer_info" => self.customer_info,
            "customer_uri" => self.customer_uri,
            "total" => self.total,
            "uuid" => self.uuid.to_string(),
            "payment_form" => self.payment_form,
            "payment_method" => self.payment_method,
            "use" => self.cfdi_use,
            "items" => self.items,
            "currency" => self.currency,
            "exchange" => self.exchange,
            "folio_number" => self.folio_number,
            "series" => self.series,
            "related" => self.related,
            "relation" => self.relation,
        }
    }
}

/// Options for [`Invoice::cancel`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CancelRequest {
    pub motive: Option<CancellationMotive>,
    /// ID of the invoice replacing this one (motive `01`).
    pub substitution: Option<String>,
}

impl CancelRequest {
    pub fn new(motive: CancellationMotive) -> Self {
        Self {
            motive: Some(motive),
            substitution: None,
        }
    }

    fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(motive) = self.motive {
            params.push(("motive".to_string(), motive.code().to_string()));
        }
        if let Some(substitution) = &self.substitution {
            params.push(("substitution".to_string(), substitution.clone()));
        }
        params
    }
}

/// Customer of a new invoice: an existing customer ID or inline data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InvoiceCustomer {
    Id(String),
    New(CustomerRequest),
}

impl From<&str> for InvoiceCustomer {
    fn from(id: &str) -> Self {
        InvoiceCustomer::Id(id.to_string())
    }
}

impl From<CustomerRequest> for InvoiceCustomer {
    fn from(request: CustomerRequest) -> Self {
        InvoiceCustomer::New(request)
    }
}

impl Sanitize for InvoiceCustomer {
    fn sanitize(&self) -> Value {
        match self {
            InvoiceCustomer::Id(id) => id.sanitize(),
            InvoiceCustomer::New(request) => request.sanitize(),
        }
    }
}

/// Product of an invoice item: an ID, embedded info, or inline data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemProduct {
    Id(String),
    Info(ProductBasicInfo),
    New(ProductRequest),
}

impl From<&str> for ItemProduct {
    fn from(id: &str) -> Self {
        ItemProduct::Id(id.to_string())
    }
}

impl From<ProductRequest> for ItemProduct {
    fn from(request: ProductRequest) -> Self {
        ItemProduct::New(request)
    }
}

impl Sanitize for ItemProduct {
    fn sanitize(&self) -> Value {
        match self {
            ItemProduct::Id(id) => id.sanitize(),
            ItemProduct::Info(info) => info.sanitize(),
            ItemProduct::New(request) => request.sanitize(),
        }
    }
}

/// One concept line of an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    /// Server default: 1.
    pub quantity: Option<u32>,
    /// Server default: 0.
    pub discount: Option<f64>,
    pub product: ItemProduct,
    pub custom_keys: Option<Vec<String>>,
    /// XML complement for the concept.
    pub complement: Option<String>,
    pub parts: Option<Vec<ItemPart>>,
    /// Predial account number.
    pub property_tax_account: Option<String>,
}

impl InvoiceItem {
    pub fn new(product: impl Into<ItemProduct>) -> Self {
        Self {
            quantity: None,
            discount: None,
            product: product.into(),
            custom_keys: None,
            complement: None,
            parts: None,
            property_tax_account: None,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = Some(discount);
        self
    }

    pub fn with_parts(mut self, parts: Vec<ItemPart>) -> Self {
        self.parts = Some(parts);
        self
    }
}

impl ToMapping for InvoiceItem {
    fn to_mapping(&self) -> Map<String, Value> {
        mapping! {
            "quantity" => self.quantity,
            "discount" => self.discount,
            "product" => self.product,
            "custom_keys" => self.custom_keys,
            "complement" => self.complement,
            "parts" => self.parts,
            "property_tax_account" => self.property_tax_account,
        }
    }
}

/// Data needed to issue an invoice.
///
/// Fields left as `None` are not sent; the server then applies its defaults
/// (`PUE`, `G01`, `MXN`, exchange `1.0`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRequest {
    pub customer: InvoiceCustomer,
    pub items: Vec<InvoiceItem>,
    pub payment_form: PaymentForm,
    pub payment_method: Option<PaymentMethod>,
    #[serde(rename = "use")]
    pub cfdi_use: Option<InvoiceUse>,
    #[serde(rename = "type")]
    pub invoice_type: Option<InvoiceType>,
    pub folio_number: Option<u64>,
    pub series: Option<String>,
    /// ISO 4217 code.
    pub currency: Option<String>,
    /// Exchange rate to MXN when `currency` is not MXN.
    pub exchange: Option<f64>,
    pub conditions: Option<String>,
    /// Comercio exterior complement, passed through untouched.
    pub foreign_trade: Option<Value>,
    /// UUIDs of related invoices.
    pub related: Option<Vec<String>>,
    pub relation: Option<InvoiceRelation>,
    /// HTML included in the PDF rendition.
    pub pdf_custom_section: Option<String>,
    pub addenda: Option<String>,
    pub namespaces: Option<Vec<Namespace>>,
}

impl InvoiceRequest {
    pub fn new(
        customer: impl Into<InvoiceCustomer>,
        items: Vec<InvoiceItem>,
        payment_form: PaymentForm,
    ) -> Self {
        Self {
            customer: customer.into(),
            items,
            payment_form,
            payment_method: None,
            cfdi_use: None,
            invoice_type: None,
            folio_number: None,
            series: None,
            currency: None,
            exchange: None,
            conditions: None,
            foreign_trade: None,
            related: None,
            relation: None,
            pdf_custom_section: None,
            addenda: None,
            namespaces: None,
        }
    }
}

impl ToMapping for InvoiceRequest {
    fn to_mapping(&self) -> Map<String, Value> {
        mapping! {
            "customer" => self.customer,
            "items" => self.items,
            "payment_form" => self.payment_form,
            "payment_method" => self.payment_method,
            "use" => self.cfdi_use,
            "type" => self.invoice_type,
            "folio_number" => self.folio_number,
            "series" => self.series,
            "currency" => self.currency,
            "exchange" => self.exchange,
            "conditions" => self.conditions,
            "foreign_trade" => self.foreign_trade,
            "related" => self.related,
            "relation" => self.relation,
            "pdf_custom_section" => self.pdf_custom_section,
            "addenda" => self.addenda,
            "namespaces" => self.namespaces,
        }
    }
}

sanitize_mapping!(Invoice, InvoiceItem, InvoiceRequest);
