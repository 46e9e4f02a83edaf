//! Blocking client for the Facturapi invoicing API.
//!
//! # Overview
//! Maps Facturapi's REST resources (customers, invoices) onto typed Rust
//! values. Every operation is one HTTP round-trip, except listing every page
//! of a query, which issues one request per page.
//!
//! # Design
//! - [`Client`] carries the API key and host explicitly; there is no global
//!   configuration. The key defaults to `FACTURAPI_KEY` via
//!   [`Client::from_env`] and can be replaced with [`Client::configure`].
//! - Requests are built and responses checked as plain data
//!   ([`HttpRequest`] / [`HttpResponse`]); a [`Transport`] performs the I/O.
//! - Capabilities are traits (`Retrievable`, `Creatable`, `Updatable`,
//!   `Deletable`, `Downloadable`, `Queryable`) that each resource opts into.
//! - Outgoing bodies are sanitized and stripped of null fields before they
//!   are encoded.
//!
//! ```no_run
//! use facturapi::{Client, Customer, Query, Queryable, Retrievable};
//!
//! # fn main() -> facturapi::Result<()> {
//! let client = Client::from_env();
//! let customer = Customer::retrieve(&client, "5fc5aa9938e6a2001b31aa21")?;
//! for invoice in facturapi::Invoice::all(&client, Query::search(&customer.legal_name))?.iter() {
//!     println!("{}", invoice?.total);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod pagination;
pub mod resources;
pub mod sanitize;
pub mod types;

pub use client::Client;
pub use config::Config;
pub use error::{FacturapiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use pagination::{Listing, Page, PageState, Pages};
pub use resources::{
    CancelRequest, Creatable, Customer, CustomerRequest, CustomerUpdateRequest, Deletable,
    Downloadable, Invoice, InvoiceCustomer, InvoiceItem, InvoiceRequest, ItemProduct, Queryable,
    Resource, ResourceUri, Retrievable, Updatable,
};
pub use sanitize::{Sanitize, ToMapping};
pub use types::{FileType, Query};
