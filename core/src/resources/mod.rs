//! Resource types and the capability traits they implement.

mod base;
mod customers;
mod invoices;

pub use base::{
    from_json, retrieve_related, Creatable, Deletable, Downloadable, Queryable, Resource,
    ResourceUri, Retrievable, Updatable,
};
pub use customers::{Customer, CustomerRequest, CustomerUpdateRequest};
pub use invoices::{
    CancelRequest, Invoice, InvoiceCustomer, InvoiceItem, InvoiceRequest, ItemProduct,
};
