//! Catalogs, nested models and query parameters.

pub mod enums;
pub mod general;
pub mod queries;

pub use enums::{
    CancellationMotive, FileType, InvoiceRelation, InvoiceType, InvoiceUse, PaymentForm,
    PaymentMethod, TaxSystem,
};
pub use general::{
    CustomerAddress, CustomerBasicInfo, ItemPart, Namespace, ProductBasicInfo, ProductRequest,
    Tax,
};
pub use queries::{DateFilter, Query, MAX_PAGE_SIZE, MIN_PAGE};
