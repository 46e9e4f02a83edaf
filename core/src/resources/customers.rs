//! Customer resource and its request objects.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::resources::base::{Creatable, Queryable, Resource, Retrievable, Updatable};
use crate::sanitize::{mapping, Map, ToMapping, Value};
use crate::sanitize_mapping;
use crate::types::{CustomerAddress, TaxSystem};

/// A customer (receiver of invoices).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Customer {
    pub id: String,
    pub created_at: DateTime<FixedOffset>,
    pub livemode: bool,
    pub legal_name: String,
    pub tax_id: String,
    pub email: String,
    /// Raw `c_RegimenFiscal` code as the server sent it. See
    /// [`Customer::known_tax_system`].
    pub tax_system: Option<String>,
    pub address: Option<CustomerAddress>,
    pub phone: Option<String>,
}

impl Customer {
    /// The tax regime as a catalog entry, or `None` when it is unset or a
    /// code this crate does not know yet.
    pub fn known_tax_system(&self) -> Option<TaxSystem> {
        self.tax_system.as_deref().and_then(TaxSystem::from_code)
    }
}

impl Resource for Customer {
    const RESOURCE: &'static str = "customers";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Retrievable for Customer {}

impl Queryable for Customer {}

impl Creatable for Customer {
    type CreateRequest = CustomerRequest;
}

impl Updatable for Customer {
    type UpdateRequest = CustomerUpdateRequest;
}

impl ToMapping for Customer {
    fn to_mapping(&self) -> Map<String, Value> {
        mapping! {
            "id" => self.id,
            "created_at" => self.created_at,
            "livemode" => self.livemode,
            "legal_name" => self.legal_name,
            "tax_id" => self.tax_id,
            "email" => self.email,
            "tax_system" => self.tax_system,
            "address" => self.address,
            "phone" => self.phone,
        }
    }
}

/// Data needed to create a customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerRequest {
    pub legal_name: String,
    /// RFC of the customer.
    pub tax_id: String,
    pub email: String,
    pub tax_system: Option<TaxSystem>,
    pub phone: Option<String>,
    pub address: Option<CustomerAddress>,
}

impl ToMapping for CustomerRequest {
    fn to_mapping(&self) -> Map<String, Value> {
        mapping! {
            "legal_name" => self.legal_name,
            "tax_id" => self.tax_id,
            "email" => self.email,
            "tax_system" => self.tax_system,
            "phone" => self.phone,
            "address" => self.address,
        }
    }
}

/// Fields to change on an existing customer; unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerUpdateRequest {
    pub legal_name: Option<String>,
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub tax_system: Option<TaxSystem>,
    pub phone: Option<String>,
    pub address: Option<CustomerAddress>,
}

impl ToMapping for CustomerUpdateRequest {
    fn to_mapping(&self) -> Map<String, Value> {
        mapping! {
            "legal_name" => self.legal_name,
            "tax_id" => self.tax_id,
            "email" => self.email,
            "tax_system" => self.tax_system,
            "phone" => self.phone,
            "address" => self.address,
        }
    }
}

sanitize_mapping!(Customer, CustomerRequest, CustomerUpdateRequest);
