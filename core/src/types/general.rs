//! Nested models shared by resources and request objects.

use serde::{Deserialize, Serialize};

use crate::sanitize::{mapping, Map, ToMapping, Value};
use crate::sanitize_mapping;

/// Postal address of a customer. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerAddress {
    pub street: Option<String>,
    pub exterior: Option<String>,
    pub interior: Option<String>,
    pub neighborhood: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub municipality: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl ToMapping for CustomerAddress {
    fn to_mapping(&self) -> Map<String, Value> {
        mapping! {
            "street" => self.street,
            "exterior" => self.exterior,
            "interior" => self.interior,
            "neighborhood" => self.neighborhood,
            "zip" => self.zip,
            "city" => self.city,
            "municipality" => self.municipality,
            "state" => self.state,
            "country" => self.country,
        }
    }
}

/// Customer data embedded in other resources.
///
/// Only `id` is guaranteed: a relation given as a bare ID carries nothing
/// else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerBasicInfo {
    pub id: String,
    pub legal_name: Option<String>,
    pub tax_id: Option<String>,
}

impl ToMapping for CustomerBasicInfo {
    fn to_mapping(&self) -> Map<String, Value> {
        mapping! {
            "id" => self.id,
            "legal_name" => self.legal_name,
            "tax_id" => self.tax_id,
        }
    }
}

/// A tax applied to a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tax {
    pub rate: f64,
    #[serde(rename = "type")]
    pub tax_type: Option<String>,
    pub withholding: Option<bool>,
    pub factor: Option<String>,
}

impl ToMapping for Tax {
    fn to_mapping(&self) -> Map<String, Value> {
        mapping! {
            "rate" => self.rate,
            "type" => self.tax_type,
            "withholding" => self.withholding,
            "factor" => self.factor,
        }
    }
}

/// Product data embedded in an invoice item returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductBasicInfo {
    pub id: String,
    pub description: String,
    pub product_key: Option<String>,
    pub price: f64,
    pub tax_included: Option<bool>,
    #[serde(default)]
    pub taxes: Vec<Tax>,
    pub unit_key: Option<String>,
    pub unit_name: Option<String>,
    pub sku: Option<String>,
}

impl ToMapping for ProductBasicInfo {
    fn to_mapping(&self) -> Map<String, Value> {
        mapping! {
            "id" => self.id,
            "description" => self.description,
            "product_key" => self.product_key,
            "price" => self.price,
            "tax_included" => self.tax_included,
            "taxes" => self.taxes,
            "unit_key" => self.unit_key,
            "unit_name" => self.unit_name,
            "sku" => self.sku,
        }
    }
}

/// Inline product definition for an invoice item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRequest {
    pub description: String,
    pub product_key: String,
    pub price: f64,
    pub tax_included: Option<bool>,
    pub taxes: Option<Vec<Tax>>,
    pub unit_key: Option<String>,
    pub unit_name: Option<String>,
    pub sku: Option<String>,
}

impl ToMapping for ProductRequest {
    fn to_mapping(&self) -> Map<String, Value> {
        mapping! {
            "description" => self.description,
            "product_key" => self.product_key,
            "price" => self.price,
            "tax_included" => self.tax_included,
            "taxes" => self.taxes,
            "unit_key" => self.unit_key,
            "unit_name" => self.unit_name,
            "sku" => self.sku,
        }
    }
}

/// A component part of an invoice item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPart {
    pub description: String,
    pub product_key: String,
    pub quantity: Option<u32>,
    pub sku: Option<String>,
    pub unit_price: Option<f64>,
    pub customs_keys: Option<Vec<String>>,
}

impl ToMapping for ItemPart {
    fn to_mapping(&self) -> Map<String, Value> {
        mapping! {
            "description" => self.description,
            "product_key" => self.product_key,
            "quantity" => self.quantity,
            "sku" => self.sku,
            "unit_price" => self.unit_price,
            "customs_keys" => self.customs_keys,
        }
    }
}

/// XML namespace declared for addenda or item complements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    pub prefix: String,
    pub uri: String,
    pub schema_location: String,
}

impl ToMapping for Namespace {
    fn to_mapping(&self) -> Map<String, Value> {
        mapping! {
            "prefix" => self.prefix,
            "uri" => self.uri,
            "schema_location" => self.schema_location,
        }
    }
}

sanitize_mapping!(
    CustomerAddress,
    CustomerBasicInfo,
    Tax,
    ProductBasicInfo,
    ProductRequest,
    ItemPart,
    Namespace,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::{strip_nulls, Sanitize};
    use serde_json::json;

    #[test]
    fn partial_address_keeps_only_set_fields() {
        let address = CustomerAddress {
            street: Some("Colima".to_string()),
            zip: Some("06700".to_string()),
            ..Default::default()
        };
        assert_eq!(
            strip_nulls(address.sanitize()),
            json!({"street": "Colima", "zip": "06700"})
        );
    }

    #[test]
    fn tax_type_maps_to_type_key() {
        let tax = Tax {
            rate: 0.16,
            tax_type: Some("IVA".to_string()),
            withholding: Some(false),
            factor: None,
        };
        assert_eq!(
            strip_nulls(tax.sanitize()),
            json!({"rate": 0.16, "type": "IVA", "withholding": false})
        );
    }

    #[test]
    fn basic_info_accepts_bare_id() {
        let info: CustomerBasicInfo = serde_json::from_value(json!({"id": "c1"})).unwrap();
        assert_eq!(info.id, "c1");
        assert!(info.legal_name.is_none());
    }
}
