//! Resource base and capability traits.
//!
//! # Design
//! A resource type implements [`Resource`] (its path and relation names) and
//! then opts into each capability the remote endpoint supports:
//! [`Retrievable`], [`Creatable`], [`Updatable`], [`Deletable`],
//! [`Downloadable`] and [`Queryable`]. Every capability is a set of default
//! methods over the same two primitives: a [`Client`] round-trip and
//! [`from_json`].

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::Client;
use crate::error::{FacturapiError, Result};
use crate::http::Transport;
use crate::pagination::{Listing, Page};
use crate::sanitize::{CatalogCode, Sanitize};
use crate::types::{FileType, Query};

/// A server-owned entity addressed as `/<RESOURCE>/<id>`.
pub trait Resource: DeserializeOwned {
    /// Plural path segment, e.g. `"invoices"`.
    const RESOURCE: &'static str;

    /// Nested objects the server embeds that are kept as relation references.
    ///
    /// For each name, the raw field is removed and replaced by
    /// `<name>_uri = "<name>s/<id>"` and `<name>_info = <raw object>`.
    const RELATIONS: &'static [&'static str] = &[];

    fn id(&self) -> &str;

    /// `<RESOURCE>/<id>`, with `id` encoded as a single path segment.
    fn item_path(id: &str) -> Result<String> {
        Ok(format!("{}/{}", Self::RESOURCE, path_segment(id)?))
    }
}

/// Percent-encode `id` so it stays exactly one path segment.
///
/// `/`, `?`, `#` and `%` never reach the URL unescaped. Empty, `.` and `..`
/// IDs are rejected: they would address the collection or a parent path.
pub fn path_segment(id: &str) -> Result<String> {
    if matches!(id, "" | "." | "..") {
        return Err(FacturapiError::Validation(format!(
            "{id:?} is not a valid resource id"
        )));
    }
    let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
    // Form encoding writes spaces as '+'; a literal '+' is already %2B.
    Ok(encoded.replace('+', "%20"))
}

/// Build a resource from one server JSON object.
///
/// Undeclared fields are ignored. Declared relations are rehomed into
/// `<name>_uri` / `<name>_info` before deserialization.
pub fn from_json<R: Resource>(value: Value) -> Result<R> {
    let value = match value {
        Value::Object(fields) => Value::Object(rehome_relations(fields, R::RELATIONS)),
        other => other,
    };
    Ok(serde_json::from_value(value)?)
}

fn rehome_relations(mut fields: Map<String, Value>, relations: &[&str]) -> Map<String, Value> {
    for name in relations {
        let Some(raw) = fields.remove(*name) else {
            continue;
        };
        let (id, info) = match raw {
            Value::String(id) => {
                let info = serde_json::json!({ "id": id });
                (Some(id), info)
            }
            Value::Object(object) => {
                let id = object.get("id").and_then(Value::as_str).map(str::to_string);
                (id, Value::Object(object))
            }
            _ => continue,
        };
        if let Some(id) = id {
            fields.insert(format!("{name}_uri"), Value::String(format!("{name}s/{id}")));
        }
        fields.insert(format!("{name}_info"), info);
    }
    fields
}

/// Reference to another resource, rendered as `<resource>/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceUri {
    resource: String,
    id: String,
}

impl ResourceUri {
    pub fn new(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            id: id.into(),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource, self.id)
    }
}

impl FromStr for ResourceUri {
    type Err = FacturapiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('/') {
            Some((resource, id)) if !resource.is_empty() && !id.is_empty() && !id.contains('/') => {
                Ok(Self::new(resource, id))
            }
            _ => Err(FacturapiError::InvalidUri(s.to_string())),
        }
    }
}

impl TryFrom<String> for ResourceUri {
    type Error = FacturapiError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ResourceUri> for String {
    fn from(uri: ResourceUri) -> Self {
        uri.to_string()
    }
}

impl Sanitize for ResourceUri {
    fn sanitize(&self) -> Value {
        Value::String(self.to_string())
    }
}

/// Fetch the resource a relation URI points at.
///
/// Fails with [`FacturapiError::InvalidUri`] when the URI names a different
/// resource type than `R`.
pub fn retrieve_related<R: Retrievable, T: Transport>(
    client: &Client<T>,
    uri: &ResourceUri,
) -> Result<R> {
    if uri.resource() != R::RESOURCE {
        return Err(FacturapiError::InvalidUri(uri.to_string()));
    }
    R::retrieve(client, uri.id())
}

/// Resources fetched with `GET /<RESOURCE>/<id>`.
pub trait Retrievable: Resource {
    fn retrieve<T: Transport>(client: &Client<T>, id: &str) -> Result<Self> {
        from_json(client.get(&Self::item_path(id)?, &[])?)
    }

    /// Re-fetch this resource and overwrite every field.
    fn refresh<T: Transport>(&mut self, client: &Client<T>) -> Result<()> {
        *self = Self::retrieve(client, self.id())?;
        Ok(())
    }
}

/// Resources created with `POST /<RESOURCE>`.
pub trait Creatable: Resource {
    type CreateRequest: Sanitize;

    fn create<T: Transport>(client: &Client<T>, data: &Self::CreateRequest) -> Result<Self> {
        from_json(client.post(Self::RESOURCE, data)?)
    }
}

/// Resources updated with `PUT /<RESOURCE>/<id>`.
pub trait Updatable: Resource {
    type UpdateRequest: Sanitize;

    fn update<T: Transport>(
        client: &Client<T>,
        id: &str,
        data: &Self::UpdateRequest,
    ) -> Result<Self> {
        from_json(client.put(&Self::item_path(id)?, data)?)
    }
}

/// Resources removed (or moved to a terminal state) with `DELETE`.
pub trait Deletable: Resource {
    fn delete<T: Transport>(client: &Client<T>, id: &str) -> Result<Self> {
        Self::delete_with(client, id, &[])
    }

    /// `DELETE /<RESOURCE>/<id>?params`.
    fn delete_with<T: Transport>(
        client: &Client<T>,
        id: &str,
        params: &[(String, String)],
    ) -> Result<Self> {
        from_json(client.delete(&Self::item_path(id)?, params)?)
    }
}

/// Resources with file renditions at `/<RESOURCE>/<id>/<file type>`.
pub trait Downloadable: Resource {
    fn download<T: Transport>(client: &Client<T>, id: &str, file_type: FileType) -> Result<Vec<u8>> {
        client.download(&format!("{}/{}", Self::item_path(id)?, file_type.code()))
    }
}

/// Resources listed with `GET /<RESOURCE>?<query>`.
pub trait Queryable: Resource {
    /// Fetch a single page.
    fn page<T: Transport>(client: &Client<T>, query: &Query) -> Result<Page<Self>> {
        query.validate()?;
        Page::from_json(client.get(Self::RESOURCE, &query.to_params())?)
    }

    /// The only match of `query`.
    ///
    /// Asks for at most two results, failing with `NoResultFound` on zero and
    /// `MultipleResultsFound` on two.
    fn one<T: Transport>(client: &Client<T>, query: Query) -> Result<Self> {
        let mut items = Self::page(client, &query.with_limit(2))?.data;
        match items.len() {
            0 => Err(FacturapiError::NoResultFound),
            1 => Ok(items.remove(0)),
            _ => Err(FacturapiError::MultipleResultsFound),
        }
    }

    /// The first match of `query`, if any.
    fn first<T: Transport>(client: &Client<T>, query: Query) -> Result<Option<Self>> {
        Ok(Self::page(client, &query.with_limit(1))?.data.into_iter().next())
    }

    /// Number of items on the single page `query` selects.
    ///
    /// This is the page's item count, bounded by `limit` (or the server's
    /// default page size), not a global total.
    fn count<T: Transport>(client: &Client<T>, query: Query) -> Result<usize> {
        Ok(Self::page(client, &query)?.data.len())
    }

    /// Every match of `query` across all pages.
    ///
    /// The query is validated here; no request is sent until the returned
    /// listing is iterated.
    fn all<T: Transport>(client: &Client<T>, query: Query) -> Result<Listing<'_, T, Self>> {
        query.validate()?;
        Ok(Listing::new(client, query))
    }
}
