//! Conversion of rich values into JSON primitives.
//!
//! Outgoing payloads are built by calling [`Sanitize::sanitize`] on a request
//! object and then removing null-valued keys with [`strip_nulls`]. The rules,
//! applied depth-first:
//!
//! - a `NaiveDateTime` is taken as UTC and rendered as ISO-8601 with a
//!   `+00:00` offset; an offset-aware `DateTime` keeps its own offset;
//! - a catalog value ([`CatalogCode`]) becomes its raw code;
//! - a [`ToMapping`] object becomes its (sanitized) mapping;
//! - anything else passes through unchanged.
//!
//! JSON has no NaN or infinity. A non-finite `f32`/`f64` sanitizes to null,
//! so [`strip_nulls`] drops its key and the field is sent as if it were
//! unset. Check floats with `is_finite` before building a request when an
//! absent field would be accepted by the server.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

pub use serde_json::{Map, Value};

/// Converts a value into a JSON-safe [`Value`].
pub trait Sanitize {
    fn sanitize(&self) -> Value;
}

/// Objects that can describe themselves as a string-keyed mapping.
///
/// Link an implementor into [`Sanitize`] with
/// [`sanitize_mapping!`](crate::sanitize_mapping).
pub trait ToMapping {
    fn to_mapping(&self) -> Map<String, Value>;
}

/// Enum-like values backed by a fixed catalog code.
pub trait CatalogCode {
    fn code(&self) -> &'static str;
}

/// Implements [`Sanitize`] for types that implement [`ToMapping`].
#[macro_export]
macro_rules! sanitize_mapping {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::sanitize::Sanitize for $ty {
                fn sanitize(&self) -> $crate::sanitize::Value {
                    let mapping = $crate::sanitize::ToMapping::to_mapping(self);
                    $crate::sanitize::Sanitize::sanitize(&mapping)
                }
            }
        )+
    };
}

/// Builds a sanitized `Map` from `"key" => expr` pairs.
macro_rules! mapping {
    ($($key:literal => $value:expr),* $(,)?) => {{
        let mut map = $crate::sanitize::Map::new();
        $(
            map.insert(
                $key.to_string(),
                $crate::sanitize::Sanitize::sanitize(&$value),
            );
        )*
        map
    }};
}
pub(crate) use mapping;

/// Declares a catalog enum whose variants map one-to-one onto string codes.
///
/// The generated type serializes and deserializes as its code and sanitizes
/// to it.
macro_rules! catalog {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn from_code(code: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| {
                    $crate::sanitize::CatalogCode::code(v) == code
                })
            }
        }

        impl $crate::sanitize::CatalogCode for $name {
            fn code(&self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }
        }

        impl $crate::sanitize::Sanitize for $name {
            fn sanitize(&self) -> $crate::sanitize::Value {
                $crate::sanitize::Value::String(
                    $crate::sanitize::CatalogCode::code(self).to_string(),
                )
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::sanitize::CatalogCode::code(self))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::FacturapiError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                Self::from_code(s).ok_or_else(|| {
                    $crate::error::FacturapiError::Validation(format!(
                        "unknown {} code {s:?}",
                        stringify!($name)
                    ))
                })
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(
                &self,
                serializer: S,
            ) -> ::std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str($crate::sanitize::CatalogCode::code(self))
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(
                deserializer: D,
            ) -> ::std::result::Result<Self, D::Error> {
                let code = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                Self::from_code(&code).ok_or_else(|| {
                    <D::Error as ::serde::de::Error>::custom(format!(
                        "unknown {} code {code:?}",
                        stringify!($name)
                    ))
                })
            }
        }
    };
}
pub(crate) use catalog;

/// Remove every null-valued key, recursing through objects and arrays.
///
/// Null elements of arrays are kept; only mapping entries are dropped.
pub fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

macro_rules! sanitize_via_from {
    ($($ty:ty),+) => {
        $(
            impl Sanitize for $ty {
                fn sanitize(&self) -> Value {
                    Value::from(*self)
                }
            }
        )+
    };
}

// Non-finite floats come out as `Value::Null`.
sanitize_via_from!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl Sanitize for str {
    fn sanitize(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl Sanitize for String {
    fn sanitize(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Sanitize for Value {
    fn sanitize(&self) -> Value {
        match self {
            Value::Array(items) => items.sanitize(),
            Value::Object(map) => map.sanitize(),
            other => other.clone(),
        }
    }
}

impl Sanitize for Map<String, Value> {
    fn sanitize(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(k, v)| (k.clone(), v.sanitize()))
                .collect(),
        )
    }
}

impl<T: Sanitize + ?Sized> Sanitize for &T {
    fn sanitize(&self) -> Value {
        (**self).sanitize()
    }
}

impl<T: Sanitize + ?Sized> Sanitize for Box<T> {
    fn sanitize(&self) -> Value {
        (**self).sanitize()
    }
}

impl<T: Sanitize> Sanitize for Option<T> {
    fn sanitize(&self) -> Value {
        match self {
            Some(value) => value.sanitize(),
            None => Value::Null,
        }
    }
}

impl<T: Sanitize> Sanitize for [T] {
    fn sanitize(&self) -> Value {
        Value::Array(self.iter().map(Sanitize::sanitize).collect())
    }
}

impl<T: Sanitize> Sanitize for Vec<T> {
    fn sanitize(&self) -> Value {
        self.as_slice().sanitize()
    }
}

impl<K: AsRef<str>, V: Sanitize> Sanitize for BTreeMap<K, V> {
    fn sanitize(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(k, v)| (k.as_ref().to_string(), v.sanitize()))
                .collect(),
        )
    }
}

impl<K: AsRef<str>, V: Sanitize, S> Sanitize for HashMap<K, V, S> {
    fn sanitize(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(k, v)| (k.as_ref().to_string(), v.sanitize()))
                .collect(),
        )
    }
}

impl Sanitize for NaiveDateTime {
    fn sanitize(&self) -> Value {
        Utc.from_utc_datetime(self).sanitize()
    }
}

impl<Tz: TimeZone> Sanitize for DateTime<Tz>
where
    Tz::Offset: std::fmt::Display,
{
    fn sanitize(&self) -> Value {
        Value::String(self.to_rfc3339_opts(SecondsFormat::AutoSi, false))
    }
}

impl Sanitize for NaiveDate {
    fn sanitize(&self) -> Value {
        Value::String(self.format("%Y-%m-%d").to_string())
    }
}
