//! Object serialization.
//!
//! The same [`Serializer`] decodes request bodies, coerces path and query
//! strings, encodes return values, and tells the schema generator how enums
//! and dates look on the wire. [`JsonSerializer`] is the `serde_json`
//! implementation. Its options are applied by a shape-directed walk over
//! the `serde_json::Value` produced by serde.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::reflect::ScalarType;
use crate::shape::{Shape, ShapeId, ShapeView};

/// How enum values are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumFormat {
    /// As declared (after serde renames).
    #[default]
    Declared,
    /// All lowercase.
    Lowercase,
    /// All uppercase.
    Uppercase,
}

impl EnumFormat {
    /// Renders a declared enum value.
    pub fn apply(self, declared: &str) -> String {
        match self {
            Self::Declared => declared.to_string(),
            Self::Lowercase => declared.to_lowercase(),
            Self::Uppercase => declared.to_uppercase(),
        }
    }
}

/// How date-times are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// RFC 3339 strings.
    #[default]
    Rfc3339,
    /// Milliseconds since the Unix epoch.
    EpochMillis,
}

/// Serializer configuration shared by dispatch and documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerOptions {
    /// Accept body fields not declared by the model
    pub ignore_unknown_fields: bool,
    /// Leave `null` fields out of encoded objects
    pub omit_null_fields: bool,
    /// Enum rendering
    pub enum_format: EnumFormat,
    /// Date-time rendering
    pub date_format: DateFormat,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            ignore_unknown_fields: true,
            omit_null_fields: true,
            enum_format: EnumFormat::Declared,
            date_format: DateFormat::Rfc3339,
        }
    }
}

/// Error raised while converting between bytes, strings and values.
#[derive(Error, Debug)]
pub enum SerializationError {
    /// The payload is not valid JSON.
    #[error("malformed JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    /// An object contained a field its model does not declare.
    #[error("unknown field '{field}' at {path}")]
    UnknownField {
        /// Location of the object.
        path: String,
        /// The unexpected field.
        field: String,
    },

    /// A value does not fit its declared type.
    #[error("invalid value at {path}: {reason}")]
    InvalidValue {
        /// Location of the value.
        path: String,
        /// What went wrong.
        reason: String,
    },
}

impl SerializationError {
    fn invalid(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Converts values to and from their wire representation.
pub trait Serializer: Send + Sync + fmt::Debug {
    /// Returns the options in effect.
    fn options(&self) -> &SerializerOptions;

    /// Encodes a return value.
    fn encode(&self, value: Value, shape: ShapeView<'_>) -> Result<Vec<u8>, SerializationError>;

    /// Decodes a request body.
    fn decode(&self, bytes: &[u8], shape: ShapeView<'_>) -> Result<Value, SerializationError>;

    /// Converts a single path or query string.
    fn coerce(&self, raw: &str, shape: ShapeView<'_>) -> Result<Value, SerializationError>;
}

/// `serde_json` backed [`Serializer`].
///
/// # Example
///
/// ```rust
/// use slate_core::{EnumFormat, JsonSerializer, Serializer, SerializerOptions, ShapeTable, TypeRef};
///
/// let serializer = JsonSerializer::new(SerializerOptions {
///     enum_format: EnumFormat::Lowercase,
///     ..SerializerOptions::default()
/// });
/// let mut shapes = ShapeTable::new();
/// let id = shapes.intern(TypeRef::of::<u32>());
///
/// let value = serializer.coerce("42", shapes.view(id)).unwrap();
/// assert_eq!(value, serde_json::json!(42));
/// assert!(serializer.coerce("forty-two", shapes.view(id)).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    options: SerializerOptions,
}

impl JsonSerializer {
    /// Creates a serializer with `options`.
    pub fn new(options: SerializerOptions) -> Self {
        Self { options }
    }

    fn outgoing(&self, value: Value, view: ShapeView<'_>) -> Value {
        match (view.shape(), value) {
            (_, Value::Null) => Value::Null,
            (Shape::Optional(inner), value) => self.outgoing(value, view.child(*inner)),
            (Shape::List(inner), Value::Array(items)) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.outgoing(item, view.child(*inner)))
                    .collect(),
            ),
            (Shape::Map(inner), Value::Object(map)) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, self.outgoing(v, view.child(*inner))))
                    .collect(),
            ),
            (Shape::Enum(_), Value::String(s)) => Value::String(self.options.enum_format.apply(&s)),
            (Shape::Scalar(ScalarType::DateTime), Value::String(s))
                if self.options.date_format == DateFormat::EpochMillis =>
            {
                parse_date_time(&s)
                    .map(|dt| Value::Number(dt.timestamp_millis().into()))
                    .unwrap_or(Value::String(s))
            }
            (Shape::Object { fields }, Value::Object(map)) => {
                Value::Object(self.outgoing_fields(map, fields, view))
            }
            (Shape::Polymorphic { property, variants }, Value::Object(map)) => {
                let variant = map
                    .get(property)
                    .and_then(Value::as_str)
                    .and_then(|tag| variants.iter().find(|(t, _)| t == tag));
                match variant.map(|(_, id)| view.child(*id).shape()) {
                    Some(Shape::Object { fields }) => {
                        Value::Object(self.outgoing_fields(map, fields, view))
                    }
                    _ => Value::Object(map),
                }
            }
            (_, value) => value,
        }
    }

    fn outgoing_fields(
        &self,
        map: Map<String, Value>,
        fields: &[(String, ShapeId)],
        view: ShapeView<'_>,
    ) -> Map<String, Value> {
        map.into_iter()
            .filter(|(_, v)| !(self.options.omit_null_fields && v.is_null()))
            .map(|(k, v)| {
                let v = match fields.iter().find(|(name, _)| *name == k) {
                    Some((_, id)) => self.outgoing(v, view.child(*id)),
                    None => v,
                };
                (k, v)
            })
            .collect()
    }

    fn incoming(
        &self,
        value: Value,
        view: ShapeView<'_>,
        path: &str,
    ) -> Result<Value, SerializationError> {
        Ok(match (view.shape(), value) {
            (_, Value::Null) => Value::Null,
            (Shape::Optional(inner), value) => self.incoming(value, view.child(*inner), path)?,
            (Shape::List(inner), Value::Array(items)) => Value::Array(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        self.incoming(item, view.child(*inner), &format!("{path}[{i}]"))
                    })
                    .collect::<Result<_, _>>()?,
            ),
            (Shape::Map(inner), Value::Object(map)) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| {
                        let v = self.incoming(v, view.child(*inner), &format!("{path}.{k}"))?;
                        Ok((k, v))
                    })
                    .collect::<Result<_, SerializationError>>()?,
            ),
            (Shape::Enum(declared), Value::String(s)) => {
                Value::String(self.match_enum(declared, &s, path)?)
            }
            (Shape::Scalar(ScalarType::DateTime), Value::Number(n)) => {
                let millis = n.as_i64().ok_or_else(|| {
                    SerializationError::invalid(path, "expected epoch milliseconds")
                })?;
                let dt = DateTime::<Utc>::from_timestamp_millis(millis)
                    .ok_or_else(|| SerializationError::invalid(path, "timestamp out of range"))?;
                Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            (Shape::Object { fields }, Value::Object(map)) => {
                Value::Object(self.incoming_fields(map, fields, None, view, path)?)
            }
            (Shape::Polymorphic { property, variants }, Value::Object(map)) => {
                let tag = map
                    .get(property)
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        SerializationError::invalid(path, format!("missing type tag '{property}'"))
                    })?;
                let (_, id) = variants.iter().find(|(t, _)| t == tag).ok_or_else(|| {
                    SerializationError::invalid(path, format!("unknown type tag '{tag}'"))
                })?;
                match view.child(*id).shape() {
                    Shape::Object { fields } => Value::Object(self.incoming_fields(
                        map,
                        fields,
                        Some(property),
                        view,
                        path,
                    )?),
                    _ => Value::Object(map),
                }
            }
            (_, value) => value,
        })
    }

    fn incoming_fields(
        &self,
        map: Map<String, Value>,
        fields: &[(String, ShapeId)],
        tag_property: Option<&str>,
        view: ShapeView<'_>,
        path: &str,
    ) -> Result<Map<String, Value>, SerializationError> {
        let mut out = Map::with_capacity(map.len());
        for (key, value) in map {
            let value = match fields.iter().find(|(name, _)| *name == key) {
                Some((_, id)) => self.incoming(value, view.child(*id), &format!("{path}.{key}"))?,
                None if self.options.ignore_unknown_fields
                    || tag_property == Some(key.as_str()) =>
                {
                    value
                }
                None => {
                    return Err(SerializationError::UnknownField {
                        path: path.to_string(),
                        field: key,
                    })
                }
            };
            out.insert(key, value);
        }
        Ok(out)
    }

    fn match_enum(
        &self,
        declared: &[String],
        raw: &str,
        path: &str,
    ) -> Result<String, SerializationError> {
        declared
            .iter()
            .find(|d| {
                d.as_str() == raw
                    || self.options.enum_format.apply(d) == raw
                    || d.eq_ignore_ascii_case(raw)
            })
            .cloned()
            .ok_or_else(|| {
                let expected: Vec<String> = declared
                    .iter()
                    .map(|d| self.options.enum_format.apply(d))
                    .collect();
                SerializationError::invalid(
                    path,
                    format!("'{raw}' is not one of [{}]", expected.join(", ")),
                )
            })
    }
}

impl Serializer for JsonSerializer {
    fn options(&self) -> &SerializerOptions {
        &self.options
    }

    fn encode(&self, value: Value, shape: ShapeView<'_>) -> Result<Vec<u8>, SerializationError> {
        Ok(serde_json::to_vec(&self.outgoing(value, shape))?)
    }

    fn decode(&self, bytes: &[u8], shape: ShapeView<'_>) -> Result<Value, SerializationError> {
        let value: Value = serde_json::from_slice(bytes)?;
        self.incoming(value, shape, "$")
    }

    fn coerce(&self, raw: &str, shape: ShapeView<'_>) -> Result<Value, SerializationError> {
        let path = "$";
        match shape.shape() {
            Shape::Optional(_) if raw.is_empty() => Ok(Value::Null),
            Shape::Optional(inner) => self.coerce(raw, shape.child(*inner)),
            Shape::Any => Ok(Value::String(raw.to_string())),
            Shape::Enum(declared) => Ok(Value::String(self.match_enum(declared, raw, path)?)),
            Shape::Scalar(scalar) => coerce_scalar(*scalar, raw).ok_or_else(|| {
                SerializationError::invalid(
                    path,
                    format!("'{raw}' is not a valid {}", scalar_label(*scalar)),
                )
            }),
            _ => Err(SerializationError::invalid(
                path,
                "structured values cannot be read from a single string",
            )),
        }
    }
}

fn coerce_scalar(scalar: ScalarType, raw: &str) -> Option<Value> {
    match scalar {
        ScalarType::String | ScalarType::Date => Some(Value::String(raw.to_string())),
        ScalarType::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        ScalarType::Int32 | ScalarType::Int64 => raw
            .parse::<i64>()
            .map(Value::from)
            .or_else(|_| raw.parse::<u64>().map(Value::from))
            .ok(),
        ScalarType::Float | ScalarType::Double => raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        ScalarType::DateTime => match raw.parse::<i64>() {
            Ok(millis) => DateTime::<Utc>::from_timestamp_millis(millis)
                .map(|dt| Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))),
            Err(_) => parse_date_time(raw).map(|_| Value::String(raw.to_string())),
        },
    }
}

const fn scalar_label(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::String => "string",
        ScalarType::Boolean => "boolean",
        ScalarType::Int32 | ScalarType::Int64 => "integer",
        ScalarType::Float | ScalarType::Double => "number",
        ScalarType::DateTime => "date-time",
        ScalarType::Date => "date",
    }
}

fn parse_date_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}
