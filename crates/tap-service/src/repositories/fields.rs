//! Typed partial updates.
//!
//! Update endpoints accept a JSON object of `<field>: value` pairs. Each table
//! publishes the fields a client may change, the column each one maps to, and
//! the column's storage type. Unknown fields and mistyped values are rejected
//! before any SQL is built; column names in the generated statement always
//! come from the whitelist, never from the request.

use crate::errors::ApiError;
use serde_json::{Map, Value};
use sqlx::{QueryBuilder, Sqlite};

/// Storage type of an updatable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Real,
}

/// An updatable column: JSON key, column name, type and nullability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdatableColumn {
    pub key: &'static str,
    pub column: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
}

impl UpdatableColumn {
    /// A nullable column.
    pub const fn new(key: &'static str, column: &'static str, kind: ColumnKind) -> Self {
        Self {
            key,
            column,
            kind,
            nullable: true,
        }
    }

    /// A `NOT NULL` column; `null` in a request is rejected as an invalid value.
    pub const fn required(key: &'static str, column: &'static str, kind: ColumnKind) -> Self {
        Self {
            key,
            column,
            kind,
            nullable: false,
        }
    }
}

/// A value coerced to its column type.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Null,
}

/// One `column = value` assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    pub column: &'static str,
    pub value: FieldValue,
}

/// Build assignments from a request body, ignoring `id_key`.
///
/// # Errors
///
/// `ApiError::BadRequest` when no fields remain, a field is not updatable,
/// or a value cannot be stored in its column.
pub fn parse_updates(
    columns: &[UpdatableColumn],
    body: &Map<String, Value>,
    id_key: &str,
) -> Result<Vec<FieldUpdate>, ApiError> {
    let updates = body
        .iter()
        .filter(|(key, _)| key.as_str() != id_key)
        .map(|(key, value)| {
            let column = columns
                .iter()
                .find(|c| c.key == key.as_str())
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown field: {}", key)))?;

            let value = coerce(column.kind, value)
                .filter(|v| column.nullable || *v != FieldValue::Null)
                .ok_or_else(|| ApiError::BadRequest(format!("Invalid value for field: {}", key)))?;

            Ok(FieldUpdate {
                column: column.column,
                value,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    if updates.is_empty() {
        return Err(ApiError::BadRequest(
            "No data provided for update".to_string(),
        ));
    }

    Ok(updates)
}

/// Push `UPDATE <table> SET a = ?, b = ?` onto a fresh builder.
///
/// The caller appends the `WHERE` clause.
pub fn update_statement<'a>(table: &'static str, updates: Vec<FieldUpdate>) -> QueryBuilder<'a, Sqlite> {
    let mut builder = QueryBuilder::new(format!("UPDATE {} SET ", table));

    for (i, update) in updates.into_iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        builder.push(update.column).push(" = ");
        match update.value {
            FieldValue::Text(v) => builder.push_bind(v),
            FieldValue::Integer(v) => builder.push_bind(v),
            FieldValue::Real(v) => builder.push_bind(v),
            FieldValue::Null => builder.push_bind(None::<String>),
        };
    }

    builder
}

fn coerce(kind: ColumnKind, value: &Value) -> Option<FieldValue> {
    match (kind, value) {
        (_, Value::Null) => Some(FieldValue::Null),

        (ColumnKind::Text, Value::String(s)) => Some(FieldValue::Text(s.clone())),
        (ColumnKind::Text, Value::Number(n)) => Some(FieldValue::Text(n.to_string())),

        (ColumnKind::Integer, Value::Number(n)) => n.as_i64().map(FieldValue::Integer),
        (ColumnKind::Integer, Value::Bool(b)) => Some(FieldValue::Integer(i64::from(*b))),
        (ColumnKind::Integer, Value::String(s)) => s.trim().parse().ok().map(FieldValue::Integer),

        (ColumnKind::Real, Value::Number(n)) => n.as_f64().map(FieldValue::Real),
        (ColumnKind::Real, Value::String(s)) => s.trim().parse().ok().map(FieldValue::Real),

        _ => None,
    }
}
