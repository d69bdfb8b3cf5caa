//! Segment filter model and operator dispatch

mod dispatch;

pub use dispatch::{Binding, ExpressionSpec, operator_expression};

use serde::{Deserialize, Serialize};

use crate::query::FilterOperator;
use crate::schema::{CustomField, FieldId};

/// One condition of a contact segment against a custom field
///
/// Transient: constructed per query build, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentFilter {
    pub field_id: FieldId,
    /// Type key of the field, resolved through the registry when applied
    pub field_type: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl SegmentFilter {
    pub fn new(
        field_id: FieldId,
        type_key: &str,
        operator: FilterOperator,
        value: FilterValue,
    ) -> Self {
        Self {
            field_id,
            field_type: type_key.to_string(),
            operator,
            value,
        }
    }

    /// Build a filter against a known field definition
    pub fn for_field(field: &CustomField, operator: FilterOperator, value: FilterValue) -> Self {
        Self::new(field.id, &field.type_key, operator, value)
    }
}

/// Operand of a segment filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// No operand (`empty` / `notEmpty`)
    None,
    Scalar(String),
    List(Vec<String>),
    Range { from: String, to: String },
}

impl FilterValue {
    pub fn scalar(value: &str) -> Self {
        FilterValue::Scalar(value.to_string())
    }

    pub fn list(values: &[&str]) -> Self {
        FilterValue::List(values.iter().map(|v| v.to_string()).collect())
    }

    pub fn range(from: &str, to: &str) -> Self {
        FilterValue::Range {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Coerce a JSON payload value into a filter operand.
    ///
    /// Numbers and booleans stringify; nested arrays flatten to their scalar
    /// string forms. Objects other than `{from, to}` carry no usable operand.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FilterValue::None,
            serde_json::Value::Bool(b) => FilterValue::Scalar(b.to_string()),
            serde_json::Value::Number(n) => FilterValue::Scalar(n.to_string()),
            serde_json::Value::String(s) => FilterValue::Scalar(s.clone()),
            serde_json::Value::Array(items) => {
                FilterValue::List(items.iter().map(json_scalar_string).collect())
            }
            serde_json::Value::Object(map) => {
                match (map.get("from"), map.get("to")) {
                    (Some(from), Some(to)) => FilterValue::Range {
                        from: json_scalar_string(from),
                        to: json_scalar_string(to),
                    },
                    _ => FilterValue::None,
                }
            }
        }
    }
}

fn json_scalar_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
