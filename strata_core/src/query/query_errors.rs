//! Error types for filter query building

use std::fmt;

/// Errors that can occur while translating a segment filter into SQL
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    /// Field type key is not registered
    UnknownFieldType { key: String },
    /// Operator is not supported for the given field type
    UnsupportedOperator {
        field_type: String,
        operator: String,
        supported: Vec<String>,
    },
    /// Operand cannot be coerced for the field type, or does not fit the operator
    InvalidFieldValue {
        field_type: String,
        value: String,
        expected: String,
    },
    /// A parameter name was bound twice with different values in one query
    DuplicateParameter { name: String },
    /// The query has no join the requested restriction could attach to
    NoUsableJoin { alias: String },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::UnknownFieldType { key } => {
                write!(f, "Unknown field type '{}'", key)
            }
            QueryError::UnsupportedOperator {
                field_type,
                operator,
                supported,
            } => {
                write!(
                    f,
                    "Cannot use '{}' operator on {} fields. Supported: {}",
                    operator,
                    field_type,
                    supported.join(", ")
                )
            }
            QueryError::InvalidFieldValue {
                field_type,
                value,
                expected,
            } => {
                write!(
                    f,
                    "Value '{}' is not valid for a {} field: expected {}",
                    value, field_type, expected
                )
            }
            QueryError::DuplicateParameter { name } => {
                write!(
                    f,
                    "Parameter '{}' is already bound with a different value",
                    name
                )
            }
            QueryError::NoUsableJoin { alias } => {
                write!(
                    f,
                    "Query contains no usable tables under alias '{}' for this restriction",
                    alias
                )
            }
        }
    }
}

impl std::error::Error for QueryError {}
