//! Parameter values and binding conventions
//!
//! Parameter names derive deterministically from a base name (usually the
//! filter's table alias plus a purpose suffix). Callers applying several
//! filters to one query must vary the alias per filter; the builder rejects
//! a name bound twice with different values.

use super::builder::QueryBuilder;
use super::query_errors::QueryError;

/// A value bound to a named query parameter
///
/// List values render as an expanded `IN (...)` placeholder list; scalar
/// values render as a single placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Int(i64),
    Float(f64),
    TextList(Vec<String>),
    IntList(Vec<i64>),
}

impl ParamValue {
    pub fn is_list(&self) -> bool {
        matches!(self, ParamValue::TextList(_) | ParamValue::IntList(_))
    }

    /// Number of items when this is a list value
    pub(crate) fn list_len(&self) -> Option<usize> {
        match self {
            ParamValue::TextList(items) => Some(items.len()),
            ParamValue::IntList(items) => Some(items.len()),
            _ => None,
        }
    }
}

/// Conventional name for a filter's value parameter
pub(crate) fn value_param_name(base_name: &str) -> String {
    format!("{}_value", base_name)
}

/// Conventional names for a range filter's two parameters
pub(crate) fn range_param_names(base_name: &str) -> (String, String) {
    (
        format!("{}_value_from", base_name),
        format!("{}_value_to", base_name),
    )
}

/// Bind a value under the conventional `<base>_value` name.
///
/// Returns the generated parameter name. Fails with `DuplicateParameter`
/// when the name is already bound to a different value.
pub fn bind(
    query: &mut QueryBuilder,
    base_name: &str,
    value: ParamValue,
) -> Result<String, QueryError> {
    let name = value_param_name(base_name);
    query.set_parameter(&name, value)?;
    Ok(name)
}

/// Bind both ends of a range under `<base>_value_from` / `<base>_value_to`.
///
/// Either both parameters bind or neither does.
pub fn bind_range(
    query: &mut QueryBuilder,
    base_name: &str,
    from: ParamValue,
    to: ParamValue,
) -> Result<(String, String), QueryError> {
    let (from_name, to_name) = range_param_names(base_name);

    for (name, value) in [(&from_name, &from), (&to_name, &to)] {
        if let Some(existing) = query.parameter(name) {
            if existing != value {
                return Err(QueryError::DuplicateParameter { name: name.clone() });
            }
        }
    }

    query.set_parameter(&from_name, from)?;
    query.set_parameter(&to_name, to)?;
    Ok((from_name, to_name))
}
