//! Filter operator symbols and their SQL comparison shapes

use std::fmt;

use serde::{Deserialize, Serialize};

/// Comparison operators a segment filter can carry
///
/// Serialized forms match the wire spellings used by segment payloads
/// (`"notEmpty"`, `"!multiselect"`, ...). `from_symbol` additionally accepts
/// the legacy negated spellings (`"!empty"`, `"!in"`, `"!like"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "eq")]
    Eq,
    #[serde(rename = "neq")]
    Neq,
    #[serde(rename = "gt")]
    Gt,
    #[serde(rename = "gte")]
    Gte,
    #[serde(rename = "lt")]
    Lt,
    #[serde(rename = "lte")]
    Lte,
    #[serde(rename = "empty")]
    Empty,
    #[serde(rename = "notEmpty")]
    NotEmpty,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "notIn")]
    NotIn,
    #[serde(rename = "multiselect")]
    Multiselect,
    #[serde(rename = "!multiselect")]
    NotMultiselect,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "like")]
    Like,
    #[serde(rename = "notLike")]
    NotLike,
    #[serde(rename = "between")]
    Between,
    #[serde(rename = "!between")]
    NotBetween,
}

impl FilterOperator {
    /// Every operator the engine knows about
    pub const ALL: &'static [FilterOperator] = &[
        FilterOperator::Eq,
        FilterOperator::Neq,
        FilterOperator::Gt,
        FilterOperator::Gte,
        FilterOperator::Lt,
        FilterOperator::Lte,
        FilterOperator::Empty,
        FilterOperator::NotEmpty,
        FilterOperator::In,
        FilterOperator::NotIn,
        FilterOperator::Multiselect,
        FilterOperator::NotMultiselect,
        FilterOperator::Contains,
        FilterOperator::Like,
        FilterOperator::NotLike,
        FilterOperator::Between,
        FilterOperator::NotBetween,
    ];

    /// Canonical wire spelling of this operator
    pub fn symbol(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Empty => "empty",
            FilterOperator::NotEmpty => "notEmpty",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "notIn",
            FilterOperator::Multiselect => "multiselect",
            FilterOperator::NotMultiselect => "!multiselect",
            FilterOperator::Contains => "contains",
            FilterOperator::Like => "like",
            FilterOperator::NotLike => "notLike",
            FilterOperator::Between => "between",
            FilterOperator::NotBetween => "!between",
        }
    }

    /// Parse an operator symbol, failing closed on anything unknown
    pub fn from_symbol(symbol: &str) -> Option<FilterOperator> {
        match symbol {
            "eq" | "=" => Some(FilterOperator::Eq),
            "neq" | "!=" => Some(FilterOperator::Neq),
            "gt" => Some(FilterOperator::Gt),
            "gte" => Some(FilterOperator::Gte),
            "lt" => Some(FilterOperator::Lt),
            "lte" => Some(FilterOperator::Lte),
            "empty" => Some(FilterOperator::Empty),
            "notEmpty" | "!empty" => Some(FilterOperator::NotEmpty),
            "in" => Some(FilterOperator::In),
            "notIn" | "!in" => Some(FilterOperator::NotIn),
            "multiselect" => Some(FilterOperator::Multiselect),
            "!multiselect" => Some(FilterOperator::NotMultiselect),
            "contains" => Some(FilterOperator::Contains),
            "like" => Some(FilterOperator::Like),
            "notLike" | "!like" => Some(FilterOperator::NotLike),
            "between" => Some(FilterOperator::Between),
            "!between" => Some(FilterOperator::NotBetween),
            _ => None,
        }
    }

    /// Whether applying this operator requires an operand value
    pub fn requires_value(&self) -> bool {
        !matches!(self, FilterOperator::Empty | FilterOperator::NotEmpty)
    }

    /// The SQL infix operator for the direct-comparison operators
    pub(crate) fn sql_comparison(&self) -> Option<&'static str> {
        match self {
            FilterOperator::Eq => Some("="),
            FilterOperator::Neq => Some("<>"),
            FilterOperator::Gt => Some(">"),
            FilterOperator::Gte => Some(">="),
            FilterOperator::Lt => Some("<"),
            FilterOperator::Lte => Some("<="),
            FilterOperator::Like => Some("LIKE"),
            _ => None,
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
