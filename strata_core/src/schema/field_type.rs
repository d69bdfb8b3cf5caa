//! Field types: storage tables, allowed operators, value coercion
//!
//! Every field type is one variant of a closed enum carrying its storage
//! table and the operator subset it can satisfy. The registry maps type keys
//! to variants; it is built once at startup and never mutated.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::query::{FilterOperator, ParamValue, QueryError};

/// Storage and filtering capabilities of one field type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Email,
    Phone,
    Url,
    Int,
    Date,
    Datetime,
    Select,
    Multiselect,
}

const TEXT_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Eq,
    FilterOperator::Neq,
    FilterOperator::Empty,
    FilterOperator::NotEmpty,
    FilterOperator::Like,
    FilterOperator::NotLike,
    FilterOperator::Contains,
    FilterOperator::In,
    FilterOperator::NotIn,
];

const COMPARABLE_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Eq,
    FilterOperator::Neq,
    FilterOperator::Gt,
    FilterOperator::Gte,
    FilterOperator::Lt,
    FilterOperator::Lte,
    FilterOperator::Empty,
    FilterOperator::NotEmpty,
    FilterOperator::Between,
    FilterOperator::NotBetween,
    FilterOperator::In,
    FilterOperator::NotIn,
];

const SELECT_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Eq,
    FilterOperator::Neq,
    FilterOperator::Empty,
    FilterOperator::NotEmpty,
    FilterOperator::In,
    FilterOperator::NotIn,
];

const MULTISELECT_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Empty,
    FilterOperator::NotEmpty,
    FilterOperator::In,
    FilterOperator::NotIn,
    FilterOperator::Multiselect,
    FilterOperator::NotMultiselect,
];

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

impl FieldType {
    /// Every built-in field type
    pub const ALL: &'static [FieldType] = &[
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Email,
        FieldType::Phone,
        FieldType::Url,
        FieldType::Int,
        FieldType::Date,
        FieldType::Datetime,
        FieldType::Select,
        FieldType::Multiselect,
    ];

    /// The registry key of this type
    pub fn key(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Url => "url",
            FieldType::Int => "int",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::Select => "select",
            FieldType::Multiselect => "multiselect",
        }
    }

    /// The value table storing rows of this type
    pub fn table(&self) -> &'static str {
        match self {
            FieldType::Text
            | FieldType::Textarea
            | FieldType::Email
            | FieldType::Phone
            | FieldType::Url => "custom_field_value_text",
            FieldType::Int => "custom_field_value_int",
            FieldType::Date => "custom_field_value_date",
            FieldType::Datetime => "custom_field_value_datetime",
            FieldType::Select | FieldType::Multiselect => "custom_field_value_option",
        }
    }

    /// Operators a filter on this type may carry
    pub fn allowed_operators(&self) -> &'static [FilterOperator] {
        match self {
            FieldType::Text
            | FieldType::Textarea
            | FieldType::Email
            | FieldType::Phone
            | FieldType::Url => TEXT_OPERATORS,
            FieldType::Int | FieldType::Date | FieldType::Datetime => COMPARABLE_OPERATORS,
            FieldType::Select => SELECT_OPERATORS,
            FieldType::Multiselect => MULTISELECT_OPERATORS,
        }
    }

    pub fn supports(&self, operator: FilterOperator) -> bool {
        self.allowed_operators().contains(&operator)
    }

    /// Whether values of this type live in a choice-option table
    pub fn is_choice(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Multiselect)
    }

    /// Coerce one raw operand into a typed parameter value.
    ///
    /// Int parses as signed 64-bit; date accepts `YYYY-MM-DD`; datetime
    /// accepts `YYYY-MM-DD HH:MM:SS` or RFC 3339 (normalized to UTC).
    /// Everything else passes through as text.
    pub fn coerce_scalar(&self, raw: &str) -> Result<ParamValue, QueryError> {
        match self {
            FieldType::Int => raw
                .trim()
                .parse::<i64>()
                .map(ParamValue::Int)
                .map_err(|_| self.invalid_value(raw, "an integer")),
            FieldType::Date => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
                .map(|date| ParamValue::Text(date.format(DATE_FORMAT).to_string()))
                .map_err(|_| self.invalid_value(raw, "a YYYY-MM-DD date")),
            FieldType::Datetime => parse_datetime(raw.trim())
                .map(|datetime| ParamValue::Text(datetime.format(DATETIME_FORMAT).to_string()))
                .ok_or_else(|| self.invalid_value(raw, "a YYYY-MM-DD HH:MM:SS or RFC 3339 datetime")),
            _ => Ok(ParamValue::Text(raw.to_string())),
        }
    }

    /// Coerce a list operand, preserving the per-item rules of `coerce_scalar`
    pub fn coerce_list(&self, raw: &[String]) -> Result<ParamValue, QueryError> {
        match self {
            FieldType::Int => {
                let mut items = Vec::with_capacity(raw.len());
                for item in raw {
                    match self.coerce_scalar(item)? {
                        ParamValue::Int(n) => items.push(n),
                        // coerce_scalar on Int only produces Int
                        _ => return Err(self.invalid_value(item, "an integer")),
                    }
                }
                Ok(ParamValue::IntList(items))
            }
            FieldType::Date | FieldType::Datetime => {
                let mut items = Vec::with_capacity(raw.len());
                for item in raw {
                    match self.coerce_scalar(item)? {
                        ParamValue::Text(s) => items.push(s),
                        _ => return Err(self.invalid_value(item, "a date")),
                    }
                }
                Ok(ParamValue::TextList(items))
            }
            _ => Ok(ParamValue::TextList(raw.to_vec())),
        }
    }

    fn invalid_value(&self, raw: &str, expected: &str) -> QueryError {
        QueryError::InvalidFieldValue {
            field_type: self.key().to_string(),
            value: raw.to_string(),
            expected: expected.to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT) {
        return Some(datetime);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|datetime| datetime.naive_utc())
}

/// Process-wide lookup from type key to field type
#[derive(Debug, Clone)]
pub struct FieldTypeRegistry {
    types: BTreeMap<&'static str, FieldType>,
}

impl FieldTypeRegistry {
    /// Registry holding every built-in field type
    pub fn standard() -> Self {
        let mut types = BTreeMap::new();
        for field_type in FieldType::ALL {
            types.insert(field_type.key(), *field_type);
        }
        Self { types }
    }

    /// Resolve a type key, failing on anything unregistered
    pub fn resolve(&self, key: &str) -> Result<FieldType, QueryError> {
        self.types
            .get(key)
            .copied()
            .ok_or_else(|| QueryError::UnknownFieldType {
                key: key.to_string(),
            })
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.types.keys().copied()
    }
}

impl Default for FieldTypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
