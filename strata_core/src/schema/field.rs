//! Custom field definitions and the field catalog

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::field_type::FieldType;
use super::ids::{FieldId, ObjectId};
use super::object::derive_alias;

/// One selectable choice of a select/multiselect field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
    pub order: usize,
}

impl FieldOption {
    pub fn new(label: &str, value: &str, order: usize) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
            order,
        }
    }
}

/// A typed attribute of a custom object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: FieldId,
    pub object_id: ObjectId,
    pub label: String,
    /// Storage-safe identifier derived from the label unless overridden
    pub alias: String,
    /// Registry key of the field's type
    pub type_key: String,
    /// Choices for select/multiselect fields, ordered by `order`
    pub options: Vec<FieldOption>,
}

impl CustomField {
    pub fn new(id: FieldId, object_id: ObjectId, label: &str, field_type: FieldType) -> Self {
        Self {
            id,
            object_id,
            label: label.to_string(),
            alias: derive_alias(label),
            type_key: field_type.key().to_string(),
            options: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = alias.to_string();
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }
}

/// In-memory lookup from field id to its definition.
///
/// Backs the engine's field-type resolution for callers that hold field ids
/// rather than full definitions.
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    fields: BTreeMap<FieldId, CustomField>,
}

impl FieldCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: CustomField) {
        self.fields.insert(field.id, field);
    }

    pub fn field(&self, id: FieldId) -> Option<&CustomField> {
        self.fields.get(&id)
    }

    /// The type key registered for a field id
    pub fn type_key_for(&self, id: FieldId) -> Option<&str> {
        self.fields.get(&id).map(|field| field.type_key.as_str())
    }

    /// All fields belonging to one object, in id order
    pub fn fields_of(&self, object_id: ObjectId) -> Vec<&CustomField> {
        self.fields
            .values()
            .filter(|field| field.object_id == object_id)
            .collect()
    }
}
