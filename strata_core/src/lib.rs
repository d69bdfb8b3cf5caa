//! Core schema model and filter query engine for Strata
//!
//! Strata lets an application define custom objects with typed custom
//! fields. Field values are stored in an entity-attribute-value layout, one
//! value table per field type, and contact segments filter over those values.
//! This crate provides:
//! - The schema model: objects, fields, items and their validation
//! - The filter query engine: translating one segment filter into a
//!   parameterized SQL predicate with the joins it needs

pub mod query;
pub mod schema;

// Re-export the core types
pub use query::{
    Expr, FilterOperator, FilterQueryBuilder, FilterValue, ParamValue, QueryBuilder, QueryError,
    SegmentFilter, UnionQueryContainer,
};
pub use schema::{
    ContactId, CustomField, CustomItem, CustomObject, FieldCatalog, FieldId, FieldOption,
    FieldType, FieldTypeRegistry, ItemId, ObjectId, ObjectKind,
};
