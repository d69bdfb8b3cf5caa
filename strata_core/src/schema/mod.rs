//! Schema model for custom objects, fields and items
//!
//! Objects define user-facing entity types, fields define their typed
//! attributes, items are the stored instances. Field values themselves live
//! in one table per field type; the query engine in `crate::query` builds
//! SQL against that layout.

mod field;
mod field_type;
mod ids;
mod object;
pub mod validation;

pub use field::{CustomField, FieldCatalog, FieldOption};
pub use field_type::{FieldType, FieldTypeRegistry};
pub use ids::{ContactId, FieldId, ItemId, ObjectId};
pub use object::{CustomItem, CustomObject, ObjectKind};
