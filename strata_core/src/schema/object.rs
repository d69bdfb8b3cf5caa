//! Custom object and item definitions

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};

use super::ids::{ItemId, ObjectId};

/// How a custom object participates in item relationships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// A standalone object whose items link to contacts directly
    #[default]
    Master,
    /// An object whose items hang off a master object's items
    Relationship,
}

/// A user-defined entity type whose items carry custom field values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomObject {
    pub id: ObjectId,
    pub name: String,
    /// Storage-safe identifier derived from the name unless overridden
    pub alias: String,
    pub description: Option<String>,
    pub kind: ObjectKind,
    /// The master object this one relates to, for relationship objects
    pub master_object: Option<ObjectId>,
}

impl CustomObject {
    /// Create a master object; the alias derives from the name
    pub fn new(id: ObjectId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            alias: derive_alias(name),
            description: None,
            kind: ObjectKind::Master,
            master_object: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = alias.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Turn this object into a relationship object under `master`
    pub fn as_relationship(mut self, master: ObjectId) -> Self {
        self.kind = ObjectKind::Relationship;
        self.master_object = Some(master);
        self
    }
}

/// One instance of a custom object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomItem {
    pub id: ItemId,
    pub object_id: ObjectId,
    pub name: String,
}

impl CustomItem {
    pub fn new(id: ItemId, object_id: ObjectId, name: &str) -> Self {
        Self {
            id,
            object_id,
            name: name.to_string(),
        }
    }
}

/// Derive a storage-safe alias from a human label
pub(crate) fn derive_alias(label: &str) -> String {
    label.to_case(Case::Snake)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_derives_from_name() {
        let object = CustomObject::new(ObjectId::new(1), "Support Ticket");
        assert_eq!(object.alias, "support_ticket");
        assert_eq!(object.kind, ObjectKind::Master);
        assert_eq!(object.master_object, None);
    }

    #[test]
    fn test_alias_override() {
        let object = CustomObject::new(ObjectId::new(1), "Support Ticket").with_alias("tickets");
        assert_eq!(object.alias, "tickets");
    }

    #[test]
    fn test_relationship_object() {
        let master = ObjectId::new(1);
        let object = CustomObject::new(ObjectId::new(2), "Order Line").as_relationship(master);

        assert_eq!(object.kind, ObjectKind::Relationship);
        assert_eq!(object.master_object, Some(master));
    }

    #[test]
    fn test_derive_alias_shapes() {
        assert_eq!(derive_alias("Mood"), "mood");
        assert_eq!(derive_alias("Favorite Color"), "favorite_color");
        assert_eq!(derive_alias("already_snake"), "already_snake");
    }

    #[test]
    fn test_item() {
        let item = CustomItem::new(ItemId::new(10), ObjectId::new(1), "ticket-10");
        assert_eq!(item.name, "ticket-10");
    }
}
