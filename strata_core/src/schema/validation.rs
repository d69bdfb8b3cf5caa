//! Schema validation for custom objects and fields

use std::fmt;

use log::debug;

use super::field::CustomField;
use super::field_type::FieldTypeRegistry;
use super::object::CustomObject;

pub const MAX_NAME_LENGTH: usize = 255;
pub const MAX_ALIAS_LENGTH: usize = 255;
pub const MAX_DESCRIPTION_LENGTH: usize = 65535;

pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A single validation failure on an object or field definition
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Human identifier of the definition that failed (name or label)
    pub subject: String,
    pub error_type: ValidationErrorType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationErrorType {
    BlankName,
    NameTooLong { actual: usize },
    AliasTooLong { actual: usize },
    /// Alias contains characters unsafe for storage identifiers
    InvalidAlias { alias: String },
    DescriptionTooLong { actual: usize },
    UnknownFieldType { key: String },
    /// Choice fields need at least one option
    MissingOptions,
    DuplicateOptionValue { value: String },
}

impl ValidationError {
    fn new(subject: &str, error_type: ValidationErrorType) -> Self {
        Self {
            subject: subject.to_string(),
            error_type,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_type {
            ValidationErrorType::BlankName => {
                write!(f, "'{}': name must not be blank", self.subject)
            }
            ValidationErrorType::NameTooLong { actual } => {
                write!(
                    f,
                    "'{}': name is {} characters, maximum is {}",
                    self.subject, actual, MAX_NAME_LENGTH
                )
            }
            ValidationErrorType::AliasTooLong { actual } => {
                write!(
                    f,
                    "'{}': alias is {} characters, maximum is {}",
                    self.subject, actual, MAX_ALIAS_LENGTH
                )
            }
            ValidationErrorType::InvalidAlias { alias } => {
                write!(
                    f,
                    "'{}': alias '{}' may only contain lowercase letters, digits and underscores",
                    self.subject, alias
                )
            }
            ValidationErrorType::DescriptionTooLong { actual } => {
                write!(
                    f,
                    "'{}': description is {} characters, maximum is {}",
                    self.subject, actual, MAX_DESCRIPTION_LENGTH
                )
            }
            ValidationErrorType::UnknownFieldType { key } => {
                write!(f, "'{}': unknown field type '{}'", self.subject, key)
            }
            ValidationErrorType::MissingOptions => {
                write!(
                    f,
                    "'{}': choice fields need at least one option",
                    self.subject
                )
            }
            ValidationErrorType::DuplicateOptionValue { value } => {
                write!(f, "'{}': duplicate option value '{}'", self.subject, value)
            }
        }
    }
}

/// Validate a custom object definition
pub fn validate_object(object: &CustomObject) -> ValidationResult {
    debug!("Validating custom object: '{}'", object.name);

    let mut errors = Vec::new();

    check_name(&object.name, &object.name, &mut errors);
    check_alias(&object.name, &object.alias, &mut errors);

    if let Some(description) = &object.description {
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            errors.push(ValidationError::new(
                &object.name,
                ValidationErrorType::DescriptionTooLong {
                    actual: description.chars().count(),
                },
            ));
        }
    }

    finish(&object.name, errors)
}

/// Validate a custom field definition against the type registry
pub fn validate_field(field: &CustomField, registry: &FieldTypeRegistry) -> ValidationResult {
    debug!(
        "Validating custom field: '{}' of type '{}'",
        field.label, field.type_key
    );

    let mut errors = Vec::new();

    check_name(&field.label, &field.label, &mut errors);
    check_alias(&field.label, &field.alias, &mut errors);

    match registry.resolve(&field.type_key) {
        Ok(field_type) => {
            if field_type.is_choice() && field.options.is_empty() {
                errors.push(ValidationError::new(
                    &field.label,
                    ValidationErrorType::MissingOptions,
                ));
            }
        }
        Err(_) => {
            errors.push(ValidationError::new(
                &field.label,
                ValidationErrorType::UnknownFieldType {
                    key: field.type_key.clone(),
                },
            ));
        }
    }

    let mut seen = Vec::new();
    for option in &field.options {
        if seen.contains(&&option.value) {
            errors.push(ValidationError::new(
                &field.label,
                ValidationErrorType::DuplicateOptionValue {
                    value: option.value.clone(),
                },
            ));
        } else {
            seen.push(&option.value);
        }
    }

    finish(&field.label, errors)
}

fn check_name(subject: &str, name: &str, errors: &mut Vec<ValidationError>) {
    if name.trim().is_empty() {
        errors.push(ValidationError::new(subject, ValidationErrorType::BlankName));
    } else if name.chars().count() > MAX_NAME_LENGTH {
        errors.push(ValidationError::new(
            subject,
            ValidationErrorType::NameTooLong {
                actual: name.chars().count(),
            },
        ));
    }
}

fn check_alias(subject: &str, alias: &str, errors: &mut Vec<ValidationError>) {
    if alias.chars().count() > MAX_ALIAS_LENGTH {
        errors.push(ValidationError::new(
            subject,
            ValidationErrorType::AliasTooLong {
                actual: alias.chars().count(),
            },
        ));
    }
    let valid = !alias.is_empty()
        && alias
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !valid {
        errors.push(ValidationError::new(
            subject,
            ValidationErrorType::InvalidAlias {
                alias: alias.to_string(),
            },
        ));
    }
}

fn finish(subject: &str, errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        debug!(
            "'{}' failed validation with {} errors",
            subject,
            errors.len()
        );
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldId, FieldOption, FieldType, ObjectId};
    use assert_matches::assert_matches;

    fn registry() -> FieldTypeRegistry {
        FieldTypeRegistry::standard()
    }

    #[test]
    fn test_validate_object_ok() {
        let object = CustomObject::new(ObjectId::new(1), "Support Ticket");
        assert!(validate_object(&object).is_ok());
    }

    #[test]
    fn test_validate_object_blank_name() {
        let object = CustomObject::new(ObjectId::new(1), "   ").with_alias("ticket");
        let errors = validate_object(&object).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_matches!(errors[0].error_type, ValidationErrorType::BlankName);
    }

    #[test]
    fn test_validate_object_name_too_long() {
        let long_name = "x".repeat(MAX_NAME_LENGTH + 1);
        let object = CustomObject::new(ObjectId::new(1), &long_name);
        let errors = validate_object(&object).unwrap_err();

        assert!(errors.iter().any(|e| matches!(
            e.error_type,
            ValidationErrorType::NameTooLong { actual } if actual == MAX_NAME_LENGTH + 1
        )));
    }

    #[test]
    fn test_validate_object_description_too_long() {
        let object = CustomObject::new(ObjectId::new(1), "Ticket")
            .with_description(&"d".repeat(MAX_DESCRIPTION_LENGTH + 1));
        let errors = validate_object(&object).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_matches!(
            errors[0].error_type,
            ValidationErrorType::DescriptionTooLong { .. }
        );
    }

    #[test]
    fn test_validate_object_invalid_alias() {
        let object = CustomObject::new(ObjectId::new(1), "Ticket").with_alias("Bad Alias!");
        let errors = validate_object(&object).unwrap_err();

        assert_matches!(
            &errors[0].error_type,
            ValidationErrorType::InvalidAlias { alias } if alias == "Bad Alias!"
        );
    }

    #[test]
    fn test_validate_field_ok() {
        let field = CustomField::new(FieldId::new(1), ObjectId::new(1), "Mood", FieldType::Text);
        assert!(validate_field(&field, &registry()).is_ok());
    }

    #[test]
    fn test_validate_field_unknown_type() {
        let mut field =
            CustomField::new(FieldId::new(1), ObjectId::new(1), "Mood", FieldType::Text);
        field.type_key = "telepathy".to_string();

        let errors = validate_field(&field, &registry()).unwrap_err();
        assert_matches!(
            &errors[0].error_type,
            ValidationErrorType::UnknownFieldType { key } if key == "telepathy"
        );
    }

    #[test]
    fn test_validate_choice_field_requires_options() {
        let field = CustomField::new(
            FieldId::new(1),
            ObjectId::new(1),
            "Favorite Color",
            FieldType::Select,
        );

        let errors = validate_field(&field, &registry()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_matches!(errors[0].error_type, ValidationErrorType::MissingOptions);
    }

    #[test]
    fn test_validate_choice_field_with_options_ok() {
        let field = CustomField::new(
            FieldId::new(1),
            ObjectId::new(1),
            "Favorite Color",
            FieldType::Select,
        )
        .with_options(vec![
            FieldOption::new("Red", "red", 0),
            FieldOption::new("Blue", "blue", 1),
        ]);

        assert!(validate_field(&field, &registry()).is_ok());
    }

    #[test]
    fn test_validate_duplicate_option_values() {
        let field = CustomField::new(
            FieldId::new(1),
            ObjectId::new(1),
            "Favorite Color",
            FieldType::Multiselect,
        )
        .with_options(vec![
            FieldOption::new("Red", "red", 0),
            FieldOption::new("Crimson", "red", 1),
        ]);

        let errors = validate_field(&field, &registry()).unwrap_err();
        assert_matches!(
            &errors[0].error_type,
            ValidationErrorType::DuplicateOptionValue { value } if value == "red"
        );
    }
}
