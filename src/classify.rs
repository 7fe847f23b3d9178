//! Compatibility policy
//!
//! Maps each structural change found by the tree walk to a severity.
//! `required` is the only cardinality whose presence matters to a decoder,
//! so anything that makes a required field appear or disappear is an error.
//! Enum value names are strict in both directions.

use crate::difference::{ChangeKind, Difference, Severity};
use crate::schema::{EnumValue, Field, FieldType, MessageType};

/// Scalar types sharing a wire representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFamily {
    /// int32, int64, uint32, uint64, bool
    Varint,
    /// sint32, sint64
    ZigZag,
    /// string, bytes
    LengthDelimited,
    /// fixed32, fixed64, sfixed32, sfixed64
    Fixed,
}

/// Family of a field type; `None` for types only compatible with themselves
pub fn family_of(field_type: FieldType) -> Option<TypeFamily> {
    match field_type {
        FieldType::Int32
        | FieldType::Int64
        | FieldType::Uint32
        | FieldType::Uint64
        | FieldType::Bool => Some(TypeFamily::Varint),
        FieldType::Sint32 | FieldType::Sint64 => Some(TypeFamily::ZigZag),
        FieldType::String | FieldType::Bytes => Some(TypeFamily::LengthDelimited),
        FieldType::Fixed32 | FieldType::Fixed64 | FieldType::Sfixed32 | FieldType::Sfixed64 => {
            Some(TypeFamily::Fixed)
        }
        FieldType::Double
        | FieldType::Float
        | FieldType::Group
        | FieldType::Message
        | FieldType::Enum => None,
    }
}

/// Whether a value written as `older` decodes as `newer`
pub fn wire_compatible(newer: FieldType, older: FieldType) -> bool {
    if newer == older {
        return true;
    }
    match (family_of(newer), family_of(older)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

pub const NOTE_PREVIOUSLY_EXTENSIONS: &str = "this number was previously used by extensions";
pub const NOTE_NOW_ASSIGNED_TO_EXTENSIONS: &str = "this number is now assigned to extensions";
pub const NOTE_NOW_USABLE_BY_EXTENSIONS: &str = "this number is now usable by extensions";
pub const NOTE_OBSOLETE: &str = "consider prefixing \"OBSOLETE_\" instead";

/// A field present only in the newer message.
///
/// Only required additions are reported; optional and repeated fields are
/// ignored by older peers.
pub fn added_field(
    field: &Field,
    path: &str,
    older: &MessageType,
) -> Option<(Severity, Difference)> {
    if !field.is_required() {
        return None;
    }
    let mut difference = Difference::new(
        ChangeKind::AddedField,
        field.label.as_str(),
        "",
        path,
        field.number.to_string(),
    );
    if older.is_extension_number(field.number) {
        difference = difference.with_note(NOTE_PREVIOUSLY_EXTENSIONS);
    }
    Some((Severity::Error, difference))
}

/// A field present only in the older message
pub fn removed_field(field: &Field, path: &str, newer: &MessageType) -> (Severity, Difference) {
    let difference = Difference::new(
        ChangeKind::RemovedField,
        "",
        field.label.as_str(),
        path,
        field.number.to_string(),
    );
    let in_extension_range = newer.is_extension_number(field.number);

    if field.is_required() {
        let difference = if in_extension_range {
            difference.with_note(NOTE_NOW_ASSIGNED_TO_EXTENSIONS)
        } else {
            difference
        };
        (Severity::Error, difference)
    } else if in_extension_range {
        (Severity::Warning, difference.with_note(NOTE_NOW_USABLE_BY_EXTENSIONS))
    } else {
        (Severity::Warning, difference.with_note(NOTE_OBSOLETE))
    }
}

/// Compare two fields sharing a tag
pub fn changed_field(newer: &Field, older: &Field, path: &str) -> Vec<(Severity, Difference)> {
    let mut changes = Vec::new();
    let qualifier = newer.number.to_string();

    if newer.label != older.label {
        let severity = if newer.is_required() || older.is_required() {
            Severity::Error
        } else {
            Severity::Warning
        };
        changes.push((
            severity,
            Difference::new(
                ChangeKind::ChangedLabel,
                newer.label.as_str(),
                older.label.as_str(),
                path,
                qualifier.as_str(),
            ),
        ));
    }

    if newer.name != older.name {
        changes.push((
            Severity::Warning,
            Difference::new(
                ChangeKind::ChangedName,
                &newer.name,
                &older.name,
                path,
                qualifier.as_str(),
            ),
        ));
    }

    if newer.field_type != older.field_type {
        let severity = if wire_compatible(newer.field_type, older.field_type) {
            Severity::Warning
        } else {
            Severity::Error
        };
        changes.push((
            severity,
            Difference::new(
                ChangeKind::ChangedType,
                newer.field_type.as_str(),
                older.field_type.as_str(),
                path,
                qualifier.as_str(),
            ),
        ));
    } else if newer.field_type.is_structural() && newer.type_name != older.type_name {
        changes.push((
            Severity::Warning,
            Difference::new(
                ChangeKind::ChangedTypeName,
                newer.type_name.as_deref().unwrap_or_default(),
                older.type_name.as_deref().unwrap_or_default(),
                path,
                qualifier.as_str(),
            ),
        ));
    }

    if newer.default_value != older.default_value {
        changes.push((
            Severity::Warning,
            Difference::new(
                ChangeKind::ChangedDefault,
                newer.default_value.as_deref().unwrap_or_default(),
                older.default_value.as_deref().unwrap_or_default(),
                path,
                qualifier,
            ),
        ));
    }

    changes
}

/// Same field name, different tag
pub fn renumbered_field(newer: &Field, older: &Field, path: &str) -> (Severity, Difference) {
    (
        Severity::Warning,
        Difference::new(
            ChangeKind::ChangedNumber,
            newer.number.to_string(),
            older.number.to_string(),
            path,
            &newer.name,
        ),
    )
}

/// Enum value only in the newer enum; strict decoders reject unknown values
pub fn added_enum_value(value: &EnumValue, path: &str) -> (Severity, Difference) {
    (
        Severity::Error,
        Difference::new(ChangeKind::AddedField, &value.name, "", path, value.number.to_string()),
    )
}

/// Enum value only in the older enum
pub fn removed_enum_value(value: &EnumValue, path: &str) -> (Severity, Difference) {
    (
        Severity::Error,
        Difference::new(ChangeKind::RemovedField, "", &value.name, path, value.number.to_string()),
    )
}

/// Enum value kept its name but changed number
pub fn renumbered_enum_value(
    newer: &EnumValue,
    older: &EnumValue,
    path: &str,
) -> (Severity, Difference) {
    (
        Severity::Warning,
        Difference::new(
            ChangeKind::ChangedNumber,
            newer.number.to_string(),
            older.number.to_string(),
            path,
            &newer.name,
        ),
    )
}

/// What kind of named definition appeared or disappeared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Definition {
    Message,
    Enum,
}

impl Definition {
    fn as_str(&self) -> &'static str {
        match self {
            Definition::Message => "message",
            Definition::Enum => "enum",
        }
    }
}

pub fn added_definition(definition: Definition, name: &str, path: &str) -> (Severity, Difference) {
    (
        Severity::Warning,
        Difference::notice(format!(
            "Added {} {} in {}",
            definition.as_str(),
            name,
            display_scope(path)
        )),
    )
}

pub fn removed_definition(
    definition: Definition,
    name: &str,
    path: &str,
) -> (Severity, Difference) {
    (
        Severity::Warning,
        Difference::notice(format!(
            "Removed {} {} in {}",
            definition.as_str(),
            name,
            display_scope(path)
        )),
    )
}

pub fn added_file(stem: &str) -> (Severity, Difference) {
    (Severity::Warning, Difference::notice(format!("Added proto file {}", stem)))
}

pub fn removed_file(stem: &str) -> (Severity, Difference) {
    (Severity::Warning, Difference::notice(format!("Removed proto file {}", stem)))
}

fn display_scope(path: &str) -> &str {
    if path.is_empty() {
        "."
    } else {
        path
    }
}
