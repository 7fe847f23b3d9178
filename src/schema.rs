//! Schema tree types
//!
//! An in-memory, format-independent picture of one version of a set of
//! protobuf definitions. Trees are built by an external parser (or by
//! [`crate::descriptor`] from a compiled descriptor set) and are read-only
//! inputs to the checker.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One version of a set of schema files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaTree {
    #[serde(default)]
    pub files: Vec<SchemaFile>,
}

impl SchemaTree {
    pub fn new(files: Vec<SchemaFile>) -> Self {
        Self { files }
    }

    /// Distinct package names in declaration order
    pub fn packages(&self) -> Vec<&str> {
        let mut packages: Vec<&str> = Vec::new();
        for file in &self.files {
            if !packages.contains(&file.package.as_str()) {
                packages.push(&file.package);
            }
        }
        packages
    }

    /// All files declaring the given package
    pub fn files_in_package<'a>(
        &'a self,
        package: &'a str,
    ) -> impl Iterator<Item = &'a SchemaFile> {
        self.files.iter().filter(move |f| f.package == package)
    }
}

/// A single schema source file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaFile {
    /// File name, e.g. "orders/order.proto"
    pub name: String,
    /// Declared package; empty when the file has none
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub messages: Vec<MessageType>,
    #[serde(default)]
    pub enums: Vec<EnumType>,
    /// Top-level `extend` blocks
    #[serde(default)]
    pub extensions: Vec<Field>,
}

impl SchemaFile {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: MessageType) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_enum(mut self, enum_type: EnumType) -> Self {
        self.enums.push(enum_type);
        self
    }

    pub fn with_extension(mut self, extension: Field) -> Self {
        self.extensions.push(extension);
        self
    }

    /// File name without directories or extension ("orders/order.proto" -> "order")
    pub fn stem(&self) -> &str {
        let base = self.name.rsplit('/').next().unwrap_or(&self.name);
        base.split('.').next().unwrap_or(base)
    }
}

/// A message definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageType {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub nested_messages: Vec<MessageType>,
    #[serde(default)]
    pub enums: Vec<EnumType>,
    /// `extend` blocks declared inside this message
    #[serde(default)]
    pub extensions: Vec<Field>,
    #[serde(default)]
    pub extension_ranges: Vec<ExtensionRange>,
}

impl MessageType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_nested(mut self, message: MessageType) -> Self {
        self.nested_messages.push(message);
        self
    }

    pub fn with_enum(mut self, enum_type: EnumType) -> Self {
        self.enums.push(enum_type);
        self
    }

    pub fn with_extension(mut self, extension: Field) -> Self {
        self.extensions.push(extension);
        self
    }

    pub fn with_extension_range(mut self, start: i32, end: i32) -> Self {
        self.extension_ranges.push(ExtensionRange { start, end });
        self
    }

    pub fn field_by_number(&self, number: i32) -> Option<&Field> {
        self.fields.iter().find(|f| f.number == number)
    }

    /// Whether `number` is reserved for extensions on this message
    pub fn is_extension_number(&self, number: i32) -> bool {
        self.extension_ranges.iter().any(|r| r.contains(number))
    }
}

/// A field, or an extension field before it is folded into its extendee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub number: i32,
    #[serde(default)]
    pub label: Label,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Referenced message/enum for structural types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Target message path when declared in an `extend` block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extendee: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, number: i32, label: Label, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            number,
            label,
            field_type,
            type_name: None,
            default_value: None,
            extendee: None,
        }
    }

    pub fn required(name: impl Into<String>, number: i32, field_type: FieldType) -> Self {
        Self::new(name, number, Label::Required, field_type)
    }

    pub fn optional(name: impl Into<String>, number: i32, field_type: FieldType) -> Self {
        Self::new(name, number, Label::Optional, field_type)
    }

    pub fn repeated(name: impl Into<String>, number: i32, field_type: FieldType) -> Self {
        Self::new(name, number, Label::Repeated, field_type)
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub fn extending(mut self, extendee: impl Into<String>) -> Self {
        self.extendee = Some(extendee.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.label == Label::Required
    }
}

/// Field cardinality
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Required,
    #[default]
    Optional,
    Repeated,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Required => "required",
            Label::Optional => "optional",
            Label::Repeated => "repeated",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar and structural field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
    Group,
    Message,
    Enum,
}

impl FieldType {
    /// Every type, scalars first
    pub const ALL: [FieldType; 18] = [
        FieldType::Double,
        FieldType::Float,
        FieldType::Int32,
        FieldType::Int64,
        FieldType::Uint32,
        FieldType::Uint64,
        FieldType::Sint32,
        FieldType::Sint64,
        FieldType::Fixed32,
        FieldType::Fixed64,
        FieldType::Sfixed32,
        FieldType::Sfixed64,
        FieldType::Bool,
        FieldType::String,
        FieldType::Bytes,
        FieldType::Group,
        FieldType::Message,
        FieldType::Enum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Double => "double",
            FieldType::Float => "float",
            FieldType::Int32 => "int32",
            FieldType::Int64 => "int64",
            FieldType::Uint32 => "uint32",
            FieldType::Uint64 => "uint64",
            FieldType::Sint32 => "sint32",
            FieldType::Sint64 => "sint64",
            FieldType::Fixed32 => "fixed32",
            FieldType::Fixed64 => "fixed64",
            FieldType::Sfixed32 => "sfixed32",
            FieldType::Sfixed64 => "sfixed64",
            FieldType::Bool => "bool",
            FieldType::String => "string",
            FieldType::Bytes => "bytes",
            FieldType::Group => "group",
            FieldType::Message => "message",
            FieldType::Enum => "enum",
        }
    }

    /// Message, group and enum fields refer to a named type
    pub fn is_structural(&self) -> bool {
        matches!(self, FieldType::Group | FieldType::Message | FieldType::Enum)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tags reserved for extensions: `start` inclusive, `end` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRange {
    pub start: i32,
    pub end: i32,
}

impl ExtensionRange {
    pub fn contains(&self, number: i32) -> bool {
        number >= self.start && number < self.end
    }
}

/// An enum definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    #[serde(default)]
    pub values: Vec<EnumValue>,
}

impl EnumType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, number: i32) -> Self {
        self.values.push(EnumValue {
            name: name.into(),
            number,
        });
        self
    }
}

/// A named enum constant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_range_is_half_open() {
        let range = ExtensionRange { start: 100, end: 200 };
        assert!(range.contains(100));
        assert!(range.contains(199));
        assert!(!range.contains(200));
        assert!(!range.contains(99));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(SchemaFile::new("orders/order.proto", "shop").stem(), "order");
        assert_eq!(SchemaFile::new("p.proto", "").stem(), "p");
    }

    #[test]
    fn test_packages_are_distinct_and_ordered() {
        let tree = SchemaTree::new(vec![
            SchemaFile::new("a.proto", "beta"),
            SchemaFile::new("b.proto", "alpha"),
            SchemaFile::new("c.proto", "beta"),
        ]);
        assert_eq!(tree.packages(), vec!["beta", "alpha"]);
        assert_eq!(tree.files_in_package("beta").count(), 2);
    }

    #[test]
    fn test_field_json_shape() {
        let json = r#"{"name": "id", "number": 1, "label": "required", "type": "sfixed64"}"#;
        let field: Field = serde_json::from_str(json).unwrap();
        assert_eq!(field, Field::required("id", 1, FieldType::Sfixed64));

        let json = r#"{"name": "note", "number": 2, "type": "string"}"#;
        let field: Field = serde_json::from_str(json).unwrap();
        assert_eq!(field.label, Label::Optional);
        assert!(field.default_value.is_none());
    }
}
