//! Schema loading
//!
//! Turns schema files on disk into [`SchemaTree`]s. Two formats are read:
//! - JSON serializations of [`SchemaTree`] (`.json`)
//! - binary `FileDescriptorSet`s, as written by
//!   `protoc --include_imports --descriptor_set_out=out.pb` (anything else)

use std::fs;
use std::path::{Path, PathBuf};

use prost::Message;
use prost_types::field_descriptor_proto::{Label as DescriptorLabel, Type as DescriptorType};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    FileDescriptorSet,
};
use tracing::debug;

use crate::error::{CompatError, Result};
use crate::schema::{
    EnumType, EnumValue, ExtensionRange, Field, FieldType, Label, MessageType, SchemaFile,
    SchemaTree,
};

/// A schema file plus the directories searched for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaLocation {
    pub path: PathBuf,
    pub include_dirs: Vec<PathBuf>,
}

impl SchemaLocation {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            include_dirs: Vec::new(),
        }
    }

    /// Build a location from a path and colon-separated search directories
    pub fn with_search_path(path: impl Into<PathBuf>, search_path: &str) -> Self {
        Self {
            path: path.into(),
            include_dirs: search_path
                .split(':')
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from)
                .collect(),
        }
    }

    /// The path as given if it exists, else the first include dir containing it
    pub fn resolve(&self) -> Result<PathBuf> {
        if self.path.is_file() {
            return Ok(self.path.clone());
        }
        if self.path.is_relative() {
            for dir in &self.include_dirs {
                let candidate = dir.join(&self.path);
                if candidate.is_file() {
                    return Ok(candidate);
                }
            }
        }
        Err(CompatError::NotFound {
            path: self.path.clone(),
            searched: self.include_dirs.clone(),
        })
    }
}

/// Load the schema tree stored at `location`
pub fn load_tree(location: &SchemaLocation) -> Result<SchemaTree> {
    let path = location.resolve()?;
    debug!(path = %path.display(), "loading schema tree");
    let bytes = fs::read(&path)?;
    if is_json(&path) {
        Ok(serde_json::from_slice(&bytes)?)
    } else {
        decode_descriptor_set(&bytes)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().map(|ext| ext == "json").unwrap_or(false)
}

/// Decode a binary `FileDescriptorSet` into a schema tree
pub fn decode_descriptor_set(bytes: &[u8]) -> Result<SchemaTree> {
    let set = FileDescriptorSet::decode(bytes)?;
    if set.file.is_empty() && !bytes.is_empty() {
        return Err(CompatError::UnsupportedFormat(
            "descriptor set contains no files".to_string(),
        ));
    }
    Ok(SchemaTree::from(&set))
}

impl From<&FileDescriptorSet> for SchemaTree {
    fn from(set: &FileDescriptorSet) -> Self {
        SchemaTree::new(set.file.iter().map(convert_file).collect())
    }
}

fn convert_file(file: &FileDescriptorProto) -> SchemaFile {
    SchemaFile {
        name: file.name().to_string(),
        package: file.package().to_string(),
        messages: file.message_type.iter().map(convert_message).collect(),
        enums: file.enum_type.iter().map(convert_enum).collect(),
        extensions: file.extension.iter().map(convert_field).collect(),
    }
}

fn convert_message(message: &DescriptorProto) -> MessageType {
    MessageType {
        name: message.name().to_string(),
        fields: message.field.iter().map(convert_field).collect(),
        nested_messages: message.nested_type.iter().map(convert_message).collect(),
        enums: message.enum_type.iter().map(convert_enum).collect(),
        extensions: message.extension.iter().map(convert_field).collect(),
        extension_ranges: message
            .extension_range
            .iter()
            .map(|r| ExtensionRange {
                start: r.start(),
                end: r.end(),
            })
            .collect(),
    }
}

fn convert_field(field: &FieldDescriptorProto) -> Field {
    Field {
        name: field.name().to_string(),
        number: field.number(),
        label: convert_label(field.label()),
        field_type: convert_type(field.r#type()),
        type_name: field.type_name.clone(),
        default_value: field.default_value.clone(),
        extendee: field.extendee.clone(),
    }
}

fn convert_enum(enum_type: &EnumDescriptorProto) -> EnumType {
    EnumType {
        name: enum_type.name().to_string(),
        values: enum_type
            .value
            .iter()
            .map(|v| EnumValue {
                name: v.name().to_string(),
                number: v.number(),
            })
            .collect(),
    }
}

fn convert_label(label: DescriptorLabel) -> Label {
    match label {
        DescriptorLabel::Required => Label::Required,
        DescriptorLabel::Optional => Label::Optional,
        DescriptorLabel::Repeated => Label::Repeated,
    }
}

fn convert_type(field_type: DescriptorType) -> FieldType {
    match field_type {
        DescriptorType::Double => FieldType::Double,
        DescriptorType::Float => FieldType::Float,
        DescriptorType::Int64 => FieldType::Int64,
        DescriptorType::Uint64 => FieldType::Uint64,
        DescriptorType::Int32 => FieldType::Int32,
        DescriptorType::Fixed64 => FieldType::Fixed64,
        DescriptorType::Fixed32 => FieldType::Fixed32,
        DescriptorType::Bool => FieldType::Bool,
        DescriptorType::String => FieldType::String,
        DescriptorType::Group => FieldType::Group,
        DescriptorType::Message => FieldType::Message,
        DescriptorType::Bytes => FieldType::Bytes,
        DescriptorType::Uint32 => FieldType::Uint32,
        DescriptorType::Enum => FieldType::Enum,
        DescriptorType::Sfixed32 => FieldType::Sfixed32,
        DescriptorType::Sfixed64 => FieldType::Sfixed64,
        DescriptorType::Sint32 => FieldType::Sint32,
        DescriptorType::Sint64 => FieldType::Sint64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::descriptor_proto::ExtensionRange as DescriptorExtensionRange;
    use prost_types::EnumValueDescriptorProto;

    fn descriptor_field(
        name: &str,
        number: i32,
        label: DescriptorLabel,
        field_type: DescriptorType,
    ) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            label: Some(label as i32),
            r#type: Some(field_type as i32),
            ..Default::default()
        }
    }

    fn descriptor_set() -> FileDescriptorSet {
        let mut extension =
            descriptor_field("tracking", 100, DescriptorLabel::Optional, DescriptorType::String);
        extension.extendee = Some(".shop.Order".to_string());

        FileDescriptorSet {
            file: vec![FileDescriptorProto {
                name: Some("shop/order.proto".to_string()),
                package: Some("shop".to_string()),
                message_type: vec![DescriptorProto {
                    name: Some("Order".to_string()),
                    field: vec![
                        descriptor_field("id", 1, DescriptorLabel::Required, DescriptorType::Int64),
                        descriptor_field(
                            "notes",
                            2,
                            DescriptorLabel::Repeated,
                            DescriptorType::Bytes,
                        ),
                    ],
                    extension_range: vec![DescriptorExtensionRange {
                        start: Some(100),
                        end: Some(200),
                        options: None,
                    }],
                    ..Default::default()
                }],
                enum_type: vec![EnumDescriptorProto {
                    name: Some("Status".to_string()),
                    value: vec![EnumValueDescriptorProto {
                        name: Some("OPEN".to_string()),
                        number: Some(0),
                        options: None,
                    }],
                    ..Default::default()
                }],
                extension: vec![extension],
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_convert_descriptor_set() {
        let tree = SchemaTree::from(&descriptor_set());
        let file = &tree.files[0];
        assert_eq!(file.package, "shop");
        assert_eq!(file.stem(), "order");

        let order = &file.messages[0];
        assert_eq!(order.fields[0], Field::required("id", 1, FieldType::Int64));
        assert_eq!(order.fields[1], Field::repeated("notes", 2, FieldType::Bytes));
        assert!(order.is_extension_number(150));
        assert!(!order.is_extension_number(200));

        assert_eq!(file.enums[0].values[0].name, "OPEN");
        assert_eq!(file.extensions[0].extendee.as_deref(), Some(".shop.Order"));
    }

    #[test]
    fn test_load_binary_descriptor_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order.pb");
        fs::write(&path, descriptor_set().encode_to_vec()).unwrap();

        let tree = load_tree(&SchemaLocation::new(&path)).unwrap();
        assert_eq!(tree, SchemaTree::from(&descriptor_set()));
    }

    #[test]
    fn test_load_json_through_search_path() {
        let dir = tempfile::tempdir().unwrap();
        let tree = SchemaTree::from(&descriptor_set());
        fs::write(dir.path().join("order.json"), serde_json::to_string(&tree).unwrap()).unwrap();

        let search_path = format!("/nonexistent::{}", dir.path().display());
        let location = SchemaLocation::with_search_path("order.json", &search_path);
        assert_eq!(location.include_dirs.len(), 2);
        assert_eq!(load_tree(&location).unwrap(), tree);
    }

    #[test]
    fn test_missing_location() {
        let location = SchemaLocation::with_search_path("missing.pb", "a:b");
        match location.resolve() {
            Err(CompatError::NotFound { searched, .. }) => assert_eq!(searched.len(), 2),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        assert!(matches!(
            decode_descriptor_set(&[0xff, 0xff, 0xff]),
            Err(CompatError::Decode(_))
        ));
    }
}
