//! proto-compat
//!
//! Decides whether a newer version of a set of protobuf definitions stays
//! wire- and source-compatible with an older one. Intended as a pre-merge
//! gate for schema repositories.
//!
//! ## Features
//!
//! - **Tag-keyed matching**: fields pair up by number, not name
//! - **Type families**: wire-compatible scalar swaps are warnings, not errors
//! - **Extension aware**: `extend` fields are folded into their extendee first
//! - **Descriptor sets**: reads `protoc --descriptor_set_out` output directly
//!
//! ## Example
//!
//! ```
//! use proto_compat::{compare, Field, FieldType, MessageType, SchemaFile, SchemaTree};
//!
//! let version = |field_type| {
//!     let message = MessageType::new("M").with_field(Field::optional("f", 1, field_type));
//!     SchemaTree::new(vec![SchemaFile::new("p.proto", "p").with_message(message)])
//! };
//! let older = version(FieldType::String);
//! let newer = version(FieldType::Bytes);
//!
//! let report = compare(&newer, &older);
//! assert!(report.is_compatible());
//! assert_eq!(report.warnings.len(), 1);
//! ```

pub mod schema;
pub mod lookup;
pub mod extensions;
pub mod classify;
pub mod difference;
pub mod compatibility;
pub mod descriptor;
pub mod config;
pub mod demo;
pub mod error;

pub use schema::{
    EnumType, EnumValue, ExtensionRange, Field, FieldType, Label, MessageType, SchemaFile,
    SchemaTree,
};
pub use difference::{ChangeKind, CompatibilityReport, Difference, Severity};
pub use compatibility::{compare, CompatibilityChecker};
pub use descriptor::{load_tree, SchemaLocation};
pub use config::{CompatConfig, OutputFormat};
pub use error::{CompatError, Result};
