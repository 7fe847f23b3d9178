//! Schema compatibility checking
//!
//! Walks a newer and an older schema tree side by side and records every
//! change as an error or a warning according to [`crate::classify`].
//!
//! Matching rules at each level:
//! - packages (files) by package name
//! - messages, enums and enum values by name
//! - fields by tag, falling back to name to catch renumberings
//!
//! Each level visits the newer side first (changes and additions), then the
//! older side (removals).

use tracing::debug;

use crate::classify::{self, Definition};
use crate::difference::{CompatibilityReport, Difference, Severity};
use crate::extensions::resolve_extensions;
use crate::schema::{EnumType, Field, MessageType, SchemaTree};

/// Compare `newer` against `older` and return every detected difference.
///
/// Neither input is modified; extensions are resolved on private copies.
pub fn compare(newer: &SchemaTree, older: &SchemaTree) -> CompatibilityReport {
    CompatibilityChecker::new(newer, older).check()
}

/// Compatibility checker for two versions of a schema tree
pub struct CompatibilityChecker {
    newer: SchemaTree,
    older: SchemaTree,
}

impl CompatibilityChecker {
    /// Resolve extensions in both trees and prepare the comparison
    pub fn new(newer: &SchemaTree, older: &SchemaTree) -> Self {
        Self {
            newer: resolve_extensions(newer),
            older: resolve_extensions(older),
        }
    }

    /// Run the comparison
    pub fn check(&self) -> CompatibilityReport {
        let mut report = CompatibilityReport::new();
        let older_packages = self.older.packages();
        let newer_packages = self.newer.packages();

        for package in &newer_packages {
            if older_packages.contains(package) {
                self.compare_package(package, &mut report);
            } else {
                for file in self.newer.files_in_package(package) {
                    push(&mut report, classify::added_file(file.stem()));
                }
            }
        }

        for package in &older_packages {
            if !newer_packages.contains(package) {
                for file in self.older.files_in_package(package) {
                    push(&mut report, classify::removed_file(file.stem()));
                }
            }
        }

        debug!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "comparison finished"
        );
        report
    }

    fn compare_package(&self, package: &str, report: &mut CompatibilityReport) {
        debug!(package = %package, "comparing package");
        let scope = if package.is_empty() {
            String::new()
        } else {
            format!(".{}", package)
        };

        let newer_messages: Vec<&MessageType> = self
            .newer
            .files_in_package(package)
            .flat_map(|f| f.messages.iter())
            .collect();
        let older_messages: Vec<&MessageType> = self
            .older
            .files_in_package(package)
            .flat_map(|f| f.messages.iter())
            .collect();
        compare_messages(&newer_messages, &older_messages, &scope, report);

        let newer_enums: Vec<&EnumType> = self
            .newer
            .files_in_package(package)
            .flat_map(|f| f.enums.iter())
            .collect();
        let older_enums: Vec<&EnumType> = self
            .older
            .files_in_package(package)
            .flat_map(|f| f.enums.iter())
            .collect();
        compare_enums(&newer_enums, &older_enums, &scope, report);
    }
}

fn push(report: &mut CompatibilityReport, (severity, difference): (Severity, Difference)) {
    report.add(severity, difference);
}

fn compare_messages(
    newer: &[&MessageType],
    older: &[&MessageType],
    scope: &str,
    report: &mut CompatibilityReport,
) {
    for message in newer {
        match older.iter().find(|m| m.name == message.name) {
            Some(previous) => {
                let path = format!("{}.{}", scope, message.name);
                compare_message(message, previous, &path, report);
            }
            None => push(
                report,
                classify::added_definition(Definition::Message, &message.name, scope),
            ),
        }
    }

    for message in older {
        if !newer.iter().any(|m| m.name == message.name) {
            push(
                report,
                classify::removed_definition(Definition::Message, &message.name, scope),
            );
        }
    }
}

fn compare_message(
    newer: &MessageType,
    older: &MessageType,
    path: &str,
    report: &mut CompatibilityReport,
) {
    debug!(path = %path, "comparing message");
    compare_fields(newer, older, path, report);

    let newer_nested: Vec<&MessageType> = newer.nested_messages.iter().collect();
    let older_nested: Vec<&MessageType> = older.nested_messages.iter().collect();
    compare_messages(&newer_nested, &older_nested, path, report);

    let newer_enums: Vec<&EnumType> = newer.enums.iter().collect();
    let older_enums: Vec<&EnumType> = older.enums.iter().collect();
    compare_enums(&newer_enums, &older_enums, path, report);
}

/// Same-named field in `other` if `field` (from `own`) kept its name but
/// changed tag.
///
/// Both ends must be unmatched by tag: a same-named field whose tag is still
/// paired on its own side is a rename of that tag, not a move of this one.
fn renumbered_counterpart<'a>(
    field: &Field,
    own: &MessageType,
    other: &'a MessageType,
) -> Option<&'a Field> {
    if other.field_by_number(field.number).is_some() {
        return None;
    }
    other
        .fields
        .iter()
        .find(|f| f.name == field.name && own.field_by_number(f.number).is_none())
}

fn compare_fields(
    newer: &MessageType,
    older: &MessageType,
    path: &str,
    report: &mut CompatibilityReport,
) {
    for field in &newer.fields {
        if let Some(previous) = older.field_by_number(field.number) {
            for change in classify::changed_field(field, previous, path) {
                push(report, change);
            }
        } else if let Some(previous) = renumbered_counterpart(field, newer, older) {
            push(report, classify::renumbered_field(field, previous, path));
        } else if let Some(change) = classify::added_field(field, path, older) {
            push(report, change);
        }
    }

    for field in &older.fields {
        let kept = newer.field_by_number(field.number).is_some()
            || renumbered_counterpart(field, older, newer).is_some();
        if !kept {
            push(report, classify::removed_field(field, path, newer));
        }
    }
}

fn compare_enums(
    newer: &[&EnumType],
    older: &[&EnumType],
    scope: &str,
    report: &mut CompatibilityReport,
) {
    for enum_type in newer {
        match older.iter().find(|e| e.name == enum_type.name) {
            Some(previous) => {
                let path = format!("{}.{}", scope, enum_type.name);
                compare_enum_values(enum_type, previous, &path, report);
            }
            None => push(
                report,
                classify::added_definition(Definition::Enum, &enum_type.name, scope),
            ),
        }
    }

    for enum_type in older {
        if !newer.iter().any(|e| e.name == enum_type.name) {
            push(
                report,
                classify::removed_definition(Definition::Enum, &enum_type.name, scope),
            );
        }
    }
}

fn compare_enum_values(
    newer: &EnumType,
    older: &EnumType,
    path: &str,
    report: &mut CompatibilityReport,
) {
    for value in &newer.values {
        match older.values.iter().find(|v| v.name == value.name) {
            Some(previous) if previous.number != value.number => {
                push(report, classify::renumbered_enum_value(value, previous, path));
            }
            Some(_) => {}
            None => push(report, classify::added_enum_value(value, path)),
        }
    }

    for value in &older.values {
        if !newer.values.iter().any(|v| v.name == value.name) {
            push(report, classify::removed_enum_value(value, path));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difference::ChangeKind;
    use crate::schema::{FieldType, SchemaFile};

    fn single(message: MessageType) -> SchemaTree {
        SchemaTree::new(vec![SchemaFile::new("p.proto", "p").with_message(message)])
    }

    fn single_enum(enum_type: EnumType) -> SchemaTree {
        SchemaTree::new(vec![SchemaFile::new("p.proto", "p").with_enum(enum_type)])
    }

    #[test]
    fn test_identical_trees_have_no_differences() {
        let tree = single(
            MessageType::new("M")
                .with_field(Field::required("id", 1, FieldType::Int64))
                .with_nested(
                    MessageType::new("N").with_field(Field::optional("x", 1, FieldType::String)),
                ),
        );
        assert!(compare(&tree, &tree.clone()).is_empty());
    }

    #[test]
    fn test_removed_required_field() {
        let older =
            single(MessageType::new("M").with_field(Field::required("f", 1, FieldType::Int32)));
        let newer = single(MessageType::new("M"));
        let report = compare(&newer, &older);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ChangeKind::RemovedField);
        assert_eq!(report.errors[0].qualifier, "1");
        assert_eq!(report.errors[0].path, ".p.M");
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_renamed_field_is_only_a_name_change() {
        let older =
            single(MessageType::new("M").with_field(Field::optional("a", 1, FieldType::Int32)));
        let newer =
            single(MessageType::new("M").with_field(Field::optional("b", 1, FieldType::Int32)));
        let report = compare(&newer, &older);
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, ChangeKind::ChangedName);
        assert_eq!(report.warnings[0].new_value, "b");
        assert_eq!(report.warnings[0].old_value, "a");
    }

    #[test]
    fn test_renumbered_field_is_only_a_number_change() {
        let older =
            single(MessageType::new("M").with_field(Field::required("a", 1, FieldType::Int32)));
        let newer =
            single(MessageType::new("M").with_field(Field::required("a", 2, FieldType::Int32)));
        let report = compare(&newer, &older);
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings.len(), 1);
        let warning = &report.warnings[0];
        assert_eq!(warning.kind, ChangeKind::ChangedNumber);
        assert_eq!(warning.qualifier, "a");
        assert_eq!(warning.new_value, "2");
        assert_eq!(warning.old_value, "1");
    }

    #[test]
    fn test_name_reused_on_paired_tag_still_removes_required_field() {
        let older = single(
            MessageType::new("M")
                .with_field(Field::required("a", 1, FieldType::Int32))
                .with_field(Field::optional("b", 2, FieldType::Int32)),
        );
        let newer =
            single(MessageType::new("M").with_field(Field::optional("a", 2, FieldType::Int32)));

        let report = compare(&newer, &older);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ChangeKind::RemovedField);
        assert_eq!(report.errors[0].qualifier, "1");
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, ChangeKind::ChangedName);
    }

    #[test]
    fn test_name_reused_on_paired_tag_still_adds_required_field() {
        let older =
            single(MessageType::new("M").with_field(Field::optional("a", 1, FieldType::Int32)));
        let newer = single(
            MessageType::new("M")
                .with_field(Field::optional("b", 1, FieldType::Int32))
                .with_field(Field::required("a", 2, FieldType::Int32)),
        );

        let report = compare(&newer, &older);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ChangeKind::AddedField);
        assert_eq!(report.errors[0].qualifier, "2");
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, ChangeKind::ChangedName);
    }

    #[test]
    fn test_nested_paths() {
        let older = single(MessageType::new("Outer").with_nested(
            MessageType::new("Inner").with_field(Field::optional("f", 1, FieldType::Int32)),
        ));
        let newer = single(MessageType::new("Outer").with_nested(
            MessageType::new("Inner").with_field(Field::required("f", 1, FieldType::Int32)),
        ));
        let report = compare(&newer, &older);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, ".p.Outer.Inner");
    }

    #[test]
    fn test_empty_package_paths() {
        let older = SchemaTree::new(vec![
            SchemaFile::new("p.proto", "").with_message(MessageType::new("M")),
        ]);
        let newer = SchemaTree::new(vec![SchemaFile::new("p.proto", "").with_message(
            MessageType::new("M").with_field(Field::required("f", 1, FieldType::Bool)),
        )]);
        let report = compare(&newer, &older);
        assert_eq!(report.errors[0].path, ".M");
    }

    #[test]
    fn test_enum_value_renumbering_is_a_warning() {
        let older = single_enum(EnumType::new("E").with_value("A", 0).with_value("B", 1));
        let newer = single_enum(EnumType::new("E").with_value("A", 0).with_value("B", 2));
        let report = compare(&newer, &older);
        assert!(report.is_compatible());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, ChangeKind::ChangedNumber);
        assert_eq!(report.warnings[0].qualifier, "B");
    }

    #[test]
    fn test_files_split_within_a_package_compare_as_one() {
        let older = SchemaTree::new(vec![SchemaFile::new("all.proto", "p")
            .with_message(MessageType::new("A"))
            .with_message(MessageType::new("B"))]);
        let newer = SchemaTree::new(vec![
            SchemaFile::new("a.proto", "p").with_message(MessageType::new("A")),
            SchemaFile::new("b.proto", "p").with_message(MessageType::new("B")),
        ]);
        assert!(compare(&newer, &older).is_empty());
    }
}
