//! Differences and the compatibility report
//!
//! A [`Difference`] is one detected change. The [`CompatibilityReport`]
//! partitions differences into errors (breaking) and warnings (safe but
//! noteworthy); only the partition decides compatibility.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of detected change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Cardinality of a field changed
    ChangedLabel,
    /// Field or enum value only present in the newer version
    AddedField,
    /// Field or enum value only present in the older version
    RemovedField,
    /// Same tag, different field name
    ChangedName,
    /// Same tag, different scalar type
    ChangedType,
    /// Same field name, different tag
    ChangedNumber,
    /// Same tag, different default value
    ChangedDefault,
    /// Same tag, different referenced message or enum
    ChangedTypeName,
    /// Messages, enums or files added or removed
    NonFieldIncompatibility,
}

/// Which half of the report a difference lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single detected change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difference {
    pub kind: ChangeKind,
    pub new_value: String,
    pub old_value: String,
    /// Fully-qualified name of the enclosing message or enum
    pub path: String,
    /// Field number, or field name for renumberings
    pub qualifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Difference {
    pub fn new(
        kind: ChangeKind,
        new_value: impl Into<String>,
        old_value: impl Into<String>,
        path: impl Into<String>,
        qualifier: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            new_value: new_value.into(),
            old_value: old_value.into(),
            path: path.into(),
            qualifier: qualifier.into(),
            note: None,
        }
    }

    /// A free-text difference about a message, enum or file
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::NonFieldIncompatibility,
            new_value: String::new(),
            old_value: String::new(),
            path: String::new(),
            qualifier: String::new(),
            note: Some(message.into()),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    fn note_suffix(&self) -> String {
        match &self.note {
            Some(note) => format!(", {}", note),
            None => String::new(),
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ChangeKind::ChangedLabel => write!(
                f,
                "Changed label of field nr {} in {} from {} to {}",
                self.qualifier, self.path, self.old_value, self.new_value
            ),
            ChangeKind::AddedField => write!(
                f,
                "Added field nr {} in {} ({}){}",
                self.qualifier,
                self.path,
                self.new_value,
                self.note_suffix()
            ),
            ChangeKind::RemovedField => write!(
                f,
                "Removed field nr {} in {} ({}){}",
                self.qualifier,
                self.path,
                self.old_value,
                self.note_suffix()
            ),
            ChangeKind::ChangedName => write!(
                f,
                "Changed name of field nr {} in {} from {} to {}",
                self.qualifier, self.path, self.old_value, self.new_value
            ),
            ChangeKind::ChangedType => write!(
                f,
                "Changed type of field nr {} in {} from {} to {}",
                self.qualifier, self.path, self.old_value, self.new_value
            ),
            ChangeKind::ChangedNumber => write!(
                f,
                "Changed numeric tag of field named \"{}\" in {} from {} to {}",
                self.qualifier, self.path, self.old_value, self.new_value
            ),
            ChangeKind::ChangedDefault => write!(
                f,
                "Changed default value of field nr {} in {} from {:?} to {:?}, \
                 this is generally OK",
                self.qualifier, self.path, self.old_value, self.new_value
            ),
            ChangeKind::ChangedTypeName => write!(
                f,
                "Changed referenced type of field nr {} in {} from {} to {}",
                self.qualifier, self.path, self.old_value, self.new_value
            ),
            ChangeKind::NonFieldIncompatibility => {
                f.write_str(self.note.as_deref().unwrap_or_default())
            }
        }
    }
}

/// Errors and warnings collected from one comparison
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub errors: Vec<Difference>,
    pub warnings: Vec<Difference>,
}

impl CompatibilityReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, difference: Difference) {
        self.errors.push(difference);
    }

    pub fn add_warning(&mut self, difference: Difference) {
        self.warnings.push(difference);
    }

    pub fn add(&mut self, severity: Severity, difference: Difference) {
        match severity {
            Severity::Error => self.add_error(difference),
            Severity::Warning => self.add_warning(difference),
        }
    }

    /// Compatible iff no errors were recorded, whatever the warning count
    pub fn is_compatible(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Every difference with its severity, errors first
    pub fn iter(&self) -> impl Iterator<Item = (Severity, &Difference)> {
        self.errors
            .iter()
            .map(|d| (Severity::Error, d))
            .chain(self.warnings.iter().map(|d| (Severity::Warning, d)))
    }

    /// Human-readable report: a WARNING section, then an ERROR section.
    /// Empty sections are omitted.
    pub fn render(&self, suppress_warnings: bool) -> String {
        let mut output = String::new();
        if !suppress_warnings && !self.warnings.is_empty() {
            output.push_str("WARNING\n");
            for warning in &self.warnings {
                output.push_str(&warning.to_string());
                output.push('\n');
            }
        }
        if !self.errors.is_empty() {
            output.push_str("ERROR\n");
            for error in &self.errors {
                output.push_str(&error.to_string());
                output.push('\n');
            }
        }
        output
    }
}

impl fmt::Display for CompatibilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}
