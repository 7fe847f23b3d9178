//! Extension resolution
//!
//! Folds every `extend` declaration into the field list of the message it
//! extends, so extension fields take part in tag matching like ordinary
//! fields. The input tree is left untouched; a resolved copy is returned.

use tracing::{debug, warn};

use crate::lookup::find_message_mut;
use crate::schema::{Field, MessageType, SchemaTree};

/// Return a copy of `tree` with all extensions folded into their extendees.
///
/// Extension lists in the result are empty, so resolving twice is a no-op.
/// An extension whose extendee cannot be found is dropped with a warning.
pub fn resolve_extensions(tree: &SchemaTree) -> SchemaTree {
    let mut pending = Vec::new();
    for file in &tree.files {
        pending.extend(file.extensions.iter().cloned());
        for message in &file.messages {
            collect_nested(message, &mut pending);
        }
    }

    let mut resolved = tree.clone();
    for file in &mut resolved.files {
        file.extensions.clear();
        for message in &mut file.messages {
            clear_nested(message);
        }
    }

    for extension in pending {
        let Some(extendee) = extension.extendee.clone() else {
            warn!(field = %extension.name, "extension without extendee, skipping");
            continue;
        };
        match find_message_mut(&mut resolved, &extendee) {
            Some(target) => {
                debug!(
                    extendee = %extendee,
                    field = %extension.name,
                    number = extension.number,
                    "folding extension"
                );
                target.fields.push(extension);
            }
            None => {
                warn!(
                    extendee = %extendee,
                    field = %extension.name,
                    "failed to find extendee, skipping"
                );
            }
        }
    }

    resolved
}

fn collect_nested(message: &MessageType, pending: &mut Vec<Field>) {
    pending.extend(message.extensions.iter().cloned());
    for nested in &message.nested_messages {
        collect_nested(nested, pending);
    }
}

fn clear_nested(message: &mut MessageType) {
    message.extensions.clear();
    for nested in &mut message.nested_messages {
        clear_nested(nested);
    }
}
