//! Descriptor lookup
//!
//! Resolves a type path such as `.shop.Order.Line` to the message it names.
//! Paths may be fully qualified (leading separator, package included) or
//! relative to a file's package. Malformed paths resolve to `None`.

use crate::schema::{MessageType, SchemaTree};

/// Split a type path into its non-empty components.
///
/// Both `.` and `/` separate components, so `.a.B`, `a/B` and `..a.B` all
/// yield `["a", "B"]`.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split(['.', '/']).filter(|c| !c.is_empty()).collect()
}

/// Position of a message inside a tree: file index, then one index per nesting level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLocation {
    pub file: usize,
    pub indices: Vec<usize>,
}

/// Find the message named by `path` in any file of `tree`
pub fn find_message<'a>(tree: &'a SchemaTree, path: &str) -> Option<&'a MessageType> {
    let location = locate_message(tree, path)?;
    message_at(tree, &location)
}

/// Mutable counterpart of [`find_message`]
pub fn find_message_mut<'a>(tree: &'a mut SchemaTree, path: &str) -> Option<&'a mut MessageType> {
    let location = locate_message(tree, path)?;
    message_at_mut(tree, &location)
}

/// Locate the message named by `path`.
///
/// Each file is tried in order. Within a file the path is first matched with
/// the file's package stripped, then as given. A fully-qualified path is only
/// taken as given in files without a package.
pub fn locate_message(tree: &SchemaTree, path: &str) -> Option<MessageLocation> {
    let components = split_path(path);
    if components.is_empty() {
        return None;
    }
    let fully_qualified = path.starts_with(['.', '/']);

    for (file_index, file) in tree.files.iter().enumerate() {
        let package = split_path(&file.package);
        let mut candidates: Vec<&[&str]> = Vec::with_capacity(2);
        if !package.is_empty() && components.starts_with(&package) {
            candidates.push(&components[package.len()..]);
        }
        if package.is_empty() || !fully_qualified {
            candidates.push(&components);
        }

        for candidate in candidates {
            let mut indices = Vec::with_capacity(candidate.len());
            if descend(&file.messages, candidate, &mut indices) {
                return Some(MessageLocation {
                    file: file_index,
                    indices,
                });
            }
        }
    }
    None
}

fn descend(messages: &[MessageType], components: &[&str], indices: &mut Vec<usize>) -> bool {
    let Some((first, rest)) = components.split_first() else {
        return false;
    };
    let Some(index) = messages.iter().position(|m| m.name == *first) else {
        return false;
    };
    indices.push(index);
    if rest.is_empty() {
        true
    } else {
        descend(&messages[index].nested_messages, rest, indices)
    }
}

pub fn message_at<'a>(tree: &'a SchemaTree, location: &MessageLocation) -> Option<&'a MessageType> {
    let (first, rest) = location.indices.split_first()?;
    let mut message = tree.files.get(location.file)?.messages.get(*first)?;
    for index in rest {
        message = message.nested_messages.get(*index)?;
    }
    Some(message)
}

pub fn message_at_mut<'a>(
    tree: &'a mut SchemaTree,
    location: &MessageLocation,
) -> Option<&'a mut MessageType> {
    let (first, rest) = location.indices.split_first()?;
    let mut message = tree.files.get_mut(location.file)?.messages.get_mut(*first)?;
    for index in rest {
        message = message.nested_messages.get_mut(*index)?;
    }
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaFile;

    fn tree() -> SchemaTree {
        SchemaTree::new(vec![
            SchemaFile::new("a.proto", "shop.v1").with_message(
                MessageType::new("Order").with_nested(MessageType::new("Line")),
            ),
            SchemaFile::new("b.proto", "").with_message(
                MessageType::new("m").with_nested(MessageType::new("n")),
            ),
        ])
    }

    #[test]
    fn test_split_path_drops_empty_components() {
        assert_eq!(split_path(".a.B"), vec!["a", "B"]);
        assert_eq!(split_path("..a//B."), vec!["a", "B"]);
        assert!(split_path("...").is_empty());
    }

    #[test]
    fn test_fully_qualified_lookup() {
        let tree = tree();
        let line = find_message(&tree, ".shop.v1.Order.Line").unwrap();
        assert_eq!(line.name, "Line");
    }

    #[test]
    fn test_package_relative_lookup() {
        let tree = tree();
        assert_eq!(find_message(&tree, "Order").unwrap().name, "Order");
        assert_eq!(find_message(&tree, ".m.n").unwrap().name, "n");
    }

    #[test]
    fn test_fully_qualified_path_skips_packaged_files() {
        let tree = SchemaTree::new(vec![
            SchemaFile::new("a.proto", "a").with_message(MessageType::new("Order")),
            SchemaFile::new("b.proto", "").with_message(
                MessageType::new("Order").with_nested(MessageType::new("Line")),
            ),
        ]);
        assert_eq!(locate_message(&tree, ".Order").unwrap().file, 1);
        assert_eq!(locate_message(&tree, "Order").unwrap().file, 0);
        assert_eq!(locate_message(&tree, ".a.Order").unwrap().file, 0);
        assert!(find_message(&tree, ".Order.Line").is_some());
    }

    #[test]
    fn test_missing_and_malformed_paths() {
        let tree = tree();
        assert!(find_message(&tree, ".shop.v1.Order.Missing").is_none());
        assert!(find_message(&tree, "").is_none());
        assert!(find_message(&tree, "..").is_none());
        assert!(find_message(&tree, ".shop.v1").is_none());
    }

    #[test]
    fn test_mutable_lookup_points_at_same_message() {
        let mut tree = tree();
        find_message_mut(&mut tree, "shop.v1.Order.Line")
            .unwrap()
            .name
            .push_str("Item");
        assert!(find_message(&tree, ".shop.v1.Order.LineItem").is_some());
    }
}
