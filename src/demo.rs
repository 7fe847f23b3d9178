//! Built-in demo schema pair
//!
//! Compiled into the binary so `protocompat` with no arguments has
//! something to compare.

use include_dir::{include_dir, Dir};

use crate::error::{CompatError, Result};
use crate::schema::SchemaTree;

static DEMO_SCHEMAS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/schemas/demo");

/// The embedded (newer, older) schema trees
pub fn demo_pair() -> Result<(SchemaTree, SchemaTree)> {
    Ok((embedded_tree("newer.json")?, embedded_tree("older.json")?))
}

fn embedded_tree(name: &str) -> Result<SchemaTree> {
    let file = DEMO_SCHEMAS.get_file(name).ok_or_else(|| {
        CompatError::InvalidLocation(format!("embedded demo schema {} missing", name))
    })?;
    Ok(serde_json::from_slice(file.contents())?)
}
