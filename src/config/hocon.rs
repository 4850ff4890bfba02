//! HOCON-backed configuration tree
//!
//! Implements [`ConfigTree`] over the `hocon` crate's parsed value type and
//! provides the file loader used by the CLI shell. Nothing outside this
//! module touches the HOCON parser.

use std::path::Path;

use hocon::{Hocon, HoconLoader};

use crate::SeedError;
use crate::config::tree::{ConfigTree, ValueKind};

/// Load and parse a HOCON config file.
///
/// Checks that the path names an existing file before handing it to the
/// parser, so a typo'd path reports as a load error rather than a parse one.
pub fn load_config_file(path: &Path) -> Result<Hocon, SeedError> {
    if !path.is_file() {
        return Err(SeedError::ConfigLoad {
            path: path.to_path_buf(),
            cause: "path does not name a file".to_string(),
        });
    }

    let path_text = path.to_string_lossy();
    HoconLoader::new()
        .load_file(&*path_text)
        .and_then(|loader| loader.hocon())
        .map_err(|e| SeedError::ConfigLoad {
            path: path.to_path_buf(),
            cause: e.to_string(),
        })
}

/// Walk a dot-delimited path down the tree.
///
/// Missing segments resolve to the parser's bad-value marker, which the
/// typed accessors below turn into a [`SeedError::ConfigKey`].
fn lookup<'a>(root: &'a Hocon, path: &str) -> &'a Hocon {
    path.split('.').fold(root, |node, part| &node[part])
}

fn kind_of(node: &Hocon) -> &'static str {
    match node {
        Hocon::Real(_) => "float",
        Hocon::Integer(_) => "int",
        Hocon::String(_) => "string",
        Hocon::Boolean(_) => "boolean",
        Hocon::Array(_) => "list",
        Hocon::Hash(_) => "config",
        _ => "null",
    }
}

fn type_error(key: &str, expected: ValueKind, node: &Hocon) -> SeedError {
    let cause = match node {
        Hocon::BadValue(e) => e.to_string(),
        other => format!("value has type {}", kind_of(other)),
    };
    SeedError::config_key(key, expected, cause)
}

impl ConfigTree for Hocon {
    fn get_string(&self, key: &str) -> Result<String, SeedError> {
        let node = lookup(self, key);
        node.as_string()
            .ok_or_else(|| type_error(key, ValueKind::String, node))
    }

    fn get_int(&self, key: &str) -> Result<i64, SeedError> {
        let node = lookup(self, key);
        node.as_i64()
            .ok_or_else(|| type_error(key, ValueKind::Int, node))
    }

    fn get_float(&self, key: &str) -> Result<f64, SeedError> {
        let node = lookup(self, key);
        node.as_f64()
            .ok_or_else(|| type_error(key, ValueKind::Float, node))
    }

    fn get_bool(&self, key: &str) -> Result<bool, SeedError> {
        let node = lookup(self, key);
        node.as_bool()
            .ok_or_else(|| type_error(key, ValueKind::Boolean, node))
    }

    fn get_string_list(&self, key: &str) -> Result<Vec<String>, SeedError> {
        let node = lookup(self, key);
        match node {
            Hocon::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_string()
                        .ok_or_else(|| type_error(key, ValueKind::List, item))
                })
                .collect(),
            other => Err(type_error(key, ValueKind::List, other)),
        }
    }

    fn get_int_list(&self, key: &str) -> Result<Vec<i64>, SeedError> {
        let node = lookup(self, key);
        match node {
            Hocon::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_i64()
                        .ok_or_else(|| type_error(key, ValueKind::List, item))
                })
                .collect(),
            other => Err(type_error(key, ValueKind::List, other)),
        }
    }

    fn get_config_list(&self, key: &str) -> Result<Vec<&dyn ConfigTree>, SeedError> {
        let node = lookup(self, key);
        match node {
            Hocon::Array(items) => Ok(items.iter().map(|item| item as &dyn ConfigTree).collect()),
            other => Err(type_error(key, ValueKind::List, other)),
        }
    }

    fn get_config(&self, key: &str) -> Result<&dyn ConfigTree, SeedError> {
        let node = lookup(self, key);
        match node {
            Hocon::Hash(_) => Ok(node as &dyn ConfigTree),
            other => Err(type_error(key, ValueKind::Config, other)),
        }
    }
}
