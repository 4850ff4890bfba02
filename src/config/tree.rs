//! Typed accessor interface over a parsed configuration tree
//!
//! The decoder depends only on this trait, never on a concrete parser, so
//! the underlying configuration language can be swapped without touching
//! the decode logic.

use std::fmt;

use crate::SeedError;

/// The value kinds a config key can be requested as.
///
/// Named in error reports, so the operator sees what the decoder expected
/// at the failing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Int,
    Float,
    Boolean,
    List,
    Config,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Boolean => "boolean",
            ValueKind::List => "list",
            ValueKind::Config => "config",
        };
        write!(f, "{}", name)
    }
}

/// A hierarchical key/value configuration tree.
///
/// Keys are dot-delimited paths (`"group.subgroup.key"`). Every accessor is
/// atomic: it either returns a value of the requested kind or fails with
/// [`SeedError::ConfigKey`] naming the full path. No defaults, no partial
/// results. List accessors preserve source order.
pub trait ConfigTree {
    /// Fetch a string value.
    fn get_string(&self, key: &str) -> Result<String, SeedError>;

    /// Fetch an integer value.
    fn get_int(&self, key: &str) -> Result<i64, SeedError>;

    /// Fetch a floating-point value.
    fn get_float(&self, key: &str) -> Result<f64, SeedError>;

    /// Fetch a boolean value.
    fn get_bool(&self, key: &str) -> Result<bool, SeedError>;

    /// Fetch a list of strings, in source order.
    fn get_string_list(&self, key: &str) -> Result<Vec<String>, SeedError>;

    /// Fetch a list of integers, in source order.
    fn get_int_list(&self, key: &str) -> Result<Vec<i64>, SeedError>;

    /// Fetch a list of nested config objects, in source order.
    fn get_config_list(&self, key: &str) -> Result<Vec<&dyn ConfigTree>, SeedError>;

    /// Fetch a nested config object.
    fn get_config(&self, key: &str) -> Result<&dyn ConfigTree, SeedError>;
}
