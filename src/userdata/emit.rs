//! YAML emission
//!
//! Hand-serializes the ordered document to YAML. A general-purpose emitter
//! is no help here: the output must start with the literal `#cloud-config`
//! marker and keep builder-supplied key order at every level, and the gzip
//! payloads must come out as `!!binary` scalars so the consuming parser
//! recovers the exact bytes.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

use crate::SeedError;
use crate::userdata::types::Node;

/// First line of every emitted document.
///
/// The consuming agent matches this token literally; `# cloud-config`
/// (with a space) is read as an ordinary comment and the document is
/// silently ignored.
pub const CLOUD_CONFIG_MARKER: &str = "#cloud-config";

/// Serialize a document to YAML text, marker line first.
pub fn emit(doc: &Node) -> Result<String, SeedError> {
    let entries = match doc {
        Node::Map(entries) => entries,
        _ => {
            return Err(SeedError::serialize(
                "<root>",
                "top-level document must be a mapping",
            ));
        }
    };

    let mut out = String::new();
    out.push_str(CLOUD_CONFIG_MARKER);
    out.push('\n');
    emit_entries(&mut out, entries, 0, false, "")?;
    Ok(out)
}

fn emit_entries(
    out: &mut String,
    entries: &[(String, Node)],
    level: usize,
    mut inline_first: bool,
    path: &str,
) -> Result<(), SeedError> {
    for (key, value) in entries {
        let child_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{path}.{key}")
        };

        if inline_first {
            inline_first = false;
        } else {
            push_indent(out, level);
        }

        if !plain_key(key) {
            return Err(SeedError::serialize(
                child_path,
                "mapping key is not a plain YAML scalar",
            ));
        }
        out.push_str(key);
        out.push(':');

        match value {
            // empty collections stay present, in flow form
            Node::Seq(items) if items.is_empty() => out.push_str(" []\n"),
            Node::Map(nested) if nested.is_empty() => out.push_str(" {}\n"),
            Node::Seq(items) => {
                out.push('\n');
                emit_items(out, items, level + 1, &child_path)?;
            }
            Node::Map(nested) => {
                out.push('\n');
                emit_entries(out, nested, level + 1, false, &child_path)?;
            }
            scalar => {
                out.push(' ');
                emit_scalar(out, scalar, &child_path)?;
                out.push('\n');
            }
        }
    }
    Ok(())
}

fn emit_items(
    out: &mut String,
    items: &[Node],
    level: usize,
    path: &str,
) -> Result<(), SeedError> {
    for (index, item) in items.iter().enumerate() {
        let child_path = format!("{path}[{index}]");
        push_indent(out, level);
        out.push('-');

        match item {
            Node::Seq(nested) if nested.is_empty() => out.push_str(" []\n"),
            Node::Map(nested) if nested.is_empty() => out.push_str(" {}\n"),
            Node::Seq(nested) => {
                out.push('\n');
                emit_items(out, nested, level + 1, &child_path)?;
            }
            Node::Map(nested) => {
                // first entry shares the dash line, the rest align under it
                out.push(' ');
                emit_entries(out, nested, level + 1, true, &child_path)?;
            }
            scalar => {
                out.push(' ');
                emit_scalar(out, scalar, &child_path)?;
                out.push('\n');
            }
        }
    }
    Ok(())
}

fn emit_scalar(out: &mut String, node: &Node, path: &str) -> Result<(), SeedError> {
    match node {
        Node::Bool(true) => out.push_str("true"),
        Node::Bool(false) => out.push_str("false"),
        Node::Binary(bytes) => {
            out.push_str("!!binary ");
            out.push_str(&BASE64.encode(bytes));
        }
        Node::Str(s) => {
            if plain_safe(s) {
                out.push_str(s);
            } else {
                push_quoted(out, s);
            }
        }
        Node::Seq(_) | Node::Map(_) => {
            return Err(SeedError::serialize(path, "expected a scalar node"));
        }
    }
    Ok(())
}

fn plain_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Whether a string survives as a plain (unquoted) scalar.
///
/// Anything that could re-parse as a number, boolean, or null, or that
/// touches YAML indicator syntax, is double-quoted instead. Octal-looking
/// permission strings (`0644`) and colon-bearing owner strings
/// (`root:root`) must come back out as strings, not integers or mappings.
fn plain_safe(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '/' || first == '_') {
        return false;
    }
    if s.ends_with(' ') {
        return false;
    }
    if matches!(
        s.to_ascii_lowercase().as_str(),
        "true" | "false" | "yes" | "no" | "on" | "off" | "null" | "nan" | "inf"
    ) {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-' | '.' | '/' | '@' | '+' | '='))
}

fn push_quoted(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}
