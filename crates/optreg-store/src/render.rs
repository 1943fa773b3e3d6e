//! Human-readable rendering of keys and key lists.
//!
//! `name (Type)` for a key without default, `name (Type = <value>)` with one.
//! The value is the default encoded by the key's codec, or its `Debug` form
//! when the key has no codec.
//! A default that is itself a store lists its definition's keys underneath,
//! indented. Nesting stops at [`MAX_RENDER_DEPTH`] levels.

use std::sync::Arc;

use crate::any_key::AnyKey;
use crate::definition::StoreDefinition;
use crate::store::Store;

/// Nested definitions deeper than this are rendered as `...`.
pub const MAX_RENDER_DEPTH: usize = 8;

const INDENT: &str = "   ";

/// Render one key.
pub fn render_key(key: &dyn AnyKey) -> String {
    render_at(key, 0)
}

/// Render keys one per line, in order.
pub fn render_keys(keys: &[Arc<dyn AnyKey>]) -> String {
    keys.iter()
        .map(|key| render_key(key.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_at(key: &dyn AnyKey, depth: usize) -> String {
    let mut out = format!("{} ({}", key.name(), key.type_name());

    let Some(default) = key.default_raw() else {
        out.push(')');
        return out;
    };

    if let Some(store) = default.downcast_ref::<Store>() {
        match key.definition().or(store.definition()) {
            Some(definition) => {
                out.push(')');
                render_nested(&mut out, definition, depth + 1);
            }
            None => out.push_str(" - undefined store)"),
        }
        return out;
    }

    let text = if key.has_codec() {
        key.encode_raw(default.as_ref()).ok()
    } else {
        key.debug_raw(default.as_ref())
    };
    match text {
        Some(text) if text.contains('\n') => {
            out.push_str(" - has default value, but spans several lines)");
        }
        Some(text) => {
            out.push_str(" = ");
            out.push_str(&text);
            out.push(')');
        }
        None => out.push(')'),
    }
    out
}

fn render_nested(out: &mut String, definition: &StoreDefinition, depth: usize) {
    if depth > MAX_RENDER_DEPTH {
        out.push('\n');
        out.push_str(INDENT);
        out.push_str("...");
        return;
    }
    for nested in definition.keys() {
        for line in render_at(nested.as_ref(), depth).lines() {
            out.push('\n');
            out.push_str(INDENT);
            out.push_str(line);
        }
    }
}
