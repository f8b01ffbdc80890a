//! JSON:API document formatter.
//!
//! Flattens a JSON:API document into the attribute shape a model expects:
//!
//! ```text
//! { data: { type: "users", id: "1",
//!           attributes: { email: "foo@bar.example" },
//!           relationships: { friends: { data: [{ type: "users", id: "2" }] } } } }
//! ```
//!
//! becomes
//!
//! ```text
//! { id: "1", email: "foo@bar.example", friend_ids: ["2"] }
//! ```
//!
//! Relationship entries are rewritten by the first matching case:
//!
//! 1. a non-empty linkage array becomes `<singular>_ids`;
//! 2. an empty linkage array becomes `<singular>_ids: []`;
//! 3. a linkage object on a polymorphic relationship becomes `<key>_type`
//!    (classified) and `<key>_id`;
//! 4. a linkage object becomes `<key>_id`;
//! 5. `data: null` becomes `<key>_id: null`;
//! 6. anything else is formatted recursively under `<key>_attributes`.
//!
//! Schema lookups are by declared key or by a child's `as`/`alias`, so a
//! renamed relationship still finds its polymorphism and nested schema.

use tparams_core::value::Hash;
use tparams_core::{Key, Value};

use super::{classify, singularize, Formatter};
use crate::schema::Schema;

pub const NAME: &str = "jsonapi";

/// The registered formatter. Its decorator asks the controller to expose
/// the document's `meta`.
pub fn formatter() -> Formatter {
    Formatter::new(NAME, |value, ctx| Ok(format(value, Some(ctx.schema))))
        .with_decorator(|controller| controller.decorate(NAME, "meta"))
}

/// Format a document against the schema describing it.
pub fn format(value: Value, schema: Option<&Schema>) -> Value {
    let mut doc = match value {
        Value::Hash(doc) if matches!(doc.get("data"), Some(Value::Array(_) | Value::Hash(_))) => doc,
        other => return other,
    };

    let data_schema = schema.and_then(|s| s.child_named("data"));
    match doc.shift_remove("data") {
        Some(Value::Array(items)) => format_array_data(items, data_schema),
        Some(Value::Hash(resource)) => Value::Hash(format_hash_data(resource, data_schema)),
        other => other.unwrap_or_default(),
    }
}

fn format_array_data(items: Vec<Value>, schema: Option<&Schema>) -> Value {
    Value::Array(
        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Hash(resource) => {
                    let child = schema.and_then(|s| s.child(&Key::Index(i)));
                    Value::Hash(format_hash_data(resource, child))
                }
                other => other,
            })
            .collect(),
    )
}

fn format_hash_data(mut data: Hash, schema: Option<&Schema>) -> Hash {
    let relationships = data.shift_remove("relationships");
    let attributes = data.shift_remove("attributes");
    for dropped in ["links", "meta", "type"] {
        data.shift_remove(dropped);
    }

    if let Some(Value::Hash(attributes)) = attributes {
        data.extend(attributes);
    }

    if let Some(Value::Hash(relationships)) = relationships {
        let schema = schema.and_then(|s| s.child_named("relationships"));
        for (key, relationship) in relationships {
            let child = schema.and_then(|s| s.child_named(&key));
            format_relationship(&mut data, key, relationship, child);
        }
    }

    data
}

enum Relationship {
    Many(Vec<Value>),
    One { ty: Value, id: Value },
    Null,
    Embedded,
}

/// Whether `value` is exactly a `{ type, id }` pair.
fn is_linkage(value: &Value) -> bool {
    value
        .as_hash()
        .map_or(false, |h| h.len() == 2 && h.contains_key("type") && h.contains_key("id"))
}

fn classify_relationship(relationship: &Value) -> Relationship {
    match relationship.get("data") {
        Some(Value::Array(items)) if items.iter().all(is_linkage) => Relationship::Many(
            items
                .iter()
                .filter_map(|item| item.get("id").cloned())
                .collect(),
        ),
        Some(linkage) if is_linkage(linkage) => Relationship::One {
            ty: linkage.get("type").cloned().unwrap_or_default(),
            id: linkage.get("id").cloned().unwrap_or_default(),
        },
        Some(Value::Nil) => Relationship::Null,
        _ => Relationship::Embedded,
    }
}

fn format_relationship(out: &mut Hash, key: String, relationship: Value, schema: Option<&Schema>) {
    match classify_relationship(&relationship) {
        Relationship::Many(ids) => {
            out.insert(format!("{}_ids", singularize(&key)), Value::Array(ids));
        }
        Relationship::One { ty, id } if schema.map_or(false, Schema::is_polymorphic) => {
            out.insert(format!("{key}_type"), Value::String(classify(&ty.to_string())));
            out.insert(format!("{key}_id"), id);
        }
        Relationship::One { id, .. } => {
            out.insert(format!("{key}_id"), id);
        }
        Relationship::Null => {
            out.insert(format!("{key}_id"), Value::Nil);
        }
        Relationship::Embedded => {
            out.insert(format!("{key}_attributes"), format(relationship, schema));
        }
    }
}
