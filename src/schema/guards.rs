//! Kind predicates and wrapper unwrapping for schema nodes.

use super::{Schema, SchemaKindTag};

pub fn is_string(node: &Schema) -> bool {
    node.tag() == SchemaKindTag::String
}

pub fn is_number(node: &Schema) -> bool {
    node.tag() == SchemaKindTag::Number
}

pub fn is_boolean(node: &Schema) -> bool {
    node.tag() == SchemaKindTag::Boolean
}

pub fn is_enum(node: &Schema) -> bool {
    node.tag() == SchemaKindTag::Enum
}

pub fn is_array(node: &Schema) -> bool {
    node.tag() == SchemaKindTag::Array
}

pub fn is_object(node: &Schema) -> bool {
    node.tag() == SchemaKindTag::Object
}

pub fn is_file(node: &Schema) -> bool {
    node.tag() == SchemaKindTag::File
}

pub fn is_date(node: &Schema) -> bool {
    node.tag() == SchemaKindTag::Date
}

pub fn is_optional(node: &Schema) -> bool {
    node.tag() == SchemaKindTag::Optional
}

pub fn is_nullable(node: &Schema) -> bool {
    node.tag() == SchemaKindTag::Nullable
}

/// Strips optional/nullable wrappers down to the first non-wrapper node.
pub fn unwrap(node: &Schema) -> &Schema {
    let mut current = node;
    while let Some(inner) = current.inner() {
        current = inner;
    }
    current
}

/// Whether any wrapper between `node` and its base admits an empty value.
pub fn is_nullish_wrapped(node: &Schema) -> bool {
    node.inner().is_some()
}

/// `node` followed by every wrapped node, outermost first.
pub fn wrapper_chain(node: &Schema) -> impl Iterator<Item = &Schema> {
    std::iter::successors(Some(node), |current| current.inner())
}
