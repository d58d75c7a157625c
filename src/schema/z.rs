//! Schema constructors.
//!
//! ```ignore
//! let schema = z::object([
//!     ("email", z::string().email()),
//!     ("age", z::number().int().gte(18).optional()),
//! ]);
//! ```

use std::sync::Arc;

use gpui::SharedString;

use super::{EnumDef, EnumMember, EnumOption, ObjectShape, Schema, SchemaKind};
use crate::value::FieldKey;

pub fn string() -> Schema {
    Schema::from_kind(SchemaKind::String)
}

pub fn number() -> Schema {
    Schema::from_kind(SchemaKind::Number)
}

pub fn boolean() -> Schema {
    Schema::from_kind(SchemaKind::Boolean)
}

pub fn date() -> Schema {
    Schema::from_kind(SchemaKind::Date)
}

pub fn file() -> Schema {
    Schema::from_kind(SchemaKind::File)
}

pub fn array(element: Schema) -> Schema {
    Schema::from_kind(SchemaKind::Array(element))
}

pub fn object<K>(fields: impl IntoIterator<Item = (K, Schema)>) -> Schema
where
    K: Into<FieldKey>,
{
    let mut shape = ObjectShape::default();
    for (key, node) in fields {
        shape.insert(key.into(), node);
    }
    Schema::from_kind(SchemaKind::Object(shape))
}

/// String enum.
pub fn enumeration<S>(values: impl IntoIterator<Item = S>) -> Schema
where
    S: Into<SharedString>,
{
    members(
        values
            .into_iter()
            .map(|value| EnumMember::Text(value.into())),
    )
}

/// Enum with arbitrary members, e.g. a numeric native enum.
pub fn members(members: impl IntoIterator<Item = EnumMember>) -> Schema {
    Schema::from_kind(SchemaKind::Enum(EnumDef {
        members: members.into_iter().collect(),
        enhanced: None,
    }))
}

/// String enum whose members carry labels and descriptions for display.
/// Validation only ever sees the option values.
pub fn enhanced_enum<O>(options: impl IntoIterator<Item = O>) -> Schema
where
    O: Into<EnumOption>,
{
    let options: Arc<[EnumOption]> = options.into_iter().map(Into::into).collect();
    let members = options
        .iter()
        .map(|option| EnumMember::Text(option.value().clone()))
        .collect();
    Schema::from_kind(SchemaKind::Enum(EnumDef {
        members,
        enhanced: Some(options),
    }))
}
