mod checks;
mod enhanced;
pub mod guards;
mod validate;
pub mod z;


use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use gpui::SharedString;
use rust_decimal::Decimal;

use crate::meta::{FieldMeta, MetadataRegistry};
use crate::value::FieldKey;

pub use checks::{Bag, Bound, Check, StringFormat};
pub use enhanced::{EnumOption, enhanced_options, has_enhanced_options};
pub use validate::{Issue, SchemaValidator};

#[cfg(feature = "derive")]
pub use calmform_derive::FormSchema;

static NODE_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

/// Identity of one schema node. Metadata is keyed by this, never by field name.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        Self(NODE_ID_ALLOCATOR.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SchemaKindTag {
    String,
    Number,
    Boolean,
    Enum,
    Array,
    Object,
    File,
    Date,
    Optional,
    Nullable,
}

impl SchemaKindTag {
    pub const fn as_str(self) -> &'static str {
        match self {
            SchemaKindTag::String => "string",
            SchemaKindTag::Number => "number",
            SchemaKindTag::Boolean => "boolean",
            SchemaKindTag::Enum => "enum",
            SchemaKindTag::Array => "array",
            SchemaKindTag::Object => "object",
            SchemaKindTag::File => "file",
            SchemaKindTag::Date => "date",
            SchemaKindTag::Optional => "optional",
            SchemaKindTag::Nullable => "nullable",
        }
    }
}

impl Display for SchemaKindTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EnumMember {
    Text(SharedString),
    Number(Decimal),
}

impl EnumMember {
    pub fn as_text(&self) -> Option<&SharedString> {
        match self {
            EnumMember::Text(value) => Some(value),
            EnumMember::Number(_) => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EnumDef {
    pub members: Vec<EnumMember>,
    pub(crate) enhanced: Option<Arc<[EnumOption]>>,
}

/// Insertion-ordered field set of an object node.
#[derive(Clone, Debug, Default)]
pub struct ObjectShape {
    fields: Vec<(FieldKey, Schema)>,
}

impl ObjectShape {
    pub fn get(&self, key: &str) -> Option<&Schema> {
        self.fields
            .iter()
            .find(|(field, _)| field.as_str() == key)
            .map(|(_, node)| node)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &Schema)> {
        self.fields.iter().map(|(key, node)| (key, node))
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.fields.iter().map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn insert(&mut self, key: FieldKey, node: Schema) {
        if let Some(slot) = self.fields.iter_mut().find(|(field, _)| *field == key) {
            slot.1 = node;
        } else {
            self.fields.push((key, node));
        }
    }
}

#[derive(Clone, Debug)]
pub enum SchemaKind {
    String,
    Number,
    Boolean,
    Enum(EnumDef),
    Array(Schema),
    Object(ObjectShape),
    File,
    Date,
    Optional(Schema),
    Nullable(Schema),
}

impl SchemaKind {
    pub fn tag(&self) -> SchemaKindTag {
        match self {
            SchemaKind::String => SchemaKindTag::String,
            SchemaKind::Number => SchemaKindTag::Number,
            SchemaKind::Boolean => SchemaKindTag::Boolean,
            SchemaKind::Enum(_) => SchemaKindTag::Enum,
            SchemaKind::Array(_) => SchemaKindTag::Array,
            SchemaKind::Object(_) => SchemaKindTag::Object,
            SchemaKind::File => SchemaKindTag::File,
            SchemaKind::Date => SchemaKindTag::Date,
            SchemaKind::Optional(_) => SchemaKindTag::Optional,
            SchemaKind::Nullable(_) => SchemaKindTag::Nullable,
        }
    }
}

#[derive(Debug)]
struct SchemaNode {
    id: NodeId,
    kind: SchemaKind,
    checks: Vec<Check>,
}

/// Immutable schema node handle.
///
/// Cloning shares the node (and its identity). Every modifier returns a new
/// node with a fresh [`NodeId`], so metadata registered on the original does
/// not leak onto derived schemas.
#[derive(Clone, Debug)]
pub struct Schema {
    node: Arc<SchemaNode>,
}

impl Schema {
    pub(crate) fn from_kind(kind: SchemaKind) -> Self {
        Self::from_parts(kind, Vec::new())
    }

    fn from_parts(kind: SchemaKind, checks: Vec<Check>) -> Self {
        Self {
            node: Arc::new(SchemaNode {
                id: NodeId::next(),
                kind,
                checks,
            }),
        }
    }

    pub fn id(&self) -> NodeId {
        self.node.id
    }

    pub fn kind(&self) -> &SchemaKind {
        &self.node.kind
    }

    pub fn tag(&self) -> SchemaKindTag {
        self.node.kind.tag()
    }

    pub fn checks(&self) -> &[Check] {
        &self.node.checks
    }

    /// Constraints of this node collapsed into their effective values.
    pub fn bag(&self) -> Bag {
        Bag::from_checks(&self.node.checks)
    }

    pub fn shape(&self) -> Option<&ObjectShape> {
        match &self.node.kind {
            SchemaKind::Object(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn element(&self) -> Option<&Schema> {
        match &self.node.kind {
            SchemaKind::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Wrapped node of an optional or nullable schema.
    pub fn inner(&self) -> Option<&Schema> {
        match &self.node.kind {
            SchemaKind::Optional(inner) | SchemaKind::Nullable(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn enum_def(&self) -> Option<&EnumDef> {
        match &self.node.kind {
            SchemaKind::Enum(def) => Some(def),
            _ => None,
        }
    }

    pub fn same_node(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// Structurally identical copy with a new identity.
    pub fn fork(&self) -> Self {
        Self::from_parts(self.node.kind.clone(), self.node.checks.clone())
    }

    pub fn register(self, registry: &mut MetadataRegistry, meta: FieldMeta) -> Self {
        registry.register(&self, meta);
        self
    }

    pub fn optional(self) -> Self {
        Self::from_kind(SchemaKind::Optional(self))
    }

    pub fn nullable(self) -> Self {
        Self::from_kind(SchemaKind::Nullable(self))
    }

    pub fn nullish(self) -> Self {
        self.nullable().optional()
    }

    pub fn check(self, check: Check) -> Self {
        let mut checks = self.node.checks.clone();
        checks.push(check);
        Self::from_parts(self.node.kind.clone(), checks)
    }

    /// Minimum string length or array item count.
    pub fn min_length(self, length: usize) -> Self {
        self.check(Check::MinLength(length))
    }

    /// Maximum string length or array item count.
    pub fn max_length(self, length: usize) -> Self {
        self.check(Check::MaxLength(length))
    }

    pub fn length(self, length: usize) -> Self {
        self.check(Check::Length(length))
    }

    pub fn nonempty(self) -> Self {
        self.min_length(1)
    }

    pub fn email(self) -> Self {
        self.check(Check::Format(StringFormat::Email))
    }

    pub fn url(self) -> Self {
        self.check(Check::Format(StringFormat::Url))
    }

    pub fn uuid(self) -> Self {
        self.check(Check::Format(StringFormat::Uuid))
    }

    pub fn gt(self, value: impl Into<Decimal>) -> Self {
        self.check(Check::GreaterThan(Bound::exclusive(value.into())))
    }

    pub fn gte(self, value: impl Into<Decimal>) -> Self {
        self.check(Check::GreaterThan(Bound::inclusive(value.into())))
    }

    pub fn lt(self, value: impl Into<Decimal>) -> Self {
        self.check(Check::LessThan(Bound::exclusive(value.into())))
    }

    pub fn lte(self, value: impl Into<Decimal>) -> Self {
        self.check(Check::LessThan(Bound::inclusive(value.into())))
    }

    pub fn min(self, value: impl Into<Decimal>) -> Self {
        self.gte(value)
    }

    pub fn max(self, value: impl Into<Decimal>) -> Self {
        self.lte(value)
    }

    pub fn positive(self) -> Self {
        self.gt(0)
    }

    pub fn nonnegative(self) -> Self {
        self.gte(0)
    }

    pub fn int(self) -> Self {
        self.check(Check::Integer)
    }

    /// Minimum file size in bytes.
    pub fn min_size(self, bytes: u64) -> Self {
        self.check(Check::MinSize(bytes))
    }

    /// Maximum file size in bytes.
    pub fn max_size(self, bytes: u64) -> Self {
        self.check(Check::MaxSize(bytes))
    }

    /// Accepted mime types; `image/*` style wildcards are allowed.
    pub fn mime<I, S>(self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SharedString>,
    {
        self.check(Check::Mime(types.into_iter().map(Into::into).collect()))
    }
}

/// Types that describe themselves as an object schema, usually through
/// `#[derive(FormSchema)]`.
pub trait FormSchema {
    fn form_schema(registry: &mut MetadataRegistry) -> Schema;
}
