#[cfg(test)]
mod tests;

use std::fmt::{Display, Formatter};

use convert_case::{Case, Casing};
use gpui::SharedString;
use thiserror::Error;

use crate::i18n::I18nManager;
use crate::meta::{FieldMeta, MetadataRegistry};
use crate::schema::{
    Bag, Bound, EnumOption, Schema, SchemaKind, SchemaKindTag, StringFormat, enhanced_options,
    guards,
};
use crate::value::FieldKey;

/// String constraints above this length render as a textarea.
pub const TEXTAREA_THRESHOLD: usize = 200;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum FieldType {
    Text,
    Textarea,
    Email,
    Password,
    Url,
    Number,
    Date,
    Time,
    DateTimeLocal,
    Switch,
    Select,
    Radio,
    Tags,
    File,
    Files,
    /// Host-defined type; renders with the text controller unless one is registered.
    Custom(SharedString),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Email => "email",
            FieldType::Password => "password",
            FieldType::Url => "url",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::DateTimeLocal => "datetime-local",
            FieldType::Switch => "switch",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Tags => "tags",
            FieldType::File => "file",
            FieldType::Files => "files",
            FieldType::Custom(name) => name.as_ref(),
        }
    }

    /// Parses a type name; names that are not built in become [`FieldType::Custom`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "text" => FieldType::Text,
            "textarea" => FieldType::Textarea,
            "email" => FieldType::Email,
            "password" => FieldType::Password,
            "url" => FieldType::Url,
            "number" => FieldType::Number,
            "date" => FieldType::Date,
            "time" => FieldType::Time,
            "datetime-local" => FieldType::DateTimeLocal,
            "switch" => FieldType::Switch,
            "select" => FieldType::Select,
            "radio" => FieldType::Radio,
            "tags" => FieldType::Tags,
            "file" => FieldType::File,
            "files" => FieldType::Files,
            other => FieldType::Custom(other.to_string().into()),
        }
    }

    fn is_text_like(&self) -> bool {
        matches!(
            self,
            FieldType::Text
                | FieldType::Textarea
                | FieldType::Email
                | FieldType::Password
                | FieldType::Url
                | FieldType::Date
                | FieldType::Time
                | FieldType::DateTimeLocal
                | FieldType::Custom(_)
        )
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum SchemaError {
    #[error("form schema must be an object, got {kind}")]
    NotAnObject { kind: SchemaKindTag },
    #[error("unsupported schema kind `{kind}` for field `{key}`")]
    UnsupportedKind { key: FieldKey, kind: SchemaKindTag },
    #[error("field `{key}` is an array of {element}; only string and file arrays are supported")]
    UnsupportedArrayElement {
        key: FieldKey,
        element: SchemaKindTag,
    },
    #[error("enum field `{key}` must have string members only")]
    NonStringEnum { key: FieldKey },
}

/// Everything the renderer needs to know about one field.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub key: FieldKey,
    pub field_type: FieldType,
    pub label: SharedString,
    pub placeholder: SharedString,
    pub half_width: bool,
    /// The value may be left empty.
    pub optional: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub greater_than: Option<Bound>,
    pub less_than: Option<Bound>,
    pub enhanced_options: Option<Vec<EnumOption>>,
    pub meta: FieldMeta,
    pub file_max_size: Option<u64>,
    pub file_min_size: Option<u64>,
    pub file_mime: Option<Vec<SharedString>>,
}

impl FieldDescriptor {
    pub fn description(&self) -> Option<&SharedString> {
        self.meta.description.as_ref()
    }
}

/// Resolves fields with the default locale's placeholders.
pub fn resolve_field(
    key: impl Into<FieldKey>,
    node: &Schema,
    registry: &MetadataRegistry,
) -> Result<FieldDescriptor, SchemaError> {
    FieldResolver::new(registry).resolve(key, node)
}

pub fn resolve_fields(
    schema: &Schema,
    registry: &MetadataRegistry,
) -> Result<Vec<FieldDescriptor>, SchemaError> {
    FieldResolver::new(registry).resolve_all(schema)
}

pub struct FieldResolver<'a> {
    registry: &'a MetadataRegistry,
    i18n: I18nManager,
}

impl<'a> FieldResolver<'a> {
    pub fn new(registry: &'a MetadataRegistry) -> Self {
        Self {
            registry,
            i18n: I18nManager::with_locale("en"),
        }
    }

    pub fn i18n(mut self, i18n: I18nManager) -> Self {
        self.i18n = i18n;
        self
    }

    /// All fields of an object schema in declaration order; the first
    /// structural error fails the whole set.
    pub fn resolve_all(&self, schema: &Schema) -> Result<Vec<FieldDescriptor>, SchemaError> {
        let Some(shape) = schema.shape() else {
            return Err(SchemaError::NotAnObject { kind: schema.tag() });
        };
        shape
            .iter()
            .map(|(key, node)| self.resolve(key, node))
            .collect()
    }

    pub fn resolve(
        &self,
        key: impl Into<FieldKey>,
        node: &Schema,
    ) -> Result<FieldDescriptor, SchemaError> {
        let key = key.into();
        let meta = self.metadata_for(node);
        tracing::debug!(target: "calmform::resolve", field = %key, ?meta, "resolving field");

        let base = guards::unwrap(node);
        let bag = base.bag();
        let mut descriptor = FieldDescriptor {
            label: meta
                .label
                .clone()
                .unwrap_or_else(|| humanize_key(key.as_str()).into()),
            key: key.clone(),
            field_type: FieldType::Text,
            placeholder: SharedString::default(),
            half_width: meta.half_width,
            optional: guards::is_nullish_wrapped(node),
            min_length: None,
            max_length: None,
            greater_than: None,
            less_than: None,
            enhanced_options: None,
            meta: meta.clone(),
            file_max_size: None,
            file_min_size: None,
            file_mime: None,
        };
        let mut placeholder = meta.placeholder.clone();

        if guards::is_boolean(base) || meta.field_type == Some(FieldType::Switch) {
            descriptor.field_type = FieldType::Switch;
            placeholder = Some(SharedString::default());
        } else {
            match base.kind() {
                SchemaKind::Array(element) => {
                    descriptor.min_length = bag.min_length;
                    descriptor.max_length = bag.max_length;
                    if guards::is_file(element) {
                        let element_bag = element.bag();
                        descriptor.field_type = FieldType::Files;
                        descriptor.file_min_size = element_bag.min_size;
                        descriptor.file_max_size = element_bag.max_size;
                        descriptor.file_mime = element_bag.mime;
                        placeholder = placeholder
                            .or_else(|| self.upload_placeholder(bag.min_length, bag.max_length));
                    } else if guards::is_string(element) {
                        descriptor.field_type = FieldType::Tags;
                    } else {
                        return Err(SchemaError::UnsupportedArrayElement {
                            key,
                            element: element.tag(),
                        });
                    }
                }
                SchemaKind::File => {
                    descriptor.field_type = FieldType::File;
                    descriptor.file_min_size = bag.min_size;
                    descriptor.file_max_size = bag.max_size;
                    descriptor.file_mime = bag.mime.clone();
                }
                SchemaKind::Enum(def) => {
                    descriptor.field_type = if meta.field_type == Some(FieldType::Radio) {
                        FieldType::Radio
                    } else {
                        FieldType::Select
                    };
                    descriptor.enhanced_options = match enhanced_options(base) {
                        Some(options) => Some(options),
                        None => Some(
                            def.members
                                .iter()
                                .map(|member| member.as_text().cloned().map(EnumOption::Value))
                                .collect::<Option<Vec<_>>>()
                                .ok_or_else(|| SchemaError::NonStringEnum { key: key.clone() })?,
                        ),
                    };
                }
                SchemaKind::String => {
                    descriptor.min_length = bag.min_length;
                    descriptor.max_length = bag.max_length;
                    descriptor.field_type = string_field_type(&key, &meta, &bag);
                }
                SchemaKind::Date => {
                    descriptor.field_type = match &meta.field_type {
                        Some(explicit @ (FieldType::Time | FieldType::DateTimeLocal)) => {
                            explicit.clone()
                        }
                        _ => FieldType::Date,
                    };
                }
                SchemaKind::Number => {
                    descriptor.field_type = match &meta.field_type {
                        Some(custom @ FieldType::Custom(_)) => custom.clone(),
                        _ => FieldType::Number,
                    };
                    descriptor.greater_than = bag.greater_than;
                    descriptor.less_than = bag.less_than;
                }
                _ => {
                    return Err(SchemaError::UnsupportedKind {
                        key,
                        kind: base.tag(),
                    });
                }
            }

            if let Some(explicit) = &meta.field_type {
                if *explicit != descriptor.field_type {
                    tracing::warn!(
                        target: "calmform::resolve",
                        field = %key,
                        requested = %explicit,
                        resolved = %descriptor.field_type,
                        kind = %base.tag(),
                        "ignoring field type incompatible with schema kind"
                    );
                }
            }
        }

        if meta.placeholder.is_none()
            && meta.field_type.is_none()
            && descriptor.field_type == FieldType::Text
        {
            descriptor.field_type = infer_type_from_key(key.as_str());
        }

        descriptor.placeholder =
            placeholder.unwrap_or_else(|| self.default_placeholder(&descriptor.field_type));
        Ok(descriptor)
    }

    /// Metadata of the node itself, else of the first wrapped node that has any.
    fn metadata_for(&self, node: &Schema) -> &'a FieldMeta {
        guards::wrapper_chain(node)
            .find_map(|candidate| self.registry.lookup(candidate))
            .unwrap_or_else(|| self.registry.get(node))
    }

    fn default_placeholder(&self, field_type: &FieldType) -> SharedString {
        let key = format!("placeholder.{}", field_type.as_str());
        if self.i18n.has_key(&key) {
            self.i18n.t(&key)
        } else {
            self.i18n.t("placeholder.text")
        }
    }

    fn upload_placeholder(
        &self,
        min_items: Option<usize>,
        max_items: Option<usize>,
    ) -> Option<SharedString> {
        let i18n = &self.i18n;
        match (min_items, max_items) {
            (Some(min), Some(max)) if min == max => {
                let key = if min > 1 {
                    "upload.exact_many"
                } else {
                    "upload.exact_one"
                };
                Some(i18n.t_with(key, &[("count", &min.to_string())]))
            }
            (Some(min), Some(max)) => Some(i18n.t_with(
                "upload.range",
                &[("min", &min.to_string()), ("max", &max.to_string())],
            )),
            (None, Some(max)) => {
                let key = if max > 1 {
                    "upload.up_to_many"
                } else {
                    "upload.up_to_one"
                };
                Some(i18n.t_with(key, &[("max", &max.to_string())]))
            }
            (Some(1), None) => Some(i18n.t("upload.at_least_one")),
            (Some(min), None) => {
                Some(i18n.t_with("upload.at_least_many", &[("min", &min.to_string())]))
            }
            (None, None) => None,
        }
    }
}

fn string_field_type(key: &FieldKey, meta: &FieldMeta, bag: &Bag) -> FieldType {
    if let Some(explicit) = meta.field_type.as_ref().filter(|kind| kind.is_text_like()) {
        return explicit.clone();
    }

    let long_text = [bag.min_length, bag.max_length]
        .into_iter()
        .flatten()
        .any(|length| length > TEXTAREA_THRESHOLD);
    if long_text {
        FieldType::Textarea
    } else if bag.has_format(StringFormat::Url) {
        FieldType::Url
    } else if bag.has_format(StringFormat::Email) {
        FieldType::Email
    } else if key.as_str().to_lowercase().contains("password") {
        FieldType::Password
    } else {
        FieldType::Text
    }
}

/// Type suggested by the field name alone; checked in order password, date, url, email.
pub fn infer_type_from_key(key: &str) -> FieldType {
    let key = key.to_lowercase();
    if key.contains("password") {
        FieldType::Password
    } else if key.contains("date") {
        FieldType::Date
    } else if ["url", "href", "link"]
        .iter()
        .any(|keyword| key.contains(keyword))
    {
        FieldType::Url
    } else if key.contains("email") {
        FieldType::Email
    } else {
        FieldType::Text
    }
}

/// `firstName`, `first_name` and `first-name` all become `First Name`.
/// Only the first letter of each word is raised, so `homepageURL` becomes
/// `Homepage URL`.
pub fn humanize_key(key: &str) -> String {
    let title = key.to_case(Case::Title);
    let mut written = key.chars().filter(|ch| !matches!(ch, '_' | '-' | ' '));
    let mut label = String::with_capacity(title.len());
    let mut word_start = true;
    for ch in title.chars() {
        if ch == ' ' {
            label.push(' ');
            word_start = true;
            continue;
        }
        let Some(original) = written.next() else {
            return title;
        };
        if !original.to_lowercase().eq(ch.to_lowercase()) {
            return title;
        }
        if word_start {
            label.extend(original.to_uppercase());
        } else {
            label.push(original);
        }
        word_start = false;
    }
    if written.next().is_some() {
        return title;
    }
    label
}
