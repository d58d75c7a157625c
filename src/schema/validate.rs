use std::collections::BTreeMap;

use gpui::SharedString;
use rust_decimal::Decimal;

use super::{Bag, Bound, EnumMember, Schema, SchemaKind, SchemaKindTag, StringFormat, guards};
use crate::files::{format_file_size, mime_matches};
use crate::i18n::I18nManager;
use crate::resolve::SchemaError;
use crate::value::{FieldKey, FieldValue, FileValue, Values};

/// First failed constraint of a field value.
#[derive(Clone, Debug, PartialEq)]
pub enum Issue {
    Required,
    InvalidType { expected: SchemaKindTag },
    TooShort { minimum: usize },
    TooLong { maximum: usize },
    TooFewItems { minimum: usize },
    TooManyItems { maximum: usize },
    TooSmall { bound: Bound },
    TooBig { bound: Bound },
    NotInteger,
    InvalidFormat(StringFormat),
    InvalidOption,
    FileTooSmall { minimum: u64 },
    FileTooLarge { maximum: u64 },
    InvalidMime { allowed: Vec<SharedString> },
    Item { index: usize, issue: Box<Issue> },
}

impl Issue {
    pub fn message(&self, i18n: &I18nManager) -> SharedString {
        match self {
            Issue::Required => i18n.t("validation.required"),
            Issue::InvalidType { expected } => {
                i18n.t_with("validation.invalid_type", &[("expected", expected.as_str())])
            }
            Issue::TooShort { minimum } => i18n.t_with(
                "validation.too_short",
                &[("minimum", &minimum.to_string())],
            ),
            Issue::TooLong { maximum } => i18n.t_with(
                "validation.too_long",
                &[("maximum", &maximum.to_string())],
            ),
            Issue::TooFewItems { minimum } => i18n.t_with(
                "validation.too_few_items",
                &[("minimum", &minimum.to_string())],
            ),
            Issue::TooManyItems { maximum } => i18n.t_with(
                "validation.too_many_items",
                &[("maximum", &maximum.to_string())],
            ),
            Issue::TooSmall { bound } => {
                let key = if bound.inclusive {
                    "validation.too_small_inclusive"
                } else {
                    "validation.too_small_exclusive"
                };
                i18n.t_with(key, &[("value", &bound.value.normalize().to_string())])
            }
            Issue::TooBig { bound } => {
                let key = if bound.inclusive {
                    "validation.too_big_inclusive"
                } else {
                    "validation.too_big_exclusive"
                };
                i18n.t_with(key, &[("value", &bound.value.normalize().to_string())])
            }
            Issue::NotInteger => i18n.t("validation.not_integer"),
            Issue::InvalidFormat(format) => {
                i18n.t(&format!("validation.invalid_{}", format.as_str()))
            }
            Issue::InvalidOption => i18n.t("validation.invalid_option"),
            Issue::FileTooSmall { minimum } => i18n.t_with(
                "validation.file_too_small",
                &[("size", &format_file_size(*minimum))],
            ),
            Issue::FileTooLarge { maximum } => i18n.t_with(
                "validation.file_too_large",
                &[("size", &format_file_size(*maximum))],
            ),
            Issue::InvalidMime { allowed } => {
                let allowed = allowed
                    .iter()
                    .map(|mime| mime.as_ref())
                    .collect::<Vec<_>>()
                    .join(", ");
                i18n.t_with("validation.invalid_mime", &[("allowed", &allowed)])
            }
            Issue::Item { index, issue } => {
                let message = issue.message(i18n);
                i18n.t_with(
                    "validation.item",
                    &[
                        ("index", &(index + 1).to_string()),
                        ("message", message.as_ref()),
                    ],
                )
            }
        }
    }
}

/// Validates form values against the fields of an object schema.
#[derive(Clone, Debug)]
pub struct SchemaValidator {
    schema: Schema,
}

impl SchemaValidator {
    pub fn new(schema: Schema) -> Result<Self, SchemaError> {
        if !guards::is_object(&schema) {
            return Err(SchemaError::NotAnObject {
                kind: schema.tag(),
            });
        }
        Ok(Self { schema })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// `None` when the value passes, or when `key` is not part of the schema.
    pub fn validate_field(&self, key: &FieldKey, value: &FieldValue) -> Option<Issue> {
        let node = self.schema.shape()?.get(key.as_str())?;
        validate_node(node, value).err()
    }

    pub fn validate(&self, values: &Values) -> BTreeMap<FieldKey, Issue> {
        let Some(shape) = self.schema.shape() else {
            return BTreeMap::new();
        };
        let empty = FieldValue::Empty;
        shape
            .iter()
            .filter_map(|(key, node)| {
                let value = values.get(key).unwrap_or(&empty);
                validate_node(node, value)
                    .err()
                    .map(|issue| (key.clone(), issue))
            })
            .collect()
    }
}

pub(crate) fn validate_node(node: &Schema, value: &FieldValue) -> Result<(), Issue> {
    if value.is_empty() {
        return if guards::is_nullish_wrapped(node) {
            Ok(())
        } else {
            Err(Issue::Required)
        };
    }

    let base = guards::unwrap(node);
    let bag = base.bag();
    match (base.kind(), value) {
        (SchemaKind::String, FieldValue::Text(text)) => validate_text(&bag, text.as_ref()),
        (SchemaKind::Number, FieldValue::Number(number)) => validate_number(&bag, *number),
        (SchemaKind::Boolean, FieldValue::Bool(_)) => Ok(()),
        (
            SchemaKind::Date,
            FieldValue::Date(_) | FieldValue::Time(_) | FieldValue::DateTime(_),
        ) => Ok(()),
        (SchemaKind::Enum(def), value) => {
            let known = def.members.iter().any(|member| match (member, value) {
                (EnumMember::Text(member), FieldValue::Text(text)) => member == text,
                (EnumMember::Number(member), FieldValue::Number(number)) => member == number,
                _ => false,
            });
            if known {
                Ok(())
            } else {
                Err(Issue::InvalidOption)
            }
        }
        (SchemaKind::Array(element), FieldValue::List(items)) => {
            validate_count(&bag, items.len())?;
            for (index, item) in items.iter().enumerate() {
                validate_node(element, &FieldValue::Text(item.clone())).map_err(|issue| {
                    Issue::Item {
                        index,
                        issue: Box::new(issue),
                    }
                })?;
            }
            Ok(())
        }
        (SchemaKind::Array(element), FieldValue::Files(files)) => {
            validate_count(&bag, files.len())?;
            for (index, file) in files.iter().enumerate() {
                validate_node(element, &FieldValue::File(file.clone())).map_err(|issue| {
                    Issue::Item {
                        index,
                        issue: Box::new(issue),
                    }
                })?;
            }
            Ok(())
        }
        (SchemaKind::File, FieldValue::File(file)) => validate_file(&bag, file),
        _ => Err(Issue::InvalidType {
            expected: base.tag(),
        }),
    }
}

fn validate_text(bag: &Bag, text: &str) -> Result<(), Issue> {
    let length = text.chars().count();
    if let Some(minimum) = bag.min_length.filter(|minimum| length < *minimum) {
        return Err(Issue::TooShort { minimum });
    }
    if let Some(maximum) = bag.max_length.filter(|maximum| length > *maximum) {
        return Err(Issue::TooLong { maximum });
    }
    for format in &bag.formats {
        let valid = match format {
            StringFormat::Email => is_email(text),
            StringFormat::Url => is_url(text),
            StringFormat::Uuid => is_uuid(text),
        };
        if !valid {
            return Err(Issue::InvalidFormat(*format));
        }
    }
    Ok(())
}

fn validate_number(bag: &Bag, number: Decimal) -> Result<(), Issue> {
    if let Some(bound) = bag.greater_than.filter(|bound| !bound.admits_above(number)) {
        return Err(Issue::TooSmall { bound });
    }
    if let Some(bound) = bag.less_than.filter(|bound| !bound.admits_below(number)) {
        return Err(Issue::TooBig { bound });
    }
    if bag.integer && !number.fract().is_zero() {
        return Err(Issue::NotInteger);
    }
    Ok(())
}

fn validate_count(bag: &Bag, count: usize) -> Result<(), Issue> {
    if let Some(minimum) = bag.min_length.filter(|minimum| count < *minimum) {
        return Err(Issue::TooFewItems { minimum });
    }
    if let Some(maximum) = bag.max_length.filter(|maximum| count > *maximum) {
        return Err(Issue::TooManyItems { maximum });
    }
    Ok(())
}

fn validate_file(bag: &Bag, file: &FileValue) -> Result<(), Issue> {
    if let Some(minimum) = bag.min_size.filter(|minimum| file.size < *minimum) {
        return Err(Issue::FileTooSmall { minimum });
    }
    if let Some(maximum) = bag.max_size.filter(|maximum| file.size > *maximum) {
        return Err(Issue::FileTooLarge { maximum });
    }
    if let Some(allowed) = &bag.mime {
        let accepted = allowed
            .iter()
            .any(|pattern| mime_matches(pattern.as_ref(), file.mime.as_ref()));
        if !accepted {
            return Err(Issue::InvalidMime {
                allowed: allowed.clone(),
            });
        }
    }
    Ok(())
}

fn is_email(text: &str) -> bool {
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| {
            !label.is_empty()
                && label
                    .chars()
                    .all(|ch| ch.is_alphanumeric() || ch == '-')
        })
}

fn is_url(text: &str) -> bool {
    let Some((scheme, rest)) = text.split_once("://") else {
        return false;
    };
    let mut scheme_chars = scheme.chars();
    let scheme_ok = scheme_chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic())
        && scheme_chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'));
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    scheme_ok && !host.is_empty() && !text.chars().any(char::is_whitespace)
}

fn is_uuid(text: &str) -> bool {
    let groups = text.split('-').collect::<Vec<_>>();
    groups.len() == 5
        && groups
            .iter()
            .zip([8, 4, 4, 4, 12])
            .all(|(group, len)| group.len() == len && group.chars().all(|ch| ch.is_ascii_hexdigit()))
}
