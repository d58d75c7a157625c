use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use gpui::SharedString;
use rust_decimal::Decimal;

/// Name of one field in an object schema.
#[derive(Clone, Debug)]
pub struct FieldKey(SharedString);

impl FieldKey {
    pub fn new(value: impl Into<SharedString>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }

    pub fn as_shared(&self) -> &SharedString {
        &self.0
    }
}

impl PartialEq for FieldKey {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for FieldKey {}

impl PartialOrd for FieldKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Hash for FieldKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Borrow<str> for FieldKey {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&'static str> for FieldKey {
    fn from(value: &'static str) -> Self {
        Self(value.into())
    }
}

impl From<String> for FieldKey {
    fn from(value: String) -> Self {
        Self(value.into())
    }
}

impl From<SharedString> for FieldKey {
    fn from(value: SharedString) -> Self {
        Self(value)
    }
}

impl From<&FieldKey> for FieldKey {
    fn from(value: &FieldKey) -> Self {
        value.clone()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct FileValue {
    pub name: SharedString,
    pub size: u64,
    pub mime: SharedString,
    /// Where the file was picked from, when it came from disk.
    pub path: Option<PathBuf>,
}

impl FileValue {
    pub fn new(name: impl Into<SharedString>, size: u64, mime: impl Into<SharedString>) -> Self {
        Self {
            name: name.into(),
            size,
            mime: mime.into(),
            path: None,
        }
    }

    /// Reads name and size from disk; the mime type comes from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            mime: crate::files::mime_from_path(path).into(),
            name: name.into(),
            size: metadata.len(),
            path: Some(path.to_path_buf()),
        })
    }

    /// Same name and size; how a re-picked file is recognised.
    pub fn same_file(&self, other: &FileValue) -> bool {
        self.name == other.name && self.size == other.size
    }
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Current value of one field.
///
/// `Empty` is the "undefined" state a cleared field holds; an empty `Text`
/// is still a present value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(SharedString),
    Number(Decimal),
    Bool(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    List(Vec<SharedString>),
    File(FileValue),
    Files(Vec<FileValue>),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value.as_ref()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            FieldValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            FieldValue::Time(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            FieldValue::DateTime(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SharedString]> {
        match self {
            FieldValue::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_files(&self) -> Option<&[FileValue]> {
        match self {
            FieldValue::Files(files) => Some(files),
            FieldValue::File(file) => Some(std::slice::from_ref(file)),
            _ => None,
        }
    }

    /// Short human-readable form used by the built-in display controllers.
    pub fn display(&self) -> Option<SharedString> {
        match self {
            FieldValue::Empty => None,
            FieldValue::Text(value) => (!value.is_empty()).then(|| value.clone()),
            FieldValue::Number(value) => Some(value.normalize().to_string().into()),
            FieldValue::Bool(value) => Some(if *value { "true" } else { "false" }.into()),
            FieldValue::Date(value) => Some(value.format(DATE_FORMAT).to_string().into()),
            FieldValue::Time(value) => Some(format_time(*value, TIME_FORMAT).into()),
            FieldValue::DateTime(value) => Some(
                format!(
                    "{}{}",
                    value.date().format(DATE_FORMAT),
                    format_time(value.time(), "T%H:%M")
                )
                .into(),
            ),
            FieldValue::List(values) => (!values.is_empty()).then(|| {
                values
                    .iter()
                    .map(|value| value.as_ref())
                    .collect::<Vec<_>>()
                    .join(", ")
                    .into()
            }),
            FieldValue::File(file) => Some(file.name.clone()),
            FieldValue::Files(files) => (!files.is_empty()).then(|| {
                files
                    .iter()
                    .map(|file| file.name.as_ref())
                    .collect::<Vec<_>>()
                    .join(", ")
                    .into()
            }),
        }
    }
}

impl From<&'static str> for FieldValue {
    fn from(value: &'static str) -> Self {
        FieldValue::Text(value.into())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value.into())
    }
}

impl From<SharedString> for FieldValue {
    fn from(value: SharedString) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(Decimal::from(value))
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<NaiveTime> for FieldValue {
    fn from(value: NaiveTime) -> Self {
        FieldValue::Time(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::DateTime(value)
    }
}

/// Seconds are only written when set, matching what time inputs accept back.
fn format_time(time: NaiveTime, minutes: &str) -> String {
    if time.second() == 0 {
        time.format(minutes).to_string()
    } else {
        time.format(&format!("{minutes}:%S")).to_string()
    }
}

impl From<FileValue> for FieldValue {
    fn from(value: FileValue) -> Self {
        FieldValue::File(value)
    }
}

impl From<Vec<FileValue>> for FieldValue {
    fn from(value: Vec<FileValue>) -> Self {
        FieldValue::Files(value)
    }
}

impl From<Vec<SharedString>> for FieldValue {
    fn from(value: Vec<SharedString>) -> Self {
        FieldValue::List(value)
    }
}

/// Full value set of a form, keyed by field name.
pub type Values = BTreeMap<FieldKey, FieldValue>;

pub fn values<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Values
where
    K: Into<FieldKey>,
    V: Into<FieldValue>,
{
    entries
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}
