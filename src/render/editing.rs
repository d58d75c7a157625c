use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use gpui::SharedString;
use rust_decimal::Decimal;

use crate::files::mime_matches;
use crate::resolve::FieldType;
use crate::value::{DATE_FORMAT, DATETIME_FORMAT, FieldValue, FileValue, TIME_FORMAT};

/// Text being typed into a field, with the caret as a char index.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EditState {
    pub text: String,
    pub caret: usize,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct EditOptions {
    pub multiline: bool,
    pub max_length: Option<usize>,
    /// Characters that finish the entry instead of being inserted.
    pub commit_chars: &'static [char],
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EditOutcome {
    Changed(EditState),
    Moved(EditState),
    Commit,
    Ignored,
}

impl EditState {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let caret = text.chars().count();
        Self { text, caret }
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_at(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(byte, _)| byte)
    }

    fn line_start(&self) -> usize {
        let before = &self.text[..self.byte_at(self.caret)];
        before
            .rfind('\n')
            .map_or(0, |newline| before[..=newline].chars().count())
    }

    fn line_end(&self) -> usize {
        let after = &self.text[self.byte_at(self.caret)..];
        let rest = after.find('\n').map_or(after, |newline| &after[..newline]);
        self.caret + rest.chars().count()
    }

    fn moved(&self, caret: usize) -> EditOutcome {
        EditOutcome::Moved(Self {
            text: self.text.clone(),
            caret,
        })
    }

    /// Applies one key press. `key` is gpui's key name, `key_char` the text it types.
    pub fn apply(&self, key: &str, key_char: Option<&str>, options: EditOptions) -> EditOutcome {
        let caret = self.caret.min(self.len());
        match key {
            "backspace" => {
                if caret == 0 {
                    return EditOutcome::Ignored;
                }
                let mut text = self.text.clone();
                text.replace_range(self.byte_at(caret - 1)..self.byte_at(caret), "");
                return EditOutcome::Changed(Self {
                    text,
                    caret: caret - 1,
                });
            }
            "delete" => {
                if caret >= self.len() {
                    return EditOutcome::Ignored;
                }
                let mut text = self.text.clone();
                text.replace_range(self.byte_at(caret)..self.byte_at(caret + 1), "");
                return EditOutcome::Changed(Self { text, caret });
            }
            "left" => return self.moved(caret.saturating_sub(1)),
            "right" => return self.moved((caret + 1).min(self.len())),
            "home" => return self.moved(self.line_start()),
            "end" => return self.moved(self.line_end()),
            "enter" if !options.multiline => return EditOutcome::Commit,
            "escape" | "tab" | "up" | "down" => return EditOutcome::Ignored,
            _ => {}
        }

        let inserted = if key == "enter" {
            "\n".to_string()
        } else {
            let typed = key_char
                .filter(|typed| !typed.is_empty())
                .map(str::to_string)
                .or_else(|| (key.chars().count() == 1).then(|| key.to_string()));
            match typed {
                Some(typed) => typed,
                None => return EditOutcome::Ignored,
            }
        };
        if inserted.chars().any(|ch| options.commit_chars.contains(&ch)) {
            return EditOutcome::Commit;
        }
        if inserted.chars().any(|ch| ch.is_control() && ch != '\n') {
            return EditOutcome::Ignored;
        }

        let room = options
            .max_length
            .map_or(usize::MAX, |max| max.saturating_sub(self.len()));
        let inserted: String = inserted.chars().take(room).collect();
        if inserted.is_empty() {
            return EditOutcome::Ignored;
        }

        let mut text = self.text.clone();
        text.insert_str(self.byte_at(caret), &inserted);
        EditOutcome::Changed(Self {
            text,
            caret: caret + inserted.chars().count(),
        })
    }
}

/// Field value for typed text. `None` while the text does not parse yet,
/// for example a half-typed date; the field keeps its previous value then.
pub fn text_to_value(field_type: &FieldType, text: &str) -> Option<FieldValue> {
    let trimmed = text.trim();
    match field_type {
        FieldType::Number => {
            if trimmed.is_empty() {
                return Some(FieldValue::Empty);
            }
            Decimal::from_str(trimmed).ok().map(FieldValue::Number)
        }
        FieldType::Date => {
            if trimmed.is_empty() {
                return Some(FieldValue::Empty);
            }
            NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                .ok()
                .map(FieldValue::Date)
        }
        FieldType::Time => {
            if trimmed.is_empty() {
                return Some(FieldValue::Empty);
            }
            NaiveTime::parse_from_str(trimmed, &format!("{TIME_FORMAT}:%S"))
                .or_else(|_| NaiveTime::parse_from_str(trimmed, TIME_FORMAT))
                .ok()
                .map(FieldValue::Time)
        }
        FieldType::DateTimeLocal => {
            if trimmed.is_empty() {
                return Some(FieldValue::Empty);
            }
            let normalized = trimmed.replacen(' ', "T", 1);
            NaiveDateTime::parse_from_str(&normalized, &format!("{DATETIME_FORMAT}:%S"))
                .or_else(|_| NaiveDateTime::parse_from_str(&normalized, DATETIME_FORMAT))
                .ok()
                .map(FieldValue::DateTime)
        }
        _ => Some(FieldValue::Text(text.to_string().into())),
    }
}

/// Text an input starts editing from.
pub fn value_to_text(value: &FieldValue) -> String {
    value
        .display()
        .map(|text| text.to_string())
        .unwrap_or_default()
}

/// Tag list after committing `entry`, or `None` when nothing is added:
/// blank entries, repeats and a full list are skipped.
pub fn tags_after_commit(
    tags: &[SharedString],
    entry: &str,
    max_tags: Option<usize>,
) -> Option<Vec<SharedString>> {
    let entry = entry.trim();
    if entry.is_empty() || tags.iter().any(|tag| tag.as_ref() == entry) {
        return None;
    }
    if max_tags.is_some_and(|max| tags.len() >= max) {
        return None;
    }
    let mut next = tags.to_vec();
    next.push(SharedString::from(entry.to_string()));
    Some(next)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FileRejection {
    TooLarge,
    TooSmall,
    WrongType,
    Duplicate,
}

/// Limits a file controller applies to picked files before they reach the form.
#[derive(Clone, Debug, Default)]
pub struct FileRules {
    pub multiple: bool,
    pub min_size: Option<u64>,
    pub max_size: Option<u64>,
    pub mime: Option<Vec<SharedString>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilePick {
    /// New field value, `None` when every picked file was rejected.
    pub value: Option<FieldValue>,
    pub rejected: Vec<(SharedString, FileRejection)>,
}

impl FileRules {
    fn check(&self, file: &FileValue) -> Result<(), FileRejection> {
        if self.max_size.is_some_and(|max| file.size > max) {
            return Err(FileRejection::TooLarge);
        }
        if self.min_size.is_some_and(|min| file.size < min) {
            return Err(FileRejection::TooSmall);
        }
        if let Some(allowed) = &self.mime {
            if !allowed
                .iter()
                .any(|pattern| mime_matches(pattern.as_ref(), file.mime.as_ref()))
            {
                return Err(FileRejection::WrongType);
            }
        }
        Ok(())
    }

    /// Multiple-file fields append accepted files; single-file fields take the first.
    pub fn pick(&self, current: &[FileValue], picked: Vec<FileValue>) -> FilePick {
        let mut accepted: Vec<FileValue> = Vec::new();
        let mut rejected = Vec::new();
        for file in picked {
            let duplicate = self.multiple
                && current
                    .iter()
                    .chain(accepted.iter())
                    .any(|existing| existing.same_file(&file));
            let verdict = if duplicate {
                Err(FileRejection::Duplicate)
            } else {
                self.check(&file)
            };
            match verdict {
                Ok(()) => accepted.push(file),
                Err(reason) => rejected.push((file.name.clone(), reason)),
            }
        }

        let value = if accepted.is_empty() {
            None
        } else if self.multiple {
            let mut files = current.to_vec();
            files.extend(accepted);
            Some(FieldValue::Files(files))
        } else {
            accepted.into_iter().next().map(FieldValue::File)
        };
        FilePick { value, rejected }
    }

    /// Value after removing the file at `index`.
    pub fn remove(&self, current: &[FileValue], index: usize) -> FieldValue {
        if !self.multiple {
            return FieldValue::Empty;
        }
        FieldValue::Files(
            current
                .iter()
                .enumerate()
                .filter(|(position, _)| *position != index)
                .map(|(_, file)| file.clone())
                .collect(),
        )
    }
}
