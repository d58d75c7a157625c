use gpui::SharedString;

use super::Schema;

/// Option of an enhanced enum: a bare value or a value with display details.
#[derive(Clone, Debug, PartialEq)]
pub enum EnumOption {
    Value(SharedString),
    Detailed {
        value: SharedString,
        label: Option<SharedString>,
        description: Option<SharedString>,
    },
}

impl EnumOption {
    pub fn new(value: impl Into<SharedString>) -> Self {
        EnumOption::Value(value.into())
    }

    pub fn detailed(value: impl Into<SharedString>) -> Self {
        EnumOption::Detailed {
            value: value.into(),
            label: None,
            description: None,
        }
    }

    pub fn label(self, text: impl Into<SharedString>) -> Self {
        match self {
            EnumOption::Value(value) => EnumOption::Detailed {
                value,
                label: Some(text.into()),
                description: None,
            },
            EnumOption::Detailed {
                value, description, ..
            } => EnumOption::Detailed {
                value,
                label: Some(text.into()),
                description,
            },
        }
    }

    pub fn description(self, text: impl Into<SharedString>) -> Self {
        match self {
            EnumOption::Value(value) => EnumOption::Detailed {
                value,
                label: None,
                description: Some(text.into()),
            },
            EnumOption::Detailed { value, label, .. } => EnumOption::Detailed {
                value,
                label,
                description: Some(text.into()),
            },
        }
    }

    pub fn value(&self) -> &SharedString {
        match self {
            EnumOption::Value(value) | EnumOption::Detailed { value, .. } => value,
        }
    }

    /// Display label, falling back to the value.
    pub fn display_label(&self) -> &SharedString {
        match self {
            EnumOption::Detailed {
                label: Some(label), ..
            } => label,
            _ => self.value(),
        }
    }

    pub fn display_description(&self) -> Option<&SharedString> {
        match self {
            EnumOption::Detailed { description, .. } => description.as_ref(),
            EnumOption::Value(_) => None,
        }
    }
}

impl From<&'static str> for EnumOption {
    fn from(value: &'static str) -> Self {
        EnumOption::Value(value.into())
    }
}

impl From<String> for EnumOption {
    fn from(value: String) -> Self {
        EnumOption::Value(value.into())
    }
}

pub fn has_enhanced_options(node: &Schema) -> bool {
    node.enum_def()
        .is_some_and(|def| def.enhanced.is_some())
}

pub fn enhanced_options(node: &Schema) -> Option<Vec<EnumOption>> {
    node.enum_def()
        .and_then(|def| def.enhanced.as_ref())
        .map(|options| options.to_vec())
}
