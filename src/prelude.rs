pub use crate::form::{
    ActionOutcome, ActionState, ActionTag, AutoForm, FormHelpers, FormStatus, ValidationMode,
    use_form_context,
};
pub use crate::i18n::{I18nManager, Locale};
pub use crate::meta::{Conditional, FieldMeta, MetadataRegistry};
pub use crate::render::{
    AutoFormAction, AutoFormActions, AutoFormContent, AutoFormRoot, ControllerParams,
    ControllerTable, FormTheme, RenderError, RenderParams,
};
pub use crate::resolve::{FieldDescriptor, FieldType};
pub use crate::schema::{FormSchema, Schema, z};
pub use crate::value::{FieldKey, FieldValue, FileValue, Values};
