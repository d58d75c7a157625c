pub mod files;
pub mod form;
pub mod i18n;
pub mod layout;
pub mod meta;
pub mod prelude;
pub mod preview;
pub mod render;
pub mod resolve;
pub mod rich_text;
pub mod schema;
pub mod value;

pub use form::{AutoForm, AutoFormBuilder, FormError, FormResult, use_form_context};
pub use i18n::{I18nManager, Locale};
pub use meta::{Conditional, FieldMeta, MetadataRegistry};
pub use render::{AutoFormAction, AutoFormActions, AutoFormContent, AutoFormRoot, FormTheme};
pub use resolve::{FieldDescriptor, FieldType, SchemaError};
pub use schema::{FormSchema, Schema, z};
pub use value::{FieldKey, FieldValue, FileValue, Values};
