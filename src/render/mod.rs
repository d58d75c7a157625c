mod actions;
mod content;
mod controllers;
mod editing;
mod input;
mod root;
mod theme;

#[cfg(test)]
mod tests;

use std::fmt::{Debug, Formatter};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use gpui::{AnyElement, SharedString};
use thiserror::Error;

use crate::form::{AutoForm, FormResult, FormStatus};
use crate::meta::{BoxError, FieldMeta, evaluate_conditional};
use crate::resolve::FieldDescriptor;
use crate::value::{FieldKey, FieldValue, Values};

pub use actions::{AutoFormAction, AutoFormActions};
pub use content::{AutoFormContent, FieldPlan, FieldRenderFn, RowPlan};
pub use controllers::{ControllerTable, DefaultController};
pub use editing::{
    EditOptions, EditOutcome, EditState, FilePick, FileRejection, FileRules, tags_after_commit,
    text_to_value, value_to_text,
};
pub use root::AutoFormRoot;
pub use theme::FormTheme;

/// Failure of a host controller or renderer; the field shows a placeholder instead.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{0}")]
    Message(SharedString),
    #[error("{0}")]
    Host(#[source] BoxError),
    #[error("field `{field}` panicked while rendering")]
    Panicked { field: FieldKey },
}

impl RenderError {
    pub fn msg(message: impl Into<SharedString>) -> Self {
        Self::Message(message.into())
    }

    pub fn host(error: impl Into<BoxError>) -> Self {
        Self::Host(error.into())
    }
}

pub type ControllerFn =
    Arc<dyn Fn(&ControllerParams) -> Result<AnyElement, RenderError> + Send + Sync>;
pub type RendererFn = Arc<dyn Fn(RenderParams) -> Result<AnyElement, RenderError> + Send + Sync>;
pub type ValueChangeFn = Arc<dyn Fn(FieldValue) + Send + Sync>;
pub type BlurFn = Arc<dyn Fn() + Send + Sync>;

/// Value and event hooks of one field, wired to the form store.
#[derive(Clone)]
pub struct FieldBinding {
    pub name: FieldKey,
    pub value: FieldValue,
    pub on_change: ValueChangeFn,
    pub on_blur: BlurFn,
}

impl FieldBinding {
    pub fn change(&self, value: impl Into<FieldValue>) {
        (self.on_change)(value.into());
    }

    pub fn blur(&self) {
        (self.on_blur)();
    }
}

impl Debug for FieldBinding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBinding")
            .field("name", &self.name)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldErrorState {
    pub invalid: bool,
    pub error: Option<SharedString>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct UiState {
    pub disabled: bool,
    pub read_only: bool,
}

/// Everything a controller needs to draw and drive one field.
#[derive(Clone, Debug)]
pub struct ControllerParams {
    pub field_config: FieldDescriptor,
    pub field: FieldBinding,
    pub field_state: FieldErrorState,
    pub form_state: FormStatus,
    pub ui: UiState,
    pub labels: bool,
    pub theme: FormTheme,
}

impl ControllerParams {
    /// Binds `descriptor` to `form`, evaluating its conditionals against `values`.
    pub fn bind(
        form: &AutoForm,
        descriptor: &FieldDescriptor,
        values: &Values,
    ) -> FormResult<Self> {
        let key = descriptor.key.clone();
        let state = form.field_state(&key)?;
        let meta = &descriptor.meta;

        let change_form = form.clone();
        let change_key = key.clone();
        let blur_form = form.clone();
        let blur_key = key.clone();

        Ok(Self {
            field: FieldBinding {
                name: key.clone(),
                value: values.get(&key).cloned().unwrap_or_default(),
                on_change: Arc::new(move |value| {
                    if let Err(error) = change_form.update_field(&change_key, value) {
                        tracing::error!(target: "field-error", field = %change_key, %error, "field update failed");
                    }
                }),
                on_blur: Arc::new(move || {
                    if let Err(error) = blur_form.touch_field(&blur_key) {
                        tracing::error!(target: "field-error", field = %blur_key, %error, "field blur failed");
                    }
                }),
            },
            field_state: FieldErrorState {
                invalid: state.invalid,
                error: state.error,
            },
            form_state: form.status()?,
            ui: UiState {
                disabled: evaluate_conditional(meta.disabled.as_ref(), values, false),
                read_only: evaluate_conditional(meta.readonly.as_ref(), values, false),
            },
            labels: form.labels(),
            theme: FormTheme::default(),
            field_config: descriptor.clone(),
        })
    }

    pub fn with_theme(mut self, theme: FormTheme) -> Self {
        self.theme = theme;
        self
    }

    pub fn meta(&self) -> &FieldMeta {
        &self.field_config.meta
    }

    pub fn key(&self) -> &FieldKey {
        &self.field.name
    }

    /// Disabled by metadata or while any form action is in flight.
    pub fn is_locked(&self) -> bool {
        self.ui.disabled || self.form_state.is_loading
    }
}

/// Renders the standard chrome around the default controller.
pub struct DefaultRender {
    render: Box<dyn FnOnce() -> AnyElement>,
}

impl DefaultRender {
    pub(crate) fn new(render: impl FnOnce() -> AnyElement + 'static) -> Self {
        Self {
            render: Box::new(render),
        }
    }

    pub fn render(self) -> AnyElement {
        (self.render)()
    }
}

/// Input of a custom renderer, which owns all markup of its field.
pub struct RenderParams {
    pub params: ControllerParams,
    /// Custom controller output when one is registered, else the default controller.
    pub controller: AnyElement,
    pub default_render: DefaultRender,
}

/// How one field is drawn in a render pass.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldDispatch {
    Default,
    CustomController,
    CustomRenderer,
}

impl FieldDispatch {
    pub fn for_meta(meta: &FieldMeta) -> Self {
        if meta.renderer.is_some() {
            FieldDispatch::CustomRenderer
        } else if meta.controller.is_some() {
            FieldDispatch::CustomController
        } else {
            FieldDispatch::Default
        }
    }
}

/// Runs host render code for one field, turning a panic into an error.
pub(crate) fn contain_field<T>(
    key: &FieldKey,
    render: impl FnOnce() -> Result<T, RenderError>,
) -> Result<T, RenderError> {
    match catch_unwind(AssertUnwindSafe(render)) {
        Ok(result) => result,
        Err(_) => Err(RenderError::Panicked { field: key.clone() }),
    }
}
