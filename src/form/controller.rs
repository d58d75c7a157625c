use std::fmt::{Display, Formatter};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::FutureExt;
use futures::future::BoxFuture;
use gpui::SharedString;
use thiserror::Error;

use super::store::{FieldState, FormStore, MemoryFormStore, SetValueOptions, Subscription};
use crate::i18n::{I18nManager, Locale};
use crate::layout::{FieldGroup, group_fields};
use crate::meta::{BoxError, MetadataRegistry};
use crate::resolve::{FieldDescriptor, FieldResolver, SchemaError};
use crate::schema::{Schema, SchemaValidator};
use crate::value::{FieldKey, FieldValue, Values};

static FORM_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormId(pub u64);

impl FormId {
    pub fn next() -> Self {
        Self(FORM_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

impl Display for FormId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Distinguishes several submit buttons of one form.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ActionTag(pub SharedString);

impl ActionTag {
    pub fn new(tag: impl Into<SharedString>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }
}

impl Display for ActionTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&'static str> for ActionTag {
    fn from(value: &'static str) -> Self {
        Self(value.into())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ActionState {
    Idle,
    Submitting,
    Cancelling,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ActionOutcome {
    /// The handler ran and finished without error.
    Completed,
    /// The handler returned an error or panicked; it has been logged.
    Failed,
    /// Validation failed, the handler was not called.
    Invalid,
    /// Another action was already in flight.
    Ignored,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FormStatus {
    pub is_submitting: bool,
    pub is_loading: bool,
}

/// When a bound widget's events validate its field.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ValidationMode {
    #[default]
    All,
    OnChange,
    OnBlur,
    OnSubmit,
}

impl ValidationMode {
    pub fn validates_on_change(self) -> bool {
        matches!(self, ValidationMode::All | ValidationMode::OnChange)
    }

    pub fn validates_on_blur(self) -> bool {
        matches!(self, ValidationMode::All | ValidationMode::OnBlur)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FormOptions {
    pub labels: bool,
    pub validation_mode: ValidationMode,
    pub locale: Locale,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            labels: true,
            validation_mode: ValidationMode::All,
            locale: Locale::System,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum FormError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("form state lock poisoned while {0}")]
    StatePoisoned(&'static str),
    #[error("field `{0}` is not part of the form schema")]
    UnknownField(FieldKey),
    #[error("no auto form is active on this thread; render inside an AutoFormRoot")]
    NoActiveForm,
    #[error("`show` and `hide` cannot both be set")]
    ConflictingFilters,
}

pub type FormResult<T> = Result<T, FormError>;

pub type ActionFuture = BoxFuture<'static, Result<(), BoxError>>;
pub type SubmitHandler =
    Arc<dyn Fn(Values, Option<ActionTag>, FormHelpers) -> ActionFuture + Send + Sync>;
pub type CancelHandler = Arc<dyn Fn() -> ActionFuture + Send + Sync>;
pub type ErrorHandler = Arc<dyn Fn() + Send + Sync>;
pub type ChangeHandler = Arc<dyn Fn(&Values) + Send + Sync>;

#[derive(Clone, Default)]
struct FormHandlers {
    on_submit: Option<SubmitHandler>,
    on_cancel: Option<CancelHandler>,
    on_error: Option<ErrorHandler>,
    on_change: Option<ChangeHandler>,
}

struct FormInner {
    id: FormId,
    schema: Schema,
    fields: Vec<FieldDescriptor>,
    groups: Vec<FieldGroup>,
    defaults: Values,
    store: Arc<dyn FormStore>,
    action: RwLock<ActionState>,
    handlers: FormHandlers,
    options: FormOptions,
    i18n: I18nManager,
    _change_subscription: Option<Subscription>,
}

/// A live form bound to an object schema.
///
/// Cloning is cheap; all clones share the same store and action state. The
/// `on_change` subscription is released when the last clone is dropped.
#[derive(Clone)]
pub struct AutoForm {
    inner: Arc<FormInner>,
}

impl AutoForm {
    pub fn builder(schema: Schema, registry: &MetadataRegistry) -> AutoFormBuilder<'_> {
        AutoFormBuilder {
            schema,
            registry,
            defaults: Values::new(),
            handlers: FormHandlers::default(),
            options: FormOptions::default(),
            store: None,
        }
    }

    pub fn id(&self) -> FormId {
        self.inner.id
    }

    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.inner.fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.inner
            .fields
            .iter()
            .find(|field| field.key.as_str() == key)
    }

    pub fn groups(&self) -> &[FieldGroup] {
        &self.inner.groups
    }

    pub fn default_values(&self) -> &Values {
        &self.inner.defaults
    }

    pub fn store(&self) -> &Arc<dyn FormStore> {
        &self.inner.store
    }

    pub fn options(&self) -> &FormOptions {
        &self.inner.options
    }

    pub fn labels(&self) -> bool {
        self.inner.options.labels
    }

    pub fn i18n(&self) -> &I18nManager {
        &self.inner.i18n
    }

    pub fn same_form(&self, other: &AutoForm) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn action_state(&self) -> FormResult<ActionState> {
        Ok(*read_lock(&self.inner.action, "reading action state")?)
    }

    pub fn is_action_loading(&self) -> FormResult<bool> {
        Ok(self.action_state()? != ActionState::Idle)
    }

    pub fn status(&self) -> FormResult<FormStatus> {
        let state = self.action_state()?;
        Ok(FormStatus {
            is_submitting: state == ActionState::Submitting,
            is_loading: state != ActionState::Idle,
        })
    }

    pub fn values(&self) -> FormResult<Values> {
        self.inner.store.values()
    }

    pub fn value(&self, key: &FieldKey) -> FormResult<FieldValue> {
        self.inner.store.value(key)
    }

    pub fn field_state(&self, key: &FieldKey) -> FormResult<FieldState> {
        self.inner.store.field_state(key)
    }

    /// Sets a field value and validates that field.
    pub fn set_value(
        &self,
        key: impl Into<FieldKey>,
        value: impl Into<FieldValue>,
    ) -> FormResult<()> {
        let key = self.known_key(key.into())?;
        self.inner
            .store
            .set_value(&key, value.into(), SetValueOptions::validated())
    }

    /// Puts an error message on a field; the value is kept.
    pub fn set_error(
        &self,
        key: impl Into<FieldKey>,
        message: impl Into<SharedString>,
    ) -> FormResult<()> {
        let key = self.known_key(key.into())?;
        self.inner.store.set_error(&key, message.into())
    }

    /// Restores the default values and clears all errors.
    pub fn reset(&self) -> FormResult<()> {
        self.inner.store.reset(self.inner.defaults.clone())
    }

    /// Sets every field to [`FieldValue::Empty`] and clears all errors.
    pub fn clear(&self) -> FormResult<()> {
        let empty = self
            .inner
            .fields
            .iter()
            .map(|field| (field.key.clone(), FieldValue::Empty))
            .collect();
        self.inner.store.reset(empty)
    }

    /// Change event of a bound widget; validates according to the form's mode.
    pub fn update_field(&self, key: &FieldKey, value: FieldValue) -> FormResult<()> {
        let options = SetValueOptions {
            should_validate: self.inner.options.validation_mode.validates_on_change(),
            should_touch: false,
        };
        self.inner.store.set_value(key, value, options)
    }

    /// Blur event of a bound widget.
    pub fn touch_field(&self, key: &FieldKey) -> FormResult<()> {
        self.inner.store.touch(key)?;
        if self.inner.options.validation_mode.validates_on_blur() {
            self.inner.store.trigger(Some(key))?;
        }
        Ok(())
    }

    pub fn helpers(&self) -> FormHelpers {
        FormHelpers { form: self.clone() }
    }

    /// Validates the whole form, then submits the current values. Ignored
    /// without validating while another action is in flight.
    pub async fn submit(&self, tag: Option<ActionTag>) -> FormResult<ActionOutcome> {
        if self.is_action_loading()? {
            tracing::debug!(
                target: "calmform::form",
                form = %self.inner.id,
                "ignoring submit while another action is in flight"
            );
            return Ok(ActionOutcome::Ignored);
        }
        let values = self.inner.store.values()?;
        if !self.inner.store.trigger(None)? {
            tracing::debug!(
                target: "form-error",
                form = %self.inner.id,
                tag = tag.as_ref().map(ActionTag::as_str),
                "submit blocked by validation errors"
            );
            if let Some(on_error) = &self.inner.handlers.on_error {
                on_error();
            }
            return Ok(ActionOutcome::Invalid);
        }
        self.submit_values(tag, values).await
    }

    /// Hands `values` to the submit handler unless an action is in flight.
    pub async fn submit_values(
        &self,
        tag: Option<ActionTag>,
        values: Values,
    ) -> FormResult<ActionOutcome> {
        let Some(_guard) = self.begin_action(ActionState::Submitting)? else {
            tracing::debug!(
                target: "calmform::form",
                form = %self.inner.id,
                "ignoring submit while another action is in flight"
            );
            return Ok(ActionOutcome::Ignored);
        };
        let Some(on_submit) = self.inner.handlers.on_submit.clone() else {
            return Ok(ActionOutcome::Completed);
        };
        let future = on_submit(values, tag, self.helpers());
        Ok(self.run_action("submit", future).await)
    }

    /// Runs the cancel handler, or resets to defaults when there is none.
    pub async fn cancel(&self) -> FormResult<ActionOutcome> {
        let Some(_guard) = self.begin_action(ActionState::Cancelling)? else {
            tracing::debug!(
                target: "calmform::form",
                form = %self.inner.id,
                "ignoring cancel while another action is in flight"
            );
            return Ok(ActionOutcome::Ignored);
        };
        match self.inner.handlers.on_cancel.clone() {
            Some(on_cancel) => Ok(self.run_action("cancel", on_cancel()).await),
            None => {
                self.reset()?;
                Ok(ActionOutcome::Completed)
            }
        }
    }

    fn begin_action(&self, next: ActionState) -> FormResult<Option<ActionGuard<'_>>> {
        let mut state = write_lock(&self.inner.action, "starting form action")?;
        if *state != ActionState::Idle {
            return Ok(None);
        }
        *state = next;
        Ok(Some(ActionGuard {
            state: &self.inner.action,
        }))
    }

    async fn run_action(&self, action: &'static str, future: ActionFuture) -> ActionOutcome {
        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(Ok(())) => ActionOutcome::Completed,
            Ok(Err(error)) => {
                tracing::error!(
                    target: "form-error",
                    form = %self.inner.id,
                    action,
                    %error,
                    "form action failed"
                );
                ActionOutcome::Failed
            }
            Err(_) => {
                tracing::error!(
                    target: "form-error",
                    form = %self.inner.id,
                    action,
                    "form action panicked"
                );
                ActionOutcome::Failed
            }
        }
    }

    fn known_key(&self, key: FieldKey) -> FormResult<FieldKey> {
        if self.inner.fields.iter().any(|field| field.key == key) {
            Ok(key)
        } else {
            Err(FormError::UnknownField(key))
        }
    }
}

/// Returns the form to `Idle` however the action ends.
struct ActionGuard<'a> {
    state: &'a RwLock<ActionState>,
}

impl Drop for ActionGuard<'_> {
    fn drop(&mut self) {
        let mut state = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *state = ActionState::Idle;
    }
}

/// Form operations available to a submit handler.
#[derive(Clone)]
pub struct FormHelpers {
    form: AutoForm,
}

impl FormHelpers {
    pub fn form(&self) -> &AutoForm {
        &self.form
    }

    pub fn reset(&self) -> FormResult<()> {
        self.form.reset()
    }

    pub fn clear(&self) -> FormResult<()> {
        self.form.clear()
    }

    pub fn set_value(
        &self,
        key: impl Into<FieldKey>,
        value: impl Into<FieldValue>,
    ) -> FormResult<()> {
        self.form.set_value(key, value)
    }

    pub fn set_error(
        &self,
        key: impl Into<FieldKey>,
        message: impl Into<SharedString>,
    ) -> FormResult<()> {
        self.form.set_error(key, message)
    }
}

pub struct AutoFormBuilder<'a> {
    schema: Schema,
    registry: &'a MetadataRegistry,
    defaults: Values,
    handlers: FormHandlers,
    options: FormOptions,
    store: Option<Arc<dyn FormStore>>,
}

impl AutoFormBuilder<'_> {
    pub fn default_values(mut self, values: Values) -> Self {
        self.defaults = values;
        self
    }

    pub fn default_value(mut self, key: impl Into<FieldKey>, value: impl Into<FieldValue>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    pub fn on_submit<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Values, Option<ActionTag>, FormHelpers) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.handlers.on_submit = Some(Arc::new(
            move |values: Values, tag: Option<ActionTag>, helpers: FormHelpers| {
                handler(values, tag, helpers).boxed()
            },
        ));
        self
    }

    pub fn on_cancel<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.handlers.on_cancel = Some(Arc::new(move || handler().boxed()));
        self
    }

    pub fn on_error(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.handlers.on_error = Some(Arc::new(handler));
        self
    }

    pub fn on_change(mut self, handler: impl Fn(&Values) + Send + Sync + 'static) -> Self {
        self.handlers.on_change = Some(Arc::new(handler));
        self
    }

    pub fn options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }

    pub fn labels(mut self, labels: bool) -> Self {
        self.options.labels = labels;
        self
    }

    pub fn validation_mode(mut self, mode: ValidationMode) -> Self {
        self.options.validation_mode = mode;
        self
    }

    pub fn locale(mut self, locale: impl Into<Locale>) -> Self {
        self.options.locale = locale.into();
        self
    }

    /// Uses an external store as-is instead of an in-memory one seeded with
    /// the default values.
    pub fn store(mut self, store: Arc<dyn FormStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Resolves every field; structural schema errors fail here, before
    /// anything is rendered.
    pub fn build(self) -> FormResult<AutoForm> {
        let i18n = I18nManager::with_locale(self.options.locale.clone());
        let fields = FieldResolver::new(self.registry)
            .i18n(i18n.clone())
            .resolve_all(&self.schema)?;
        let groups = group_fields(fields.iter().cloned());

        let store = match self.store {
            Some(store) => store,
            None => {
                let validator = SchemaValidator::new(self.schema.clone())?;
                Arc::new(MemoryFormStore::new(
                    validator,
                    self.defaults.clone(),
                    i18n.clone(),
                )) as Arc<dyn FormStore>
            }
        };

        let change_subscription = match self.handlers.on_change.clone() {
            Some(on_change) => Some(store.watch(on_change)?),
            None => None,
        };

        let id = FormId::next();
        tracing::debug!(
            target: "calmform::form",
            form = %id,
            fields = fields.len(),
            groups = groups.len(),
            "form built"
        );

        Ok(AutoForm {
            inner: Arc::new(FormInner {
                id,
                schema: self.schema,
                fields,
                groups,
                defaults: self.defaults,
                store,
                action: RwLock::new(ActionState::Idle),
                handlers: self.handlers,
                options: self.options,
                i18n,
                _change_subscription: change_subscription,
            }),
        })
    }
}

pub(crate) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(crate) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
