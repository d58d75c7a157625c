use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use gpui::SharedString;

use super::controller::{FormResult, read_lock, write_lock};
use crate::i18n::I18nManager;
use crate::schema::SchemaValidator;
use crate::value::{FieldKey, FieldValue, Values};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SetValueOptions {
    pub should_validate: bool,
    pub should_touch: bool,
}

impl SetValueOptions {
    pub const fn validated() -> Self {
        Self {
            should_validate: true,
            should_touch: false,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldState {
    pub invalid: bool,
    pub error: Option<SharedString>,
    pub dirty: bool,
    pub touched: bool,
}

pub type ValueListener = Arc<dyn Fn(&Values) + Send + Sync>;

/// Keeps a value listener registered; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Keeps the listener registered for as long as its store lives.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

/// Live value, validation and interaction state of one form.
pub trait FormStore: Send + Sync + 'static {
    fn values(&self) -> FormResult<Values>;
    fn value(&self, key: &FieldKey) -> FormResult<FieldValue>;
    fn set_value(
        &self,
        key: &FieldKey,
        value: FieldValue,
        options: SetValueOptions,
    ) -> FormResult<()>;
    fn field_state(&self, key: &FieldKey) -> FormResult<FieldState>;
    /// Sets an error message without touching the value.
    fn set_error(&self, key: &FieldKey, message: SharedString) -> FormResult<()>;
    /// Validates one field, or every field when `key` is `None`. Returns
    /// whether everything validated passed.
    fn trigger(&self, key: Option<&FieldKey>) -> FormResult<bool>;
    fn touch(&self, key: &FieldKey) -> FormResult<()>;
    /// Replaces all values and makes them the new baseline.
    fn reset(&self, values: Values) -> FormResult<()>;
    fn watch(&self, listener: ValueListener) -> FormResult<Subscription>;
}

#[derive(Clone, Debug, Default)]
struct FieldStatus {
    error: Option<SharedString>,
    touched: bool,
}

struct StoreState {
    initial: Values,
    values: Values,
    status: BTreeMap<FieldKey, FieldStatus>,
}

type ListenerMap = BTreeMap<u64, ValueListener>;

/// In-memory [`FormStore`] validating against an object schema.
#[derive(Clone)]
pub struct MemoryFormStore {
    state: Arc<RwLock<StoreState>>,
    listeners: Arc<RwLock<ListenerMap>>,
    next_listener: Arc<AtomicU64>,
    validator: SchemaValidator,
    i18n: I18nManager,
}

impl MemoryFormStore {
    pub fn new(validator: SchemaValidator, initial: Values, i18n: I18nManager) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState {
                initial: initial.clone(),
                values: initial,
                status: BTreeMap::new(),
            })),
            listeners: Arc::new(RwLock::new(BTreeMap::new())),
            next_listener: Arc::new(AtomicU64::new(1)),
            validator,
            i18n,
        }
    }

    pub fn listener_count(&self) -> FormResult<usize> {
        Ok(read_lock(&self.listeners, "counting value listeners")?.len())
    }

    fn notify(&self) -> FormResult<()> {
        let values = read_lock(&self.state, "snapshotting values for listeners")?
            .values
            .clone();
        let listeners = read_lock(&self.listeners, "reading value listeners")?
            .values()
            .cloned()
            .collect::<Vec<_>>();
        for listener in listeners {
            listener(&values);
        }
        Ok(())
    }

    fn validate_into(&self, state: &mut StoreState, key: &FieldKey) -> bool {
        let value = state.values.get(key).cloned().unwrap_or_default();
        let error = self
            .validator
            .validate_field(key, &value)
            .map(|issue| issue.message(&self.i18n));
        let valid = error.is_none();
        state.status.entry(key.clone()).or_default().error = error;
        valid
    }
}

impl FormStore for MemoryFormStore {
    fn values(&self) -> FormResult<Values> {
        Ok(read_lock(&self.state, "reading form values")?.values.clone())
    }

    fn value(&self, key: &FieldKey) -> FormResult<FieldValue> {
        Ok(read_lock(&self.state, "reading field value")?
            .values
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    fn set_value(
        &self,
        key: &FieldKey,
        value: FieldValue,
        options: SetValueOptions,
    ) -> FormResult<()> {
        {
            let mut state = write_lock(&self.state, "setting field value")?;
            state.values.insert(key.clone(), value);
            if options.should_touch {
                state.status.entry(key.clone()).or_default().touched = true;
            }
            if options.should_validate {
                self.validate_into(&mut state, key);
            }
        }
        self.notify()
    }

    fn field_state(&self, key: &FieldKey) -> FormResult<FieldState> {
        let state = read_lock(&self.state, "reading field state")?;
        let status = state.status.get(key).cloned().unwrap_or_default();
        let empty = FieldValue::Empty;
        let current = state.values.get(key).unwrap_or(&empty);
        let dirty = current != state.initial.get(key).unwrap_or(&empty);
        Ok(FieldState {
            invalid: status.error.is_some(),
            error: status.error,
            dirty,
            touched: status.touched,
        })
    }

    fn set_error(&self, key: &FieldKey, message: SharedString) -> FormResult<()> {
        let mut state = write_lock(&self.state, "setting field error")?;
        state.status.entry(key.clone()).or_default().error = Some(message);
        Ok(())
    }

    fn trigger(&self, key: Option<&FieldKey>) -> FormResult<bool> {
        let mut state = write_lock(&self.state, "validating form")?;
        match key {
            Some(key) => Ok(self.validate_into(&mut state, key)),
            None => {
                let issues = self.validator.validate(&state.values);
                for status in state.status.values_mut() {
                    status.error = None;
                }
                let valid = issues.is_empty();
                for (key, issue) in issues {
                    state.status.entry(key).or_default().error = Some(issue.message(&self.i18n));
                }
                Ok(valid)
            }
        }
    }

    fn touch(&self, key: &FieldKey) -> FormResult<()> {
        let mut state = write_lock(&self.state, "touching field")?;
        state.status.entry(key.clone()).or_default().touched = true;
        Ok(())
    }

    fn reset(&self, values: Values) -> FormResult<()> {
        {
            let mut state = write_lock(&self.state, "resetting form values")?;
            state.initial = values.clone();
            state.values = values;
            state.status.clear();
        }
        self.notify()
    }

    fn watch(&self, listener: ValueListener) -> FormResult<Subscription> {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        write_lock(&self.listeners, "registering value listener")?.insert(id, listener);

        let listeners: Weak<RwLock<ListenerMap>> = Arc::downgrade(&self.listeners);
        Ok(Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                let mut listeners = match listeners.write() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                listeners.remove(&id);
            }
        }))
    }
}
