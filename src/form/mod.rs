mod context;
mod controller;
mod store;


pub use context::{FormScope, use_form_context};
pub use controller::{
    ActionFuture, ActionOutcome, ActionState, ActionTag, AutoForm, AutoFormBuilder,
    CancelHandler, ChangeHandler, ErrorHandler, FormError, FormHelpers, FormId, FormOptions,
    FormResult, FormStatus, SubmitHandler, ValidationMode,
};
pub use store::{
    FieldState, FormStore, MemoryFormStore, SetValueOptions, Subscription, ValueListener,
};
