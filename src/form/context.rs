use std::cell::RefCell;
use std::marker::PhantomData;

use super::controller::{AutoForm, FormError, FormResult};

thread_local! {
    static ACTIVE_FORMS: RefCell<Vec<AutoForm>> = const { RefCell::new(Vec::new()) };
}

/// Keeps a form active on the current thread until dropped. Scopes nest.
#[must_use = "the form is only active while the scope guard is alive"]
pub struct FormScope {
    form: AutoForm,
    _not_send: PhantomData<*const ()>,
}

impl FormScope {
    pub fn form(&self) -> &AutoForm {
        &self.form
    }
}

impl Drop for FormScope {
    fn drop(&mut self) {
        ACTIVE_FORMS.with(|forms| {
            let mut forms = forms.borrow_mut();
            if let Some(index) = forms.iter().rposition(|form| form.same_form(&self.form)) {
                forms.remove(index);
            }
        });
    }
}

impl AutoForm {
    pub fn enter_scope(&self) -> FormScope {
        ACTIVE_FORMS.with(|forms| forms.borrow_mut().push(self.clone()));
        FormScope {
            form: self.clone(),
            _not_send: PhantomData,
        }
    }
}

/// The innermost active form; fails outside any [`AutoForm::enter_scope`].
pub fn use_form_context() -> FormResult<AutoForm> {
    ACTIVE_FORMS
        .with(|forms| forms.borrow().last().cloned())
        .ok_or(FormError::NoActiveForm)
}
