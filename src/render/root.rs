use gpui::{App, Component, IntoElement, ParentElement, RenderOnce, Styled, Window, div};

use super::{AutoFormActions, AutoFormContent, FormTheme};
use crate::form::AutoForm;

/// Renders a form's content and actions with the form active, so controllers
/// can reach it through [`crate::form::use_form_context`]. Colours come from
/// the installed [`FormTheme`], or the default palette.
pub struct AutoFormRoot {
    form: AutoForm,
    content: AutoFormContent,
    actions: Option<AutoFormActions>,
}

impl AutoFormRoot {
    pub fn new(form: AutoForm) -> Self {
        Self {
            form,
            content: AutoFormContent::default(),
            actions: None,
        }
    }

    pub fn content(mut self, content: AutoFormContent) -> Self {
        self.content = content;
        self
    }

    pub fn actions(mut self, actions: AutoFormActions) -> Self {
        self.actions = Some(actions);
        self
    }

    pub fn form(&self) -> &AutoForm {
        &self.form
    }
}

impl RenderOnce for AutoFormRoot {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let theme = FormTheme::current(cx);
        let _scope = self.form.enter_scope();
        let content = self.content.render_with(&self.form, theme);
        let actions = self
            .actions
            .as_ref()
            .map(|actions| actions.render_with(&self.form, theme));

        div()
            .w_full()
            .flex()
            .flex_col()
            .gap_6()
            .child(content)
            .children(actions)
    }
}

impl IntoElement for AutoFormRoot {
    type Element = Component<Self>;

    fn into_element(self) -> Self::Element {
        Component::new(self)
    }
}
