use gpui::prelude::FluentBuilder;
use gpui::{
    AnyElement, FontWeight, InteractiveElement, IntoElement, ParentElement, SharedString,
    StatefulInteractiveElement, Styled, div, px,
};

use super::FormTheme;
use crate::form::{ActionOutcome, ActionState, ActionTag, AutoForm, FormResult};
use crate::resolve::humanize_key;

/// A form button. `Reset` runs the cancel handler, or restores the defaults.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AutoFormAction {
    Submit,
    Reset,
    /// Submits with this tag so the handler can tell the buttons apart.
    Custom(ActionTag),
}

impl AutoFormAction {
    pub fn custom(tag: impl Into<SharedString>) -> Self {
        Self::Custom(ActionTag::new(tag))
    }

    pub async fn trigger(&self, form: &AutoForm) -> FormResult<ActionOutcome> {
        match self {
            AutoFormAction::Submit => form.submit(None).await,
            AutoFormAction::Reset => form.cancel().await,
            AutoFormAction::Custom(tag) => form.submit(Some(tag.clone())).await,
        }
    }

    /// Whether this button's own operation is the one in flight.
    pub fn is_loading(&self, state: ActionState) -> bool {
        match self {
            AutoFormAction::Reset => state == ActionState::Cancelling,
            AutoFormAction::Submit | AutoFormAction::Custom(_) => state == ActionState::Submitting,
        }
    }

    fn default_label(&self, form: &AutoForm) -> SharedString {
        match self {
            AutoFormAction::Submit => form.i18n().t("action.submit"),
            AutoFormAction::Reset => form.i18n().t("action.reset"),
            AutoFormAction::Custom(tag) => humanize_key(tag.as_str()).into(),
        }
    }

    fn element_key(&self) -> String {
        match self {
            AutoFormAction::Submit => "submit".to_string(),
            AutoFormAction::Reset => "reset".to_string(),
            AutoFormAction::Custom(tag) => format!("custom-{tag}"),
        }
    }
}

/// Button row of a form. Every button is disabled while any action runs.
#[derive(Clone, Debug, Default)]
pub struct AutoFormActions {
    actions: Vec<(AutoFormAction, Option<SharedString>)>,
}

impl AutoFormActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action(mut self, action: AutoFormAction) -> Self {
        self.actions.push((action, None));
        self
    }

    pub fn labeled(mut self, action: AutoFormAction, label: impl Into<SharedString>) -> Self {
        self.actions.push((action, Some(label.into())));
        self
    }

    pub fn actions(&self) -> impl Iterator<Item = &AutoFormAction> {
        self.actions.iter().map(|(action, _)| action)
    }

    pub(crate) fn render_with(&self, form: &AutoForm, theme: FormTheme) -> AnyElement {
        let state = match form.action_state() {
            Ok(state) => state,
            Err(error) => {
                tracing::error!(target: "form-error", form = %form.id(), %error, "cannot read action state");
                ActionState::Idle
            }
        };
        let busy = state != ActionState::Idle;

        div()
            .flex()
            .flex_row()
            .justify_end()
            .gap_2()
            .children(self.actions.iter().map(|(action, label)| {
                let primary = !matches!(action, AutoFormAction::Reset);
                let loading = action.is_loading(state);
                let label = label.clone().unwrap_or_else(|| action.default_label(form));
                let click_form = form.clone();
                let click_action = action.clone();

                div()
                    .id(format!("calmform-{}-action-{}", form.id(), action.element_key()))
                    .px_4()
                    .py_2()
                    .rounded(px(6.0))
                    .border_1()
                    .border_color(if primary { theme.accent } else { theme.border })
                    .bg(if primary { theme.accent } else { theme.surface })
                    .text_sm()
                    .font_weight(FontWeight::MEDIUM)
                    .text_color(if primary { theme.on_accent } else { theme.text })
                    .child(if loading {
                        SharedString::from(format!("{label}\u{2026}"))
                    } else {
                        label
                    })
                    .when(busy, |this| this.opacity(0.6))
                    .when(!busy, |this| {
                        this.cursor_pointer().on_click(move |_, window, cx| {
                            let form = click_form.clone();
                            let action = click_action.clone();
                            let window_handle = window.window_handle();
                            window.refresh();
                            cx.spawn(async move |cx| {
                                match action.trigger(&form).await {
                                    Ok(outcome) => tracing::debug!(
                                        target: "calmform::form",
                                        form = %form.id(),
                                        ?action,
                                        ?outcome,
                                        "form action finished"
                                    ),
                                    Err(error) => tracing::error!(
                                        target: "form-error",
                                        form = %form.id(),
                                        ?action,
                                        %error,
                                        "form action failed"
                                    ),
                                }
                                let _ = window_handle.update(cx, |_, window, _| {
                                    window.refresh();
                                });
                            })
                            .detach();
                        })
                    })
            }))
            .into_any_element()
    }
}
