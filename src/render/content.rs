use std::rc::Rc;

use gpui::prelude::FluentBuilder;
use gpui::{AnyElement, FontWeight, IntoElement, ParentElement, SharedString, Styled, div, px};

use super::{
    ControllerParams, ControllerTable, DefaultRender, FieldDispatch, FormTheme, RenderParams,
    contain_field,
};
use crate::form::{AutoForm, FormError, FormResult};
use crate::i18n::I18nManager;
use crate::layout::group_fields;
use crate::meta::evaluate_conditional;
use crate::resolve::{FieldDescriptor, FieldType};
use crate::rich_text::{RichSpan, parse_inline};
use crate::value::{FieldKey, Values};

/// Host hook wrapping each field that has no custom renderer.
pub type FieldRenderFn = Rc<dyn Fn(&FieldDescriptor, DefaultRender, &AutoForm) -> AnyElement>;

#[derive(Clone, Debug)]
pub struct FieldPlan {
    pub field: FieldDescriptor,
    pub dispatch: FieldDispatch,
}

#[derive(Clone, Debug)]
pub struct RowPlan {
    pub fields: Vec<FieldPlan>,
    pub columns: usize,
}

/// The field area of a form: which fields to show, in which rows, drawn how.
#[derive(Clone, Default)]
pub struct AutoFormContent {
    show: Option<Vec<FieldKey>>,
    hide: Option<Vec<FieldKey>>,
    render_field: Option<FieldRenderFn>,
    controllers: ControllerTable,
}

impl AutoFormContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders only these fields, in this order.
    pub fn show<K: Into<FieldKey>>(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.show = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn hide<K: Into<FieldKey>>(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.hide = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn render_field(
        mut self,
        render: impl Fn(&FieldDescriptor, DefaultRender, &AutoForm) -> AnyElement + 'static,
    ) -> Self {
        self.render_field = Some(Rc::new(render));
        self
    }

    pub fn controllers(mut self, controllers: ControllerTable) -> Self {
        self.controllers = controllers;
        self
    }

    /// Rows to draw in this pass. Filters and `hidden` conditionals apply
    /// before grouping, so rows close up around removed fields.
    pub fn plan(&self, form: &AutoForm) -> FormResult<Vec<RowPlan>> {
        if self.show.is_some() && self.hide.is_some() {
            return Err(FormError::ConflictingFilters);
        }
        let values = form.values()?;

        let selected: Vec<&FieldDescriptor> = match (&self.show, &self.hide) {
            (Some(show), _) => show
                .iter()
                .filter_map(|key| {
                    let field = form.field(key.as_str());
                    if field.is_none() {
                        tracing::warn!(
                            target: "calmform::render",
                            form = %form.id(),
                            field = %key,
                            "field listed in `show` is not part of the schema"
                        );
                    }
                    field
                })
                .collect(),
            (None, Some(hide)) => form
                .fields()
                .iter()
                .filter(|field| !hide.contains(&field.key))
                .collect(),
            (None, None) => form.fields().iter().collect(),
        };

        let visible = selected
            .into_iter()
            .filter(|field| !evaluate_conditional(field.meta.hidden.as_ref(), &values, false))
            .cloned();

        Ok(group_fields(visible)
            .into_iter()
            .filter(|group| !group.is_empty())
            .map(|group| RowPlan {
                columns: if group.is_split() { 2 } else { 1 },
                fields: group
                    .fields
                    .into_iter()
                    .map(|field| FieldPlan {
                        dispatch: FieldDispatch::for_meta(&field.meta),
                        field,
                    })
                    .collect(),
            })
            .collect())
    }

    pub(crate) fn render_with(&self, form: &AutoForm, theme: FormTheme) -> AnyElement {
        let rows = match self.plan(form) {
            Ok(rows) => rows,
            Err(error) => {
                tracing::error!(target: "form-error", form = %form.id(), %error, "cannot lay out form content");
                return div().into_any_element();
            }
        };
        let values = match form.values() {
            Ok(values) => values,
            Err(error) => {
                tracing::error!(target: "form-error", form = %form.id(), %error, "cannot read form values");
                return div().into_any_element();
            }
        };

        div()
            .w_full()
            .flex()
            .flex_col()
            .gap_4()
            .children(rows.iter().map(|row| {
                div()
                    .w_full()
                    .flex()
                    .flex_row()
                    .gap_4()
                    .children(row.fields.iter().map(|plan| {
                        div()
                            .flex_1()
                            .min_w(px(0.0))
                            .child(self.render_planned(form, plan, &values, theme))
                    }))
            }))
            .into_any_element()
    }

    fn render_planned(
        &self,
        form: &AutoForm,
        plan: &FieldPlan,
        values: &Values,
        theme: FormTheme,
    ) -> AnyElement {
        let key = plan.field.key.clone();
        let i18n = form.i18n().clone();
        let params = match ControllerParams::bind(form, &plan.field, values) {
            Ok(params) => params.with_theme(theme),
            Err(error) => return failed_field(&key, &error, &i18n, theme),
        };
        tracing::debug!(
            target: "calmform::render",
            field = %key,
            dispatch = ?plan.dispatch,
            "rendering field"
        );

        let default_render = {
            let params = params.clone();
            let controllers = self.controllers.clone();
            let i18n = i18n.clone();
            DefaultRender::new(move || {
                let control = control_element(&controllers, &params, &i18n);
                field_chrome(&params, control)
            })
        };

        let rendered = match (plan.dispatch, params.meta().renderer.clone()) {
            (FieldDispatch::CustomRenderer, Some(renderer)) => {
                let controller = control_element(&self.controllers, &params, &i18n);
                contain_field(&key, || {
                    renderer(RenderParams {
                        params: params.clone(),
                        controller,
                        default_render,
                    })
                })
            }
            _ => match &self.render_field {
                Some(render_field) => {
                    contain_field(&key, || Ok(render_field(&plan.field, default_render, form)))
                }
                None => Ok(default_render.render()),
            },
        };
        rendered.unwrap_or_else(|error| failed_field(&key, &error, &i18n, theme))
    }
}

/// The field's widget: its custom controller when set, else the table default.
fn control_element(
    controllers: &ControllerTable,
    params: &ControllerParams,
    i18n: &I18nManager,
) -> AnyElement {
    let key = params.key().clone();
    contain_field(&key, || match params.meta().controller.clone() {
        Some(controller) => controller(params),
        None => Ok(controllers.render(params)),
    })
    .unwrap_or_else(|error| failed_field(&key, &error, i18n, params.theme))
}

fn failed_field(
    key: &FieldKey,
    error: &dyn std::error::Error,
    i18n: &I18nManager,
    theme: FormTheme,
) -> AnyElement {
    tracing::error!(target: "field-error", field = %key, %error, "field failed to render");
    div()
        .text_sm()
        .text_color(theme.border_error)
        .child(i18n.t("field.failed"))
        .into_any_element()
}

fn field_chrome(params: &ControllerParams, control: AnyElement) -> AnyElement {
    let config = &params.field_config;
    let theme = params.theme;
    let label = params.labels.then(|| {
        div()
            .text_sm()
            .font_weight(FontWeight::MEDIUM)
            .text_color(theme.text)
            .child(config.label.clone())
    });
    let description = config
        .description()
        .map(|source| rich_description(source, theme));
    let error = params.field_state.error.clone().map(|message| {
        div()
            .text_xs()
            .text_color(theme.border_error)
            .child(message)
    });

    if config.field_type == FieldType::Switch {
        return div()
            .w_full()
            .flex()
            .flex_col()
            .gap_1()
            .child(
                div()
                    .w_full()
                    .flex()
                    .flex_row()
                    .items_center()
                    .justify_between()
                    .gap_3()
                    .py_2()
                    .child(
                        div()
                            .flex()
                            .flex_col()
                            .gap_1()
                            .children(label)
                            .when(params.labels, |this| this.children(description)),
                    )
                    .child(control),
            )
            .children(error)
            .into_any_element();
    }

    div()
        .w_full()
        .flex()
        .flex_col()
        .gap_1()
        .children(label)
        .child(control)
        .children(description)
        .children(error)
        .into_any_element()
}

fn rich_description(source: &SharedString, theme: FormTheme) -> impl IntoElement {
    div()
        .flex()
        .flex_row()
        .flex_wrap()
        .text_sm()
        .text_color(theme.muted)
        .children(
            parse_inline(source.as_ref())
                .into_iter()
                .map(move |span| span_element(span, theme)),
        )
}

fn span_element(span: RichSpan, theme: FormTheme) -> impl IntoElement {
    let style = span.style;
    div()
        .child(span.text)
        .when(style.strong, |this| this.font_weight(FontWeight::BOLD))
        .when(style.emphasis, |this| this.italic())
        .when(style.strikethrough, |this| this.line_through())
        .when(style.code, |this| this.font_family("monospace"))
        .when(span.link.is_some(), |this| this.underline().text_color(theme.accent))
}
