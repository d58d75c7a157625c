use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use gpui::prelude::FluentBuilder;
use gpui::{
    AnyElement, FontWeight, InteractiveElement, IntoElement, ParentElement, PathPromptOptions,
    SharedString, StatefulInteractiveElement, Styled, div, px,
};
use rust_decimal::Decimal;

use super::ControllerParams;
use super::editing::{FilePick, FileRules};
use super::input::{TagsInput, TextInput};
use crate::files::{format_file_size, mime_to_ext};
use crate::form::use_form_context;
use crate::i18n::I18nManager;
use crate::resolve::{FieldType, humanize_key};
use crate::schema::EnumOption;
use crate::value::{FieldValue, FileValue};

pub type DefaultController = Arc<dyn Fn(&ControllerParams) -> AnyElement + Send + Sync>;

/// Default widget per field type name. Types without an entry render with
/// the text controller.
#[derive(Clone)]
pub struct ControllerTable {
    controllers: HashMap<String, DefaultController>,
}

impl Default for ControllerTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ControllerTable {
    pub fn builtin() -> Self {
        let mut table = Self {
            controllers: HashMap::new(),
        };
        for text_like in [
            FieldType::Text,
            FieldType::Textarea,
            FieldType::Email,
            FieldType::Password,
            FieldType::Url,
            FieldType::Date,
            FieldType::Time,
            FieldType::DateTimeLocal,
        ] {
            table.register(text_like.as_str(), Arc::new(text_controller));
        }
        table.register(FieldType::Number.as_str(), Arc::new(number_controller));
        table.register(FieldType::Switch.as_str(), Arc::new(switch_controller));
        table.register(FieldType::Select.as_str(), Arc::new(select_controller));
        table.register(FieldType::Radio.as_str(), Arc::new(radio_controller));
        table.register(FieldType::Tags.as_str(), Arc::new(tags_controller));
        table.register(FieldType::File.as_str(), Arc::new(file_controller));
        table.register(FieldType::Files.as_str(), Arc::new(file_controller));
        table
    }

    /// Adds or replaces the default controller of a type, including custom ones.
    pub fn register(&mut self, name: impl Into<String>, controller: DefaultController) {
        self.controllers.insert(name.into(), controller);
    }

    pub fn has_controller(&self, field_type: &FieldType) -> bool {
        self.controllers.contains_key(field_type.as_str())
    }

    pub fn controller_for(&self, field_type: &FieldType) -> DefaultController {
        if let Some(controller) = self.controllers.get(field_type.as_str()) {
            return controller.clone();
        }
        tracing::debug!(
            target: "calmform::render",
            field_type = %field_type,
            "no controller registered, using the text controller"
        );
        self.controllers
            .get(FieldType::Text.as_str())
            .cloned()
            .unwrap_or_else(|| Arc::new(text_controller))
    }

    pub fn render(&self, params: &ControllerParams) -> AnyElement {
        (self.controller_for(&params.field_config.field_type))(params)
    }
}

fn form_i18n() -> I18nManager {
    use_form_context()
        .map(|form| form.i18n().clone())
        .unwrap_or_default()
}

pub(crate) fn element_id(params: &ControllerParams, part: &str) -> String {
    format!("calmform-{}-{part}", params.key())
}

/// Bordered box shared by the text-like controllers.
pub(crate) fn field_box(params: &ControllerParams) -> gpui::Div {
    let theme = params.theme;
    let locked = params.is_locked();
    div()
        .w_full()
        .px_3()
        .py_2()
        .rounded(px(6.0))
        .border_1()
        .border_color(if params.field_state.invalid {
            theme.border_error
        } else {
            theme.border
        })
        .bg(if locked || params.ui.read_only {
            theme.surface_disabled
        } else {
            theme.surface
        })
        .text_sm()
        .when(locked, |this| this.opacity(0.6))
}

pub(crate) fn text_controller(params: &ControllerParams) -> AnyElement {
    TextInput::new(params.clone()).into_any_element()
}

fn number_controller(params: &ControllerParams) -> AnyElement {
    let input = TextInput::new(params.clone());
    if !params.meta().with_controls {
        return input.into_any_element();
    }

    let theme = params.theme;
    let step = params.meta().step.unwrap_or(Decimal::ONE);
    let current = params.field.value.as_number().unwrap_or_default();
    let locked = params.is_locked() || params.ui.read_only;
    let lower = params.field_config.greater_than;
    let upper = params.field_config.less_than;

    let decrement = lower.map_or(current - step, |bound| (current - step).max(bound.value));
    let increment = upper.map_or(current + step, |bound| (current + step).min(bound.value));
    let at_lower = lower.is_some_and(|bound| {
        current < bound.value || (bound.inclusive && current == bound.value)
    });
    let at_upper = upper.is_some_and(|bound| {
        current > bound.value || (bound.inclusive && current == bound.value)
    });

    let stepper = |label: &'static str, next: Decimal, blocked: bool| {
        let binding = params.field.clone();
        div()
            .id(element_id(params, label))
            .px_2()
            .py_1()
            .rounded(px(4.0))
            .border_1()
            .border_color(theme.border)
            .text_color(theme.text)
            .child(label)
            .when(blocked, |this| this.opacity(0.4))
            .when(!blocked, |this| {
                this.cursor_pointer().on_click(move |_, window, _| {
                    binding.change(FieldValue::Number(next));
                    window.refresh();
                })
            })
    };

    div()
        .flex()
        .flex_row()
        .items_center()
        .gap_2()
        .child(div().flex_1().child(input))
        .child(stepper("-", decrement, locked || at_lower))
        .child(stepper("+", increment, locked || at_upper))
        .into_any_element()
}

fn switch_controller(params: &ControllerParams) -> AnyElement {
    let theme = params.theme;
    let checked = params.field.value.as_bool().unwrap_or(false);
    let locked = params.is_locked() || params.ui.read_only;
    let binding = params.field.clone();
    let i18n = form_i18n();
    let state = if checked {
        i18n.t("field.switch_on")
    } else {
        i18n.t("field.switch_off")
    };

    let thumb = div()
        .size(px(16.0))
        .rounded_full()
        .bg(theme.on_accent);
    let track = div()
        .id(element_id(params, "switch"))
        .flex()
        .items_center()
        .w(px(36.0))
        .h(px(20.0))
        .px(px(2.0))
        .rounded_full()
        .bg(if checked { theme.accent } else { theme.border })
        .when(checked, |this| this.justify_end())
        .child(thumb)
        .when(!locked, |this| {
            this.cursor_pointer().on_click(move |_, window, _| {
                binding.change(!checked);
                binding.blur();
                window.refresh();
            })
        })
        .when(locked, |this| this.opacity(0.6));

    div()
        .flex()
        .flex_row()
        .items_center()
        .gap_2()
        .child(track)
        .child(div().text_sm().text_color(theme.muted).child(state))
        .into_any_element()
}

/// Label of an option, title-casing bare values.
fn option_label(option: &EnumOption) -> SharedString {
    if option.display_label() == option.value() {
        humanize_key(option.value().as_ref()).into()
    } else {
        option.display_label().clone()
    }
}

fn options(params: &ControllerParams) -> Vec<EnumOption> {
    params
        .field_config
        .enhanced_options
        .clone()
        .unwrap_or_default()
}

fn select_controller(params: &ControllerParams) -> AnyElement {
    let theme = params.theme;
    let selected = params.field.value.as_text().map(str::to_string);
    let locked = params.is_locked() || params.ui.read_only;

    let chips = options(params).into_iter().enumerate().map(|(index, option)| {
        let active = selected.as_deref() == Some(option.value().as_ref());
        let binding = params.field.clone();
        let value = option.value().clone();
        div()
            .id(element_id(params, &format!("option-{index}")))
            .px_3()
            .py_1()
            .rounded(px(6.0))
            .border_1()
            .border_color(if active { theme.accent } else { theme.border })
            .text_sm()
            .text_color(if active { theme.accent } else { theme.text })
            .child(option_label(&option))
            .when(!locked, |this| {
                this.cursor_pointer().on_click(move |_, window, _| {
                    binding.change(value.clone());
                    binding.blur();
                    window.refresh();
                })
            })
    });

    div()
        .flex()
        .flex_col()
        .gap_1()
        .when(selected.is_none(), |this| {
            this.child(
                div()
                    .text_sm()
                    .text_color(theme.muted)
                    .child(params.field_config.placeholder.clone()),
            )
        })
        .child(div().flex().flex_row().flex_wrap().gap_2().children(chips))
        .when(locked, |this| this.opacity(0.6))
        .into_any_element()
}

fn radio_controller(params: &ControllerParams) -> AnyElement {
    let theme = params.theme;
    let selected = params.field.value.as_text().map(str::to_string);
    let locked = params.is_locked() || params.ui.read_only;

    let rows = options(params).into_iter().enumerate().map(|(index, option)| {
        let active = selected.as_deref() == Some(option.value().as_ref());
        let binding = params.field.clone();
        let value = option.value().clone();
        let dot = div()
            .size(px(16.0))
            .rounded_full()
            .border_1()
            .border_color(if active { theme.accent } else { theme.border })
            .flex()
            .items_center()
            .justify_center()
            .when(active, |this| {
                this.child(div().size(px(8.0)).rounded_full().bg(theme.accent))
            });
        let text = div()
            .flex()
            .flex_col()
            .child(
                div()
                    .text_sm()
                    .text_color(theme.text)
                    .font_weight(FontWeight::SEMIBOLD)
                    .child(option_label(&option)),
            )
            .when_some(option.display_description().cloned(), |this, description| {
                this.child(div().text_xs().text_color(theme.muted).child(description))
            });

        div()
            .id(element_id(params, &format!("radio-{index}")))
            .flex()
            .flex_row()
            .items_start()
            .gap_2()
            .child(dot)
            .child(text)
            .when(!locked, |this| {
                this.cursor_pointer().on_click(move |_, window, _| {
                    binding.change(value.clone());
                    binding.blur();
                    window.refresh();
                })
            })
    });

    div()
        .flex()
        .flex_col()
        .gap_2()
        .children(rows)
        .when(locked, |this| this.opacity(0.6))
        .into_any_element()
}

fn tags_controller(params: &ControllerParams) -> AnyElement {
    TagsInput::new(params.clone()).into_any_element()
}

fn current_files(value: &FieldValue) -> Vec<FileValue> {
    match value {
        FieldValue::File(file) => vec![file.clone()],
        FieldValue::Files(files) => files.clone(),
        _ => Vec::new(),
    }
}

pub(crate) fn file_rules(params: &ControllerParams) -> FileRules {
    FileRules {
        multiple: params.field_config.field_type == FieldType::Files,
        min_size: params.field_config.file_min_size,
        max_size: params.field_config.file_max_size,
        mime: params.field_config.file_mime.clone(),
    }
}

/// Reads picked paths into file values and applies the field's limits.
pub(crate) fn pick_paths(
    rules: &FileRules,
    current: &[FileValue],
    paths: &[PathBuf],
) -> FilePick {
    let mut picked = Vec::new();
    for path in paths {
        match FileValue::from_path(path) {
            Ok(file) => picked.push(file),
            Err(error) => {
                tracing::warn!(
                    target: "field-error",
                    path = %path.display(),
                    %error,
                    "picked file could not be read"
                );
            }
        }
    }
    rules.pick(current, picked)
}

fn file_row(
    params: &ControllerParams,
    index: usize,
    file: &FileValue,
    editable: bool,
) -> impl IntoElement {
    let theme = params.theme;
    let binding = params.field.clone();
    let rules = file_rules(params);
    let files = current_files(&params.field.value);
    div()
        .flex()
        .flex_row()
        .items_center()
        .gap_2()
        .child(div().text_color(theme.text).child(file.name.clone()))
        .child(
            div()
                .text_xs()
                .text_color(theme.muted)
                .child(format!(
                    "{} \u{00b7} {}",
                    mime_to_ext(file.mime.as_ref()),
                    format_file_size(file.size)
                )),
        )
        .when(editable, |this| {
            this.child(
                div()
                    .id(element_id(params, &format!("file-remove-{index}")))
                    .text_xs()
                    .text_color(theme.muted)
                    .cursor_pointer()
                    .child(form_i18n().t("field.remove"))
                    .on_click(move |_, window, _| {
                        binding.change(rules.remove(&files, index));
                        binding.blur();
                        window.refresh();
                    }),
            )
        })
}

fn file_controller(params: &ControllerParams) -> AnyElement {
    let theme = params.theme;
    let files = current_files(&params.field.value);
    let editable = !params.is_locked() && !params.ui.read_only;
    let i18n = form_i18n();

    let mut hints = Vec::new();
    if let Some(max) = params.field_config.file_max_size {
        hints.push(format!("\u{2264} {}", format_file_size(max)));
    }
    if let Some(mime) = &params.field_config.file_mime {
        hints.push(
            mime.iter()
                .map(|mime| mime_to_ext(mime.as_ref()))
                .collect::<Vec<_>>()
                .join(", "),
        );
    }

    let body = if files.is_empty() {
        div()
            .flex()
            .flex_col()
            .gap_1()
            .child(
                div()
                    .text_color(theme.muted)
                    .child(params.field_config.placeholder.clone()),
            )
            .child(
                div()
                    .text_xs()
                    .text_color(theme.muted)
                    .child(i18n.t("field.no_files")),
            )
    } else {
        div().flex().flex_col().gap_1().children(
            files
                .iter()
                .enumerate()
                .map(|(index, file)| file_row(params, index, file, editable)),
        )
    };

    let rules = file_rules(params);
    let binding = params.field.clone();
    let key = params.key().clone();
    let browse = div()
        .id(element_id(params, "browse"))
        .px_3()
        .py_1()
        .rounded(px(6.0))
        .bg(theme.accent)
        .text_color(theme.on_accent)
        .text_sm()
        .child(i18n.t("field.browse"))
        .when(!editable, |this| this.opacity(0.6))
        .when(editable, |this| {
            this.cursor_pointer().on_click(move |_, window, cx| {
                let receiver = cx.prompt_for_paths(PathPromptOptions {
                    files: true,
                    directories: false,
                    multiple: rules.multiple,
                    prompt: None,
                });
                let window_handle = window.window_handle();
                let rules = rules.clone();
                let binding = binding.clone();
                let key = key.clone();
                cx.spawn(async move |cx| {
                    let paths = match receiver.await {
                        Ok(Ok(Some(paths))) => paths,
                        Ok(Ok(None)) | Err(_) => return,
                        Ok(Err(error)) => {
                            tracing::warn!(
                                target: "field-error",
                                field = %key,
                                %error,
                                "file picker failed"
                            );
                            return;
                        }
                    };
                    let current = current_files(&binding.value);
                    let pick = pick_paths(&rules, &current, &paths);
                    for (name, reason) in &pick.rejected {
                        tracing::warn!(
                            target: "field-error",
                            field = %key,
                            file = %name,
                            ?reason,
                            "picked file rejected"
                        );
                    }
                    if let Some(value) = pick.value {
                        binding.change(value);
                        binding.blur();
                    }
                    let _ = window_handle.update(cx, |_, window, _| window.refresh());
                })
                .detach();
            })
        });

    field_box(params)
        .flex()
        .flex_col()
        .gap_1()
        .font_weight(FontWeight::NORMAL)
        .child(body)
        .child(div().flex().flex_row().child(browse))
        .when(!hints.is_empty(), |this| {
            this.child(
                div()
                    .text_xs()
                    .text_color(theme.muted)
                    .child(hints.join(" \u{00b7} ")),
            )
        })
        .into_any_element()
}
