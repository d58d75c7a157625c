use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};

use gpui::prelude::FluentBuilder;
use gpui::{
    AnyElement, App, Component, FocusHandle, InteractiveElement, IntoElement, KeyDownEvent,
    MouseButton, ParentElement, RenderOnce, SharedString, StatefulInteractiveElement, Styled,
    Window, div, px,
};

use super::ControllerParams;
use super::editing::{
    EditOptions, EditOutcome, EditState, tags_after_commit, text_to_value, value_to_text,
};
use crate::resolve::FieldType;

static FOCUS_HANDLES: LazyLock<Mutex<HashMap<String, FocusHandle>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));
static DRAFTS: LazyLock<Mutex<HashMap<String, EditState>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

const TAG_COMMIT_CHARS: &[char] = &[','];

fn focus_handle_for(id: &str, cx: &mut App) -> FocusHandle {
    let mut handles = FOCUS_HANDLES.lock().unwrap_or_else(PoisonError::into_inner);
    handles
        .entry(id.to_string())
        .or_insert_with(|| cx.focus_handle())
        .clone()
}

/// Text typed since the field was focused; present only while editing.
fn draft(id: &str) -> Option<EditState> {
    DRAFTS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(id)
        .cloned()
}

fn store_draft(id: &str, state: EditState) {
    DRAFTS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(id.to_string(), state);
}

fn take_draft(id: &str) -> Option<EditState> {
    DRAFTS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(id)
}

fn has_command_modifier(event: &KeyDownEvent) -> bool {
    let modifiers = &event.keystroke.modifiers;
    modifiers.control || modifiers.platform || modifiers.function || modifiers.alt
}

/// Text with a caret drawn at `caret` while focused.
fn text_with_caret(
    params: &ControllerParams,
    shown: &str,
    caret: usize,
    focused: bool,
) -> AnyElement {
    let theme = params.theme;
    if shown.is_empty() && !focused {
        return div()
            .text_color(theme.muted)
            .child(params.field_config.placeholder.clone())
            .into_any_element();
    }
    let split = shown
        .char_indices()
        .nth(caret)
        .map_or(shown.len(), |(byte, _)| byte);
    let (before, after) = shown.split_at(split);
    div()
        .flex()
        .flex_row()
        .flex_wrap()
        .text_color(theme.text)
        .child(SharedString::from(before.to_string()))
        .when(focused, |this| {
            this.child(div().w(px(1.0)).h(px(16.0)).bg(theme.accent))
        })
        .child(SharedString::from(after.to_string()))
        .into_any_element()
}

/// Editable single- or multi-line text box bound to one field. Typed text is
/// parsed for the field's type and written through on every edit that parses.
pub(crate) struct TextInput {
    params: ControllerParams,
}

impl TextInput {
    pub(crate) fn new(params: ControllerParams) -> Self {
        Self { params }
    }
}

impl RenderOnce for TextInput {
    fn render(self, window: &mut Window, cx: &mut App) -> impl IntoElement {
        let params = self.params;
        let theme = params.theme;
        let field_type = params.field_config.field_type.clone();
        let id = super::controllers::element_id(&params, "input");
        let focus_handle = focus_handle_for(&id, cx);
        let focused = focus_handle.is_focused(window);
        let editable = !params.is_locked() && !params.ui.read_only;
        let options = EditOptions {
            multiline: field_type == FieldType::Textarea,
            max_length: params.field_config.max_length,
            commit_chars: &[],
        };

        let stored = value_to_text(&params.field.value);
        let state = draft(&id).unwrap_or_else(|| EditState::new(stored.clone()));
        let shown = if field_type == FieldType::Password {
            "\u{2022}".repeat(state.text.chars().count())
        } else {
            state.text.clone()
        };
        let counter = params
            .field_config
            .max_length
            .filter(|_| {
                matches!(
                    field_type,
                    FieldType::Text | FieldType::Password | FieldType::Url
                )
            })
            .map(|max| format!("{} / {max}", state.text.chars().count()));

        super::controllers::field_box(&params)
            .id(id.clone())
            .track_focus(&focus_handle)
            .flex()
            .flex_row()
            .items_start()
            .gap_2()
            .when(options.multiline, |this| this.min_h(px(88.0)))
            .when(focused, |this| this.border_color(theme.accent))
            .child(div().flex_1().child(text_with_caret(&params, &shown, state.caret, focused)))
            .when_some(counter, |this, counter| {
                this.child(
                    div()
                        .px_1()
                        .rounded(px(4.0))
                        .bg(theme.surface_disabled)
                        .text_xs()
                        .text_color(theme.muted)
                        .child(counter),
                )
            })
            .when(editable, |this| {
                let handle = focus_handle.clone();
                let focus_id = id.clone();
                let focus_text = stored.clone();
                let key_id = id.clone();
                let key_text = stored.clone();
                let blur_id = id.clone();
                let binding = params.field.clone();
                let blur_binding = params.field.clone();
                this.cursor_text()
                    .on_mouse_down(MouseButton::Left, move |_, window, cx| {
                        if draft(&focus_id).is_none() {
                            store_draft(&focus_id, EditState::new(focus_text.clone()));
                        }
                        window.focus(&handle, cx);
                        window.refresh();
                    })
                    .on_key_down(move |event: &KeyDownEvent, window, cx| {
                        if has_command_modifier(event) {
                            return;
                        }
                        let current =
                            draft(&key_id).unwrap_or_else(|| EditState::new(key_text.clone()));
                        let outcome = current.apply(
                            event.keystroke.key.as_str(),
                            event.keystroke.key_char.as_deref(),
                            options,
                        );
                        match outcome {
                            EditOutcome::Changed(next) => {
                                if let Some(value) = text_to_value(&field_type, &next.text) {
                                    binding.change(value);
                                }
                                store_draft(&key_id, next);
                            }
                            EditOutcome::Moved(next) => store_draft(&key_id, next),
                            EditOutcome::Commit => {
                                take_draft(&key_id);
                                binding.blur();
                            }
                            EditOutcome::Ignored => return,
                        }
                        cx.stop_propagation();
                        window.refresh();
                    })
                    .on_mouse_down_out(move |_, window, _| {
                        if take_draft(&blur_id).is_some() {
                            blur_binding.blur();
                            window.refresh();
                        }
                    })
            })
    }
}

impl IntoElement for TextInput {
    type Element = Component<Self>;

    fn into_element(self) -> Self::Element {
        Component::new(self)
    }
}

/// Tag chips plus an entry box; Enter or `,` adds the typed tag, Backspace on
/// an empty entry removes the last one.
pub(crate) struct TagsInput {
    params: ControllerParams,
}

impl TagsInput {
    pub(crate) fn new(params: ControllerParams) -> Self {
        Self { params }
    }
}

impl RenderOnce for TagsInput {
    fn render(self, window: &mut Window, cx: &mut App) -> impl IntoElement {
        let params = self.params;
        let theme = params.theme;
        let id = super::controllers::element_id(&params, "tags");
        let focus_handle = focus_handle_for(&id, cx);
        let focused = focus_handle.is_focused(window);
        let tags: Vec<SharedString> = params
            .field
            .value
            .as_list()
            .map(<[SharedString]>::to_vec)
            .unwrap_or_default();
        let max_tags = params.field_config.max_length;
        let full = max_tags.is_some_and(|max| tags.len() >= max);
        let editable = !params.is_locked() && !params.ui.read_only;
        let entry = draft(&id).unwrap_or_default();

        let chips = tags.iter().enumerate().map(|(index, tag)| {
            let binding = params.field.clone();
            let remaining: Vec<SharedString> = tags
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .map(|(_, tag)| tag.clone())
                .collect();
            div()
                .id(super::controllers::element_id(&params, &format!("tag-{index}")))
                .flex()
                .flex_row()
                .gap_1()
                .px_2()
                .rounded(px(4.0))
                .bg(theme.surface_disabled)
                .text_color(theme.text)
                .child(tag.clone())
                .when(editable, |this| {
                    this.child(div().text_color(theme.muted).child("\u{00d7}"))
                        .cursor_pointer()
                        .on_click(move |_, window, _| {
                            binding.change(remaining.clone());
                            window.refresh();
                        })
                })
        });
        let counter = max_tags.map(|max| format!("{} / {max}", tags.len()));

        super::controllers::field_box(&params)
            .id(id.clone())
            .track_focus(&focus_handle)
            .flex()
            .flex_row()
            .flex_wrap()
            .items_center()
            .gap_1()
            .when(focused, |this| this.border_color(theme.accent))
            .children(chips)
            .child(
                div()
                    .flex_1()
                    .min_w(px(48.0))
                    .child(text_with_caret(&params, &entry.text, entry.caret, focused && !full)),
            )
            .when_some(counter, |this, counter| {
                this.child(div().text_xs().text_color(theme.muted).child(counter))
            })
            .when(editable, |this| {
                let handle = focus_handle.clone();
                let focus_id = id.clone();
                let key_id = id.clone();
                let blur_id = id.clone();
                let binding = params.field.clone();
                let blur_binding = params.field.clone();
                let key_tags = tags.clone();
                this.cursor_text()
                    .on_mouse_down(MouseButton::Left, move |_, window, cx| {
                        if draft(&focus_id).is_none() {
                            store_draft(&focus_id, EditState::default());
                        }
                        window.focus(&handle, cx);
                        window.refresh();
                    })
                    .on_key_down(move |event: &KeyDownEvent, window, cx| {
                        if has_command_modifier(event) {
                            return;
                        }
                        let current = draft(&key_id).unwrap_or_default();
                        let key = event.keystroke.key.as_str();
                        if key == "backspace" && current.text.is_empty() {
                            if key_tags.is_empty() {
                                return;
                            }
                            binding.change(key_tags[..key_tags.len() - 1].to_vec());
                        } else {
                            let options = EditOptions {
                                multiline: false,
                                max_length: None,
                                commit_chars: TAG_COMMIT_CHARS,
                            };
                            match current.apply(key, event.keystroke.key_char.as_deref(), options) {
                                EditOutcome::Changed(next) | EditOutcome::Moved(next) => {
                                    store_draft(&key_id, next);
                                }
                                EditOutcome::Commit => {
                                    if let Some(next) =
                                        tags_after_commit(&key_tags, &current.text, max_tags)
                                    {
                                        binding.change(next);
                                    }
                                    take_draft(&key_id);
                                }
                                EditOutcome::Ignored => return,
                            }
                        }
                        cx.stop_propagation();
                        window.refresh();
                    })
                    .on_mouse_down_out(move |_, window, _| {
                        if take_draft(&blur_id).is_some() {
                            blur_binding.blur();
                            window.refresh();
                        }
                    })
            })
    }
}

impl IntoElement for TagsInput {
    type Element = Component<Self>;

    fn into_element(self) -> Self::Element {
        Component::new(self)
    }
}
