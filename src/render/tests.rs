use super::*;
use futures::executor::block_on;
use gpui::IntoElement;

use crate::form::{ActionOutcome, ActionState, ActionTag, FormError};
use crate::meta::{BoxError, Conditional, MetadataRegistry};
use crate::resolve::FieldType;
use crate::schema::{Schema, z};

fn failing_renderer() -> RendererFn {
    Arc::new(|_params: RenderParams| Err(RenderError::msg("renderer unused")))
}

fn failing_controller() -> ControllerFn {
    Arc::new(|_params: &ControllerParams| Err(RenderError::msg("controller unused")))
}

fn profile_schema(registry: &mut MetadataRegistry) -> Schema {
    z::object([
        (
            "firstName",
            z::string().register(registry, FieldMeta::new().half_width(true)),
        ),
        (
            "lastName",
            z::string().register(registry, FieldMeta::new().half_width(true)),
        ),
        (
            "nickname",
            z::string().optional().register(
                registry,
                FieldMeta::new()
                    .half_width(true)
                    .hidden(Conditional::when(|values: &Values| {
                        values.get("public") != Some(&FieldValue::Bool(true))
                    })),
            ),
        ),
        (
            "city",
            z::string().register(registry, FieldMeta::new().half_width(true)),
        ),
        ("public", z::boolean().optional()),
    ])
}

fn row_keys(rows: &[RowPlan]) -> Vec<Vec<&str>> {
    rows.iter()
        .map(|row| row.fields.iter().map(|plan| plan.field.key.as_str()).collect())
        .collect()
}

#[test]
fn dispatch_prefers_renderer_then_controller() {
    let both = FieldMeta::new()
        .renderer(failing_renderer())
        .controller(failing_controller());
    assert_eq!(FieldDispatch::for_meta(&both), FieldDispatch::CustomRenderer);

    let controller = FieldMeta::new().controller(failing_controller());
    assert_eq!(
        FieldDispatch::for_meta(&controller),
        FieldDispatch::CustomController
    );
    assert_eq!(
        FieldDispatch::for_meta(&FieldMeta::new()),
        FieldDispatch::Default
    );
}

#[test]
fn plan_drops_hidden_fields_and_regroups_rows() {
    let mut registry = MetadataRegistry::new();
    let form = AutoForm::builder(profile_schema(&mut registry), &registry)
        .build()
        .expect("form builds");
    let content = AutoFormContent::new();

    let rows = content.plan(&form).expect("plan");
    assert_eq!(
        row_keys(&rows),
        vec![vec!["firstName", "lastName"], vec!["city"], vec!["public"]]
    );
    assert_eq!(rows[0].columns, 2);
    assert_eq!(rows[1].columns, 1);

    form.set_value("public", true).expect("set value");
    let rows = content.plan(&form).expect("plan");
    assert_eq!(
        row_keys(&rows),
        vec![
            vec!["firstName", "lastName"],
            vec!["nickname", "city"],
            vec!["public"],
        ]
    );
}

#[test]
fn show_keeps_its_own_order_and_skips_unknown_keys() {
    let mut registry = MetadataRegistry::new();
    let form = AutoForm::builder(profile_schema(&mut registry), &registry)
        .build()
        .expect("form builds");

    let rows = AutoFormContent::new()
        .show(["city", "missing", "firstName"])
        .plan(&form)
        .expect("plan");
    assert_eq!(row_keys(&rows), vec![vec!["city", "firstName"]]);

    let rows = AutoFormContent::new()
        .hide(["lastName", "public"])
        .plan(&form)
        .expect("plan");
    assert_eq!(row_keys(&rows), vec![vec!["firstName", "city"]]);
}

#[test]
fn show_and_hide_together_are_rejected() {
    let mut registry = MetadataRegistry::new();
    let form = AutoForm::builder(profile_schema(&mut registry), &registry)
        .build()
        .expect("form builds");

    let result = AutoFormContent::new()
        .show(["city"])
        .hide(["firstName"])
        .plan(&form);
    assert!(matches!(result, Err(FormError::ConflictingFilters)));
}

#[test]
fn plans_record_each_fields_dispatch() {
    let mut registry = MetadataRegistry::new();
    let schema = z::object([
        (
            "color",
            z::string().register(
                &mut registry,
                FieldMeta::new()
                    .field_type(FieldType::from_name("color"))
                    .controller(failing_controller()),
            ),
        ),
        ("name", z::string()),
    ]);
    let form = AutoForm::builder(schema, &registry)
        .build()
        .expect("form builds");

    let rows = AutoFormContent::new().plan(&form).expect("plan");
    let dispatch = rows
        .iter()
        .flat_map(|row| row.fields.iter().map(|plan| plan.dispatch))
        .collect::<Vec<_>>();
    assert_eq!(
        dispatch,
        vec![FieldDispatch::CustomController, FieldDispatch::Default]
    );
}

#[test]
fn host_render_failures_are_contained() {
    let key = FieldKey::from("avatar");

    let panicked = contain_field(&key, || -> Result<u8, RenderError> {
        panic!("controller exploded")
    });
    assert!(matches!(
        panicked,
        Err(RenderError::Panicked { ref field }) if field.as_str() == "avatar"
    ));

    let failed = contain_field(&key, || -> Result<u8, RenderError> {
        Err(RenderError::host(BoxError::from("upload service offline")))
    });
    assert_eq!(
        failed.err().map(|error| error.to_string()),
        Some("upload service offline".to_string())
    );

    assert_eq!(contain_field(&key, || Ok(7)).ok(), Some(7));
}

#[test]
fn unknown_types_fall_back_to_the_text_controller() {
    let mut table = ControllerTable::builtin();
    for field_type in [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Email,
        FieldType::Password,
        FieldType::Url,
        FieldType::Number,
        FieldType::Date,
        FieldType::Time,
        FieldType::DateTimeLocal,
        FieldType::Switch,
        FieldType::Select,
        FieldType::Radio,
        FieldType::Tags,
        FieldType::File,
        FieldType::Files,
    ] {
        assert!(table.has_controller(&field_type), "{field_type} has a controller");
    }

    let color = FieldType::from_name("color");
    assert!(!table.has_controller(&color));
    assert!(Arc::ptr_eq(
        &table.controller_for(&color),
        &table.controller_for(&FieldType::Text)
    ));

    let swatch: DefaultController = Arc::new(|_params: &ControllerParams| gpui::Empty.into_any_element());
    table.register("color", swatch.clone());
    assert!(table.has_controller(&color));
    assert!(Arc::ptr_eq(&table.controller_for(&color), &swatch));
}

#[test]
fn bound_params_drive_the_form() {
    let mut registry = MetadataRegistry::new();
    let schema = z::object([
        (
            "email",
            z::string().email().register(
                &mut registry,
                FieldMeta::new().disabled(Conditional::when(|values: &Values| {
                    values.get("locked") == Some(&FieldValue::Bool(true))
                })),
            ),
        ),
        ("locked", z::boolean().optional()),
    ]);
    let form = AutoForm::builder(schema, &registry)
        .default_value("locked", true)
        .labels(false)
        .build()
        .expect("form builds");

    let values = form.values().expect("values");
    let descriptor = form.field("email").expect("email field").clone();
    let params = ControllerParams::bind(&form, &descriptor, &values).expect("params");
    assert!(params.ui.disabled);
    assert!(!params.ui.read_only);
    assert!(params.is_locked());
    assert!(!params.labels);
    assert_eq!(params.field.value, FieldValue::Empty);
    assert_eq!(params.form_state, FormStatus::default());

    params.field.change("not-an-email");
    params.field.blur();
    let state = form.field_state(&"email".into()).expect("state");
    assert!(state.touched);
    assert!(state.invalid);
    assert_eq!(
        form.value(&"email".into()).expect("value"),
        FieldValue::from("not-an-email")
    );
}

#[test]
fn actions_run_their_form_operation() {
    let mut registry = MetadataRegistry::new();
    let received = Arc::new(std::sync::Mutex::new(Vec::new()));
    let form = AutoForm::builder(profile_schema(&mut registry), &registry)
        .default_values(crate::value::values([
            ("firstName", "Ada"),
            ("lastName", "Lovelace"),
            ("city", "London"),
        ]))
        .on_submit({
            let received = received.clone();
            move |_, tag, _| {
                received.lock().expect("received lock").push(tag);
                async { Ok::<(), BoxError>(()) }
            }
        })
        .build()
        .expect("form builds");

    let outcome = block_on(AutoFormAction::custom("draft").trigger(&form)).expect("trigger");
    assert_eq!(outcome, ActionOutcome::Completed);
    assert_eq!(
        *received.lock().expect("received lock"),
        vec![Some(ActionTag::new("draft"))]
    );

    form.set_value("city", "Paris").expect("set value");
    let outcome = block_on(AutoFormAction::Reset.trigger(&form)).expect("trigger");
    assert_eq!(outcome, ActionOutcome::Completed);
    assert_eq!(
        form.value(&"city".into()).expect("value"),
        FieldValue::from("London")
    );

    assert!(AutoFormAction::Reset.is_loading(ActionState::Cancelling));
    assert!(!AutoFormAction::Submit.is_loading(ActionState::Cancelling));
    assert!(AutoFormAction::custom("draft").is_loading(ActionState::Submitting));
}

fn typed(state: &EditState, key: &str, options: EditOptions) -> EditOutcome {
    state.apply(key, Some(key), options)
}

#[test]
fn typing_edits_text_at_the_caret() {
    let options = EditOptions::default();
    let state = EditState::new("Ad");
    let EditOutcome::Changed(state) = typed(&state, "a", options) else {
        panic!("typing inserts");
    };
    assert_eq!(state, EditState::new("Ada"));

    let EditOutcome::Moved(state) = state.apply("home", None, options) else {
        panic!("home moves the caret");
    };
    assert_eq!(state.caret, 0);
    assert_eq!(state.apply("backspace", None, options), EditOutcome::Ignored);

    let EditOutcome::Changed(state) = state.apply("delete", None, options) else {
        panic!("delete removes the next char");
    };
    assert_eq!(state.text, "da");
    assert_eq!(state.apply("f1", None, options), EditOutcome::Ignored);
    assert_eq!(
        state.apply("\u{7f}", Some("\u{7f}"), options),
        EditOutcome::Ignored
    );
}

#[test]
fn enter_commits_single_lines_and_breaks_textarea_lines() {
    let state = EditState::new("first");
    assert_eq!(
        state.apply("enter", None, EditOptions::default()),
        EditOutcome::Commit
    );

    let multiline = EditOptions {
        multiline: true,
        ..EditOptions::default()
    };
    let EditOutcome::Changed(state) = state.apply("enter", None, multiline) else {
        panic!("enter breaks the line");
    };
    let EditOutcome::Changed(state) = typed(&state, "x", multiline) else {
        panic!("typing inserts");
    };
    assert_eq!(state.text, "first\nx");
    let EditOutcome::Moved(state) = state.apply("home", None, multiline) else {
        panic!("home moves the caret");
    };
    assert_eq!(state.caret, 6);
}

#[test]
fn max_length_caps_typed_text() {
    let options = EditOptions {
        max_length: Some(4),
        ..EditOptions::default()
    };
    let state = EditState::new("abc");
    let EditOutcome::Changed(state) = state.apply("v", Some("vwxyz"), options) else {
        panic!("pasted text is cut to fit");
    };
    assert_eq!(state.text, "abcv");
    assert_eq!(typed(&state, "z", options), EditOutcome::Ignored);
}

#[test]
fn typed_text_parses_for_the_field_type() {
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal::Decimal;

    assert_eq!(
        text_to_value(&FieldType::Number, "12.5"),
        Some(FieldValue::Number(Decimal::new(125, 1)))
    );
    assert_eq!(text_to_value(&FieldType::Number, "12a"), None);
    assert_eq!(text_to_value(&FieldType::Number, " "), Some(FieldValue::Empty));

    let date = NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date");
    assert_eq!(
        text_to_value(&FieldType::Date, "2024-03-09"),
        Some(FieldValue::Date(date))
    );
    assert_eq!(text_to_value(&FieldType::Date, "2024-03"), None);

    let time = NaiveTime::from_hms_opt(9, 15, 0).expect("valid time");
    assert_eq!(
        text_to_value(&FieldType::Time, "09:15"),
        Some(FieldValue::Time(time))
    );
    let date_time = date.and_hms_opt(18, 30, 0).expect("valid date-time");
    assert_eq!(
        text_to_value(&FieldType::DateTimeLocal, "2024-03-09 18:30"),
        Some(FieldValue::DateTime(date_time))
    );
    assert_eq!(
        text_to_value(&FieldType::DateTimeLocal, "2024-03-09T18:30:00"),
        Some(FieldValue::DateTime(date_time))
    );
    assert_eq!(value_to_text(&FieldValue::DateTime(date_time)), "2024-03-09T18:30");

    assert_eq!(
        text_to_value(&FieldType::Email, " ada@"),
        Some(FieldValue::from(" ada@"))
    );
}

#[test]
fn tag_commits_skip_blanks_repeats_and_full_lists() {
    let tags = vec![SharedString::from("rust")];
    assert_eq!(
        tags_after_commit(&tags, " gpui ", None),
        Some(vec![SharedString::from("rust"), SharedString::from("gpui")])
    );
    assert_eq!(tags_after_commit(&tags, "  ", None), None);
    assert_eq!(tags_after_commit(&tags, "rust", None), None);
    assert_eq!(tags_after_commit(&tags, "gpui", Some(1)), None);

    let comma = EditOptions {
        commit_chars: &[','],
        ..EditOptions::default()
    };
    assert_eq!(typed(&EditState::new("gpui"), ",", comma), EditOutcome::Commit);
}

#[test]
fn file_rules_filter_picked_files() {
    use crate::value::FileValue;

    let rules = FileRules {
        multiple: true,
        min_size: None,
        max_size: Some(1024),
        mime: Some(vec!["image/*".into()]),
    };
    let avatar = FileValue::new("avatar.png", 512, "image/png");
    let pick = rules.pick(
        &[avatar.clone()],
        vec![
            FileValue::new("banner.png", 900, "image/png"),
            FileValue::new("huge.png", 4096, "image/png"),
            FileValue::new("notes.txt", 10, "text/plain"),
            avatar.clone(),
        ],
    );
    assert_eq!(
        pick.rejected,
        vec![
            (SharedString::from("huge.png"), FileRejection::TooLarge),
            (SharedString::from("notes.txt"), FileRejection::WrongType),
            (SharedString::from("avatar.png"), FileRejection::Duplicate),
        ]
    );
    let Some(FieldValue::Files(files)) = pick.value else {
        panic!("accepted files are appended");
    };
    assert_eq!(files.len(), 2);
    assert_eq!(files[1].name.as_ref(), "banner.png");
    assert_eq!(
        rules.remove(&files, 0),
        FieldValue::Files(vec![files[1].clone()])
    );

    let single = FileRules::default();
    let pick = single.pick(
        &[],
        vec![
            FileValue::new("a.pdf", 1, "application/pdf"),
            FileValue::new("b.pdf", 1, "application/pdf"),
        ],
    );
    assert_eq!(
        pick.value,
        Some(FieldValue::File(FileValue::new("a.pdf", 1, "application/pdf")))
    );
    assert_eq!(single.remove(&[], 0), FieldValue::Empty);
}

fn editor_form(registry: &mut MetadataRegistry) -> AutoForm {
    let schema = z::object([
        ("bio", z::string().max_length(500)),
        (
            "startsAt",
            z::date().register(
                registry,
                FieldMeta::new().field_type(FieldType::DateTimeLocal),
            ),
        ),
        ("topics", z::array(z::string()).max_length(3)),
        (
            "attachments",
            z::array(z::file().max_size(1024).mime(["text/plain"])),
        ),
    ]);
    AutoForm::builder(schema, registry)
        .build()
        .expect("form builds")
}

fn bound(form: &AutoForm, key: &str) -> ControllerParams {
    let values = form.values().expect("values");
    let descriptor = form.field(key).expect("field").clone();
    ControllerParams::bind(form, &descriptor, &values).expect("params")
}

#[test]
fn text_input_edits_reach_the_store() {
    let mut registry = MetadataRegistry::new();
    let form = editor_form(&mut registry);

    let bio = bound(&form, "bio");
    let options = EditOptions {
        multiline: bio.field_config.field_type == FieldType::Textarea,
        max_length: bio.field_config.max_length,
        commit_chars: &[],
    };
    let EditOutcome::Changed(state) =
        EditState::new(value_to_text(&bio.field.value)).apply("h", Some("hi"), options)
    else {
        panic!("typing inserts");
    };
    let value = text_to_value(&bio.field_config.field_type, &state.text).expect("text parses");
    bio.field.change(value);
    assert_eq!(
        form.value(&"bio".into()).expect("value"),
        FieldValue::from("hi")
    );

    let starts_at = bound(&form, "startsAt");
    assert_eq!(starts_at.field_config.field_type, FieldType::DateTimeLocal);
    assert_eq!(
        text_to_value(&starts_at.field_config.field_type, "2024-03-09 18"),
        None
    );
    let value = text_to_value(&starts_at.field_config.field_type, "2024-03-09 18:30")
        .expect("date-time parses");
    starts_at.field.change(value.clone());
    assert_eq!(form.value(&"startsAt".into()).expect("value"), value);
    assert!(!form.field_state(&"startsAt".into()).expect("state").invalid);
}

#[test]
fn tag_and_file_edits_reach_the_store() {
    let mut registry = MetadataRegistry::new();
    let form = editor_form(&mut registry);

    let topics = bound(&form, "topics");
    assert_eq!(topics.field_config.field_type, FieldType::Tags);
    let next = tags_after_commit(&[], "rust", topics.field_config.max_length).expect("tag added");
    topics.field.change(next);
    assert_eq!(
        form.value(&"topics".into()).expect("value"),
        FieldValue::from(vec![SharedString::from("rust")])
    );

    let path = std::env::temp_dir().join(format!("calmform-notes-{}.txt", std::process::id()));
    std::fs::write(&path, b"hello").expect("write upload");
    let attachments = bound(&form, "attachments");
    assert_eq!(attachments.field_config.field_type, FieldType::Files);
    let rules = super::controllers::file_rules(&attachments);
    let pick = super::controllers::pick_paths(&rules, &[], std::slice::from_ref(&path));
    std::fs::remove_file(&path).expect("remove upload");
    assert!(pick.rejected.is_empty());
    attachments.field.change(pick.value.expect("file accepted"));

    let Ok(FieldValue::Files(files)) = form.value(&"attachments".into()) else {
        panic!("attachments hold files");
    };
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].size, 5);
    assert_eq!(files[0].mime.as_ref(), "text/plain");
    assert_eq!(files[0].path.as_deref(), Some(path.as_path()));

    let attachments = bound(&form, "attachments");
    attachments.field.change(rules.remove(&files, 0));
    assert_eq!(
        form.value(&"attachments".into()).expect("value"),
        FieldValue::Files(Vec::new())
    );
}

#[test]
fn theme_defaults_and_overrides() {
    let mut registry = MetadataRegistry::new();
    let form = editor_form(&mut registry);
    let bio = bound(&form, "bio");
    assert_eq!(bio.theme, FormTheme::default());

    let accent = gpui::rgb(0x7048e8);
    let themed = bio.with_theme(FormTheme::new().accent(accent));
    assert_eq!(themed.theme.accent, gpui::Hsla::from(accent));
    assert_eq!(themed.theme.border, FormTheme::default().border);
}
