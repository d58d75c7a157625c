use super::*;
use crate::schema::{EnumMember, z};
use rust_decimal::Decimal;

fn resolve_one(key: &'static str, node: Schema) -> FieldDescriptor {
    resolve_field(key, &node, &MetadataRegistry::new()).expect("field resolves")
}

#[test]
fn humanized_labels_keep_acronyms() {
    assert_eq!(humanize_key("homepageURL"), "Homepage URL");
    assert_eq!(humanize_key("apiKey"), "Api Key");
    assert_eq!(humanize_key("user_ID"), "User ID");
    assert_eq!(humanize_key("last-name"), "Last Name");

    let field = resolve_one("homepageURL", z::string().url());
    assert_eq!(field.label.as_ref(), "Homepage URL");
}

#[test]
fn fields_resolve_in_declaration_order_with_humanized_labels() {
    let registry = MetadataRegistry::new();
    let schema = z::object([
        ("lastName", z::string()),
        ("first_name", z::string()),
        ("date-of-birth", z::date()),
    ]);

    let fields = resolve_fields(&schema, &registry).expect("fields resolve");
    let labels = fields
        .iter()
        .map(|field| field.label.as_ref())
        .collect::<Vec<_>>();
    assert_eq!(labels, vec!["Last Name", "First Name", "Date Of Birth"]);
    assert_eq!(fields[2].field_type, FieldType::Date);
    assert_eq!(fields[2].placeholder.as_ref(), "Select date");
}

#[test]
fn long_strings_become_textareas_before_any_other_rule() {
    let field = resolve_one("password", z::string().max_length(500));
    assert_eq!(field.field_type, FieldType::Textarea);
    assert_eq!(field.max_length, Some(500));
    assert_eq!(field.placeholder.as_ref(), "Enter detailed text");

    let field = resolve_one("bio", z::string().max_length(TEXTAREA_THRESHOLD));
    assert_eq!(field.field_type, FieldType::Text);
}

#[test]
fn string_formats_and_key_names_pick_text_like_types() {
    assert_eq!(
        resolve_one("contact", z::string().email()).field_type,
        FieldType::Email
    );
    assert_eq!(
        resolve_one("homepage", z::string().url()).field_type,
        FieldType::Url
    );
    assert_eq!(
        resolve_one("newPassword", z::string().min_length(8)).field_type,
        FieldType::Password
    );
    assert_eq!(
        resolve_one("startDate", z::string()).field_type,
        FieldType::Date
    );
    assert_eq!(
        resolve_one("profileLink", z::string()).field_type,
        FieldType::Url
    );
    assert_eq!(
        resolve_one("backupEmail", z::string()).field_type,
        FieldType::Email
    );
    assert_eq!(resolve_one("nickname", z::string()).field_type, FieldType::Text);
}

#[test]
fn explicit_placeholder_disables_key_inference() {
    let mut registry = MetadataRegistry::new();
    let node = z::string().register(&mut registry, FieldMeta::new().placeholder("Paste it here"));

    let field = resolve_field("profileLink", &node, &registry).expect("field resolves");
    assert_eq!(field.field_type, FieldType::Text);
    assert_eq!(field.placeholder.as_ref(), "Paste it here");
}

#[test]
fn infer_type_from_key_checks_password_first() {
    assert_eq!(infer_type_from_key("passwordResetDate"), FieldType::Password);
    assert_eq!(infer_type_from_key("updateDate"), FieldType::Date);
    assert_eq!(infer_type_from_key("EMAIL"), FieldType::Email);
    assert_eq!(infer_type_from_key("title"), FieldType::Text);
}

#[test]
fn file_arrays_take_counts_from_the_array_and_limits_from_the_element() {
    let photos = z::array(
        z::file()
            .max_size(5 * 1024 * 1024)
            .mime(["image/png", "image/jpeg"]),
    )
    .min_length(2)
    .max_length(4);

    let field = resolve_one("photos", photos);
    assert_eq!(field.field_type, FieldType::Files);
    assert_eq!(field.min_length, Some(2));
    assert_eq!(field.max_length, Some(4));
    assert_eq!(field.file_max_size, Some(5 * 1024 * 1024));
    assert_eq!(field.file_min_size, None);
    assert_eq!(
        field.file_mime,
        Some(vec![
            SharedString::from("image/png"),
            SharedString::from("image/jpeg"),
        ])
    );
    assert_eq!(field.placeholder.as_ref(), "Upload from 2 to 4 files");
}

#[test]
fn upload_placeholders_follow_item_counts() {
    let placeholder =
        |node: Schema| resolve_one("attachments", node).placeholder.to_string();

    assert_eq!(
        placeholder(z::array(z::file()).length(1)),
        "Upload 1 file"
    );
    assert_eq!(
        placeholder(z::array(z::file()).length(3)),
        "Upload 3 files"
    );
    assert_eq!(
        placeholder(z::array(z::file()).max_length(3)),
        "Upload up to 3 files"
    );
    assert_eq!(
        placeholder(z::array(z::file()).min_length(1)),
        "Upload at least 1 file"
    );
    assert_eq!(placeholder(z::array(z::file())), "Upload multiple files");
    assert_eq!(placeholder(z::file().max_size(1024)), "Upload a file");
}

#[test]
fn string_arrays_become_tags_and_other_arrays_fail() {
    let field = resolve_one("labels", z::array(z::string()).max_length(5));
    assert_eq!(field.field_type, FieldType::Tags);
    assert_eq!(field.placeholder.as_ref(), "Enter tags and press Enter");

    let error = resolve_field("scores", &z::array(z::number()), &MetadataRegistry::new())
        .expect_err("numeric arrays are unsupported");
    assert_eq!(
        error,
        SchemaError::UnsupportedArrayElement {
            key: "scores".into(),
            element: SchemaKindTag::Number,
        }
    );

    let schema = z::object([
        ("name", z::string()),
        ("scores", z::array(z::number())),
    ]);
    assert!(resolve_fields(&schema, &MetadataRegistry::new()).is_err());
}

#[test]
fn booleans_and_switch_hints_render_as_switches() {
    let field = resolve_one("newsletter", z::boolean().optional());
    assert_eq!(field.field_type, FieldType::Switch);
    assert_eq!(field.placeholder.as_ref(), "");
    assert!(field.optional);

    let mut registry = MetadataRegistry::new();
    let node = z::string().register(
        &mut registry,
        FieldMeta::new()
            .field_type(FieldType::Switch)
            .placeholder("ignored"),
    );
    let field = resolve_field("enabled", &node, &registry).expect("field resolves");
    assert_eq!(field.field_type, FieldType::Switch);
    assert_eq!(field.placeholder.as_ref(), "");
}

#[test]
fn enums_become_selects_or_radios_with_options() {
    let field = resolve_one("size", z::enumeration(["s", "m", "l"]));
    assert_eq!(field.field_type, FieldType::Select);
    assert_eq!(field.placeholder.as_ref(), "Select an option");
    let values = field
        .enhanced_options
        .as_ref()
        .expect("options")
        .iter()
        .map(|option| option.value().to_string())
        .collect::<Vec<_>>();
    assert_eq!(values, vec!["s", "m", "l"]);

    let mut registry = MetadataRegistry::new();
    let node = z::enhanced_enum([
        EnumOption::detailed("card").label("Credit card"),
        EnumOption::detailed("invoice")
            .label("Invoice")
            .description("Net 30"),
    ])
    .register(&mut registry, FieldMeta::new().field_type(FieldType::Radio));
    let field = resolve_field("payment", &node, &registry).expect("field resolves");
    assert_eq!(field.field_type, FieldType::Radio);
    assert_eq!(field.placeholder.as_ref(), "Choose an option");
    let options = field.enhanced_options.expect("options");
    assert_eq!(options[0].display_label().as_ref(), "Credit card");
    assert_eq!(
        options[1].display_description().map(|text| text.as_ref()),
        Some("Net 30")
    );
}

#[test]
fn numeric_enums_are_rejected() {
    let node = z::members([
        EnumMember::Number(Decimal::from(1)),
        EnumMember::Number(Decimal::from(2)),
    ]);
    assert_eq!(
        resolve_field("level", &node, &MetadataRegistry::new()).expect_err("numeric enum"),
        SchemaError::NonStringEnum {
            key: "level".into()
        }
    );
}

#[test]
fn nested_objects_and_non_object_roots_are_rejected() {
    let registry = MetadataRegistry::new();
    assert_eq!(
        resolve_fields(&z::string(), &registry).expect_err("not an object"),
        SchemaError::NotAnObject {
            kind: SchemaKindTag::String
        }
    );

    let schema = z::object([("address", z::object([("street", z::string())]))]);
    assert_eq!(
        resolve_fields(&schema, &registry).expect_err("nested object"),
        SchemaError::UnsupportedKind {
            key: "address".into(),
            kind: SchemaKindTag::Object,
        }
    );
}

#[test]
fn numbers_carry_their_bounds() {
    let field = resolve_one("quantity", z::number().min(1).lt(100).optional());
    assert_eq!(field.field_type, FieldType::Number);
    assert_eq!(field.greater_than, Some(Bound::inclusive(Decimal::from(1))));
    assert_eq!(field.less_than, Some(Bound::exclusive(Decimal::from(100))));
    assert_eq!(field.placeholder.as_ref(), "Enter number");
    assert!(field.optional);
}

#[test]
fn incompatible_type_hints_are_ignored() {
    let mut registry = MetadataRegistry::new();
    let node = z::number().register(&mut registry, FieldMeta::new().field_type(FieldType::Email));
    let field = resolve_field("age", &node, &registry).expect("field resolves");
    assert_eq!(field.field_type, FieldType::Number);

    let node = z::date().register(&mut registry, FieldMeta::new().field_type(FieldType::Time));
    let field = resolve_field("opensAt", &node, &registry).expect("field resolves");
    assert_eq!(field.field_type, FieldType::Time);
    assert_eq!(field.placeholder.as_ref(), "Select time");
}

#[test]
fn date_nodes_shown_as_time_or_datetime_accept_those_values() {
    use crate::schema::SchemaValidator;
    use crate::value::{FieldKey, FieldValue};
    use chrono::{NaiveDate, NaiveTime};

    let mut registry = MetadataRegistry::new();
    let starts_at = z::date().register(
        &mut registry,
        FieldMeta::new().field_type(FieldType::DateTimeLocal),
    );
    let opens_at = z::date().register(&mut registry, FieldMeta::new().field_type(FieldType::Time));
    let schema = z::object([("startsAt", starts_at), ("opensAt", opens_at)]);

    let fields = resolve_fields(&schema, &registry).expect("fields resolve");
    assert_eq!(fields[0].field_type, FieldType::DateTimeLocal);
    assert_eq!(fields[1].field_type, FieldType::Time);

    let validator = SchemaValidator::new(schema).expect("object schema");
    let starts = NaiveDate::from_ymd_opt(2024, 3, 9)
        .and_then(|date| date.and_hms_opt(18, 30, 0))
        .expect("valid date-time");
    let opens = NaiveTime::from_hms_opt(9, 15, 0).expect("valid time");
    assert!(
        validator
            .validate_field(&FieldKey::from("startsAt"), &FieldValue::DateTime(starts))
            .is_none()
    );
    assert!(
        validator
            .validate_field(&FieldKey::from("opensAt"), &FieldValue::Time(opens))
            .is_none()
    );
    assert!(
        validator
            .validate_field(&FieldKey::from("opensAt"), &FieldValue::from("9:15"))
            .is_some()
    );
}

#[test]
fn custom_types_fall_back_to_the_text_placeholder() {
    let mut registry = MetadataRegistry::new();
    let node = z::string().register(
        &mut registry,
        FieldMeta::new().field_type(FieldType::from_name("color")),
    );
    let field = resolve_field("accent", &node, &registry).expect("field resolves");
    assert_eq!(field.field_type, FieldType::Custom("color".into()));
    assert_eq!(field.placeholder.as_ref(), "Enter text");
}

#[test]
fn metadata_on_the_outer_node_wins_over_the_inner_node() {
    let mut registry = MetadataRegistry::new();

    let inner_only = z::string()
        .register(&mut registry, FieldMeta::new().label("Inner"))
        .optional();
    let field = resolve_field("name", &inner_only, &registry).expect("field resolves");
    assert_eq!(field.label.as_ref(), "Inner");
    assert!(field.optional);

    let both = z::string()
        .register(&mut registry, FieldMeta::new().label("Inner"))
        .optional()
        .register(&mut registry, FieldMeta::new().label("Outer").half_width(true));
    let field = resolve_field("name", &both, &registry).expect("field resolves");
    assert_eq!(field.label.as_ref(), "Outer");
    assert!(field.half_width);
}

#[test]
fn metadata_follows_node_identity_not_field_name() {
    let mut registry = MetadataRegistry::new();
    let shared = z::string().register(&mut registry, FieldMeta::new().description("Shown once"));
    let schema = z::object([("first", shared.clone()), ("second", shared.fork())]);

    let fields = resolve_fields(&schema, &registry).expect("fields resolve");
    assert_eq!(
        fields[0].description().map(|text| text.as_ref()),
        Some("Shown once")
    );
    assert_eq!(fields[1].description(), None);
}

#[test]
fn placeholders_are_localized() {
    let registry = MetadataRegistry::new();
    let schema = z::object([("email", z::string().email())]);
    let fields = FieldResolver::new(&registry)
        .i18n(I18nManager::with_locale("fr-FR"))
        .resolve_all(&schema)
        .expect("fields resolve");
    assert_eq!(
        fields[0].placeholder.as_ref(),
        "Saisissez une adresse e-mail"
    );
}
