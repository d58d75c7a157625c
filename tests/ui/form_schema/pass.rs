use calmform::meta::MetadataRegistry;
use calmform::resolve::{FieldType, resolve_fields};
use calmform::schema::FormSchema;
use calmform::value::FileValue;

#[derive(calmform::schema::FormSchema)]
#[allow(dead_code)]
struct Signup {
    #[form(label = "Given name", half_width)]
    first_name: String,
    #[form(half_width)]
    last_name: String,
    #[form(email, description = "We never share it")]
    contact: String,
    #[form(min = 18, max = 120)]
    age: Option<u32>,
    #[form(options("free", "pro"), kind = "radio")]
    plan: String,
    #[form(min_length = 1, max_length = 3, mime("image/*"), max_size = 1024)]
    photos: Vec<FileValue>,
    newsletter: bool,
    #[form(rename = "referralCode", placeholder = "Optional")]
    referral: Option<String>,
    #[form(skip)]
    internal: u8,
}

fn main() {
    let mut registry = MetadataRegistry::new();
    let schema = Signup::form_schema(&mut registry);
    let fields = resolve_fields(&schema, &registry).expect("resolves");

    let keys: Vec<&str> = fields.iter().map(|field| field.key.as_str()).collect();
    assert_eq!(
        keys,
        [
            "first_name",
            "last_name",
            "contact",
            "age",
            "plan",
            "photos",
            "newsletter",
            "referralCode",
        ]
    );

    assert_eq!(fields[0].label.as_ref(), "Given name");
    assert!(fields[0].half_width && fields[1].half_width);
    assert_eq!(fields[2].field_type, FieldType::Email);
    assert_eq!(
        fields[2].description().map(|text| text.as_ref()),
        Some("We never share it")
    );
    assert_eq!(fields[3].field_type, FieldType::Number);
    assert!(fields[3].optional);
    assert_eq!(fields[4].field_type, FieldType::Radio);
    assert_eq!(fields[5].field_type, FieldType::Files);
    assert_eq!(fields[5].file_max_size, Some(1024));
    assert_eq!(fields[6].field_type, FieldType::Switch);
    assert_eq!(fields[7].placeholder.as_ref(), "Optional");
    assert!(fields[7].optional);
}
