use calmform::schema::FormSchema;

#[derive(FormSchema)]
#[allow(dead_code)]
struct Rating {
    #[form(min = 0.5, max = 5)]
    score: f64,
}

fn main() {}
