use calmform::schema::FormSchema;

#[derive(FormSchema)]
#[allow(dead_code)]
enum Plan {
    Free,
    Pro,
}

fn main() {}
