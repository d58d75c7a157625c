use calmform::schema::FormSchema;

#[derive(FormSchema)]
#[allow(dead_code)]
struct Wrapper<T> {
    value: T,
}

fn main() {}
