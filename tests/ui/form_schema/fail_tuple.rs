use calmform::schema::FormSchema;

#[derive(FormSchema)]
#[allow(dead_code)]
struct Point(i32, i32);

fn main() {}
