use std::time::Instant;

use calmform::schema::FormSchema;

#[derive(FormSchema)]
#[allow(dead_code)]
struct Session {
    name: String,
    started: Instant,
}

fn main() {}
