//! Test unknown field attribute error.

use sge::Reflect;

#[derive(Reflect)]
struct Test {
    #[reflect(field, getter)]
    value: i32,
}

fn main() {
    let test = Test { value: 0 };
    let _ = test.value;
}
