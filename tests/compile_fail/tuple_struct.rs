//! Test tuple struct error.

use sge::Reflect;

#[derive(Reflect)]
struct Test(i32);

fn main() {
    let test = Test(0);
    let _ = test.0;
}
