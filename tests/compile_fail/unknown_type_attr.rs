//! Test unknown type attribute error.

use sge::Reflect;

#[derive(Reflect)]
#[reflect(bogus)]
struct Test;

fn main() {
    let _ = Test;
}
