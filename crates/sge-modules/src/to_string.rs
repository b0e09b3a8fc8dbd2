//! The `IToString` interface.

use std::fmt::Display;

use sge_core::{Any, Interface, InterfaceInfo};

static INFO: InterfaceInfo = InterfaceInfo::new("IToString");

/// Renders a value as text.
#[derive(Clone, Copy)]
pub struct IToString {
    pub to_string: fn(Any<'_>) -> String,
}

impl Interface for IToString {
    fn info() -> &'static InterfaceInfo {
        &INFO
    }
}

impl IToString {
    /// Implementation backed by `T`'s `Display`.
    pub fn of<T: Display + 'static>() -> Self {
        Self {
            to_string: display::<T>,
        }
    }
}

fn display<T: Display + 'static>(value: Any<'_>) -> String {
    value.get::<T>().to_string()
}

/// Renders `value` if its type implements [`IToString`].
pub fn to_string(value: Any<'_>) -> Option<String> {
    value
        .implementation::<IToString>()
        .map(|imp| (imp.to_string)(value))
}
