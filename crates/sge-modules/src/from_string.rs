//! The `IFromString` interface.
//!
//! Parsing consumes the longest valid prefix of the input, after leading
//! whitespace, and reports how many bytes it used. A result of zero means
//! nothing was parsed and the value was left untouched.

use std::str::FromStr;

use sge_core::{AnyMut, Interface, InterfaceInfo};

static INFO: InterfaceInfo = InterfaceInfo::new("IFromString");

/// Parses a value in place.
#[derive(Clone, Copy)]
pub struct IFromString {
    pub from_string: fn(AnyMut<'_>, &str) -> usize,
}

impl Interface for IFromString {
    fn info() -> &'static InterfaceInfo {
        &INFO
    }
}

impl IFromString {
    /// Implementation that requires the whole input to parse as `T`.
    pub fn of<T: FromStr + 'static>() -> Self {
        Self {
            from_string: parse_whole::<T>,
        }
    }

    /// Implementation that parses the longest prefix accepted by `T::from_str`.
    pub fn prefix<T: FromStr + 'static>() -> Self {
        Self {
            from_string: parse_prefix::<T>,
        }
    }

    pub(crate) fn first_char() -> Self {
        Self {
            from_string: parse_char,
        }
    }

    pub(crate) fn whole_string() -> Self {
        Self {
            from_string: |mut this: AnyMut<'_>, text: &str| {
                this.get_mut::<String>().replace_range(.., text);
                text.len()
            },
        }
    }
}

fn parse_whole<T: FromStr + 'static>(mut this: AnyMut<'_>, text: &str) -> usize {
    match text.parse::<T>() {
        Ok(value) if !text.is_empty() => {
            *this.get_mut::<T>() = value;
            text.len()
        }
        _ => 0,
    }
}

fn parse_prefix<T: FromStr + 'static>(mut this: AnyMut<'_>, text: &str) -> usize {
    let body = text.trim_start();
    let skipped = text.len() - body.len();
    let ends = body
        .char_indices()
        .map(|(start, c)| start + c.len_utf8())
        .collect::<Vec<_>>();
    for &end in ends.iter().rev() {
        if let Ok(value) = body[..end].parse::<T>() {
            *this.get_mut::<T>() = value;
            return skipped + end;
        }
    }
    0
}

fn parse_char(mut this: AnyMut<'_>, text: &str) -> usize {
    match text.chars().next() {
        Some(c) => {
            *this.get_mut::<char>() = c;
            c.len_utf8()
        }
        None => 0,
    }
}

/// Parses `text` into `value` if its type implements [`IFromString`].
///
/// Returns the number of bytes consumed.
pub fn from_string(value: AnyMut<'_>, text: &str) -> Option<usize> {
    let imp = value.implementation::<IFromString>()?;
    Some((imp.from_string)(value, text))
}

#[cfg(test)]
mod tests {
    use sge_core::{Registry, RegistryBuilder};

    use super::*;

    fn registry() -> &'static Registry {
        crate::install(RegistryBuilder::with_primitives())
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn integer_prefix_stops_at_first_invalid_byte() {
        let registry = registry();
        let mut value = 0i32;
        let used = from_string(registry.any_mut(&mut value).unwrap(), "  -17px");
        assert_eq!(used, Some(5));
        assert_eq!(value, -17);
    }

    #[test]
    fn float_prefix() {
        let registry = registry();
        let mut value = 0.0f32;
        let used = from_string(registry.any_mut(&mut value).unwrap(), "2.5e1, 3");
        assert_eq!(used, Some(5));
        assert_eq!(value, 25.0);
    }

    #[test]
    fn nothing_parsed_leaves_value_untouched() {
        let registry = registry();
        let mut value = 9u8;
        assert_eq!(from_string(registry.any_mut(&mut value).unwrap(), "x1"), Some(0));
        assert_eq!(from_string(registry.any_mut(&mut value).unwrap(), "300"), Some(2));
        assert_eq!(value, 30);
    }

    #[test]
    fn strings_and_chars() {
        let registry = registry();
        let mut text = String::from("old");
        assert_eq!(from_string(registry.any_mut(&mut text).unwrap(), "new"), Some(3));
        assert_eq!(text, "new");

        let mut c = 'a';
        assert_eq!(from_string(registry.any_mut(&mut c).unwrap(), "éa"), Some(2));
        assert_eq!(c, 'é');
    }

    #[test]
    fn whole_string_parsing() {
        let registry = RegistryBuilder::with_primitives()
            .implement::<u16, _>(IFromString::of::<u16>())
            .unwrap()
            .build()
            .unwrap();
        let mut value = 1u16;
        assert_eq!(from_string(registry.any_mut(&mut value).unwrap(), "12a"), Some(0));
        assert_eq!(value, 1);
        assert_eq!(from_string(registry.any_mut(&mut value).unwrap(), "512"), Some(3));
        assert_eq!(value, 512);
        let mut flag = false;
        assert_eq!(from_string(registry.any_mut(&mut flag).unwrap(), "true"), None);
    }
}
