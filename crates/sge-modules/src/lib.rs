//! Standard reflection interfaces.
//!
//! This crate provides the interfaces most types want to implement:
//!
//! - **to_string** - [`IToString`], textual rendering of a value
//! - **from_string** - [`IFromString`], parsing a value in place
//!
//! # Usage
//!
//! [`install`] registers both interfaces and implements them for the
//! primitive types:
//!
//! ```ignore
//! let registry = sge_modules::install(RegistryBuilder::with_primitives())?
//!     .register::<Point>()?
//!     .implement::<Point, _>(IToString::of::<Point>())?
//!     .build()?;
//!
//! let p = Point { x: 1, y: 2 };
//! assert_eq!(to_string(registry.any(&p).unwrap()).as_deref(), Some("(1, 2)"));
//! ```

pub mod from_string;
pub mod to_string;

use sge_core::{RegistrationError, RegistryBuilder};

pub use from_string::{IFromString, from_string};
pub use to_string::{IToString, to_string};

/// Implements `$iface` for each listed primitive type.
macro_rules! implement_all {
    ($builder:expr, $iface:ident, $ctor:ident, [$($ty:ty),* $(,)?]) => {{
        let builder = $builder;
        $(let builder = builder.implement::<$ty, $iface>($iface::$ctor::<$ty>())?;)*
        builder
    }};
}

/// Registers [`IToString`] and [`IFromString`] and implements them for
/// `bool`, `char`, every integer and float type and `String`.
///
/// The builder must already contain the primitive types, as created by
/// [`RegistryBuilder::with_primitives`].
pub fn install(builder: RegistryBuilder) -> Result<RegistryBuilder, RegistrationError> {
    let builder = builder
        .register_interface::<IToString>()
        .register_interface::<IFromString>();
    let builder = implement_all!(
        builder,
        IToString,
        of,
        [bool, char, i8, u8, i16, u16, i32, u32, i64, u64, f32, f64, String]
    );
    let builder = implement_all!(
        builder,
        IFromString,
        prefix,
        [bool, i8, u8, i16, u16, i32, u32, i64, u64, f32, f64]
    );
    let builder = builder
        .implement::<char, IFromString>(IFromString::first_char())?
        .implement::<String, IFromString>(IFromString::whole_string())?;
    tracing::debug!("installed string interfaces");
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_covers_primitives() {
        let registry = install(RegistryBuilder::with_primitives())
            .unwrap()
            .build()
            .unwrap();
        for ty in registry.types().filter(|ty| !ty.is::<()>()) {
            assert!(
                ty.implementation::<IToString>().is_some(),
                "{} lacks IToString",
                ty.name()
            );
            assert!(
                ty.implementation::<IFromString>().is_some(),
                "{} lacks IFromString",
                ty.name()
            );
        }
        assert!(registry.find_interface("IToString").is_some());
        assert!(registry.find_interface("IFromString").is_some());
    }

    #[test]
    fn install_requires_primitives() {
        let err = install(RegistryBuilder::new()).unwrap_err();
        assert!(matches!(err, RegistrationError::TypeNotFound(_)));
    }
}
