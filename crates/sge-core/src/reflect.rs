//! The `Reflect` trait and field registration helpers.

use crate::{NativeTypeInfoBuilder, RegistrationError};

/// Types that describe themselves to a [`RegistryBuilder`](crate::RegistryBuilder).
///
/// Usually derived with `#[derive(Reflect)]`; implement it by hand when
/// the derive's attributes are not enough.
///
/// # Example
///
/// ```ignore
/// impl Reflect for Point {
///     const NAME: &'static str = "Point";
///
///     fn reflect(
///         builder: NativeTypeInfoBuilder<Self>,
///     ) -> Result<NativeTypeInfoBuilder<Self>, RegistrationError> {
///         let builder = builder.default_init().copyable();
///         let builder = reflect_field!(builder, Point, x)?;
///         reflect_field!(builder, Point, y)
///     }
/// }
/// ```
pub trait Reflect: Sized + 'static {
    /// The registered type name.
    const NAME: &'static str;

    /// Adds this type's capabilities and members to `builder`.
    fn reflect(
        builder: NativeTypeInfoBuilder<Self>,
    ) -> Result<NativeTypeInfoBuilder<Self>, RegistrationError>;
}

/// Registers a named field of a struct on a [`NativeTypeInfoBuilder`].
///
/// The offset comes from `core::mem::offset_of!` and the field type from
/// the field itself, so no `unsafe` is needed at the call site.
///
/// ```ignore
/// let builder = reflect_field!(builder, Line, start)?;
/// let builder = reflect_field!(builder, Line, cache, FieldFlags::TRANSIENT)?;
/// ```
#[macro_export]
macro_rules! reflect_field {
    ($builder:expr, $ty:ty, $field:ident $(, $flags:expr)?) => {{
        let flags = $crate::FieldFlags::empty() $(| $flags)?;
        // SAFETY: the offset and the projection name the same field.
        unsafe {
            $builder.field_with_witness(
                ::core::stringify!($field),
                ::core::mem::offset_of!($ty, $field),
                |this: &$ty| &this.$field,
                flags,
            )
        }
    }};
}

/// Registers a named field of a struct together with a property of the same
/// name backed by it.
///
/// Field flags and property flags default to empty.
///
/// ```ignore
/// let builder = reflect_field_property!(builder, Point, x)?;
/// let builder = reflect_field_property!(builder, Point, y, FieldFlags::PUBLIC, PropertyFlags::EDITOR_ONLY)?;
/// ```
#[macro_export]
macro_rules! reflect_field_property {
    ($builder:expr, $ty:ty, $field:ident $(, $field_flags:expr $(, $property_flags:expr)?)?) => {{
        let field_flags = $crate::FieldFlags::empty() $(| $field_flags)?;
        let property_flags = $crate::PropertyFlags::empty() $($(| $property_flags)?)?;
        // SAFETY: the offset and the projection name the same field.
        unsafe {
            $builder.field_property_with_witness(
                ::core::stringify!($field),
                ::core::mem::offset_of!($ty, $field),
                |this: &$ty| &this.$field,
                field_flags,
                property_flags,
            )
        }
    }};
}

/// [`reflect_field_property!`] with a read-only property.
#[macro_export]
macro_rules! reflect_readonly_field_property {
    ($builder:expr, $ty:ty, $field:ident $(, $field_flags:expr $(, $property_flags:expr)?)?) => {{
        let field_flags = $crate::FieldFlags::empty() $(| $field_flags)?;
        let property_flags = $crate::PropertyFlags::empty() $($(| $property_flags)?)?;
        // SAFETY: the offset and the projection name the same field.
        unsafe {
            $builder.readonly_field_property_with_witness(
                ::core::stringify!($field),
                ::core::mem::offset_of!($ty, $field),
                |this: &$ty| &this.$field,
                field_flags,
                property_flags,
            )
        }
    }};
}
