//! Registration builders.
//!
//! - [`NativeTypeInfoBuilder`] describes structs and primitives.
//! - [`EnumInfoBuilder`] describes C-like enums and bit flag sets.
//!
//! Both are consumed by [`RegistryBuilder`](crate::RegistryBuilder).

mod enums;
mod native;

pub use enums::EnumInfoBuilder;
pub use native::{IntoConstructor, NativeTypeInfoBuilder};
