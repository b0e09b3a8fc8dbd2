//! Core runtime reflection for Rust types.
//!
//! This crate provides the descriptor model and the type-erased handles used
//! to inspect and manipulate values whose types are only known at runtime:
//!
//! - [`TypeInfo`] - one descriptor per reflected type: identity, layout,
//!   lifecycle contract, constructors, properties, fields and interfaces
//! - [`Any`] / [`AnyMut`] - non-owning views pairing an address with its
//!   descriptor
//! - [`ArgAny`] - a single argument to a reflected constructor
//! - [`UFunction`] - a move-only callable with small-buffer storage
//! - [`ErasedBox`] - an owned heap value of a runtime type
//! - [`RegistryBuilder`] / [`Registry`] - registration and the frozen,
//!   process-wide descriptor set
//!
//! # Example
//!
//! ```ignore
//! use sge_core::{FieldFlags, NativeTypeInfoBuilder, RegistryBuilder, reflect_field_property};
//!
//! #[derive(Default, Clone, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! let point = NativeTypeInfoBuilder::<Point>::new("Point")
//!     .default_init()
//!     .copyable()
//!     .equality();
//! let point = reflect_field_property!(point, Point, x, FieldFlags::PUBLIC)?;
//! let point = reflect_field_property!(point, Point, y, FieldFlags::PUBLIC)?;
//!
//! let registry = RegistryBuilder::with_primitives().register_type(point)?.build()?;
//! let ty = registry.type_of::<Point>().unwrap();
//!
//! let mut p = Point { x: 1, y: 2 };
//! ty.find_property("x").unwrap().set_value(registry.any_mut(&mut p).unwrap(), &7i32);
//! assert_eq!(p.x, 7);
//! ```

mod any;
mod arg_any;
mod builder;
mod constructor;
mod enum_type;
mod erased_box;
mod error;
mod field;
mod flags;
mod interface;
mod lifecycle;
mod members;
mod property;
mod reflect;
mod registry;
mod type_hash;
mod type_info;
mod type_ref;
mod ufunction;

pub use any::{Any, AnyMut};
pub use arg_any::ArgAny;
pub use builder::{EnumInfoBuilder, IntoConstructor, NativeTypeInfoBuilder};
pub use constructor::{ConstructorFn, ConstructorInfo};
pub use enum_type::{EnumBits, EnumPropertyKind};
pub use erased_box::ErasedBox;
pub use error::RegistrationError;
pub use field::FieldInfo;
pub use flags::{FieldFlags, PropertyFlags, TypeFlags};
pub use interface::{ImplRef, Interface, InterfaceInfo};
pub use lifecycle::Lifecycle;
pub use property::{PropertyInfo, PropertyKind};
pub use reflect::Reflect;
pub use registry::{Registry, RegistryBuilder, get_type, try_get_type};
pub use type_hash::{TypeHash, hash_constants};
pub use type_info::{TypeInfo, TypeKind};
pub use type_ref::TypeRef;
pub use ufunction::{FnPtr, Invoke, Representation, UFunction};
