//! Runtime reflection and type erasure for Rust types.
//!
//! This crate re-exports the workspace crates:
//!
//! - [`sge_core`] - descriptors, erased views, [`UFunction`] and the registry
//! - [`sge_macros`] - `#[derive(Reflect)]`
//! - [`sge_modules`] - the standard [`IToString`](modules::IToString) and
//!   [`IFromString`](modules::IFromString) interfaces
//!
//! # Example
//!
//! ```ignore
//! use sge::{Reflect, RegistryBuilder, get_type};
//!
//! #[derive(Reflect, Default, Clone, PartialEq)]
//! #[reflect(default, clone, eq)]
//! struct Point {
//!     #[reflect(property)]
//!     x: i32,
//!     #[reflect(property, editor_hidden)]
//!     y: i32,
//! }
//!
//! let registry = sge::modules::install(RegistryBuilder::with_primitives())?
//!     .register::<Point>()?
//!     .build()?;
//! registry.install()?;
//!
//! let point = get_type::<Point>();
//! point.enumerate_properties(|name, prop| println!("{name}: {}", prop.property_type()));
//! ```

// `#[derive(Reflect)]` names items as `::sge::...`.
extern crate self as sge;

pub use sge_core::*;
pub use sge_core::Reflect;
pub use sge_macros::Reflect;

/// Standard interfaces.
pub mod modules {
    pub use sge_modules::*;
}
