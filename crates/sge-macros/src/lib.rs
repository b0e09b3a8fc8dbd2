//! Derive macros for sge runtime reflection.
//!
//! # Macros
//!
//! - `#[derive(Reflect)]` - Implement the `Reflect` trait for a struct
//!
//! # Example
//!
//! ```ignore
//! use sge::Reflect;
//!
//! #[derive(Reflect, Default, Clone, PartialEq)]
//! #[reflect(name = "Player", default, clone, eq)]
//! pub struct Player {
//!     #[reflect(property, collapsed)]
//!     pub health: i32,
//! }
//! ```

use proc_macro::TokenStream;

mod attrs;
mod derive_reflect;

/// Derive the `Reflect` trait for a struct with named fields.
///
/// The generated implementation registers the requested lifecycle
/// capabilities and every field carrying a `field` or `property`
/// attribute. Unmarked fields are not reflected.
///
/// The generated code names items through the `sge` facade crate, so the
/// deriving crate depends on `sge` rather than on `sge-core` directly.
///
/// # Type Attributes
///
/// - `#[reflect(name = "...")]` - Override the registered type name
/// - `#[reflect(default)]` - Register default construction (`Default`)
/// - `#[reflect(clone)]` - Register copy construction and assignment (`Clone`)
/// - `#[reflect(eq)]` - Register equality (`PartialEq`)
/// - `#[reflect(no_construct)]` - Set `TypeFlags::SCRIPT_NOCONSTRUCT`
///
/// # Field Attributes
///
/// - `#[reflect(field)]` - Register a public field descriptor
/// - `#[reflect(property)]` - Register a field descriptor and a property backed by it
///   (field type must be `Clone` unless `readonly`)
/// - `#[reflect(readonly)]` - Make the field and its property read-only
/// - `#[reflect(transient)]` - Set `FieldFlags::TRANSIENT`
/// - `#[reflect(editor_only)]` - Set `PropertyFlags::EDITOR_ONLY`
/// - `#[reflect(editor_hidden)]` - Set `PropertyFlags::EDITOR_HIDDEN`
/// - `#[reflect(collapsed)]` - Set `PropertyFlags::EDITOR_DEFAULT_COLLAPSED`
/// - `#[reflect(name = "...")]` - Override the member name
///
/// # Example
///
/// ```ignore
/// #[derive(Reflect, Default)]
/// #[reflect(default)]
/// struct Line {
///     #[reflect(field)]
///     start: Point,
///     #[reflect(field)]
///     end: Point,
///     #[reflect(property, readonly, name = "label")]
///     caption: String,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    derive_reflect::derive_reflect_impl(input)
}
