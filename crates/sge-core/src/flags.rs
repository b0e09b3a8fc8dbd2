//! Flag sets attached to types, properties and fields.
//!
//! Flags are advisory metadata for callers (archives, editors, script
//! bindings). The only flag the core itself enforces is
//! [`FieldFlags::READONLY`], which makes [`FieldInfo::get_mut`] a
//! precondition violation.
//!
//! [`FieldInfo::get_mut`]: crate::FieldInfo::get_mut

use bitflags::bitflags;

bitflags! {
    /// Flags describing a registered type.
    ///
    /// ```
    /// use sge_core::TypeFlags;
    ///
    /// assert!(TypeFlags::PRIMITIVE.contains(TypeFlags::NATIVE));
    /// assert!(TypeFlags::SCRIPT_NOCONSTRUCT.contains(TypeFlags::NATIVE));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeFlags: u32 {
        /// The type is implemented in Rust.
        const NATIVE = 1 << 0;
        /// The type is a built-in scalar or string.
        const PRIMITIVE = (1 << 1) | Self::NATIVE.bits();
        /// Script bindings must not construct the type.
        const SCRIPT_NOCONSTRUCT = (1 << 2) | Self::NATIVE.bits();
        /// Generic traversals stop here instead of walking properties.
        const RECURSE_TERMINAL = 1 << 3;
    }
}

bitflags! {
    /// Flags describing a registered property.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropertyFlags: u32 {
        /// Editors use this property; scripts do not see it.
        const EDITOR_ONLY = 1 << 0;
        /// Editors do not show this property.
        const EDITOR_HIDDEN = 1 << 1;
        /// Editors show this property collapsed until expanded.
        const EDITOR_DEFAULT_COLLAPSED = 1 << 2;
    }
}

bitflags! {
    /// Flags describing a registered field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldFlags: u32 {
        /// The field is visible to scripts and editors.
        const PUBLIC = 1 << 0;
        /// The field is not persisted.
        const TRANSIENT = 1 << 1;
        /// The field must not be written through reflection. Implies `TRANSIENT`.
        const READONLY = (1 << 2) | Self::TRANSIENT.bits();
    }
}
