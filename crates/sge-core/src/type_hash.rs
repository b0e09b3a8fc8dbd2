//! Deterministic name hashes.
//!
//! [`TypeHash`] is a 64-bit hash computed from a registered name. It is the
//! key of every name-indexed table in the registry and the identity of an
//! [`InterfaceInfo`](crate::InterfaceInfo): two interfaces with the same name
//! are the same interface.
//!
//! Hashing is a `const fn`, so interface descriptors can live in `static`
//! items with their hash computed at compile time.
//!
//! ```
//! use sge_core::TypeHash;
//!
//! const POINT: TypeHash = TypeHash::from_name("Point");
//! assert_eq!(POINT, TypeHash::from_name("Point"));
//! assert_ne!(POINT, TypeHash::from_interface("Point"));
//! ```

use std::fmt;

use xxhash_rust::const_xxh64::xxh64;

/// Domain constants mixed into hashes so a type and an interface sharing a
/// name never collide.
pub mod hash_constants {
    /// Domain marker for type hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for interface hashes.
    pub const INTERFACE: u64 = 0x6b1d8e4f93a2c705;
}

/// A deterministic 64-bit hash of a registered name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Hash of a type name.
    #[inline]
    pub const fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Hash of an interface name.
    #[inline]
    pub const fn from_interface(name: &str) -> Self {
        TypeHash(hash_constants::INTERFACE ^ xxh64(name.as_bytes(), 0))
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
