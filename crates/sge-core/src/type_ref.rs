//! Deferred references between descriptors.
//!
//! Descriptors are assembled before the types they mention are registered
//! (a `Line` property of type `Point` may be declared before `Point`). A
//! [`TypeRef`] records the Rust [`TypeId`] at declaration time and is bound
//! to the frozen `&'static TypeInfo` when the registry is built.

use std::any::{TypeId, type_name};
use std::fmt;
use std::sync::OnceLock;

use crate::TypeInfo;

pub struct TypeRef {
    id: TypeId,
    rust_name: &'static str,
    resolved: OnceLock<&'static TypeInfo>,
}

impl TypeRef {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            rust_name: type_name::<T>(),
            resolved: OnceLock::new(),
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// The Rust path of the referenced type, for diagnostics.
    #[inline]
    pub fn rust_name(&self) -> &'static str {
        self.rust_name
    }

    /// The referenced descriptor.
    ///
    /// # Panics
    ///
    /// Panics if the owning registry has not been built yet.
    #[inline]
    pub fn get(&self) -> &'static TypeInfo {
        match self.resolved.get() {
            Some(info) => info,
            None => panic!(
                "type reference to `{}` used before its registry was built",
                self.rust_name
            ),
        }
    }

    #[inline]
    pub fn try_get(&self) -> Option<&'static TypeInfo> {
        self.resolved.get().copied()
    }

    /// Binds the reference. Returns `false` if `info` describes another type.
    pub(crate) fn resolve(&self, info: &'static TypeInfo) -> bool {
        if info.type_id() != self.id {
            return false;
        }
        // A descriptor is resolved by exactly one registry build.
        let _ = self.resolved.set(info);
        true
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resolved.get() {
            Some(info) => write!(f, "TypeRef({})", info.name()),
            None => write!(f, "TypeRef(`{}`, unresolved)", self.rust_name),
        }
    }
}
