//! Interfaces: capability tables without inheritance.
//!
//! An interface is a plain struct of function pointers (its "vtable") plus a
//! `static` [`InterfaceInfo`] naming it. A type opts in by registering one
//! instance of that struct; callers look the instance up through the type's
//! descriptor and call through it, passing the value as an erased view.
//!
//! ```
//! use sge_core::{Any, Interface, InterfaceInfo};
//!
//! pub struct Describe {
//!     pub describe: fn(Any<'_>) -> String,
//! }
//!
//! static DESCRIBE: InterfaceInfo = InterfaceInfo::new("Describe");
//!
//! impl Interface for Describe {
//!     fn info() -> &'static InterfaceInfo {
//!         &DESCRIBE
//!     }
//! }
//!
//! assert_eq!(Describe::info().name(), "Describe");
//! ```
//!
//! Interface identity is the `static` descriptor itself. Tables are keyed by
//! the hash of the name, so descriptors must also have distinct names.

use std::any::Any as StdAny;
use std::fmt;

use crate::{TypeHash, TypeInfo};

/// Names one interface.
pub struct InterfaceInfo {
    name: &'static str,
    hash: TypeHash,
}

impl InterfaceInfo {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            hash: TypeHash::from_interface(name),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn hash(&self) -> TypeHash {
        self.hash
    }

    /// The implementation registered for `ty`, if any.
    ///
    /// Returns the same record on every call for a given type.
    #[inline]
    pub fn get_implementation<'t>(&self, ty: &'t TypeInfo) -> Option<ImplRef<'t>> {
        ty.get_implementation(self)
    }

    #[inline]
    pub fn is_implemented_by(&self, ty: &TypeInfo) -> bool {
        ty.implements(self)
    }
}

impl PartialEq for InterfaceInfo {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for InterfaceInfo {}

impl fmt::Debug for InterfaceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InterfaceInfo({})", self.name)
    }
}

/// Ties a vtable struct to its [`InterfaceInfo`].
pub trait Interface: Send + Sync + 'static {
    fn info() -> &'static InterfaceInfo;
}

/// An opaque implementation record.
///
/// Callers that know the interface's shape recover the vtable with
/// [`downcast`](Self::downcast).
#[derive(Clone, Copy)]
pub struct ImplRef<'a> {
    record: &'a (dyn StdAny + Send + Sync),
}

impl<'a> ImplRef<'a> {
    /// Address of the record; stable for the registry's lifetime.
    #[inline]
    pub fn as_ptr(&self) -> *const () {
        (self.record as *const (dyn StdAny + Send + Sync)).cast()
    }

    #[inline]
    pub fn downcast<I: Interface>(&self) -> Option<&'a I> {
        self.record.downcast_ref::<I>()
    }
}

impl fmt::Debug for ImplRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImplRef({:p})", self.as_ptr())
    }
}

/// One (interface, record) entry of a type's capability table.
pub(crate) struct ImplEntry {
    pub(crate) interface: &'static InterfaceInfo,
    record: Box<dyn StdAny + Send + Sync>,
}

impl ImplEntry {
    pub(crate) fn new<I: Interface>(record: I) -> Self {
        Self {
            interface: I::info(),
            record: Box::new(record),
        }
    }

    #[inline]
    pub(crate) fn record(&self) -> ImplRef<'_> {
        ImplRef {
            record: &*self.record,
        }
    }
}
