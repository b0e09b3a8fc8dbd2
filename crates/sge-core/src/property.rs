//! Property descriptors.
//!
//! A [`PropertyInfo`] is a named, typed accessor on a type. Unlike a field it
//! need not correspond to memory: a property may be computed by a getter and
//! stored by a setter. Two implementations exist:
//!
//! - **native** properties run closures registered by the type builder,
//!   stored as [`UFunction`]s. Field-backed properties hand out views of the
//!   live field (no copy) and mutate in place. Computed properties write their
//!   value into a scratch slot for the duration of the callback, and
//!   `mutate` round-trips through get, callback, set.
//! - **enum** properties read or update one enumerator or bit flag of an enum
//!   value and are typed `bool`.
//!
//! A property without a setter is read-only. Writing it through [`set`] or
//! [`mutate`] is a precondition violation and panics before anything is
//! written.
//!
//! [`set`]: PropertyInfo::set
//! [`mutate`]: PropertyInfo::mutate

use crate::enum_type::{EnumProperty, EnumPropertyKind};
use crate::erased_box::{DropGuard, with_scratch};
use crate::members::Member;
use crate::{Any, AnyMut, PropertyFlags, TypeInfo, TypeRef, UFunction};

// ============================================================================
// Native implementation
// ============================================================================

pub(crate) enum Getter {
    /// Returns a pointer to the live value inside `this`.
    Project(UFunction<(*const u8,), *const u8>),
    /// Writes a freshly computed value into uninitialized storage.
    Compute(UFunction<(*const u8, *mut u8), ()>),
}

pub(crate) enum Mutator {
    /// Returns a mutable pointer to the live value inside `this`.
    Project(UFunction<(*mut u8,), *mut u8>),
    /// Get into scratch storage, run the callback, set back.
    RoundTrip,
}

pub(crate) struct NativeProperty {
    pub(crate) getter: Getter,
    pub(crate) setter: Option<UFunction<(*mut u8, *const u8), ()>>,
    pub(crate) mutator: Option<Mutator>,
}

pub(crate) enum PropertyImpl {
    Native(NativeProperty),
    Enum(EnumProperty),
}

/// Which implementation backs a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Native,
    Enum { kind: EnumPropertyKind, value: u64 },
}

// ============================================================================
// PropertyInfo
// ============================================================================

pub struct PropertyInfo {
    name: String,
    index: usize,
    flags: PropertyFlags,
    ty: TypeRef,
    owner: TypeRef,
    imp: PropertyImpl,
}

impl PropertyInfo {
    pub(crate) fn new(
        name: String,
        index: usize,
        flags: PropertyFlags,
        ty: TypeRef,
        owner: TypeRef,
        imp: PropertyImpl,
    ) -> Self {
        Self {
            name,
            index,
            flags,
            ty,
            owner,
            imp,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registration index within the owning type.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn flags(&self) -> PropertyFlags {
        self.flags
    }

    #[inline]
    pub fn property_type(&self) -> &'static TypeInfo {
        self.ty.get()
    }

    #[inline]
    pub fn owner(&self) -> &'static TypeInfo {
        self.owner.get()
    }

    pub fn kind(&self) -> PropertyKind {
        match &self.imp {
            PropertyImpl::Native(_) => PropertyKind::Native,
            PropertyImpl::Enum(prop) => PropertyKind::Enum {
                kind: prop.kind,
                value: prop.value,
            },
        }
    }

    pub fn is_read_only(&self) -> bool {
        match &self.imp {
            PropertyImpl::Native(native) => native.setter.is_none(),
            PropertyImpl::Enum(_) => false,
        }
    }

    /// Calls `out` with a view of the current value.
    ///
    /// # Panics
    ///
    /// Panics if `this` is not an instance of the owning type.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn get(&self, this: Any<'_>, out: impl FnOnce(Any<'_>)) {
        self.check_owner(this.type_info());
        let mut out = Some(out);
        // SAFETY: `this` is a live instance of the owner.
        unsafe {
            self.get_raw(this.as_ptr(), &mut |value: Any<'_>| {
                if let Some(out) = out.take() {
                    out(value);
                }
            })
        }
    }

    /// Clones the current value out as `P`.
    ///
    /// Returns `None` if the property is not of type `P`.
    pub fn get_cloned<P: Clone + 'static>(&self, this: Any<'_>) -> Option<P> {
        let mut result = None;
        self.get(this, |value| result = value.downcast::<P>().cloned());
        result
    }

    /// Unchecked form of [`get`](Self::get).
    ///
    /// # Safety
    ///
    /// `this` must point at a live instance of the owning type.
    pub unsafe fn get_raw(&self, this: *const u8, out: &mut dyn FnMut(Any<'_>)) {
        let ty = self.property_type();
        match &self.imp {
            PropertyImpl::Native(native) => match &native.getter {
                Getter::Project(project) => {
                    let value = project.call((this,));
                    out(unsafe { Any::from_raw(value, ty) });
                }
                Getter::Compute(compute) => with_scratch(ty.layout(), |slot| {
                    compute.call((this, slot));
                    let _guard = DropGuard::new(ty, slot);
                    out(unsafe { Any::from_raw(slot, ty) });
                }),
            },
            PropertyImpl::Enum(prop) => {
                let value = unsafe { prop.get(this) };
                out(Any::new(&value, ty));
            }
        }
    }

    /// Assigns `value` to the property.
    ///
    /// # Panics
    ///
    /// Panics if the property is read-only, `this` is not an instance of the
    /// owning type, or `value` is not of the property type.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn set(&self, this: AnyMut<'_>, value: Any<'_>) {
        self.check_writable();
        self.check_owner(this.type_info());
        assert!(
            value.type_info() == self.property_type(),
            "property '{}.{}' expects a '{}', got a '{}'",
            self.owner().name(),
            self.name,
            self.property_type().name(),
            value.type_info().name()
        );
        let mut this = this;
        // SAFETY: both views were checked against the descriptor.
        unsafe { self.set_raw(this.as_mut_ptr(), value.as_ptr()) }
    }

    /// Assigns a typed value to the property.
    ///
    /// # Panics
    ///
    /// As [`set`](Self::set).
    pub fn set_value<P: 'static>(&self, this: AnyMut<'_>, value: &P) {
        self.set(this, Any::new(value, self.property_type()));
    }

    /// Unchecked form of [`set`](Self::set). Still panics on read-only
    /// properties.
    ///
    /// # Safety
    ///
    /// `this` must point at a live instance of the owning type and `value`
    /// at a live instance of the property type.
    pub unsafe fn set_raw(&self, this: *mut u8, value: *const u8) {
        self.check_writable();
        match &self.imp {
            PropertyImpl::Native(native) => {
                if let Some(setter) = &native.setter {
                    setter.call((this, value));
                }
            }
            PropertyImpl::Enum(prop) => unsafe {
                prop.set(this, *value.cast::<bool>(), self.owner().name())
            },
        }
    }

    /// Calls `mutator` with a mutable view of the value.
    ///
    /// # Panics
    ///
    /// Panics if the property is read-only or `this` is not an instance of
    /// the owning type.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn mutate(&self, this: AnyMut<'_>, mutator: impl FnOnce(AnyMut<'_>)) {
        self.check_writable();
        self.check_owner(this.type_info());
        let mut mutator = Some(mutator);
        let mut this = this;
        // SAFETY: `this` is a live, uniquely borrowed instance of the owner.
        unsafe {
            self.mutate_raw(this.as_mut_ptr(), &mut |value: AnyMut<'_>| {
                if let Some(mutator) = mutator.take() {
                    mutator(value);
                }
            })
        }
    }

    /// Unchecked form of [`mutate`](Self::mutate). Still panics on read-only
    /// properties.
    ///
    /// # Safety
    ///
    /// `this` must point at a live instance of the owning type that nothing
    /// else accesses during the call.
    pub unsafe fn mutate_raw(&self, this: *mut u8, mutator: &mut dyn FnMut(AnyMut<'_>)) {
        self.check_writable();
        let ty = self.property_type();
        match &self.imp {
            PropertyImpl::Native(native) => match (&native.mutator, &native.getter, &native.setter) {
                (Some(Mutator::Project(project)), _, _) => {
                    let value = project.call((this,));
                    mutator(unsafe { AnyMut::from_raw(value, ty) });
                }
                (Some(Mutator::RoundTrip), getter, Some(setter)) => {
                    with_scratch(ty.layout(), |slot| {
                        match getter {
                            Getter::Compute(compute) => compute.call((this.cast_const(), slot)),
                            Getter::Project(project) => {
                                let current = project.call((this.cast_const(),));
                                unsafe { ty.copy_init(slot, current) };
                            }
                        }
                        let _guard = DropGuard::new(ty, slot);
                        mutator(unsafe { AnyMut::from_raw(slot, ty) });
                        setter.call((this, slot.cast_const()));
                    });
                }
                _ => unreachable!("writable property '{}' has no mutator", self.name),
            },
            PropertyImpl::Enum(prop) => {
                let mut value = unsafe { prop.get(this) };
                mutator(AnyMut::new(&mut value, ty));
                unsafe { prop.set(this, value, self.owner().name()) };
            }
        }
    }

    fn check_writable(&self) {
        assert!(
            !self.is_read_only(),
            "property '{}.{}' is read-only",
            self.owner.try_get().map_or("?", |owner| owner.name()),
            self.name
        );
    }

    fn check_owner(&self, ty: &TypeInfo) {
        let owner = self.owner();
        assert!(
            ty.derives_from(owner),
            "property '{}.{}' accessed through a '{}'",
            owner.name(),
            self.name,
            ty.name()
        );
    }

    pub(crate) fn type_refs(&self) -> [&TypeRef; 2] {
        [&self.ty, &self.owner]
    }
}

impl Member for PropertyInfo {
    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for PropertyInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyInfo")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("type", &self.ty)
            .field("kind", &self.kind())
            .field("read_only", &self.is_read_only())
            .finish()
    }
}
