//! Type-erased value views.
//!
//! [`Any`] and [`AnyMut`] pair a pointer with the `&'static TypeInfo` that
//! describes the referent. They never own the value: the lifetime parameter
//! ties the view to the borrow it was created from, and mutability is a
//! property of the view type (`Any` reads, `AnyMut` writes).
//!
//! Views are how values of runtime-known type move through generic code:
//! property getters hand one to a callback, field access returns one, and
//! interface implementations receive one as their `self`.
//!
//! ```ignore
//! let point = Point { x: 1, y: 2 };
//! let view = registry.any(&point).unwrap();
//! assert_eq!(view.type_info().name(), "Point");
//! assert_eq!(view.downcast::<Point>(), Some(&point));
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::{Interface, InterfaceInfo, ImplRef, TypeInfo};

// ============================================================================
// Read view
// ============================================================================

/// A borrowed, read-only view of a value of runtime type.
#[derive(Clone, Copy)]
pub struct Any<'a> {
    value: NonNull<u8>,
    ty: &'static TypeInfo,
    _marker: PhantomData<&'a ()>,
}

impl<'a> Any<'a> {
    /// Views `value` as an instance of `ty`.
    ///
    /// # Panics
    ///
    /// Panics if `ty` does not describe `T`.
    pub fn new<T: 'static>(value: &'a T, ty: &'static TypeInfo) -> Self {
        assert!(
            ty.is::<T>(),
            "cannot view a `{}` as '{}'",
            std::any::type_name::<T>(),
            ty.name()
        );
        Self {
            value: NonNull::from(value).cast(),
            ty,
            _marker: PhantomData,
        }
    }

    /// Views raw memory as an instance of `ty`.
    ///
    /// # Safety
    ///
    /// `value` must be non-null, aligned for `ty`, and point to a live
    /// instance of `ty` (or of a type deriving from it) that stays valid and
    /// unmutated for `'a`.
    #[inline]
    pub unsafe fn from_raw(value: *const u8, ty: &'static TypeInfo) -> Self {
        debug_assert!(!value.is_null());
        Self {
            // SAFETY: the caller guarantees a non-null pointer.
            value: unsafe { NonNull::new_unchecked(value.cast_mut()) },
            ty,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        self.ty
    }

    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.value.as_ptr()
    }

    /// Returns `true` if the view's type describes `T`.
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.ty.is::<T>()
    }

    /// Returns the referent as `T` if the view's type describes `T`.
    #[inline]
    pub fn downcast<T: 'static>(&self) -> Option<&'a T> {
        if self.is::<T>() {
            // SAFETY: the descriptor's native type is `T`.
            Some(unsafe { self.value.cast::<T>().as_ref() })
        } else {
            None
        }
    }

    /// Returns the referent as `T` if the view's type is `T` or derives
    /// from it.
    pub fn upcast<T: 'static>(&self) -> Option<&'a T> {
        let mut current = Some(self.ty);
        while let Some(ty) = current {
            if ty.is::<T>() {
                // SAFETY: a type registered with `extends` starts with its
                // base, so the referent is a valid `T`.
                return Some(unsafe { self.get_unchecked::<T>() });
            }
            current = ty.base();
        }
        None
    }

    /// Returns the referent as `T`.
    ///
    /// # Panics
    ///
    /// Panics if the view's type does not describe `T`.
    pub fn get<T: 'static>(&self) -> &'a T {
        match self.downcast::<T>() {
            Some(value) => value,
            None => panic!(
                "requested `{}` from a view of '{}'",
                std::any::type_name::<T>(),
                self.ty.name()
            ),
        }
    }

    /// Reinterprets the referent as `T` without checking.
    ///
    /// # Safety
    ///
    /// The referent must be a valid `T`.
    #[inline]
    pub unsafe fn get_unchecked<T>(&self) -> &'a T {
        // SAFETY: upheld by the caller.
        unsafe { self.value.cast::<T>().as_ref() }
    }

    /// Compares two views with the type's equality glue.
    ///
    /// Returns `None` when the views have different types or the type has no
    /// equality comparison.
    pub fn equals(&self, other: Any<'_>) -> Option<bool> {
        if self.ty != other.ty || !self.ty.has_equality_compare() {
            return None;
        }
        // SAFETY: both views point at live instances of `ty`.
        Some(unsafe { self.ty.equality_compare(self.as_ptr(), other.as_ptr()) })
    }

    /// The opaque implementation of `interface` for the view's type.
    #[inline]
    pub fn get_implementation(&self, interface: &InterfaceInfo) -> Option<ImplRef<'static>> {
        self.ty.get_implementation(interface)
    }

    /// The typed implementation of `I` for the view's type.
    #[inline]
    pub fn implementation<I: Interface>(&self) -> Option<&'static I> {
        self.ty.implementation::<I>()
    }
}

impl fmt::Debug for Any<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Any")
            .field("type", &self.ty.name())
            .field("ptr", &self.value)
            .finish()
    }
}

// ============================================================================
// Write view
// ============================================================================

/// A borrowed, mutable view of a value of runtime type.
///
/// Not `Clone`: at most one write view of a value exists at a time. Use
/// [`reborrow`](Self::reborrow) to lend it out for a shorter scope.
pub struct AnyMut<'a> {
    value: NonNull<u8>,
    ty: &'static TypeInfo,
    _marker: PhantomData<&'a mut ()>,
}

impl<'a> AnyMut<'a> {
    /// Views `value` mutably as an instance of `ty`.
    ///
    /// # Panics
    ///
    /// Panics if `ty` does not describe `T`.
    pub fn new<T: 'static>(value: &'a mut T, ty: &'static TypeInfo) -> Self {
        assert!(
            ty.is::<T>(),
            "cannot view a `{}` as '{}'",
            std::any::type_name::<T>(),
            ty.name()
        );
        Self {
            value: NonNull::from(value).cast(),
            ty,
            _marker: PhantomData,
        }
    }

    /// Views raw memory mutably as an instance of `ty`.
    ///
    /// # Safety
    ///
    /// `value` must be non-null, aligned for `ty`, point to a live instance
    /// of `ty` (or of a type deriving from it), and not be accessed through
    /// any other pointer for `'a`.
    #[inline]
    pub unsafe fn from_raw(value: *mut u8, ty: &'static TypeInfo) -> Self {
        debug_assert!(!value.is_null());
        Self {
            // SAFETY: the caller guarantees a non-null pointer.
            value: unsafe { NonNull::new_unchecked(value) },
            ty,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        self.ty
    }

    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.value.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.value.as_ptr()
    }

    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.ty.is::<T>()
    }

    /// A read view borrowing from this one.
    #[inline]
    pub fn as_any(&self) -> Any<'_> {
        // SAFETY: the write view is borrowed shared for the result's lifetime.
        unsafe { Any::from_raw(self.as_ptr(), self.ty) }
    }

    /// Converts into a read view with the full lifetime.
    #[inline]
    pub fn into_any(self) -> Any<'a> {
        // SAFETY: `self` is consumed, so no write access remains.
        unsafe { Any::from_raw(self.as_ptr(), self.ty) }
    }

    /// A shorter-lived write view of the same value.
    #[inline]
    pub fn reborrow(&mut self) -> AnyMut<'_> {
        // SAFETY: `self` is mutably borrowed for the result's lifetime.
        unsafe { AnyMut::from_raw(self.as_mut_ptr(), self.ty) }
    }

    #[inline]
    pub fn downcast<T: 'static>(&self) -> Option<&T> {
        self.as_any().downcast::<T>()
    }

    #[inline]
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        if self.is::<T>() {
            // SAFETY: the descriptor's native type is `T` and the view is unique.
            Some(unsafe { self.value.cast::<T>().as_mut() })
        } else {
            None
        }
    }

    /// Converts into a typed reference with the full lifetime.
    pub fn into_mut<T: 'static>(self) -> Option<&'a mut T> {
        if self.is::<T>() {
            // SAFETY: as in `downcast_mut`, and `self` is consumed.
            Some(unsafe { self.value.cast::<T>().as_mut() })
        } else {
            None
        }
    }

    /// Returns the referent as `T`.
    ///
    /// # Panics
    ///
    /// Panics if the view's type does not describe `T`.
    pub fn get_mut<T: 'static>(&mut self) -> &mut T {
        let name = self.ty.name();
        match self.downcast_mut::<T>() {
            Some(value) => value,
            None => panic!(
                "requested `{}` from a view of '{name}'",
                std::any::type_name::<T>()
            ),
        }
    }

    /// Copy-assigns `src` into the referent.
    ///
    /// # Panics
    ///
    /// Panics if `src` has another type or the type is not copy-assignable.
    pub fn assign(&mut self, src: Any<'_>) {
        assert!(
            self.ty == src.type_info(),
            "cannot assign a '{}' to a '{}'",
            src.type_info().name(),
            self.ty.name()
        );
        // SAFETY: both views point at live instances of the same type.
        unsafe { self.ty.copy_assign(self.as_mut_ptr(), src.as_ptr()) }
    }

    #[inline]
    pub fn implementation<I: Interface>(&self) -> Option<&'static I> {
        self.ty.implementation::<I>()
    }
}

impl<'a> From<AnyMut<'a>> for Any<'a> {
    fn from(value: AnyMut<'a>) -> Self {
        value.into_any()
    }
}

impl fmt::Debug for AnyMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyMut")
            .field("type", &self.ty.name())
            .field("ptr", &self.value)
            .finish()
    }
}
