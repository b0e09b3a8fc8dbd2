//! Owned storage for values of runtime type.
//!
//! [`ErasedBox`] is the owning counterpart of [`Any`]: a heap allocation
//! sized and aligned from a [`TypeInfo`], constructed and destroyed through
//! the type's lifecycle glue. It is what a generic container (a resource
//! store, an undo stack) uses to hold values it only knows by descriptor.
//!
//! ```ignore
//! let ty = registry.type_of::<Point>().unwrap();
//! let ctor = ty.find_constructor(2).unwrap();
//! let point = ErasedBox::construct(ctor, &[ArgAny::from(1), ArgAny::from(2)]);
//! let copy = point.try_clone().unwrap();
//! assert_eq!(point.as_any().equals(copy.as_any()), Some(true));
//! ```

use std::alloc::{self, Layout};
use std::fmt;
use std::mem::{self, MaybeUninit};
use std::ptr::{self, NonNull};

use crate::{Any, AnyMut, ArgAny, ConstructorInfo, TypeInfo};

// ============================================================================
// Raw allocation
// ============================================================================

struct RawAlloc {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl RawAlloc {
    fn new(layout: Layout) -> Self {
        let ptr = if layout.size() == 0 {
            NonNull::new(ptr::without_provenance_mut(layout.align())).unwrap_or(NonNull::dangling())
        } else {
            // SAFETY: the layout has a non-zero size.
            let raw = unsafe { alloc::alloc(layout) };
            match NonNull::new(raw) {
                Some(ptr) => ptr,
                None => alloc::handle_alloc_error(layout),
            }
        };
        Self { ptr, layout }
    }

    #[inline]
    fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Releases ownership of the allocation without freeing it.
    fn into_raw(self) -> NonNull<u8> {
        let ptr = self.ptr;
        mem::forget(self);
        ptr
    }
}

impl Drop for RawAlloc {
    fn drop(&mut self) {
        if self.layout.size() != 0 {
            // SAFETY: allocated in `new` with the same layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
        }
    }
}

/// Runs the drop glue of a value when leaving scope.
pub(crate) struct DropGuard {
    ty: &'static TypeInfo,
    ptr: *mut u8,
}

impl DropGuard {
    pub(crate) fn new(ty: &'static TypeInfo, ptr: *mut u8) -> Self {
        Self { ty, ptr }
    }
}

impl Drop for DropGuard {
    fn drop(&mut self) {
        if self.ty.has_drop() {
            // SAFETY: the guard is created right after the value is initialized.
            unsafe { self.ty.drop(self.ptr) }
        }
    }
}

#[repr(C, align(16))]
struct ScratchSlot(MaybeUninit<[u8; 64]>);

/// Calls `f` with uninitialized storage for `layout`, on the stack when it fits.
pub(crate) fn with_scratch<R>(layout: Layout, f: impl FnOnce(*mut u8) -> R) -> R {
    if layout.size() <= mem::size_of::<ScratchSlot>() && layout.align() <= mem::align_of::<ScratchSlot>() {
        let mut slot = ScratchSlot(MaybeUninit::uninit());
        f(slot.0.as_mut_ptr().cast())
    } else {
        let storage = RawAlloc::new(layout);
        f(storage.as_ptr())
    }
}

// ============================================================================
// ErasedBox
// ============================================================================

/// A heap-allocated value whose type is known only by descriptor.
pub struct ErasedBox {
    ptr: NonNull<u8>,
    ty: &'static TypeInfo,
}

impl ErasedBox {
    /// Boxes `value` as an instance of `ty`.
    ///
    /// # Panics
    ///
    /// Panics if `ty` does not describe `T`.
    pub fn new<T: 'static>(value: T, ty: &'static TypeInfo) -> Self {
        assert!(
            ty.is::<T>(),
            "cannot box a `{}` as '{}'",
            std::any::type_name::<T>(),
            ty.name()
        );
        let storage = RawAlloc::new(Layout::new::<T>());
        // SAFETY: fresh storage sized and aligned for `T`.
        unsafe { storage.as_ptr().cast::<T>().write(value) };
        Self {
            ptr: storage.into_raw(),
            ty,
        }
    }

    /// Default-constructs an instance of `ty`, or `None` if `ty` has no
    /// default construction.
    pub fn new_default(ty: &'static TypeInfo) -> Option<Self> {
        if !ty.has_init() {
            return None;
        }
        let storage = RawAlloc::new(ty.layout());
        // SAFETY: fresh storage laid out for `ty`.
        unsafe { ty.init(storage.as_ptr()) };
        Some(Self {
            ptr: storage.into_raw(),
            ty,
        })
    }

    /// Constructs an instance of the constructor's owning type.
    ///
    /// # Panics
    ///
    /// Panics if `args` does not match the constructor's signature.
    pub fn construct(ctor: &ConstructorInfo, args: &[ArgAny<'_>]) -> Self {
        assert!(
            ctor.accepts(args),
            "arguments {args:?} do not match constructor of '{}'",
            ctor.owner().name()
        );
        let ty = ctor.owner();
        let storage = RawAlloc::new(ty.layout());
        // SAFETY: fresh storage laid out for the owner; arguments checked.
        unsafe { ctor.invoke(storage.as_ptr(), args) };
        Self {
            ptr: storage.into_raw(),
            ty,
        }
    }

    /// Copy-constructs a second instance, or `None` if the type is not copyable.
    pub fn try_clone(&self) -> Option<Self> {
        if !self.ty.has_copy_init() {
            return None;
        }
        let storage = RawAlloc::new(self.ty.layout());
        // SAFETY: fresh storage for the same type, source is live.
        unsafe { self.ty.copy_init(storage.as_ptr(), self.ptr.as_ptr()) };
        Some(Self {
            ptr: storage.into_raw(),
            ty: self.ty,
        })
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        self.ty
    }

    #[inline]
    pub fn as_any(&self) -> Any<'_> {
        // SAFETY: the box owns a live instance of `ty`.
        unsafe { Any::from_raw(self.ptr.as_ptr(), self.ty) }
    }

    #[inline]
    pub fn as_any_mut(&mut self) -> AnyMut<'_> {
        // SAFETY: the box owns a live instance of `ty`, borrowed uniquely.
        unsafe { AnyMut::from_raw(self.ptr.as_ptr(), self.ty) }
    }

    #[inline]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.as_any().downcast::<T>()
    }

    #[inline]
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.as_any_mut().into_mut::<T>()
    }

    /// Moves the value out as `T`, or gives the box back if it holds another type.
    pub fn into_inner<T: 'static>(self) -> Result<T, Self> {
        if !self.ty.is::<T>() {
            return Err(self);
        }
        let this = mem::ManuallyDrop::new(self);
        // SAFETY: the box holds a live `T`; reading it moves ownership out,
        // after which the allocation is freed without running drop glue.
        let value = unsafe { this.ptr.cast::<T>().read() };
        drop(RawAlloc {
            ptr: this.ptr,
            layout: this.ty.layout(),
        });
        Ok(value)
    }
}

impl Drop for ErasedBox {
    fn drop(&mut self) {
        let storage = RawAlloc {
            ptr: self.ptr,
            layout: self.ty.layout(),
        };
        if self.ty.has_drop() {
            // SAFETY: the box owns a live instance and drops it exactly once.
            unsafe { self.ty.drop(storage.as_ptr()) };
        }
    }
}

impl fmt::Debug for ErasedBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedBox")
            .field("type", &self.ty.name())
            .finish_non_exhaustive()
    }
}
