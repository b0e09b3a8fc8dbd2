//! Lifecycle glue for native types.
//!
//! A [`Lifecycle`] is the table of type-specific special members a
//! [`TypeInfo`](crate::TypeInfo) exposes for an erased value. Each entry is a
//! monomorphized `unsafe fn` over raw pointers; an absent entry means the Rust
//! type lacks the capability (no `Default`, no `Clone`, no `PartialEq`).
//!
//! Every Rust type can be moved and dropped, so [`Lifecycle::movable`] is the
//! baseline and the other capabilities are opted into.

use std::ptr;

use ordered_float::OrderedFloat;

pub(crate) type InitFn = unsafe fn(*mut u8);
pub(crate) type CopyInitFn = unsafe fn(*mut u8, *const u8);
pub(crate) type MoveInitFn = unsafe fn(*mut u8, *mut u8);
pub(crate) type DropFn = unsafe fn(*mut u8);
pub(crate) type EqualityFn = unsafe fn(*const u8, *const u8) -> bool;

/// Special-member table of a native type.
#[derive(Clone, Copy, Default)]
pub struct Lifecycle {
    pub(crate) init: Option<InitFn>,
    pub(crate) copy_init: Option<CopyInitFn>,
    pub(crate) move_init: Option<MoveInitFn>,
    pub(crate) copy_assign: Option<CopyInitFn>,
    pub(crate) move_assign: Option<MoveInitFn>,
    pub(crate) drop: Option<DropFn>,
    pub(crate) equality: Option<EqualityFn>,
}

impl Lifecycle {
    /// Move construction, move assignment and drop for `T`.
    pub fn movable<T>() -> Self {
        Self {
            move_init: Some(move_init::<T>),
            move_assign: Some(move_assign::<T>),
            drop: Some(drop_value::<T>),
            ..Self::default()
        }
    }

    /// Adds default construction.
    pub fn with_default<T: Default>(mut self) -> Self {
        self.init = Some(init_default::<T>);
        self
    }

    /// Adds copy construction and copy assignment through `Clone`.
    pub fn with_clone<T: Clone>(mut self) -> Self {
        self.copy_init = Some(copy_init::<T>);
        self.copy_assign = Some(copy_assign::<T>);
        self
    }

    /// Adds equality through `PartialEq`.
    pub fn with_eq<T: PartialEq>(mut self) -> Self {
        self.equality = Some(equals::<T>);
        self
    }

    /// Float equality that treats every NaN as equal to itself, so a copy
    /// always compares equal to its source.
    pub(crate) fn with_float_eq<T>(mut self) -> Self
    where
        T: Copy,
        OrderedFloat<T>: PartialEq,
    {
        self.equality = Some(float_equals::<T>);
        self
    }

    #[inline]
    pub fn has_init(&self) -> bool {
        self.init.is_some()
    }

    #[inline]
    pub fn has_copy_init(&self) -> bool {
        self.copy_init.is_some()
    }

    #[inline]
    pub fn has_move_init(&self) -> bool {
        self.move_init.is_some()
    }

    #[inline]
    pub fn has_copy_assign(&self) -> bool {
        self.copy_assign.is_some()
    }

    #[inline]
    pub fn has_move_assign(&self) -> bool {
        self.move_assign.is_some()
    }

    #[inline]
    pub fn has_drop(&self) -> bool {
        self.drop.is_some()
    }

    #[inline]
    pub fn has_equality_compare(&self) -> bool {
        self.equality.is_some()
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("init", &self.has_init())
            .field("copy_init", &self.has_copy_init())
            .field("move_init", &self.has_move_init())
            .field("copy_assign", &self.has_copy_assign())
            .field("move_assign", &self.has_move_assign())
            .field("drop", &self.has_drop())
            .field("equality", &self.has_equality_compare())
            .finish()
    }
}

// ============================================================================
// Glue
// ============================================================================
//
// All functions require pointers that are non-null, aligned for `T`, and
// point at live (or, for destinations of `*_init`, uninitialized) `T`s.

unsafe fn init_default<T: Default>(addr: *mut u8) {
    unsafe { addr.cast::<T>().write(T::default()) }
}

unsafe fn copy_init<T: Clone>(addr: *mut u8, src: *const u8) {
    unsafe {
        let value = (*src.cast::<T>()).clone();
        addr.cast::<T>().write(value);
    }
}

// The source is left logically uninitialized and must not be dropped.
unsafe fn move_init<T>(addr: *mut u8, src: *mut u8) {
    unsafe { ptr::copy_nonoverlapping(src.cast::<T>(), addr.cast::<T>(), 1) }
}

unsafe fn copy_assign<T: Clone>(dst: *mut u8, src: *const u8) {
    unsafe { (*dst.cast::<T>()).clone_from(&*src.cast::<T>()) }
}

unsafe fn move_assign<T>(dst: *mut u8, src: *mut u8) {
    unsafe {
        let value = src.cast::<T>().read();
        *dst.cast::<T>() = value;
    }
}

unsafe fn drop_value<T>(this: *mut u8) {
    unsafe { ptr::drop_in_place(this.cast::<T>()) }
}

unsafe fn equals<T: PartialEq>(a: *const u8, b: *const u8) -> bool {
    unsafe { *a.cast::<T>() == *b.cast::<T>() }
}

unsafe fn float_equals<T>(a: *const u8, b: *const u8) -> bool
where
    T: Copy,
    OrderedFloat<T>: PartialEq,
{
    unsafe { OrderedFloat(*a.cast::<T>()) == OrderedFloat(*b.cast::<T>()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::MaybeUninit;

    #[test]
    fn movable_is_the_baseline() {
        let glue = Lifecycle::movable::<String>();
        assert!(glue.has_move_init() && glue.has_move_assign() && glue.has_drop());
        assert!(!glue.has_init());
        assert!(!glue.has_copy_init());
        assert!(!glue.has_equality_compare());
    }

    #[test]
    fn copy_then_compare_then_drop_independently() {
        let glue = Lifecycle::movable::<String>()
            .with_clone::<String>()
            .with_eq::<String>();
        let source = String::from("value");
        let mut copy = MaybeUninit::<String>::uninit();
        unsafe {
            (glue.copy_init.unwrap())(copy.as_mut_ptr().cast(), (&source as *const String).cast());
            assert!((glue.equality.unwrap())(
                copy.as_ptr().cast(),
                (&source as *const String).cast()
            ));
            (glue.drop.unwrap())(copy.as_mut_ptr().cast());
        }
        assert_eq!(source, "value");
    }

    #[test]
    fn nan_copies_compare_equal() {
        let glue = Lifecycle::movable::<f64>().with_float_eq::<f64>();
        let nan = f64::NAN;
        let ptr = (&nan as *const f64).cast();
        assert!(unsafe { (glue.equality.unwrap())(ptr, ptr) });
    }

    #[test]
    fn move_assign_drops_the_old_value() {
        let glue = Lifecycle::movable::<Vec<u8>>();
        let mut dst = vec![1u8];
        let mut src = std::mem::ManuallyDrop::new(vec![2u8, 3]);
        unsafe {
            (glue.move_assign.unwrap())(
                (&mut dst as *mut Vec<u8>).cast(),
                (&mut *src as *mut Vec<u8>).cast(),
            );
        }
        assert_eq!(dst, [2, 3]);
    }
}
