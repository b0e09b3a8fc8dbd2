//! Move-only type-erased callables.
//!
//! [`UFunction<Args, R>`] owns one callable taking the argument tuple `Args`
//! and returning `R`. The storage strategy is chosen once, at construction:
//!
//! | payload | representation |
//! |---|---|
//! | bare `fn` pointer ([`UFunction::from_fn_ptr`]) | [`Representation::FnPtr`], direct call |
//! | closure that fits two words, word aligned, no drop glue | [`Representation::Inline`], no allocation |
//! | anything else | [`Representation::Heap`], boxed, freed by a destructor trampoline |
//!
//! A `UFunction` has exactly one owner. It is not `Clone`; ownership moves
//! with Rust moves, and [`UFunction::take`] moves the callable out while
//! leaving an empty function behind. Calling an empty function panics.
//!
//! ```
//! use sge_core::{Representation, UFunction};
//!
//! let offset = 10;
//! let mut add = UFunction::<(i32,), i32>::new(move |x: i32| x + offset);
//! assert_eq!(add.representation(), Representation::Inline);
//! assert_eq!(add.call((5,)), 15);
//!
//! let moved = add.take();
//! assert!(add.is_empty());
//! assert_eq!(moved.call((5,)), 15);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::mem::{self, MaybeUninit};

const INLINE_WORDS: usize = 2;

/// Where a [`UFunction`] keeps its callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Empty,
    FnPtr,
    Inline,
    Heap,
}

// ============================================================================
// Call traits
// ============================================================================

/// Callables invocable with an argument tuple.
///
/// Implemented for every `Fn` closure of up to six arguments. Closure
/// parameters must carry type annotations, since their types are not
/// inferred through this trait.
pub trait Invoke<Args> {
    type Output;

    fn invoke(&self, args: Args) -> Self::Output;
}

/// Plain function pointers that can be stored without their closure type.
///
/// Implemented for `fn(..) -> R` of up to six arguments.
pub trait FnPtr<Args>: Copy + Send + Sync + 'static {
    type Output;

    fn into_erased(self) -> *const ();

    /// # Safety
    ///
    /// `ptr` must come from [`FnPtr::into_erased`] on the same type.
    unsafe fn from_erased(ptr: *const ()) -> Self;

    fn call_with(self, args: Args) -> Self::Output;
}

macro_rules! impl_call_traits {
    ($($arg:ident $idx:tt),*) => {
        impl<F, R, $($arg),*> Invoke<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> R,
        {
            type Output = R;

            #[inline]
            #[allow(unused_variables)]
            fn invoke(&self, args: ($($arg,)*)) -> R {
                (self)($(args.$idx),*)
            }
        }

        impl<R: 'static, $($arg: 'static),*> FnPtr<($($arg,)*)> for fn($($arg),*) -> R {
            type Output = R;

            #[inline]
            fn into_erased(self) -> *const () {
                self as *const ()
            }

            #[inline]
            unsafe fn from_erased(ptr: *const ()) -> Self {
                // SAFETY: `ptr` was produced by `into_erased` for this signature.
                unsafe { mem::transmute_copy::<*const (), Self>(&ptr) }
            }

            #[inline]
            #[allow(unused_variables)]
            fn call_with(self, args: ($($arg,)*)) -> R {
                (self)($(args.$idx),*)
            }
        }
    };
}

impl_call_traits!();
impl_call_traits!(A 0);
impl_call_traits!(A 0, B 1);
impl_call_traits!(A 0, B 1, C 2);
impl_call_traits!(A 0, B 1, C 2, D 3);
impl_call_traits!(A 0, B 1, C 2, D 3, E 4);
impl_call_traits!(A 0, B 1, C 2, D 3, E 4, G 5);

// ============================================================================
// Storage
// ============================================================================

#[derive(Clone, Copy)]
union Storage {
    fn_ptr: *const (),
    heap: *mut (),
    inline: MaybeUninit<[usize; INLINE_WORDS]>,
}

impl Storage {
    const EMPTY: Storage = Storage {
        inline: MaybeUninit::uninit(),
    };
}

const fn fits_inline<F>() -> bool {
    mem::size_of::<F>() <= mem::size_of::<Storage>()
        && mem::align_of::<F>() <= mem::align_of::<Storage>()
        && !mem::needs_drop::<F>()
}

unsafe fn call_fn_ptr<P, Args>(storage: &Storage, args: Args) -> P::Output
where
    P: FnPtr<Args>,
{
    // SAFETY: the storage holds a `P` erased by `into_erased`.
    unsafe { P::from_erased(storage.fn_ptr) }.call_with(args)
}

unsafe fn call_inline<F, Args>(storage: &Storage, args: Args) -> F::Output
where
    F: Invoke<Args>,
{
    // SAFETY: the inline buffer holds an initialized, suitably aligned `F`.
    let f = unsafe { &*storage.inline.as_ptr().cast::<F>() };
    f.invoke(args)
}

unsafe fn call_heap<F, Args>(storage: &Storage, args: Args) -> F::Output
where
    F: Invoke<Args>,
{
    // SAFETY: the heap pointer came from `Box::<F>::into_raw`.
    let f = unsafe { &*storage.heap.cast::<F>() };
    f.invoke(args)
}

unsafe fn destroy_heap<F>(storage: &mut Storage) {
    // SAFETY: the heap pointer came from `Box::<F>::into_raw` and is freed once.
    drop(unsafe { Box::from_raw(storage.heap.cast::<F>()) });
}

// ============================================================================
// UFunction
// ============================================================================

/// A move-only, type-erased `Fn(Args) -> R`.
pub struct UFunction<Args, R = ()> {
    storage: Storage,
    invoker: Option<unsafe fn(&Storage, Args) -> R>,
    destructor: Option<unsafe fn(&mut Storage)>,
    repr: Representation,
    _marker: PhantomData<fn(Args) -> R>,
}

// SAFETY: every stored callable is `Send + Sync` (enforced by the
// constructors), and the storage is only reached through `&self`/`&mut self`.
unsafe impl<Args, R> Send for UFunction<Args, R> {}
// SAFETY: see above; `call` only needs shared access to an `Fn`.
unsafe impl<Args, R> Sync for UFunction<Args, R> {}

impl<Args, R> UFunction<Args, R> {
    /// An empty function.
    pub const fn empty() -> Self {
        Self {
            storage: Storage::EMPTY,
            invoker: None,
            destructor: None,
            repr: Representation::Empty,
            _marker: PhantomData,
        }
    }

    /// Stores a closure, inline when it fits and needs no drop, boxed otherwise.
    pub fn new<F>(f: F) -> Self
    where
        F: Invoke<Args, Output = R> + Send + Sync + 'static,
    {
        if fits_inline::<F>() {
            let mut storage = Storage::EMPTY;
            // SAFETY: `fits_inline` checked size and alignment; the buffer is
            // uninitialized and `F` has no drop glue to leak.
            unsafe { storage.inline.as_mut_ptr().cast::<F>().write(f) };
            Self {
                storage,
                invoker: Some(call_inline::<F, Args>),
                destructor: None,
                repr: Representation::Inline,
                _marker: PhantomData,
            }
        } else {
            let storage = Storage {
                heap: Box::into_raw(Box::new(f)).cast(),
            };
            Self {
                storage,
                invoker: Some(call_heap::<F, Args>),
                destructor: Some(destroy_heap::<F>),
                repr: Representation::Heap,
                _marker: PhantomData,
            }
        }
    }

    /// Stores a bare function pointer.
    pub fn from_fn_ptr<P>(f: P) -> Self
    where
        P: FnPtr<Args, Output = R>,
    {
        Self {
            storage: Storage {
                fn_ptr: f.into_erased(),
            },
            invoker: Some(call_fn_ptr::<P, Args>),
            destructor: None,
            repr: Representation::FnPtr,
            _marker: PhantomData,
        }
    }

    /// Replaces the callable, destroying the previous one.
    pub fn set<F>(&mut self, f: F)
    where
        F: Invoke<Args, Output = R> + Send + Sync + 'static,
    {
        *self = Self::new(f);
    }

    /// Destroys the callable and leaves the function empty.
    pub fn clear(&mut self) {
        *self = Self::empty();
    }

    /// Moves the callable out, leaving this function empty.
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.invoker.is_none()
    }

    #[inline]
    pub fn representation(&self) -> Representation {
        self.repr
    }

    /// Calls the stored callable.
    ///
    /// # Panics
    ///
    /// Panics if the function is empty.
    #[inline]
    pub fn call(&self, args: Args) -> R {
        match self.invoker {
            // SAFETY: `invoker` was selected together with `storage`.
            Some(invoker) => unsafe { invoker(&self.storage, args) },
            None => panic!("called an empty UFunction"),
        }
    }
}

impl<Args, R> Default for UFunction<Args, R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<Args, R> Drop for UFunction<Args, R> {
    fn drop(&mut self) {
        if let Some(destructor) = self.destructor.take() {
            // SAFETY: the destructor matches the heap payload and runs once.
            unsafe { destructor(&mut self.storage) };
        }
        self.invoker = None;
    }
}

impl<Args, R> fmt::Debug for UFunction<Args, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UFunction")
            .field("representation", &self.repr)
            .finish()
    }
}
