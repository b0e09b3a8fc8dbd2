//! Constructor descriptors.

use crate::members::Member;
use crate::{ArgAny, TypeInfo, TypeRef};

/// Type-erased constructor body: constructs into the given storage.
pub type ConstructorFn = Box<dyn Fn(*mut u8, &[ArgAny<'_>]) + Send + Sync>;

/// Builds an instance of its owning type from reflected arguments.
pub struct ConstructorInfo {
    index: usize,
    name: Option<String>,
    arg_types: Box<[TypeRef]>,
    owner: TypeRef,
    invoker: ConstructorFn,
}

impl ConstructorInfo {
    pub(crate) fn new(
        index: usize,
        name: Option<String>,
        arg_types: Vec<TypeRef>,
        owner: TypeRef,
        invoker: ConstructorFn,
    ) -> Self {
        Self {
            index,
            name,
            arg_types: arg_types.into_boxed_slice(),
            owner,
            invoker,
        }
    }

    /// Registration index among the type's constructors of the same kind
    /// (positional or named).
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The name of a named constructor; `None` for positional ones.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.arg_types.len()
    }

    pub fn arg_types(&self) -> impl ExactSizeIterator<Item = &'static TypeInfo> + '_ {
        self.arg_types.iter().map(TypeRef::get)
    }

    #[inline]
    pub fn owner(&self) -> &'static TypeInfo {
        self.owner.get()
    }

    /// Returns `true` if `args` has the constructor's arity and each argument
    /// matches its declared type.
    pub fn accepts(&self, args: &[ArgAny<'_>]) -> bool {
        args.len() == self.arity()
            && args
                .iter()
                .zip(self.arg_types())
                .all(|(arg, ty)| arg.matches(ty))
    }

    /// Constructs an instance at `addr`.
    ///
    /// # Safety
    ///
    /// `addr` must be valid, uninitialized storage laid out for the owning
    /// type. The caller owns the storage and the constructed value.
    ///
    /// # Panics
    ///
    /// Panics if `args.len()` differs from the arity, or an argument does not
    /// hold its declared type.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub unsafe fn invoke(&self, addr: *mut u8, args: &[ArgAny<'_>]) {
        assert_eq!(
            args.len(),
            self.arity(),
            "constructor of '{}' called with the wrong number of arguments",
            self.owner().name()
        );
        (self.invoker)(addr, args)
    }

    pub(crate) fn type_refs(&self) -> impl Iterator<Item = &TypeRef> {
        self.arg_types.iter().chain(std::iter::once(&self.owner))
    }
}

impl Member for ConstructorInfo {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

impl std::fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("arg_types", &self.arg_types)
            .finish()
    }
}
