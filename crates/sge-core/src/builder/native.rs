//! NativeTypeInfoBuilder for describing Rust structs and primitives.
//!
//! The builder assembles one [`TypeInfo`] through a fluent API. Lifecycle
//! capabilities are opted into with trait-bounded methods, so a descriptor
//! never claims a capability the Rust type lacks. Member registration
//! methods return `Result<Self, RegistrationError>` and chain with `?`.
//!
//! # Example
//!
//! ```ignore
//! let point = NativeTypeInfoBuilder::<Point>::new("Point")
//!     .default_init()
//!     .copyable()
//!     .equality()
//!     .constructor(|x: i32, y: i32| Point { x, y })?
//!     .readonly_property("length", |p: &Point| p.length(), PropertyFlags::empty())?
//!     .implements(Stringify { stringify: point_to_string })?;
//! let point = reflect_field_property!(point, Point, x, FieldFlags::PUBLIC)?;
//! let point = reflect_field_property!(point, Point, y, FieldFlags::PUBLIC)?;
//!
//! let registry = RegistryBuilder::with_primitives().register_type(point)?.build()?;
//! ```

use std::marker::PhantomData;

use crate::constructor::ConstructorFn;
use crate::interface::ImplEntry;
use crate::lifecycle::Lifecycle;
use crate::property::{Getter, Mutator, NativeProperty, PropertyImpl};
use crate::type_info::Flavor;
use crate::{
    ArgAny, ConstructorInfo, FieldFlags, FieldInfo, Interface, PropertyFlags, PropertyInfo,
    RegistrationError, TypeFlags, TypeInfo, TypeRef, UFunction,
};

// ============================================================================
// Constructor conversion
// ============================================================================

/// Functions usable as reflected constructors of `T`.
///
/// Implemented for every `Fn(A, B, ..) -> T` of up to six arguments whose
/// argument types are `Clone`. Each argument is cloned out of its
/// [`ArgAny`]. Closure parameters need type annotations, since the
/// signature is not inferred through this trait.
pub trait IntoConstructor<Args, T> {
    /// Declared argument types, in order.
    fn arg_types() -> Vec<TypeRef>;

    /// Wraps the function as a type-erased constructor body.
    fn into_constructor_fn(self) -> ConstructorFn;
}

macro_rules! impl_into_constructor {
    ($($arg:ident $idx:tt),*) => {
        impl<F, T, $($arg),*> IntoConstructor<($($arg,)*), T> for F
        where
            F: Fn($($arg),*) -> T + Send + Sync + 'static,
            T: 'static,
            $($arg: Clone + 'static,)*
        {
            fn arg_types() -> Vec<TypeRef> {
                vec![$(TypeRef::of::<$arg>()),*]
            }

            #[allow(unused_variables)]
            fn into_constructor_fn(self) -> ConstructorFn {
                Box::new(move |addr: *mut u8, args: &[ArgAny<'_>]| {
                    let value = (self)($(args[$idx].get::<$arg>().clone()),*);
                    // SAFETY: `ConstructorInfo::invoke` requires uninitialized
                    // storage laid out for `T`.
                    unsafe { addr.cast::<T>().write(value) }
                })
            }
        }
    };
}

impl_into_constructor!();
impl_into_constructor!(A 0);
impl_into_constructor!(A 0, B 1);
impl_into_constructor!(A 0, B 1, C 2);
impl_into_constructor!(A 0, B 1, C 2, D 3);
impl_into_constructor!(A 0, B 1, C 2, D 3, E 4);
impl_into_constructor!(A 0, B 1, C 2, D 3, E 4, G 5);

// ============================================================================
// NativeTypeInfoBuilder
// ============================================================================

/// Builder for the descriptor of a Rust type `T`.
///
/// Created with [`NativeTypeInfoBuilder::new`] and handed to
/// [`RegistryBuilder::register_type`](crate::RegistryBuilder::register_type).
pub struct NativeTypeInfoBuilder<T: 'static> {
    info: TypeInfo,
    lifecycle: Lifecycle,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> NativeTypeInfoBuilder<T> {
    /// Starts a descriptor named `name`.
    ///
    /// Every Rust type can be moved and dropped, so those capabilities are
    /// always present. Default construction, copying and equality are added
    /// with [`default_init`](Self::default_init), [`copyable`](Self::copyable)
    /// and [`equality`](Self::equality).
    pub fn new(name: impl Into<String>) -> Self {
        let lifecycle = Lifecycle::movable::<T>();
        Self {
            info: TypeInfo::new::<T>(name.into(), TypeFlags::NATIVE, Flavor::Native(lifecycle)),
            lifecycle,
            _marker: PhantomData,
        }
    }

    /// The descriptor name.
    #[inline]
    pub fn name(&self) -> &str {
        self.info.name()
    }

    /// Sets the type flags. `NATIVE` is always kept.
    pub fn flags(mut self, flags: TypeFlags) -> Self {
        self.info.flags = flags | TypeFlags::NATIVE;
        self
    }

    /// Enables default construction through `T::default()`.
    pub fn default_init(mut self) -> Self
    where
        T: Default,
    {
        self.lifecycle = self.lifecycle.with_default::<T>();
        self
    }

    /// Enables copy construction and copy assignment through `Clone`.
    pub fn copyable(mut self) -> Self
    where
        T: Clone,
    {
        self.lifecycle = self.lifecycle.with_clone::<T>();
        self
    }

    /// Enables equality comparison through `PartialEq`.
    pub fn equality(mut self) -> Self
    where
        T: PartialEq,
    {
        self.lifecycle = self.lifecycle.with_eq::<T>();
        self
    }

    pub(crate) fn lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Declares `B` as the base type of `T`.
    ///
    /// Fields and properties of `B` then accept views of `T`.
    ///
    /// # Safety
    ///
    /// `T` must start with a `B`: it is `#[repr(C)]` (or `#[repr(transparent)]`)
    /// with a `B` as its first field, so a pointer to a `T` is a valid pointer
    /// to a `B`.
    pub unsafe fn extends<B: 'static>(mut self) -> Self {
        self.info.base = Some(TypeRef::of::<B>());
        self
    }

    // ========================================================================
    // Constructors
    // ========================================================================

    /// Registers a positional constructor.
    ///
    /// At most one positional constructor per arity is allowed.
    ///
    /// # Example
    ///
    /// ```ignore
    /// NativeTypeInfoBuilder::<Point>::new("Point")
    ///     .constructor(|| Point::default())?
    ///     .constructor(|x: i32, y: i32| Point { x, y })?;
    /// ```
    pub fn constructor<F, Args>(mut self, f: F) -> Result<Self, RegistrationError>
    where
        F: IntoConstructor<Args, T>,
    {
        let arg_types = F::arg_types();
        let arity = arg_types.len();
        if self.info.constructors_by_arity.contains_key(&arity) {
            return Err(RegistrationError::DuplicateConstructorArity {
                type_name: self.info.name.clone(),
                arity,
            });
        }
        let index = self.info.constructors.len();
        self.info.constructors.push(ConstructorInfo::new(
            index,
            None,
            arg_types,
            TypeRef::of::<T>(),
            f.into_constructor_fn(),
        ));
        self.info.constructors_by_arity.insert(arity, index);
        Ok(self)
    }

    /// Registers a named constructor, independent of the positional set.
    ///
    /// # Example
    ///
    /// ```ignore
    /// NativeTypeInfoBuilder::<Color>::new("Color")
    ///     .named_constructor("gray", |level: u8| Color::rgb(level, level, level))?;
    /// ```
    pub fn named_constructor<F, Args>(
        mut self,
        name: impl Into<String>,
        f: F,
    ) -> Result<Self, RegistrationError>
    where
        F: IntoConstructor<Args, T>,
    {
        let index = self.info.named_constructors.next_index();
        let ctor = ConstructorInfo::new(
            index,
            Some(name.into()),
            F::arg_types(),
            TypeRef::of::<T>(),
            f.into_constructor_fn(),
        );
        self.info
            .named_constructors
            .insert(ctor)
            .map_err(|ctor| self.duplicate(ctor.name().unwrap_or_default(), "named constructor"))?;
        Ok(self)
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// Registers a property computed by `getter` and stored by `setter`.
    ///
    /// Reads write the getter's result into scratch storage for the duration
    /// of the callback; `mutate` round-trips through getter and setter.
    ///
    /// # Example
    ///
    /// ```ignore
    /// builder.property(
    ///     "name",
    ///     |e: &Entity| e.name().to_owned(),
    ///     |e: &mut Entity, name: String| e.rename(name),
    ///     PropertyFlags::EDITOR_DEFAULT_COLLAPSED,
    /// )?;
    /// ```
    pub fn property<P, G, S>(
        self,
        name: impl Into<String>,
        getter: G,
        setter: S,
        flags: PropertyFlags,
    ) -> Result<Self, RegistrationError>
    where
        P: Clone + 'static,
        G: Fn(&T) -> P + Send + Sync + 'static,
        S: Fn(&mut T, P) + Send + Sync + 'static,
    {
        let setter = UFunction::new(move |this: *mut u8, value: *const u8| {
            // SAFETY: `PropertyInfo` passes a live `T` and a live `P`.
            let (this, value) = unsafe { (&mut *this.cast::<T>(), &*value.cast::<P>()) };
            setter(this, value.clone());
        });
        self.push_native::<P>(
            name.into(),
            flags,
            NativeProperty {
                getter: compute_getter::<T, P, G>(getter),
                setter: Some(setter),
                mutator: Some(Mutator::RoundTrip),
            },
        )
    }

    /// Registers a property with a getter only.
    ///
    /// Calling `set` or `mutate` on it panics.
    pub fn readonly_property<P, G>(
        self,
        name: impl Into<String>,
        getter: G,
        flags: PropertyFlags,
    ) -> Result<Self, RegistrationError>
    where
        P: 'static,
        G: Fn(&T) -> P + Send + Sync + 'static,
    {
        self.push_native::<P>(
            name.into(),
            flags,
            NativeProperty {
                getter: compute_getter::<T, P, G>(getter),
                setter: None,
                mutator: None,
            },
        )
    }

    /// Registers a property that views a place inside `T` through a projection.
    ///
    /// Reads view the projected value without copying, `mutate` edits it in
    /// place and `set` clone-assigns into it. No [`FieldInfo`] is recorded;
    /// use [`field_property`](Self::field_property) for a struct field.
    pub fn projected_property<F, G, M>(
        self,
        name: impl Into<String>,
        project: G,
        project_mut: M,
        flags: PropertyFlags,
    ) -> Result<Self, RegistrationError>
    where
        F: Clone + 'static,
        G: Fn(&T) -> &F + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut F + Send + Sync + 'static,
    {
        let project_mut = std::sync::Arc::new(project_mut);
        let setter_project = std::sync::Arc::clone(&project_mut);
        let setter = UFunction::new(move |this: *mut u8, value: *const u8| {
            // SAFETY: `PropertyInfo` passes a live `T` and a live `F`.
            let (this, value) = unsafe { (&mut *this.cast::<T>(), &*value.cast::<F>()) };
            (*setter_project)(this).clone_from(value);
        });
        let mutator = UFunction::new(move |this: *mut u8| -> *mut u8 {
            // SAFETY: `PropertyInfo` passes a live, uniquely borrowed `T`.
            let this = unsafe { &mut *this.cast::<T>() };
            ((*project_mut)(this) as *mut F).cast()
        });
        self.push_native::<F>(
            name.into(),
            flags,
            NativeProperty {
                getter: project_getter::<T, F, G>(project),
                setter: Some(setter),
                mutator: Some(Mutator::Project(mutator)),
            },
        )
    }

    /// Registers a read-only property that views a place inside `T`.
    pub fn readonly_projected_property<F, G>(
        self,
        name: impl Into<String>,
        project: G,
        flags: PropertyFlags,
    ) -> Result<Self, RegistrationError>
    where
        F: 'static,
        G: Fn(&T) -> &F + Send + Sync + 'static,
    {
        self.push_native::<F>(
            name.into(),
            flags,
            NativeProperty {
                getter: project_getter::<T, F, G>(project),
                setter: None,
                mutator: None,
            },
        )
    }

    /// Registers a field of type `F` at byte `offset` together with a
    /// property of the same name backed by it.
    ///
    /// The field carries `field_flags`, the property `property_flags`.
    /// Prefer the [`reflect_field_property!`](crate::reflect_field_property)
    /// macro, which derives the offset and the type from the field name.
    ///
    /// # Safety
    ///
    /// `T` must have a field of type `F` at `offset`.
    pub unsafe fn field_property<F: Clone + 'static>(
        self,
        name: impl Into<String>,
        offset: usize,
        field_flags: FieldFlags,
        property_flags: PropertyFlags,
    ) -> Result<Self, RegistrationError> {
        let name = name.into();
        // SAFETY: upheld by the caller.
        let builder = unsafe { self.field::<F>(name.clone(), offset, field_flags)? };
        let setter = UFunction::new(move |this: *mut u8, value: *const u8| {
            // SAFETY: `PropertyInfo` passes a live `T`, whose field at
            // `offset` is an `F`, and a live `F`.
            let (field, value) =
                unsafe { (&mut *this.add(offset).cast::<F>(), &*value.cast::<F>()) };
            field.clone_from(value);
        });
        let mutator = UFunction::new(move |this: *mut u8| -> *mut u8 {
            // SAFETY: `PropertyInfo` passes a live `T`.
            unsafe { this.add(offset) }
        });
        builder.push_native::<F>(
            name,
            property_flags,
            NativeProperty {
                getter: offset_getter(offset),
                setter: Some(setter),
                mutator: Some(Mutator::Project(mutator)),
            },
        )
    }

    /// Registers a field of type `F` at byte `offset` together with a
    /// read-only property of the same name backed by it.
    ///
    /// # Safety
    ///
    /// `T` must have a field of type `F` at `offset`.
    pub unsafe fn readonly_field_property<F: 'static>(
        self,
        name: impl Into<String>,
        offset: usize,
        field_flags: FieldFlags,
        property_flags: PropertyFlags,
    ) -> Result<Self, RegistrationError> {
        let name = name.into();
        // SAFETY: upheld by the caller.
        let builder = unsafe { self.field::<F>(name.clone(), offset, field_flags)? };
        builder.push_native::<F>(
            name,
            property_flags,
            NativeProperty {
                getter: offset_getter(offset),
                setter: None,
                mutator: None,
            },
        )
    }

    /// [`field_property`](Self::field_property) with the field type fixed by a projection.
    ///
    /// # Safety
    ///
    /// `offset` must be the offset of the field `witness` projects to.
    #[doc(hidden)]
    pub unsafe fn field_property_with_witness<F, W>(
        self,
        name: &str,
        offset: usize,
        _witness: W,
        field_flags: FieldFlags,
        property_flags: PropertyFlags,
    ) -> Result<Self, RegistrationError>
    where
        F: Clone + 'static,
        W: Fn(&T) -> &F,
    {
        // SAFETY: upheld by the caller.
        unsafe { self.field_property::<F>(name, offset, field_flags, property_flags) }
    }

    /// [`readonly_field_property`](Self::readonly_field_property) with the
    /// field type fixed by a projection.
    ///
    /// # Safety
    ///
    /// `offset` must be the offset of the field `witness` projects to.
    #[doc(hidden)]
    pub unsafe fn readonly_field_property_with_witness<F, W>(
        self,
        name: &str,
        offset: usize,
        _witness: W,
        field_flags: FieldFlags,
        property_flags: PropertyFlags,
    ) -> Result<Self, RegistrationError>
    where
        F: 'static,
        W: Fn(&T) -> &F,
    {
        // SAFETY: upheld by the caller.
        unsafe { self.readonly_field_property::<F>(name, offset, field_flags, property_flags) }
    }

    fn push_native<P: 'static>(
        mut self,
        name: String,
        flags: PropertyFlags,
        native: NativeProperty,
    ) -> Result<Self, RegistrationError> {
        let prop = PropertyInfo::new(
            name,
            self.info.properties.next_index(),
            flags,
            TypeRef::of::<P>(),
            TypeRef::of::<T>(),
            PropertyImpl::Native(native),
        );
        self.info
            .properties
            .insert(prop)
            .map_err(|prop| self.duplicate(prop.name(), "property"))?;
        Ok(self)
    }

    // ========================================================================
    // Fields
    // ========================================================================

    /// Registers a field of type `F` at byte `offset`.
    ///
    /// Prefer the [`reflect_field!`](crate::reflect_field) macro, which
    /// derives the offset and the type from the field name.
    ///
    /// # Safety
    ///
    /// `T` must have a field of type `F` at `offset` (as reported by
    /// `core::mem::offset_of!`).
    pub unsafe fn field<F: 'static>(
        mut self,
        name: impl Into<String>,
        offset: usize,
        flags: FieldFlags,
    ) -> Result<Self, RegistrationError> {
        let field = FieldInfo::new(
            name.into(),
            self.info.fields.next_index(),
            flags,
            offset,
            TypeRef::of::<F>(),
            TypeRef::of::<T>(),
        );
        self.info
            .fields
            .insert(field)
            .map_err(|field| self.duplicate(field.name(), "field"))?;
        Ok(self)
    }

    /// [`field`](Self::field) with the field type fixed by a projection.
    ///
    /// # Safety
    ///
    /// `offset` must be the offset of the field `witness` projects to.
    #[doc(hidden)]
    pub unsafe fn field_with_witness<F, W>(
        self,
        name: &str,
        offset: usize,
        _witness: W,
        flags: FieldFlags,
    ) -> Result<Self, RegistrationError>
    where
        F: 'static,
        W: Fn(&T) -> &F,
    {
        // SAFETY: upheld by the caller.
        unsafe { self.field::<F>(name, offset, flags) }
    }

    // ========================================================================
    // Interfaces
    // ========================================================================

    /// Registers `record` as this type's implementation of interface `I`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// builder.implements(IToString { to_string: |this| this.get::<Point>().to_string() })?;
    /// ```
    pub fn implements<I: Interface>(mut self, record: I) -> Result<Self, RegistrationError> {
        self.info
            .add_implementation(ImplEntry::new(record))
            .map_err(|entry| RegistrationError::DuplicateInterface {
                type_name: self.info.name.clone(),
                interface: entry.interface.name(),
            })?;
        Ok(self)
    }

    fn duplicate(&self, name: &str, kind: &'static str) -> RegistrationError {
        RegistrationError::DuplicateRegistration {
            type_name: self.info.name.clone(),
            name: name.to_string(),
            kind,
        }
    }

    /// Finalizes the descriptor.
    pub(crate) fn finish(mut self) -> TypeInfo {
        self.info.flavor = Flavor::Native(self.lifecycle);
        self.info
    }
}

fn compute_getter<T, P, G>(getter: G) -> Getter
where
    T: 'static,
    P: 'static,
    G: Fn(&T) -> P + Send + Sync + 'static,
{
    Getter::Compute(UFunction::new(move |this: *const u8, out: *mut u8| {
        // SAFETY: `PropertyInfo` passes a live `T` and uninitialized storage
        // laid out for `P`.
        unsafe { out.cast::<P>().write(getter(&*this.cast::<T>())) }
    }))
}

fn project_getter<T, F, G>(project: G) -> Getter
where
    T: 'static,
    F: 'static,
    G: Fn(&T) -> &F + Send + Sync + 'static,
{
    Getter::Project(UFunction::new(move |this: *const u8| -> *const u8 {
        // SAFETY: `PropertyInfo` passes a live `T`.
        let this = unsafe { &*this.cast::<T>() };
        (project(this) as *const F).cast()
    }))
}

fn offset_getter(offset: usize) -> Getter {
    Getter::Project(UFunction::new(move |this: *const u8| -> *const u8 {
        // SAFETY: `PropertyInfo` passes a live `T` with a field at `offset`.
        unsafe { this.add(offset) }
    }))
}
