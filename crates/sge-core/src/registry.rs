//! The reflection registry.
//!
//! Registration happens in two phases:
//!
//! 1. A [`RegistryBuilder`] collects descriptors from the type builders, the
//!    [`Reflect`] trait and interface implementations. Nothing is shared yet
//!    and every method takes the builder by value.
//! 2. [`RegistryBuilder::build`] freezes the registry. Every descriptor is
//!    moved into `'static` storage, every [`TypeRef`] is bound to its
//!    descriptor and the result is returned as `&'static Registry`.
//!
//! A frozen registry is immutable and may be read from any thread. One
//! registry can additionally be installed as the process-global one, which
//! backs [`get_type`] and [`try_get_type`].
//!
//! # Example
//!
//! ```ignore
//! let registry = RegistryBuilder::with_primitives()
//!     .register::<Point>()?
//!     .register_enum(EnumInfoBuilder::<Access>::bit_flags("Access")?)?
//!     .implement::<Point, _>(Stringify { stringify: point_to_string })?
//!     .build()?;
//! registry.install()?;
//!
//! let point = get_type::<Point>();
//! assert_eq!(point.num_properties(), 2);
//! ```

use std::any::{TypeId, type_name};
use std::fmt;
use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use crate::interface::ImplEntry;
use crate::lifecycle::Lifecycle;
use crate::{
    Any, AnyMut, EnumInfoBuilder, Interface, InterfaceInfo, NativeTypeInfoBuilder, Reflect,
    RegistrationError, TypeFlags, TypeHash, TypeInfo,
};

static GLOBAL: OnceLock<&'static Registry> = OnceLock::new();

// ============================================================================
// RegistryBuilder
// ============================================================================

/// Collects descriptors until the registry is frozen.
pub struct RegistryBuilder {
    // === Type Storage ===
    types: Vec<TypeInfo>,
    by_type_id: FxHashMap<TypeId, usize>,
    by_name: FxHashMap<String, usize>,

    // === Interface Storage ===
    interfaces: Vec<&'static InterfaceInfo>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("types", &self.by_name.keys().collect::<Vec<_>>())
            .field("interfaces", &self.interfaces)
            .finish()
    }
}

impl RegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            by_type_id: FxHashMap::default(),
            by_name: FxHashMap::default(),
            interfaces: Vec::new(),
        }
    }

    /// Creates a builder with the primitive types pre-registered.
    ///
    /// | Name     | Rust type |
    /// |----------|-----------|
    /// | `void`   | `()`      |
    /// | `bool`   | `bool`    |
    /// | `char`   | `char`    |
    /// | `int8` .. `uint64` | `i8` .. `u64` |
    /// | `float`  | `f32`     |
    /// | `double` | `f64`     |
    /// | `string` | `String`  |
    pub fn with_primitives() -> Self {
        let mut builder = Self::new();
        builder.register_primitive::<()>("void");
        builder.register_primitive::<bool>("bool");
        builder.register_primitive::<char>("char");
        builder.register_primitive::<i8>("int8");
        builder.register_primitive::<u8>("uint8");
        builder.register_primitive::<i16>("int16");
        builder.register_primitive::<u16>("uint16");
        builder.register_primitive::<i32>("int32");
        builder.register_primitive::<u32>("uint32");
        builder.register_primitive::<i64>("int64");
        builder.register_primitive::<u64>("uint64");
        builder.register_float::<f32>("float");
        builder.register_float::<f64>("double");
        builder.register_primitive::<String>("string");
        builder
    }

    fn register_primitive<T>(&mut self, name: &str)
    where
        T: Default + Clone + PartialEq + 'static,
    {
        let info = NativeTypeInfoBuilder::<T>::new(name)
            .flags(TypeFlags::PRIMITIVE | TypeFlags::RECURSE_TERMINAL)
            .default_init()
            .copyable()
            .equality()
            .finish();
        self.insert(info);
    }

    fn register_float<T>(&mut self, name: &str)
    where
        T: Default + Copy + 'static,
        ordered_float::OrderedFloat<T>: PartialEq,
    {
        let lifecycle = Lifecycle::movable::<T>()
            .with_default::<T>()
            .with_clone::<T>()
            .with_float_eq::<T>();
        let info = NativeTypeInfoBuilder::<T>::new(name)
            .flags(TypeFlags::PRIMITIVE | TypeFlags::RECURSE_TERMINAL)
            .lifecycle(lifecycle)
            .finish();
        self.insert(info);
    }

    // =========================================================================
    // Type Registration
    // =========================================================================

    /// Registers `T` through its [`Reflect`] implementation.
    pub fn register<T: Reflect>(self) -> Result<Self, RegistrationError> {
        let builder = T::reflect(NativeTypeInfoBuilder::new(T::NAME))?;
        self.register_type(builder)
    }

    /// Registers the descriptor assembled by a native type builder.
    pub fn register_type<T: 'static>(
        self,
        builder: NativeTypeInfoBuilder<T>,
    ) -> Result<Self, RegistrationError> {
        self.add(builder.finish())
    }

    /// Registers the descriptor assembled by an enum builder.
    pub fn register_enum<E: Copy + 'static>(
        self,
        builder: EnumInfoBuilder<E>,
    ) -> Result<Self, RegistrationError> {
        self.add(builder.finish()?)
    }

    fn add(mut self, info: TypeInfo) -> Result<Self, RegistrationError> {
        if self.by_type_id.contains_key(&info.type_id()) || self.by_name.contains_key(info.name())
        {
            return Err(RegistrationError::DuplicateType(info.name().to_string()));
        }
        tracing::trace!(
            ty = info.name(),
            kind = ?info.kind(),
            properties = info.num_properties(),
            fields = info.num_fields(),
            "registered type"
        );
        self.insert(info);
        Ok(self)
    }

    fn insert(&mut self, info: TypeInfo) {
        let index = self.types.len();
        self.by_type_id.insert(info.type_id(), index);
        self.by_name.insert(info.name().to_string(), index);
        self.types.push(info);
    }

    /// Returns true if `T` has been registered.
    pub fn contains<T: 'static>(&self) -> bool {
        self.by_type_id.contains_key(&TypeId::of::<T>())
    }

    // =========================================================================
    // Interface Registration
    // =========================================================================

    /// Makes interface `I` discoverable by name.
    ///
    /// Interfaces implemented by a registered type are discoverable without
    /// this call.
    pub fn register_interface<I: Interface>(mut self) -> Self {
        let info = I::info();
        if !self.interfaces.iter().any(|known| std::ptr::eq(*known, info)) {
            self.interfaces.push(info);
        }
        self
    }

    /// Registers `record` as the implementation of `I` for the already
    /// registered type `T`.
    pub fn implement<T: 'static, I: Interface>(
        mut self,
        record: I,
    ) -> Result<Self, RegistrationError> {
        let Some(&index) = self.by_type_id.get(&TypeId::of::<T>()) else {
            return Err(RegistrationError::TypeNotFound(type_name::<T>().to_string()));
        };
        let info = &mut self.types[index];
        info.add_implementation(ImplEntry::new(record))
            .map_err(|entry| RegistrationError::DuplicateInterface {
                type_name: info.name().to_string(),
                interface: entry.interface.name(),
            })?;
        tracing::trace!(ty = info.name(), interface = I::info().name(), "registered implementation");
        Ok(self.register_interface::<I>())
    }

    // =========================================================================
    // Freeze
    // =========================================================================

    /// Freezes the registry.
    ///
    /// Fails if two distinct interfaces share a name, or if a member refers
    /// to a Rust type that was never registered.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build(self) -> Result<&'static Registry, RegistrationError> {
        let mut interfaces: FxHashMap<TypeHash, &'static InterfaceInfo> = FxHashMap::default();
        let declared = self.interfaces.iter().copied();
        let implemented = self
            .types
            .iter()
            .flat_map(|ty| ty.interfaces().map(|(interface, _)| interface));
        for interface in declared.chain(implemented) {
            match interfaces.get(&interface.hash()) {
                Some(known) if !std::ptr::eq(*known, interface) => {
                    return Err(RegistrationError::InterfaceCollision(interface.name()));
                }
                Some(_) => {}
                None => {
                    interfaces.insert(interface.hash(), interface);
                }
            }
        }

        // Validate before leaking so a failed build does not leak descriptors.
        for ty in &self.types {
            let mut missing = None;
            ty.for_each_type_ref(|member, type_ref| {
                if missing.is_none() && !self.by_type_id.contains_key(&type_ref.type_id()) {
                    missing = Some((member, type_ref.rust_name()));
                }
            });
            if let Some((member, rust_type)) = missing {
                return Err(RegistrationError::UnresolvedType {
                    owner: ty.name().to_string(),
                    member,
                    rust_type,
                });
            }
        }

        let types: Vec<&'static TypeInfo> = self
            .types
            .into_iter()
            .map(|ty| &*Box::leak(Box::new(ty)))
            .collect();
        let by_type_id: FxHashMap<TypeId, &'static TypeInfo> =
            types.iter().map(|ty| (ty.type_id(), *ty)).collect();
        for ty in &types {
            ty.for_each_type_ref(|_, type_ref| {
                if let Some(target) = by_type_id.get(&type_ref.type_id()) {
                    type_ref.resolve(target);
                }
            });
        }

        let registry = Registry {
            by_name: types.iter().map(|ty| (ty.name().to_string(), *ty)).collect(),
            by_hash: types.iter().map(|ty| (ty.type_hash(), *ty)).collect(),
            by_type_id,
            interfaces,
            types,
        };
        tracing::debug!(
            types = registry.num_types(),
            interfaces = registry.interfaces.len(),
            "registry frozen"
        );
        Ok(Box::leak(Box::new(registry)))
    }
}

// ============================================================================
// Registry
// ============================================================================

/// A frozen set of type descriptors.
pub struct Registry {
    types: Vec<&'static TypeInfo>,
    by_type_id: FxHashMap<TypeId, &'static TypeInfo>,
    by_name: FxHashMap<String, &'static TypeInfo>,
    by_hash: FxHashMap<TypeHash, &'static TypeInfo>,
    interfaces: FxHashMap<TypeHash, &'static InterfaceInfo>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.types.iter().map(|ty| ty.name()).collect::<Vec<_>>())
            .field("interfaces", &self.interfaces.values().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    // =========================================================================
    // Type Lookups
    // =========================================================================

    /// The descriptor of `T`, if registered.
    #[inline]
    pub fn type_of<T: 'static>(&self) -> Option<&'static TypeInfo> {
        self.by_type_id.get(&TypeId::of::<T>()).copied()
    }

    /// The descriptor of the type of `value`, if registered.
    #[inline]
    pub fn type_of_val<T: 'static>(&self, _value: &T) -> Option<&'static TypeInfo> {
        self.type_of::<T>()
    }

    pub fn find_type(&self, name: &str) -> Option<&'static TypeInfo> {
        self.by_name.get(name).copied()
    }

    pub fn find_type_by_hash(&self, hash: TypeHash) -> Option<&'static TypeInfo> {
        self.by_hash.get(&hash).copied()
    }

    /// All descriptors, in registration order.
    pub fn types(&self) -> impl ExactSizeIterator<Item = &'static TypeInfo> + '_ {
        self.types.iter().copied()
    }

    #[inline]
    pub fn num_types(&self) -> usize {
        self.types.len()
    }

    // =========================================================================
    // Interface Lookups
    // =========================================================================

    pub fn find_interface(&self, name: &str) -> Option<&'static InterfaceInfo> {
        self.interfaces.get(&TypeHash::from_interface(name)).copied()
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &'static InterfaceInfo> + '_ {
        self.interfaces.values().copied()
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// A typed view of `value`, if `T` is registered.
    pub fn any<'a, T: 'static>(&self, value: &'a T) -> Option<Any<'a>> {
        self.type_of::<T>().map(|ty| Any::new(value, ty))
    }

    /// A mutable typed view of `value`, if `T` is registered.
    pub fn any_mut<'a, T: 'static>(&self, value: &'a mut T) -> Option<AnyMut<'a>> {
        self.type_of::<T>().map(|ty| AnyMut::new(value, ty))
    }

    // =========================================================================
    // Global Registry
    // =========================================================================

    /// Installs this registry as the process-global one.
    ///
    /// Installing the same registry twice is a no-op. Installing a different
    /// registry once one is installed fails with
    /// [`RegistrationError::AlreadyInstalled`].
    pub fn install(&'static self) -> Result<(), RegistrationError> {
        let installed = GLOBAL.get_or_init(|| self);
        if std::ptr::eq(*installed, self) {
            Ok(())
        } else {
            tracing::warn!("a global registry is already installed");
            Err(RegistrationError::AlreadyInstalled)
        }
    }

    /// The process-global registry, if one has been installed.
    pub fn global() -> Option<&'static Registry> {
        GLOBAL.get().copied()
    }
}

/// The descriptor of `T` in the global registry.
///
/// # Panics
///
/// Panics if no registry is installed or `T` is not registered in it.
pub fn get_type<T: 'static>() -> &'static TypeInfo {
    match try_get_type::<T>() {
        Some(info) => info,
        None => panic!(
            "type `{}` is not registered in the global registry",
            type_name::<T>()
        ),
    }
}

/// The descriptor of `T` in the global registry, if any.
pub fn try_get_type<T: 'static>() -> Option<&'static TypeInfo> {
    Registry::global().and_then(|registry| registry.type_of::<T>())
}
