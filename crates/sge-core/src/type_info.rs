//! Type descriptors.
//!
//! A [`TypeInfo`] is the single runtime descriptor of one Rust type. It
//! aggregates everything reflection knows about the type:
//!
//! - identity and layout: name, [`TypeHash`], [`TypeId`], size, alignment,
//!   [`TypeFlags`], an optional base type;
//! - the **lifecycle contract**: default construction, copy and move
//!   construction, copy and move assignment, drop and equality, each guarded
//!   by a `has_*` predicate;
//! - positional constructors (one per arity) and named constructors;
//! - properties and fields, enumerated in registration order;
//! - the capability table mapping [`InterfaceInfo`]s to implementation
//!   records.
//!
//! Descriptors come in two flavors. **Native** descriptors carry the
//! monomorphized glue of a struct or primitive. **Enum** descriptors treat
//! the value as an integer bit pattern: they default to zero (when zero is a
//! valid value), copy and move bitwise, have nothing to drop, compare by
//! value, and expose enum properties.
//!
//! Descriptors are created by the registration builders, frozen by
//! [`RegistryBuilder::build`](crate::RegistryBuilder::build), and live for
//! the rest of the process. Every query is a read of immutable data.
//!
//! # Lifecycle operations
//!
//! The lifecycle operations work on raw pointers and are `unsafe`: the
//! caller guarantees the pointers are aligned, sized for the type and in the
//! state the operation expects. Invoking a capability whose `has_*`
//! predicate is `false` panics.

use std::alloc::Layout;
use std::any::TypeId;
use std::fmt;
use std::ptr;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::enum_type::EnumCodec;
use crate::interface::ImplEntry;
use crate::lifecycle::Lifecycle;
use crate::members::MemberTable;
use crate::{
    ConstructorInfo, FieldInfo, ImplRef, Interface, InterfaceInfo, PropertyInfo, TypeFlags,
    TypeHash, TypeRef,
};

/// The flavor of a [`TypeInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Native,
    Enum,
}

pub(crate) enum Flavor {
    Native(Lifecycle),
    Enum(Arc<dyn EnumCodec>),
}

pub struct TypeInfo {
    pub(crate) name: String,
    pub(crate) flags: TypeFlags,
    pub(crate) layout: Layout,
    pub(crate) type_hash: TypeHash,
    pub(crate) type_id: TypeId,
    pub(crate) base: Option<TypeRef>,
    pub(crate) flavor: Flavor,
    pub(crate) properties: MemberTable<PropertyInfo>,
    pub(crate) fields: MemberTable<FieldInfo>,
    pub(crate) constructors: Vec<ConstructorInfo>,
    pub(crate) constructors_by_arity: FxHashMap<usize, usize>,
    pub(crate) named_constructors: MemberTable<ConstructorInfo>,
    pub(crate) interfaces: FxHashMap<TypeHash, ImplEntry>,
}

impl TypeInfo {
    pub(crate) fn new<T: 'static>(name: String, flags: TypeFlags, flavor: Flavor) -> Self {
        Self {
            type_hash: TypeHash::from_name(&name),
            name,
            flags,
            layout: Layout::new::<T>(),
            type_id: TypeId::of::<T>(),
            base: None,
            flavor,
            properties: MemberTable::new(),
            fields: MemberTable::new(),
            constructors: Vec::new(),
            constructors_by_arity: FxHashMap::default(),
            named_constructors: MemberTable::new(),
            interfaces: FxHashMap::default(),
        }
    }

    // ========================================================================
    // Identity
    // ========================================================================

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn flags(&self) -> TypeFlags {
        self.flags
    }

    #[inline]
    pub fn type_hash(&self) -> TypeHash {
        self.type_hash
    }

    /// The Rust type this descriptor was registered for.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    #[inline]
    pub fn kind(&self) -> TypeKind {
        match self.flavor {
            Flavor::Native(_) => TypeKind::Native,
            Flavor::Enum(_) => TypeKind::Enum,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.layout.size()
    }

    #[inline]
    pub fn alignment(&self) -> usize {
        self.layout.align()
    }

    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// `true` for zero-sized types.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layout.size() == 0
    }

    #[inline]
    pub fn is_native(&self) -> bool {
        self.flags.contains(TypeFlags::NATIVE)
    }

    #[inline]
    pub fn is_primitive(&self) -> bool {
        self.flags.contains(TypeFlags::PRIMITIVE)
    }

    #[inline]
    pub fn base(&self) -> Option<&'static TypeInfo> {
        self.base.as_ref().and_then(TypeRef::try_get)
    }

    /// `true` if `self` is `other` or has `other` in its base chain.
    pub fn derives_from(&self, other: &TypeInfo) -> bool {
        if self == other {
            return true;
        }
        let mut current = self.base();
        while let Some(ty) = current {
            if ty == other {
                return true;
            }
            current = ty.base();
        }
        false
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    fn lifecycle(&self) -> Option<&Lifecycle> {
        match &self.flavor {
            Flavor::Native(lifecycle) => Some(lifecycle),
            Flavor::Enum(_) => None,
        }
    }

    fn missing(&self, capability: &str) -> ! {
        panic!("type '{}' has no {capability}", self.name)
    }

    pub fn has_init(&self) -> bool {
        match &self.flavor {
            Flavor::Native(lifecycle) => lifecycle.has_init(),
            Flavor::Enum(codec) => codec.accepts(0),
        }
    }

    /// Default-constructs an instance at `addr`.
    ///
    /// # Safety
    ///
    /// `addr` must be uninitialized storage laid out for this type.
    pub unsafe fn init(&self, addr: *mut u8) {
        match &self.flavor {
            Flavor::Native(lifecycle) => match lifecycle.init {
                Some(init) => unsafe { init(addr) },
                None => self.missing("default construction"),
            },
            Flavor::Enum(codec) => {
                if !unsafe { codec.write(addr, 0) } {
                    self.missing("zero value");
                }
            }
        }
    }

    pub fn has_copy_init(&self) -> bool {
        self.lifecycle().is_none_or(Lifecycle::has_copy_init)
    }

    /// Copy-constructs `src` into `addr`.
    ///
    /// # Safety
    ///
    /// `addr` must be uninitialized storage for this type and `src` a live
    /// instance of it; the two must not overlap.
    pub unsafe fn copy_init(&self, addr: *mut u8, src: *const u8) {
        match self.lifecycle() {
            Some(lifecycle) => match lifecycle.copy_init {
                Some(copy_init) => unsafe { copy_init(addr, src) },
                None => self.missing("copy construction"),
            },
            None => unsafe { self.copy_bits(addr, src) },
        }
    }

    pub fn has_move_init(&self) -> bool {
        self.lifecycle().is_none_or(Lifecycle::has_move_init)
    }

    /// Move-constructs `src` into `addr`. `src` is left logically
    /// uninitialized: it must not be dropped or used afterwards.
    ///
    /// # Safety
    ///
    /// As [`copy_init`](Self::copy_init).
    pub unsafe fn move_init(&self, addr: *mut u8, src: *mut u8) {
        match self.lifecycle() {
            Some(lifecycle) => match lifecycle.move_init {
                Some(move_init) => unsafe { move_init(addr, src) },
                None => self.missing("move construction"),
            },
            None => unsafe { self.copy_bits(addr, src) },
        }
    }

    pub fn has_copy_assign(&self) -> bool {
        self.lifecycle().is_none_or(Lifecycle::has_copy_assign)
    }

    /// Copy-assigns `src` to the live instance at `dst`.
    ///
    /// # Safety
    ///
    /// `dst` and `src` must be live instances of this type.
    pub unsafe fn copy_assign(&self, dst: *mut u8, src: *const u8) {
        match self.lifecycle() {
            Some(lifecycle) => match lifecycle.copy_assign {
                Some(copy_assign) => unsafe { copy_assign(dst, src) },
                None => self.missing("copy assignment"),
            },
            None => unsafe { self.copy_bits(dst, src) },
        }
    }

    pub fn has_move_assign(&self) -> bool {
        self.lifecycle().is_none_or(Lifecycle::has_move_assign)
    }

    /// Move-assigns `src` to the live instance at `dst`, dropping the old
    /// value. `src` is left logically uninitialized.
    ///
    /// # Safety
    ///
    /// `dst` and `src` must be live, distinct instances of this type.
    pub unsafe fn move_assign(&self, dst: *mut u8, src: *mut u8) {
        match self.lifecycle() {
            Some(lifecycle) => match lifecycle.move_assign {
                Some(move_assign) => unsafe { move_assign(dst, src) },
                None => self.missing("move assignment"),
            },
            None => unsafe { self.copy_bits(dst, src) },
        }
    }

    pub fn has_drop(&self) -> bool {
        self.lifecycle().is_none_or(Lifecycle::has_drop)
    }

    /// Drops the instance at `this` in place.
    ///
    /// # Safety
    ///
    /// `this` must be a live instance of this type; it is uninitialized
    /// afterwards.
    pub unsafe fn drop(&self, this: *mut u8) {
        match self.lifecycle() {
            Some(lifecycle) => match lifecycle.drop {
                Some(drop) => unsafe { drop(this) },
                None => self.missing("drop"),
            },
            None => {}
        }
    }

    pub fn has_equality_compare(&self) -> bool {
        self.lifecycle().is_none_or(Lifecycle::has_equality_compare)
    }

    /// Compares two live instances.
    ///
    /// # Safety
    ///
    /// `a` and `b` must be live instances of this type.
    pub unsafe fn equality_compare(&self, a: *const u8, b: *const u8) -> bool {
        match &self.flavor {
            Flavor::Native(lifecycle) => match lifecycle.equality {
                Some(equals) => unsafe { equals(a, b) },
                None => self.missing("equality comparison"),
            },
            Flavor::Enum(codec) => unsafe { codec.read(a) == codec.read(b) },
        }
    }

    unsafe fn copy_bits(&self, dst: *mut u8, src: *const u8) {
        if !ptr::eq(dst, src) {
            unsafe { ptr::copy_nonoverlapping(src, dst, self.layout.size()) }
        }
    }

    // ========================================================================
    // Constructors
    // ========================================================================

    #[inline]
    pub fn num_constructors(&self) -> usize {
        self.constructors.len()
    }

    /// The positional constructor taking `argc` arguments.
    pub fn find_constructor(&self, argc: usize) -> Option<&ConstructorInfo> {
        self.constructors_by_arity
            .get(&argc)
            .map(|&index| &self.constructors[index])
    }

    /// Calls `f` for every positional constructor in registration order.
    pub fn enumerate_constructors(&self, mut f: impl FnMut(&ConstructorInfo)) {
        self.constructors.iter().for_each(&mut f);
    }

    #[inline]
    pub fn constructors(&self) -> impl ExactSizeIterator<Item = &ConstructorInfo> {
        self.constructors.iter()
    }

    #[inline]
    pub fn num_named_constructors(&self) -> usize {
        self.named_constructors.len()
    }

    #[inline]
    pub fn find_named_constructor(&self, name: &str) -> Option<&ConstructorInfo> {
        self.named_constructors.find(name)
    }

    /// Calls `f` with each named constructor and its name, in registration order.
    pub fn enumerate_named_constructors(&self, mut f: impl FnMut(&str, &ConstructorInfo)) {
        for ctor in self.named_constructors.iter() {
            f(ctor.name().unwrap_or_default(), ctor);
        }
    }

    // ========================================================================
    // Properties and fields
    // ========================================================================

    #[inline]
    pub fn num_properties(&self) -> usize {
        self.properties.len()
    }

    #[inline]
    pub fn find_property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.find(name)
    }

    /// Calls `f` with each property and its name, in registration order.
    pub fn enumerate_properties(&self, mut f: impl FnMut(&str, &PropertyInfo)) {
        for prop in self.properties.iter() {
            f(prop.name(), prop);
        }
    }

    #[inline]
    pub fn properties(&self) -> impl ExactSizeIterator<Item = &PropertyInfo> {
        self.properties.iter()
    }

    #[inline]
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn find_field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.find(name)
    }

    /// Calls `f` with each field and its name, in registration order.
    pub fn enumerate_fields(&self, mut f: impl FnMut(&str, &FieldInfo)) {
        for field in self.fields.iter() {
            f(field.name(), field);
        }
    }

    #[inline]
    pub fn fields(&self) -> impl ExactSizeIterator<Item = &FieldInfo> {
        self.fields.iter()
    }

    // ========================================================================
    // Interfaces
    // ========================================================================

    /// The opaque implementation record of `interface` for this type.
    ///
    /// Only the registered descriptor itself matches; another
    /// `InterfaceInfo` that happens to share its name does not.
    #[inline]
    pub fn get_implementation(&self, interface: &InterfaceInfo) -> Option<ImplRef<'_>> {
        self.interfaces
            .get(&interface.hash())
            .filter(|entry| ptr::eq(entry.interface, interface))
            .map(ImplEntry::record)
    }

    /// The typed implementation of `I` for this type.
    #[inline]
    pub fn implementation<I: Interface>(&self) -> Option<&I> {
        self.get_implementation(I::info())
            .and_then(|record| record.downcast::<I>())
    }

    #[inline]
    pub fn implements(&self, interface: &InterfaceInfo) -> bool {
        self.get_implementation(interface).is_some()
    }

    /// Every implemented interface with its record, in no particular order.
    pub fn interfaces(&self) -> impl Iterator<Item = (&'static InterfaceInfo, ImplRef<'_>)> {
        self.interfaces
            .values()
            .map(|entry| (entry.interface, entry.record()))
    }

    // ========================================================================
    // Registration support
    // ========================================================================

    /// Adds an implementation record; returns it back if one exists.
    pub(crate) fn add_implementation(&mut self, entry: ImplEntry) -> Result<(), ImplEntry> {
        let hash = entry.interface.hash();
        if self.interfaces.contains_key(&hash) {
            return Err(entry);
        }
        self.interfaces.insert(hash, entry);
        Ok(())
    }

    /// Calls `f` with a description and every deferred type reference.
    pub(crate) fn for_each_type_ref(&self, mut f: impl FnMut(String, &TypeRef)) {
        if let Some(base) = &self.base {
            f("<base>".to_string(), base);
        }
        for prop in self.properties.iter() {
            for r in prop.type_refs() {
                f(prop.name().to_string(), r);
            }
        }
        for field in self.fields.iter() {
            for r in field.type_refs() {
                f(field.name().to_string(), r);
            }
        }
        for ctor in self.constructors.iter().chain(self.named_constructors.iter()) {
            let label = match ctor.name() {
                Some(name) => format!("<constructor {name}>"),
                None => format!("<constructor/{}>", ctor.arity()),
            };
            for r in ctor.type_refs() {
                f(label.clone(), r);
            }
        }
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other) || self.type_id == other.type_id
    }
}

impl Eq for TypeInfo {}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("size", &self.size())
            .field("alignment", &self.alignment())
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
