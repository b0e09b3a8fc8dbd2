//! EnumInfoBuilder for describing C-like enums and bit flag sets.
//!
//! Enum descriptors expose each named value as a `bool` property:
//!
//! - [`value`](EnumInfoBuilder::value) adds an enumerator property, true
//!   while the whole value equals it.
//! - [`flag`](EnumInfoBuilder::flag) adds a bit flag property, true while
//!   any of its bits is set.
//!
//! # Example
//!
//! ```ignore
//! bitflags! {
//!     #[derive(Clone, Copy)]
//!     struct Access: u8 {
//!         const READ = 1;
//!         const WRITE = 2;
//!     }
//! }
//!
//! // Registers READ and WRITE as bit flag properties.
//! let access = EnumInfoBuilder::<Access>::bit_flags("Access")?;
//!
//! #[derive(Clone, Copy, TryFromPrimitive, IntoPrimitive)]
//! #[repr(u8)]
//! enum Mode { Off, On }
//!
//! let mode = EnumInfoBuilder::<Mode>::enumeration("Mode")
//!     .value("Off", Mode::Off)?
//!     .value("On", Mode::On)?;
//! ```

use std::sync::Arc;

use bitflags::Flags;
use num_enum::TryFromPrimitive;

use crate::enum_type::{
    Codec, EnumBits, EnumCodec, EnumProperty, EnumPropertyKind, flags_from_bits, flags_to_bits,
    primitive_from_bits, primitive_to_bits,
};
use crate::interface::ImplEntry;
use crate::property::PropertyImpl;
use crate::type_info::Flavor;
use crate::{Interface, PropertyFlags, PropertyInfo, RegistrationError, TypeFlags, TypeInfo, TypeRef};

/// Builder for the descriptor of an enum type `E`.
pub struct EnumInfoBuilder<E: Copy + 'static> {
    info: TypeInfo,
    codec: Arc<Codec<E>>,
}

impl<E: Copy + 'static> EnumInfoBuilder<E> {
    /// Starts an enum descriptor from explicit bit conversions.
    ///
    /// `from_bits` must return `None` for every pattern `E` cannot hold.
    pub fn new(
        name: impl Into<String>,
        to_bits: fn(E) -> u64,
        from_bits: fn(u64) -> Option<E>,
    ) -> Self {
        let codec = Arc::new(Codec::new(to_bits, from_bits));
        let erased: Arc<dyn EnumCodec> = codec.clone();
        Self {
            info: TypeInfo::new::<E>(name.into(), TypeFlags::NATIVE, Flavor::Enum(erased)),
            codec,
        }
    }

    /// Starts a descriptor for a `bitflags` type and registers every named,
    /// non-empty flag as a bit flag property.
    pub fn bit_flags(name: impl Into<String>) -> Result<Self, RegistrationError>
    where
        E: Flags,
        E::Bits: EnumBits,
    {
        let mut builder = Self::new(name, flags_to_bits::<E>, flags_from_bits::<E>);
        for flag in E::FLAGS.iter().filter(|flag| flag.is_named()) {
            if flag.value().is_empty() {
                continue;
            }
            builder = builder.flag(flag.name(), *flag.value())?;
        }
        Ok(builder)
    }

    /// Starts a descriptor for a C-like enum deriving `num_enum`'s
    /// `TryFromPrimitive` and `IntoPrimitive`.
    pub fn enumeration(name: impl Into<String>) -> Self
    where
        E: TryFromPrimitive + Into<<E as TryFromPrimitive>::Primitive>,
        E::Primitive: EnumBits,
    {
        Self::new(name, primitive_to_bits::<E>, primitive_from_bits::<E>)
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.info.name()
    }

    /// Sets the type flags. `NATIVE` is always kept.
    pub fn flags(mut self, flags: TypeFlags) -> Self {
        self.info.flags = flags | TypeFlags::NATIVE;
        self
    }

    /// Adds an enumerator property for `value`.
    pub fn value(self, name: impl Into<String>, value: E) -> Result<Self, RegistrationError> {
        self.push(name.into(), value, EnumPropertyKind::Enumerator)
    }

    /// Adds a bit flag property for the bits of `mask`.
    pub fn flag(self, name: impl Into<String>, mask: E) -> Result<Self, RegistrationError> {
        self.push(name.into(), mask, EnumPropertyKind::BitFlag)
    }

    fn push(
        mut self,
        name: String,
        value: E,
        kind: EnumPropertyKind,
    ) -> Result<Self, RegistrationError> {
        let codec: Arc<dyn EnumCodec> = self.codec.clone();
        let prop = PropertyInfo::new(
            name,
            self.info.properties.next_index(),
            PropertyFlags::empty(),
            TypeRef::of::<bool>(),
            TypeRef::of::<E>(),
            PropertyImpl::Enum(EnumProperty {
                value: self.codec.bits_of(value),
                kind,
                codec,
            }),
        );
        self.info
            .properties
            .insert(prop)
            .map_err(|prop| RegistrationError::DuplicateEnumValue {
                enum_name: self.info.name.clone(),
                value_name: prop.name().to_string(),
            })?;
        Ok(self)
    }

    /// Registers `record` as this enum's implementation of interface `I`.
    pub fn implements<I: Interface>(mut self, record: I) -> Result<Self, RegistrationError> {
        self.info
            .add_implementation(ImplEntry::new(record))
            .map_err(|entry| RegistrationError::DuplicateInterface {
                type_name: self.info.name.clone(),
                interface: entry.interface.name(),
            })?;
        Ok(self)
    }

    /// Finalizes the descriptor. An enum must expose at least one value.
    pub(crate) fn finish(self) -> Result<TypeInfo, RegistrationError> {
        if self.info.properties.is_empty() {
            return Err(RegistrationError::EmptyEnum(self.info.name));
        }
        Ok(self.info)
    }
}
