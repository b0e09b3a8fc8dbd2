//! Enum representation and enum-backed properties.
//!
//! An enum type is reflected through its integer value. The [`EnumCodec`]
//! converts between a Rust enum (a C-like enum or a `bitflags` type) and a
//! `u64` bit pattern, and refuses patterns the Rust type cannot represent.
//!
//! Each enum property tests or updates one value of the enum:
//!
//! - an **enumerator** property is `true` when the whole value equals its
//!   value; setting it stores the value, clearing it stores zero.
//! - a **bit flag** property is `true` when any of its mask bits is set;
//!   setting ORs the mask in, clearing ANDs it out.
//!
//! Setting a property to the state it already has leaves the value untouched.

use std::sync::Arc;

use bitflags::Flags;
use num_enum::TryFromPrimitive;

// ============================================================================
// Integer representations
// ============================================================================

/// Integer types usable as an enum representation.
///
/// Signed values are sign-extended into the `u64` pattern.
pub trait EnumBits: Copy + 'static {
    fn to_u64(self) -> u64;

    fn from_u64(bits: u64) -> Option<Self>;
}

macro_rules! impl_enum_bits_unsigned {
    ($($ty:ty),*) => {
        $(
            impl EnumBits for $ty {
                #[inline]
                fn to_u64(self) -> u64 {
                    self as u64
                }

                #[inline]
                fn from_u64(bits: u64) -> Option<Self> {
                    Self::try_from(bits).ok()
                }
            }
        )*
    };
}

macro_rules! impl_enum_bits_signed {
    ($($ty:ty),*) => {
        $(
            impl EnumBits for $ty {
                #[inline]
                fn to_u64(self) -> u64 {
                    self as i64 as u64
                }

                #[inline]
                fn from_u64(bits: u64) -> Option<Self> {
                    Self::try_from(bits as i64).ok()
                }
            }
        )*
    };
}

impl_enum_bits_unsigned!(u8, u16, u32, u64);
impl_enum_bits_signed!(i8, i16, i32, i64);

pub(crate) fn flags_to_bits<E>(value: E) -> u64
where
    E: Flags,
    E::Bits: EnumBits,
{
    value.bits().to_u64()
}

/// Decodes a flag set, keeping bits that no named flag covers.
///
/// Only patterns wider than `E::Bits` are rejected.
pub(crate) fn flags_from_bits<E>(bits: u64) -> Option<E>
where
    E: Flags,
    E::Bits: EnumBits,
{
    E::Bits::from_u64(bits).map(E::from_bits_retain)
}

pub(crate) fn primitive_to_bits<E>(value: E) -> u64
where
    E: TryFromPrimitive + Into<<E as TryFromPrimitive>::Primitive>,
    E::Primitive: EnumBits,
{
    let primitive: E::Primitive = value.into();
    primitive.to_u64()
}

pub(crate) fn primitive_from_bits<E>(bits: u64) -> Option<E>
where
    E: TryFromPrimitive,
    E::Primitive: EnumBits,
{
    E::Primitive::from_u64(bits).and_then(|primitive| E::try_from_primitive(primitive).ok())
}

// ============================================================================
// Codec
// ============================================================================

/// Reads and writes an erased enum value as a bit pattern.
pub(crate) trait EnumCodec: Send + Sync {
    /// # Safety
    ///
    /// `this` must point at a live value of the codec's enum.
    unsafe fn read(&self, this: *const u8) -> u64;

    /// Stores `bits` if the enum can represent them; returns `false` and
    /// leaves memory untouched otherwise.
    ///
    /// # Safety
    ///
    /// `this` must point at storage for the codec's enum (initialized or not).
    unsafe fn write(&self, this: *mut u8, bits: u64) -> bool;

    fn accepts(&self, bits: u64) -> bool;
}

pub(crate) struct Codec<E> {
    to_bits: fn(E) -> u64,
    from_bits: fn(u64) -> Option<E>,
}

impl<E> Codec<E> {
    pub(crate) fn new(to_bits: fn(E) -> u64, from_bits: fn(u64) -> Option<E>) -> Self {
        Self { to_bits, from_bits }
    }
}

impl<E: Copy + 'static> Codec<E> {
    pub(crate) fn bits_of(&self, value: E) -> u64 {
        (self.to_bits)(value)
    }
}

impl<E: Copy + 'static> EnumCodec for Codec<E> {
    unsafe fn read(&self, this: *const u8) -> u64 {
        // SAFETY: upheld by the caller.
        (self.to_bits)(unsafe { this.cast::<E>().read() })
    }

    unsafe fn write(&self, this: *mut u8, bits: u64) -> bool {
        match (self.from_bits)(bits) {
            Some(value) => {
                // SAFETY: upheld by the caller; `E: Copy` has nothing to drop.
                unsafe { this.cast::<E>().write(value) };
                true
            }
            None => false,
        }
    }

    fn accepts(&self, bits: u64) -> bool {
        (self.from_bits)(bits).is_some()
    }
}

// ============================================================================
// Enum properties
// ============================================================================

/// What an enum property tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumPropertyKind {
    /// Exact match against the whole value.
    Enumerator,
    /// Any bit of the mask set.
    BitFlag,
}

pub(crate) struct EnumProperty {
    pub(crate) value: u64,
    pub(crate) kind: EnumPropertyKind,
    pub(crate) codec: Arc<dyn EnumCodec>,
}

impl EnumProperty {
    #[inline]
    pub(crate) fn test(&self, bits: u64) -> bool {
        match self.kind {
            EnumPropertyKind::Enumerator => bits == self.value,
            EnumPropertyKind::BitFlag => bits & self.value != 0,
        }
    }

    pub(crate) fn apply(&self, bits: u64, on: bool) -> u64 {
        if self.test(bits) == on {
            return bits;
        }
        match (self.kind, on) {
            (EnumPropertyKind::Enumerator, true) => self.value,
            (EnumPropertyKind::Enumerator, false) => 0,
            (EnumPropertyKind::BitFlag, true) => bits | self.value,
            (EnumPropertyKind::BitFlag, false) => bits & !self.value,
        }
    }

    /// # Safety
    ///
    /// `this` must point at a live value of the codec's enum.
    pub(crate) unsafe fn get(&self, this: *const u8) -> bool {
        self.test(unsafe { self.codec.read(this) })
    }

    /// # Safety
    ///
    /// `this` must point at a live value of the codec's enum.
    ///
    /// # Panics
    ///
    /// Panics if the resulting pattern is not a valid value of the enum.
    pub(crate) unsafe fn set(&self, this: *mut u8, on: bool, enum_name: &str) {
        let current = unsafe { self.codec.read(this) };
        let next = self.apply(current, on);
        if next == current {
            return;
        }
        let written = unsafe { self.codec.write(this, next) };
        assert!(
            written,
            "{next:#x} is not a valid value of enum '{enum_name}'"
        );
    }
}
