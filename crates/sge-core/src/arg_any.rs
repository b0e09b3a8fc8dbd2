//! Constructor arguments.
//!
//! [`ArgAny`] carries one argument of a reflected constructor call: scalars
//! by value, everything else as a borrowed [`Any`] view. The callee knows the
//! expected signature from [`ConstructorInfo::arg_types`] and extracts each
//! argument with [`ArgAny::get`].
//!
//! [`ConstructorInfo::arg_types`]: crate::ConstructorInfo::arg_types

use std::any::{Any as StdAny, TypeId};

use crate::{Any, TypeInfo};

/// One argument of a reflected call.
#[derive(Clone, Copy, Debug)]
pub enum ArgAny<'a> {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    /// A borrowed non-scalar value.
    Object(Any<'a>),
}

impl<'a> ArgAny<'a> {
    #[inline]
    pub fn object(value: Any<'a>) -> Self {
        ArgAny::Object(value)
    }

    /// Replaces the stored argument.
    #[inline]
    pub fn set(&mut self, value: impl Into<ArgAny<'a>>) {
        *self = value.into();
    }

    fn scalar(&self) -> Option<&dyn StdAny> {
        let value: &dyn StdAny = match self {
            ArgAny::Bool(v) => v,
            ArgAny::I8(v) => v,
            ArgAny::U8(v) => v,
            ArgAny::I16(v) => v,
            ArgAny::U16(v) => v,
            ArgAny::I32(v) => v,
            ArgAny::U32(v) => v,
            ArgAny::I64(v) => v,
            ArgAny::U64(v) => v,
            ArgAny::F32(v) => v,
            ArgAny::F64(v) => v,
            ArgAny::Object(_) => return None,
        };
        Some(value)
    }

    /// The Rust type of the stored argument.
    pub fn type_id(&self) -> TypeId {
        match self {
            ArgAny::Object(value) => value.type_info().type_id(),
            _ => self
                .scalar()
                .map(|value| value.type_id())
                .unwrap_or_else(TypeId::of::<()>),
        }
    }

    /// Returns the argument as `T` if it holds a `T`, or an object of a
    /// type deriving from `T`.
    pub fn try_get<T: 'static>(&self) -> Option<&T> {
        match self {
            ArgAny::Object(value) => value.upcast::<T>(),
            _ => self.scalar().and_then(|v| v.downcast_ref::<T>()),
        }
    }

    /// Returns the argument as `T`.
    ///
    /// # Panics
    ///
    /// Panics if the argument does not hold a `T`.
    pub fn get<T: 'static>(&self) -> &T {
        match self.try_get::<T>() {
            Some(value) => value,
            None => panic!(
                "argument {:?} is not a `{}`",
                self,
                std::any::type_name::<T>()
            ),
        }
    }

    /// Returns `true` if the argument can be passed where `ty` is expected.
    ///
    /// Agrees with [`try_get`](Self::try_get): an argument that matches the
    /// descriptor of `T` can be extracted as a `T`.
    pub fn matches(&self, ty: &TypeInfo) -> bool {
        match self {
            ArgAny::Object(value) => value.type_info().derives_from(ty),
            _ => ty.type_id() == self.type_id(),
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ArgAny<'_> {
                #[inline]
                fn from(value: $ty) -> Self {
                    ArgAny::$variant(value)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

impl<'a> From<Any<'a>> for ArgAny<'a> {
    #[inline]
    fn from(value: Any<'a>) -> Self {
        ArgAny::Object(value)
    }
}
