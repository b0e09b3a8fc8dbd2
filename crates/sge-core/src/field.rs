//! Field descriptors: raw offset access.

use crate::members::Member;
use crate::{Any, AnyMut, FieldFlags, TypeInfo, TypeRef};

/// A named byte offset into a type, tagged with the field's type.
#[derive(Debug)]
pub struct FieldInfo {
    name: String,
    index: usize,
    flags: FieldFlags,
    offset: usize,
    ty: TypeRef,
    owner: TypeRef,
}

impl FieldInfo {
    pub(crate) fn new(
        name: String,
        index: usize,
        flags: FieldFlags,
        offset: usize,
        ty: TypeRef,
        owner: TypeRef,
    ) -> Self {
        Self {
            name,
            index,
            flags,
            offset,
            ty,
            owner,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registration index within the owning type.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn flags(&self) -> FieldFlags {
        self.flags
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn field_type(&self) -> &'static TypeInfo {
        self.ty.get()
    }

    #[inline]
    pub fn owner(&self) -> &'static TypeInfo {
        self.owner.get()
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.flags.contains(FieldFlags::READONLY)
    }

    /// A view of the field inside `this`.
    ///
    /// # Panics
    ///
    /// Panics if `this` is not an instance of the owning type or a type
    /// deriving from it.
    pub fn get<'a>(&self, this: Any<'a>) -> Any<'a> {
        self.check_owner(this.type_info());
        // SAFETY: `this` is a live instance of the owner, which has this
        // field at `offset`.
        unsafe { self.get_raw(this.as_ptr()) }
    }

    /// A mutable view of the field inside `this`.
    ///
    /// # Panics
    ///
    /// Panics if `this` has the wrong type or the field is read-only.
    pub fn get_mut<'a>(&self, this: AnyMut<'a>) -> AnyMut<'a> {
        self.check_owner(this.type_info());
        assert!(
            !self.is_read_only(),
            "field '{}.{}' is read-only",
            self.owner().name(),
            self.name
        );
        let mut this = this;
        let ptr = this.as_mut_ptr();
        // SAFETY: as in `get`; the write view is consumed into the result.
        unsafe { AnyMut::from_raw(ptr.add(self.offset), self.field_type()) }
    }

    /// A view of the field at `this + offset`, without checks.
    ///
    /// # Safety
    ///
    /// `this` must point at a live instance of the owning type (or a
    /// layout-compatible derived type) that outlives `'a`.
    #[inline]
    pub unsafe fn get_raw<'a>(&self, this: *const u8) -> Any<'a> {
        unsafe { Any::from_raw(this.add(self.offset), self.field_type()) }
    }

    fn check_owner(&self, ty: &TypeInfo) {
        let owner = self.owner();
        assert!(
            ty.derives_from(owner),
            "field '{}.{}' accessed through a '{}'",
            owner.name(),
            self.name,
            ty.name()
        );
    }

    pub(crate) fn type_refs(&self) -> [&TypeRef; 2] {
        [&self.ty, &self.owner]
    }
}

impl Member for FieldInfo {
    fn name(&self) -> &str {
        &self.name
    }
}
