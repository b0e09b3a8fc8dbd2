//! Attribute parsing for `#[reflect(...)]`.

use syn::{Attribute, LitStr};

/// Parsed `#[reflect(...)]` attributes on a type.
#[derive(Debug, Default)]
pub struct TypeAttrs {
    /// Override the registered name (default: the Rust struct name)
    pub name: Option<String>,
    /// Register default construction (`T: Default`)
    pub default: bool,
    /// Register copy construction and assignment (`T: Clone`)
    pub clone: bool,
    /// Register equality (`T: PartialEq`)
    pub eq: bool,
    /// Set `TypeFlags::SCRIPT_NOCONSTRUCT`
    pub no_construct: bool,
}

/// How a field is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// A raw field descriptor (`FieldInfo`)
    Field,
    /// A field-backed property (`PropertyInfo`)
    Property,
}

/// Parsed `#[reflect(...)]` attributes on a field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Exposure; `None` leaves the field unreflected
    pub kind: Option<MemberKind>,
    /// Override the member name
    pub name: Option<String>,
    /// Read-only field or property
    pub readonly: bool,
    /// `FieldFlags::TRANSIENT`
    pub transient: bool,
    /// `PropertyFlags::EDITOR_ONLY`
    pub editor_only: bool,
    /// `PropertyFlags::EDITOR_HIDDEN`
    pub editor_hidden: bool,
    /// `PropertyFlags::EDITOR_DEFAULT_COLLAPSED`
    pub collapsed: bool,
}

fn unknown(meta: &syn::meta::ParseNestedMeta<'_>, what: &str) -> syn::Error {
    meta.error(format!(
        "unknown reflect {what}attribute: {}",
        meta.path
            .get_ident()
            .map(|i| i.to_string())
            .unwrap_or_default()
    ))
}

impl TypeAttrs {
    /// Parse attributes from a list of `#[reflect(...)]` attributes.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("reflect") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    result.name = Some(value.value());
                } else if meta.path.is_ident("default") {
                    result.default = true;
                } else if meta.path.is_ident("clone") {
                    result.clone = true;
                } else if meta.path.is_ident("eq") {
                    result.eq = true;
                } else if meta.path.is_ident("no_construct") {
                    result.no_construct = true;
                } else {
                    return Err(unknown(&meta, ""));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }
}

impl FieldAttrs {
    /// Parse attributes from a list of `#[reflect(...)]` attributes.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("reflect") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("field") {
                    result.set_kind(&meta, MemberKind::Field)?;
                } else if meta.path.is_ident("property") {
                    result.set_kind(&meta, MemberKind::Property)?;
                } else if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    result.name = Some(value.value());
                } else if meta.path.is_ident("readonly") {
                    result.readonly = true;
                } else if meta.path.is_ident("transient") {
                    result.transient = true;
                } else if meta.path.is_ident("editor_only") {
                    result.editor_only = true;
                } else if meta.path.is_ident("editor_hidden") {
                    result.editor_hidden = true;
                } else if meta.path.is_ident("collapsed") {
                    result.collapsed = true;
                } else {
                    return Err(unknown(&meta, "field "));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }

    fn set_kind(
        &mut self,
        meta: &syn::meta::ParseNestedMeta<'_>,
        kind: MemberKind,
    ) -> syn::Result<()> {
        if self.kind.is_some_and(|existing| existing != kind) {
            return Err(meta.error("a field is reflected either as `field` or as `property`"));
        }
        self.kind = Some(kind);
        Ok(())
    }
}
