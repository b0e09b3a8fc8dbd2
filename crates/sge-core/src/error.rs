//! Registration errors.
//!
//! Reflection has two kinds of failure:
//!
//! - **Registration failures** happen while descriptors are assembled and the
//!   registry is frozen (duplicate names, unregistered member types). They
//!   are reported as [`RegistrationError`] values so startup code can decide
//!   what to do.
//! - **Precondition violations** happen when a caller misuses a frozen
//!   descriptor: invoking an absent lifecycle capability, calling a
//!   constructor with the wrong arity, writing a read-only property, calling
//!   an empty [`UFunction`](crate::UFunction). These are programmer errors
//!   and panic.
//!
//! A lookup that finds nothing (no such property, no constructor of that
//! arity, no implementation of an interface) is neither: it returns `None`.

use thiserror::Error;

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while building descriptors or freezing a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A referenced type was not found.
    #[error("type not found: {0}")]
    TypeNotFound(String),

    /// A type with this name or Rust type is already registered.
    #[error("duplicate type: {0}")]
    DuplicateType(String),

    /// A member with this name already exists on the type.
    #[error("duplicate registration: '{name}' already registered as a {kind} of '{type_name}'")]
    DuplicateRegistration {
        /// The owning type.
        type_name: String,
        /// The duplicated member name.
        name: String,
        /// The kind of member ("property", "field", "named constructor").
        kind: &'static str,
    },

    /// Two positional constructors with the same arity.
    #[error("type '{type_name}' already has a constructor taking {arity} argument(s)")]
    DuplicateConstructorArity {
        /// The owning type.
        type_name: String,
        /// The duplicated arity.
        arity: usize,
    },

    /// A duplicate enum value was registered.
    #[error("duplicate enum value: '{value_name}' in enum '{enum_name}'")]
    DuplicateEnumValue {
        /// The enum name.
        enum_name: String,
        /// The duplicate value name.
        value_name: String,
    },

    /// An enum was registered without any values.
    #[error("enum '{0}' has no values")]
    EmptyEnum(String),

    /// The type already implements the interface.
    #[error("type '{type_name}' already implements interface '{interface}'")]
    DuplicateInterface {
        /// The implementing type.
        type_name: String,
        /// The interface name.
        interface: &'static str,
    },

    /// Two distinct interface descriptors share a name.
    #[error("interface '{0}' is declared by more than one descriptor")]
    InterfaceCollision(&'static str),

    /// A member refers to a Rust type that was never registered.
    #[error("'{owner}.{member}' refers to unregistered type `{rust_type}`")]
    UnresolvedType {
        /// The type declaring the member.
        owner: String,
        /// The member name (or a constructor description).
        member: String,
        /// The Rust name of the missing type.
        rust_type: &'static str,
    },

    /// A registry is already installed as the process-global registry.
    #[error("a global registry is already installed")]
    AlreadyInstalled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = RegistrationError::DuplicateConstructorArity {
            type_name: "Point".to_string(),
            arity: 2,
        };
        assert_eq!(
            err.to_string(),
            "type 'Point' already has a constructor taking 2 argument(s)"
        );

        let err = RegistrationError::UnresolvedType {
            owner: "Line".to_string(),
            member: "start".to_string(),
            rust_type: "demo::Point",
        };
        assert_eq!(
            err.to_string(),
            "'Line.start' refers to unregistered type `demo::Point`"
        );
    }
}
