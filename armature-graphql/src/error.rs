// Error types for resolver registration and invocation

use crate::class::ClassRef;
use thiserror::Error;

/// Contract violations detected while registering resolver classes or
/// building resolver maps.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphQLError {
    #[error("Method `{method}` on resolver `{class}` is annotated but has no body")]
    UndefinedMethod { class: &'static str, method: String },

    #[error("Method `{method}` on resolver `{class}` is annotated as {expected} but its body is a {found}")]
    MethodKindMismatch {
        class: &'static str,
        method: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Field `{method}` on resolver `{class}` declares an empty type name")]
    EmptyTypeName { class: &'static str, method: String },

    #[error("Field `{method}` on resolver `{class}` targets reserved root type `{type_name}`")]
    ReservedTypeName {
        class: &'static str,
        method: String,
        type_name: String,
    },

    #[error("Parameter {index} of `{method}` on resolver `{class}` is bound to a method without a resolver annotation")]
    OrphanParameter {
        class: &'static str,
        method: String,
        index: usize,
    },

    #[error("Parameter {index} of `{method}` on resolver `{class}` exceeds the limit of {limit} parameters")]
    ParameterIndexOutOfRange {
        class: &'static str,
        method: String,
        index: usize,
        limit: usize,
    },

    #[error("Resolver `{0}` is not registered")]
    ClassNotRegistered(&'static str),

    #[error("Resolver `{0}` was registered without an instance factory")]
    MissingFactory(&'static str),

    #[error("Unknown parameter type: {0}")]
    UnknownParameterType(String),
}

impl GraphQLError {
    pub(crate) fn undefined_method(class: ClassRef, method: &str) -> Self {
        Self::UndefinedMethod {
            class: class.name(),
            method: method.to_string(),
        }
    }
}

/// Errors raised while a resolver is being invoked.
///
/// Errors returned by resolver methods travel through [`ResolverError::Source`]
/// untouched, so the engine (or a test) can downcast them back.
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Source(Box<dyn std::error::Error + Send + Sync>),

    #[error("Invalid argument at position {index}: {source}")]
    Argument {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize resolver output: {0}")]
    Output(#[source] serde_json::Error),
}

impl ResolverError {
    /// Create an error from a plain message
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Wrap an arbitrary error without altering it
    pub fn from_error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Source(Box::new(error))
    }

    /// Borrow the wrapped error as its concrete type, if it is one
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Source(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

impl From<String> for ResolverError {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for ResolverError {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for ResolverError {
    fn from(error: Box<dyn std::error::Error + Send + Sync>) -> Self {
        match error.downcast::<ResolverError>() {
            Ok(error) => *error,
            Err(error) => Self::Source(error),
        }
    }
}

impl From<std::convert::Infallible> for ResolverError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

/// Result type for registration and build operations
pub type Result<T> = std::result::Result<T, GraphQLError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("user not found: {0}")]
    struct NotFound(u32);

    #[test]
    fn test_source_errors_are_preserved() {
        let error = ResolverError::from_error(NotFound(7));
        assert_eq!(error.to_string(), "user not found: 7");
        assert_eq!(error.downcast_ref::<NotFound>().map(|e| e.0), Some(7));
    }

    #[test]
    fn test_message_conversions() {
        let error: ResolverError = "boom".into();
        assert!(matches!(error, ResolverError::Message(ref m) if m == "boom"));
        assert!(error.downcast_ref::<NotFound>().is_none());
    }

    #[test]
    fn test_graphql_error_display() {
        let error = GraphQLError::ReservedTypeName {
            class: "UserResolver",
            method: "me".to_string(),
            type_name: "Query".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Field `me` on resolver `UserResolver` targets reserved root type `Query`"
        );
    }
}
