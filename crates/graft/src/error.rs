//! Error types for graft operations.

use crate::Path;
use thiserror::Error;

/// Result type alias for graft operations.
pub type GraftResult<T> = Result<T, GraftError>;

/// Errors that can occur while extracting paths, resolving strategies or
/// rebuilding an object graph.
///
/// Every variant reflects a static mismatch between a path, a type's
/// descriptor and the engine's configuration, so nothing is retried.
#[derive(Debug, Error)]
pub enum GraftError {
    /// A required argument (root, path or conversion source) is absent.
    #[error("argument '{argument}' must not be null")]
    NullArgument {
        /// Name of the missing argument.
        argument: &'static str,
    },

    /// The path contains a node that cannot be turned into an access step.
    #[error("unable to process path expression '{expression}': {reason}")]
    UnsupportedPath {
        /// Literal text of the offending node, from the root.
        expression: String,
        /// Why the node was rejected.
        reason: String,
    },

    /// No override is registered and the type does not expose exactly one
    /// eligible constructor.
    #[error(
        "unable to find appropriate constructor of type '{type_name}' \
         (found {candidates}); consider registering a strategy override"
    )]
    ConstructorAmbiguity {
        /// The type being constructed.
        type_name: String,
        /// Number of eligible constructors found.
        candidates: usize,
    },

    /// A constructor parameter matches zero or several properties.
    #[error(
        "unable to find appropriate property to use as constructor parameter \
         '{parameter}' of type '{type_name}'; consider registering a strategy override"
    )]
    PropertyBinding {
        /// The unmatched parameter.
        parameter: String,
        /// The type declaring the constructor.
        type_name: String,
    },

    /// The property being replaced is not bound to any constructor parameter.
    #[error(
        "unable to construct object of type '{type_name}': no constructor parameter \
         matches property '{property}'"
    )]
    UnassignableProperty {
        /// The property that was targeted.
        property: String,
        /// The type owning the property.
        type_name: String,
    },

    /// A strategy override was rejected at registration time.
    #[error("invalid strategy override: {message}")]
    InvalidOverride {
        /// Description of what went wrong.
        message: String,
    },

    /// Traversal reached a null value before the end of the path.
    #[error("path not found: {path}")]
    PathNotFound {
        /// The path that could not be reached.
        path: Path,
    },

    /// List index is out of bounds.
    #[error("index {index} out of bounds (len: {len}) at path {path}")]
    IndexOutOfBounds {
        /// The path to the list.
        path: Path,
        /// The index that was accessed.
        index: usize,
        /// The actual length of the list.
        len: usize,
    },

    /// A value has a different kind than the slot it is assigned to.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// The slot where the mismatch occurred.
        path: Path,
        /// The expected kind.
        expected: &'static str,
        /// The kind that was supplied.
        found: &'static str,
    },

    /// An in-place write was attempted on a list that cannot be mutated.
    #[error("list at {path} cannot be written in place")]
    ImmutableList {
        /// The path to the list.
        path: Path,
    },
}

impl GraftError {
    /// Create a null argument error.
    #[inline]
    pub fn null_argument(argument: &'static str) -> Self {
        GraftError::NullArgument { argument }
    }

    /// Create an unsupported path error.
    #[inline]
    pub fn unsupported_path(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        GraftError::UnsupportedPath {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// Create a constructor ambiguity error.
    #[inline]
    pub fn constructor_ambiguity(type_name: impl Into<String>, candidates: usize) -> Self {
        GraftError::ConstructorAmbiguity {
            type_name: type_name.into(),
            candidates,
        }
    }

    /// Create a property binding error.
    #[inline]
    pub fn property_binding(parameter: impl Into<String>, type_name: impl Into<String>) -> Self {
        GraftError::PropertyBinding {
            parameter: parameter.into(),
            type_name: type_name.into(),
        }
    }

    /// Create an unassignable property error.
    #[inline]
    pub fn unassignable_property(property: impl Into<String>, type_name: impl Into<String>) -> Self {
        GraftError::UnassignableProperty {
            property: property.into(),
            type_name: type_name.into(),
        }
    }

    /// Create an invalid override error.
    #[inline]
    pub fn invalid_override(message: impl Into<String>) -> Self {
        GraftError::InvalidOverride {
            message: message.into(),
        }
    }

    /// Create a path not found error.
    #[inline]
    pub fn path_not_found(path: Path) -> Self {
        GraftError::PathNotFound { path }
    }

    /// Create an index out of bounds error.
    #[inline]
    pub fn index_out_of_bounds(path: Path, index: usize, len: usize) -> Self {
        GraftError::IndexOutOfBounds { path, index, len }
    }

    /// Create a type mismatch error.
    #[inline]
    pub fn type_mismatch(path: Path, expected: &'static str, found: &'static str) -> Self {
        GraftError::TypeMismatch {
            path,
            expected,
            found,
        }
    }

    /// Create an immutable list error.
    #[inline]
    pub fn immutable_list(path: Path) -> Self {
        GraftError::ImmutableList { path }
    }

    /// Prefix the path carried by this error.
    ///
    /// Values are converted without knowing where they sit in the graph, so
    /// callers re-anchor the error at the slot they were filling.
    pub fn with_prefix(self, prefix: &Path) -> Self {
        match self {
            GraftError::PathNotFound { path } => GraftError::PathNotFound {
                path: prefix.join(&path),
            },
            GraftError::TypeMismatch {
                path,
                expected,
                found,
            } => GraftError::TypeMismatch {
                path: prefix.join(&path),
                expected,
                found,
            },
            GraftError::IndexOutOfBounds { path, index, len } => GraftError::IndexOutOfBounds {
                path: prefix.join(&path),
                index,
                len,
            },
            other => other,
        }
    }
}
