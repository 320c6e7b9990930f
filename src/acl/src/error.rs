//! Error types for the ACL engine

use thiserror::Error;

/// Grammar violations found while parsing a pattern or a requested permission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// Empty string (or a lone `!`)
    #[error("pattern cannot be empty")]
    Empty,

    /// Two consecutive dots, or a leading/trailing dot
    #[error("empty segment at position {position}")]
    EmptySegment { position: usize },

    /// `#` somewhere other than the final segment
    #[error("multi-level wildcard '#' must be the last segment")]
    MultiWildcardNotLast,

    /// Segment outside `[A-Za-z0-9_-]+`
    #[error("invalid character in segment '{segment}'")]
    InvalidCharacter { segment: String },

    /// Requested permissions are concrete: no `*` or `#`
    #[error("wildcard segment '{segment}' not allowed in a permission")]
    WildcardInPermission { segment: String },

    /// Requested permissions are concrete: no `me` or `my_session`
    #[error("reserved word '{segment}' not allowed in a permission")]
    ReservedWordInPermission { segment: String },

    /// Requested permissions cannot be negated
    #[error("a permission cannot start with '!'")]
    NegatedPermission,
}

/// ACL engine errors
#[derive(Debug, Error)]
pub enum AclError {
    /// A grant entry violates the pattern grammar
    #[error("malformed pattern '{pattern}': {source}")]
    MalformedPattern {
        pattern: String,
        #[source]
        source: PatternError,
    },

    /// A requested permission violates the grammar (caller error)
    #[error("malformed permission '{permission}': {source}")]
    MalformedPermission {
        permission: String,
        #[source]
        source: PatternError,
    },

    /// Invalid engine configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AclError {
    /// Whether the error was caused by the caller's input rather than the
    /// engine, i.e. should map to a 4xx-class response.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MalformedPermission { .. })
    }
}

/// Result type for ACL operations
pub type Result<T> = std::result::Result<T, AclError>;
