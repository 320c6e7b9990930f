/// Segment AST for compiled permission patterns
///
/// Provides the tagged segment matchers a pattern compiles into and the
/// structural match against a concrete permission.

use std::fmt;
use std::str::FromStr;

use crate::error::AclError;

/// Single-level wildcard token
pub const SINGLE_WILDCARD: &str = "*";

/// Multi-level wildcard token
pub const MULTI_WILDCARD: &str = "#";

/// Negation prefix
pub const NEGATION_PREFIX: char = '!';

/// Segment separator
pub const SEPARATOR: char = '.';

/// Literal segments bound to a value of the evaluation context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedWord {
    /// `me`, the subject id
    Me,
    /// `my_session`, the session id
    MySession,
}

impl ReservedWord {
    /// Recognizes a reserved word segment
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "me" => Some(Self::Me),
            "my_session" => Some(Self::MySession),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Me => "me",
            Self::MySession => "my_session",
        }
    }
}

/// One segment matcher of a compiled pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Matches one segment equal to the value
    Literal(String),
    /// `*`: matches exactly one arbitrary segment
    Single,
    /// `#`: matches one or more trailing segments
    Multi,
    /// Reserved word left unresolved because its context field was absent.
    /// Never matches anything.
    Unresolved(ReservedWord),
}

impl Segment {
    /// Checks this matcher against one concrete segment.
    ///
    /// `Multi` is handled by [`CompiledPattern::matches_segments`] since it
    /// consumes the rest of the permission.
    fn matches(&self, segment: &str) -> bool {
        match self {
            Self::Literal(value) => value == segment,
            Self::Single | Self::Multi => true,
            Self::Unresolved(_) => false,
        }
    }

    /// Whether this is `*` or `#`
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Single | Self::Multi)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.write_str(value),
            Self::Single => f.write_str(SINGLE_WILDCARD),
            Self::Multi => f.write_str(MULTI_WILDCARD),
            Self::Unresolved(word) => f.write_str(word.as_str()),
        }
    }
}

/// A permission pattern compiled into segment matchers
///
/// Immutable once built; shared behind `Arc` by the pattern cache and every
/// access checker holding it.
///
/// # Examples
///
/// ```
/// use cretoai_acl::pattern::{compile, Permission};
///
/// let pattern = compile("confd.users.*").unwrap();
/// let permission = Permission::parse("confd.users.read").unwrap();
/// assert!(pattern.matches(&permission));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompiledPattern {
    pub(crate) segments: Vec<Segment>,
    pub(crate) negated: bool,
}

impl CompiledPattern {
    /// Returns the segment matchers
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the pattern was prefixed with `!`
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Whether the pattern is exactly `#` (negated or not)
    pub fn is_superuser(&self) -> bool {
        matches!(self.segments.as_slice(), [Segment::Multi])
    }

    /// Structural match against a parsed permission
    pub fn matches(&self, permission: &Permission<'_>) -> bool {
        self.matches_segments(permission.segments())
    }

    /// Structural match against concrete segments.
    ///
    /// Both lists are walked in lockstep. Lengths must agree unless the
    /// pattern ends in `#`, which needs at least one remaining segment.
    pub fn matches_segments(&self, requested: &[&str]) -> bool {
        let mut rest = requested;

        for matcher in &self.segments {
            if *matcher == Segment::Multi {
                return !rest.is_empty();
            }

            let Some((head, tail)) = rest.split_first() else {
                return false;
            };
            if !matcher.matches(head) {
                return false;
            }
            rest = tail;
        }

        rest.is_empty()
    }
}

impl fmt::Display for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "{}", NEGATION_PREFIX)?;
        }
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                write!(f, "{}", SEPARATOR)?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for CompiledPattern {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        super::compile(s)
    }
}

/// A concrete, requested permission split into segments
///
/// Contains no wildcards, no reserved words and no negation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission<'a> {
    raw: &'a str,
    segments: Vec<&'a str>,
}

impl<'a> Permission<'a> {
    /// Parses a requested permission, rejecting anything that is not a
    /// concrete dot-separated literal path.
    pub fn parse(raw: &'a str) -> crate::error::Result<Self> {
        let segments = super::compiler::parse_permission(raw).map_err(|source| {
            AclError::MalformedPermission {
                permission: raw.to_string(),
                source,
            }
        })?;
        Ok(Self { raw, segments })
    }

    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    pub fn as_str(&self) -> &'a str {
        self.raw
    }
}

impl fmt::Display for Permission<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw)
    }
}
