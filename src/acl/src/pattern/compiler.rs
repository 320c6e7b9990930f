/// Pattern compiler and permission parser
///
/// Both share the same grammar:
///
/// ```text
/// pattern    := ["!"] segment ("." segment)*
/// segment    := literal | "*" | "#" | "me" | "my_session"
/// literal    := (alnum | "-" | "_")+
/// ```
///
/// A requested permission is the literal-only subset of it.

use super::types::{
    CompiledPattern, ReservedWord, Segment, MULTI_WILDCARD, NEGATION_PREFIX, SEPARATOR,
    SINGLE_WILDCARD,
};
use crate::error::{AclError, PatternError, Result};

/// Compiles a permission pattern into segment matchers
///
/// The `!` prefix applies to the whole pattern. Reserved words that reach
/// the compiler (i.e. were not substituted) compile to
/// [`Segment::Unresolved`] and never match.
///
/// # Errors
///
/// Returns [`AclError::MalformedPattern`] on an empty pattern, an empty
/// segment, a `#` that is not last, or a character outside the literal set.
pub fn compile(pattern: &str) -> Result<CompiledPattern> {
    compile_segments(pattern).map_err(|source| AclError::MalformedPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn compile_segments(pattern: &str) -> std::result::Result<CompiledPattern, PatternError> {
    let (negated, body) = match pattern.strip_prefix(NEGATION_PREFIX) {
        Some(body) => (true, body),
        None => (false, pattern),
    };

    if body.is_empty() {
        return Err(PatternError::Empty);
    }

    let raw: Vec<&str> = body.split(SEPARATOR).collect();
    let last = raw.len() - 1;
    let mut segments = Vec::with_capacity(raw.len());

    for (position, token) in raw.into_iter().enumerate() {
        let segment = match token {
            "" => return Err(PatternError::EmptySegment { position }),
            SINGLE_WILDCARD => Segment::Single,
            MULTI_WILDCARD if position == last => Segment::Multi,
            MULTI_WILDCARD => return Err(PatternError::MultiWildcardNotLast),
            _ => match ReservedWord::from_segment(token) {
                Some(word) => Segment::Unresolved(word),
                None => Segment::Literal(validate_literal(token)?.to_string()),
            },
        };
        segments.push(segment);
    }

    Ok(CompiledPattern { segments, negated })
}

/// Splits a requested permission into concrete segments
pub(crate) fn parse_permission(raw: &str) -> std::result::Result<Vec<&str>, PatternError> {
    if raw.is_empty() {
        return Err(PatternError::Empty);
    }
    if raw.starts_with(NEGATION_PREFIX) {
        return Err(PatternError::NegatedPermission);
    }

    raw.split(SEPARATOR)
        .enumerate()
        .map(|(position, token)| match token {
            "" => Err(PatternError::EmptySegment { position }),
            SINGLE_WILDCARD | MULTI_WILDCARD => Err(PatternError::WildcardInPermission {
                segment: token.to_string(),
            }),
            _ if ReservedWord::from_segment(token).is_some() => {
                Err(PatternError::ReservedWordInPermission {
                    segment: token.to_string(),
                })
            }
            _ => validate_literal(token),
        })
        .collect()
}

fn validate_literal(token: &str) -> std::result::Result<&str, PatternError> {
    if token.chars().all(is_literal_char) {
        Ok(token)
    } else {
        Err(PatternError::InvalidCharacter {
            segment: token.to_string(),
        })
    }
}

/// Whether `token` is exactly one concrete literal segment: non-empty,
/// within the literal alphabet and not a reserved word
pub(crate) fn is_literal_segment(token: &str) -> bool {
    !token.is_empty()
        && token.chars().all(is_literal_char)
        && ReservedWord::from_segment(token).is_none()
}

fn is_literal_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
