//! Reserved word substitution
//!
//! Rewrites `me` and `my_session` segments into context values before a
//! pattern is compiled.

use crate::context::EvaluationContext;
use crate::pattern::{ReservedWord, NEGATION_PREFIX, SEPARATOR};

/// Whether any segment of the pattern is a reserved word
pub fn has_reserved_words(pattern: &str) -> bool {
    body(pattern)
        .split(SEPARATOR)
        .any(|segment| ReservedWord::from_segment(segment).is_some())
}

/// Substitutes reserved words with values from the context
///
/// A reserved word whose context field is absent, or is not a single
/// literal segment, is left in place; the compiler turns it into a matcher
/// that never matches, so a missing or malformed id fails closed.
///
/// # Examples
///
/// ```
/// use cretoai_acl::{reserved::substitute, EvaluationContext};
///
/// let ctx = EvaluationContext::new("u1");
/// assert_eq!(substitute("users.me.read", &ctx), "users.u1.read");
/// assert_eq!(substitute("!sessions.my_session.delete", &ctx), "!sessions.my_session.delete");
/// ```
pub fn substitute(pattern: &str, ctx: &EvaluationContext) -> String {
    if !has_reserved_words(pattern) {
        return pattern.to_string();
    }

    let prefix = &pattern[..pattern.len() - body(pattern).len()];
    let segments: Vec<&str> = body(pattern)
        .split(SEPARATOR)
        .map(|segment| {
            ReservedWord::from_segment(segment)
                .and_then(|word| ctx.resolve(word))
                .unwrap_or(segment)
        })
        .collect();

    let mut substituted = String::with_capacity(pattern.len());
    substituted.push_str(prefix);
    substituted.push_str(&segments.join(&SEPARATOR.to_string()));
    substituted
}

fn body(pattern: &str) -> &str {
    pattern.strip_prefix(NEGATION_PREFIX).unwrap_or(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_me() {
        let ctx = EvaluationContext::new("u1");
        assert_eq!(substitute("users.me.read", &ctx), "users.u1.read");
        assert_eq!(substitute("me", &ctx), "u1");
    }

    #[test]
    fn test_substitute_session() {
        let ctx = EvaluationContext::new("u1").with_session("s1");
        assert_eq!(
            substitute("users.me.sessions.my_session.delete", &ctx),
            "users.u1.sessions.s1.delete"
        );
    }

    #[test]
    fn test_missing_session_left_in_place() {
        let ctx = EvaluationContext::new("u1");
        assert_eq!(
            substitute("users.me.sessions.my_session", &ctx),
            "users.u1.sessions.my_session"
        );
    }

    #[test]
    fn test_negation_prefix_preserved() {
        let ctx = EvaluationContext::new("u1");
        assert_eq!(substitute("!users.me.delete", &ctx), "!users.u1.delete");
    }

    #[test]
    fn test_only_whole_segments() {
        let ctx = EvaluationContext::new("u1");
        assert_eq!(substitute("meetings.name.me_too", &ctx), "meetings.name.me_too");
        assert!(!has_reserved_words("meetings.name.me_too"));
        assert!(has_reserved_words("!a.me"));
    }

    #[test]
    fn test_non_literal_ids_left_in_place() {
        for subject in ["*", "#", "a.#", "u1.x", "!u1", ""] {
            let ctx = EvaluationContext::new(subject).with_session(subject);
            assert_eq!(substitute("users.me.read", &ctx), "users.me.read", "subject '{}'", subject);
            assert_eq!(
                substitute("sessions.my_session.delete", &ctx),
                "sessions.my_session.delete",
                "session '{}'",
                subject
            );
        }
    }

    #[test]
    fn test_wildcards_untouched() {
        let ctx = EvaluationContext::new("u1").with_session("s1");
        assert_eq!(substitute("users.me.*", &ctx), "users.u1.*");
        assert_eq!(substitute("users.me.#", &ctx), "users.u1.#");
    }
}
