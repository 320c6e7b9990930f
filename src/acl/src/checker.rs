//! Access checker: negation-partitioned compiled grant set

use std::sync::Arc;

use tracing::warn;

use crate::context::EvaluationContext;
use crate::error::Result;
use crate::pattern::{compile, CompiledPattern, Permission};
use crate::reserved::substitute;

/// Compiled grant set for one subject, session and grant list
///
/// Deny patterns (`!`-prefixed grants) always win over allow patterns; a
/// permission matched by nothing is denied.
///
/// # Examples
///
/// ```
/// use cretoai_acl::{AccessChecker, EvaluationContext};
///
/// let ctx = EvaluationContext::new("u1");
/// let checker = AccessChecker::from_grants(&["a.#", "!a.b.delete"], &ctx);
///
/// assert!(checker.matches("a.b.read").unwrap());
/// assert!(!checker.matches("a.b.delete").unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AccessChecker {
    allow: Vec<Arc<CompiledPattern>>,
    deny: Vec<Arc<CompiledPattern>>,
}

impl AccessChecker {
    /// Builds a checker from already substituted and compiled patterns
    pub fn new(patterns: impl IntoIterator<Item = Arc<CompiledPattern>>) -> Self {
        let (deny, allow) = patterns.into_iter().partition(|p| p.is_negated());
        Self { allow, deny }
    }

    /// Substitutes and compiles grants without any caching
    ///
    /// Malformed grants are logged and skipped.
    pub fn from_grants<S: AsRef<str>>(grants: &[S], ctx: &EvaluationContext) -> Self {
        let patterns = grants.iter().filter_map(|grant| {
            let grant = grant.as_ref();
            match compile(&substitute(grant, ctx)) {
                Ok(pattern) => Some(Arc::new(pattern)),
                Err(e) => {
                    warn!("Skipping grant '{}' for subject {}: {}", grant, ctx.subject_id(), e);
                    None
                }
            }
        });
        Self::new(patterns)
    }

    /// Checks a requested permission string
    ///
    /// # Errors
    ///
    /// Returns [`crate::AclError::MalformedPermission`] if `requested` is not
    /// a concrete permission.
    pub fn matches(&self, requested: &str) -> Result<bool> {
        let permission = Permission::parse(requested)?;
        Ok(self.matches_permission(&permission))
    }

    /// Checks an already parsed permission
    pub fn matches_permission(&self, permission: &Permission<'_>) -> bool {
        if self.deny.iter().any(|p| p.matches(permission)) {
            return false;
        }
        self.allow.iter().any(|p| p.matches(permission))
    }

    /// Number of non-negated patterns
    pub fn allow_count(&self) -> usize {
        self.allow.len()
    }

    /// Number of negated patterns
    pub fn deny_count(&self) -> usize {
        self.deny.len()
    }
}
