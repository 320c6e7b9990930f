//! ACL checker facade
//!
//! Higher level questions over one access checker: any-of, all-of,
//! superuser and delegation checks.

use std::sync::Arc;

use tracing::warn;

use crate::checker::AccessChecker;
use crate::context::EvaluationContext;
use crate::error::Result;
use crate::pattern::{Permission, MULTI_WILDCARD};

/// Authorization view of one subject's grants
///
/// # Examples
///
/// ```
/// use cretoai_acl::{AclEngine, EvaluationContext};
///
/// let engine = AclEngine::default();
/// let acl = engine.acl(&["orders.read"], EvaluationContext::new("u1"));
///
/// assert!(acl.can_grant("orders.read").unwrap());
/// assert!(!acl.can_grant("orders.write").unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct AclChecker {
    checker: Arc<AccessChecker>,
    grants: Vec<String>,
    context: EvaluationContext,
}

impl AclChecker {
    /// Wraps an access checker built from `grants` for `context`
    pub fn new<S: AsRef<str>>(
        checker: Arc<AccessChecker>,
        grants: &[S],
        context: EvaluationContext,
    ) -> Self {
        Self {
            checker,
            grants: grants.iter().map(|g| g.as_ref().to_string()).collect(),
            context,
        }
    }

    /// Whether the grants allow `permission`
    pub fn has_permission(&self, permission: &str) -> Result<bool> {
        self.checker.matches(permission)
    }

    /// Whether the grants allow at least one of `permissions`
    ///
    /// Every permission is validated before any is matched, so a malformed
    /// entry errors regardless of its position. An empty list is `false`.
    pub fn has_any_permission<S: AsRef<str>>(&self, permissions: &[S]) -> Result<bool> {
        let parsed = parse_all(permissions)?;
        Ok(parsed.iter().any(|p| self.checker.matches_permission(p)))
    }

    /// Whether the grants allow every one of `permissions`
    ///
    /// An empty list is `true`.
    pub fn has_all_permissions<S: AsRef<str>>(&self, permissions: &[S]) -> Result<bool> {
        let parsed = parse_all(permissions)?;
        Ok(parsed.iter().all(|p| self.checker.matches_permission(p)))
    }

    /// Whether the raw grants contain a non-negated `#`
    pub fn is_superuser(&self) -> bool {
        self.grants.iter().any(|g| g == MULTI_WILDCARD)
    }

    /// Whether this subject may grant `target` to another party
    ///
    /// Only permissions the subject itself holds can be delegated, and the
    /// target must be concrete (no wildcards, reserved words or negation).
    ///
    /// # Errors
    ///
    /// Returns [`crate::AclError::MalformedPermission`] if `target` is not a
    /// concrete permission.
    pub fn can_grant(&self, target: &str) -> Result<bool> {
        self.has_permission(target)
    }

    /// Whether this subject may revoke `target` from another party
    ///
    /// Same rule as [`Self::can_grant`]: the subject must hold it.
    pub fn can_revoke(&self, target: &str) -> Result<bool> {
        self.has_permission(target)
    }

    /// Filters `targets` down to those [`Self::can_grant`] accepts;
    /// malformed targets are logged and dropped
    pub fn grantable<S: AsRef<str>>(&self, targets: &[S]) -> Vec<String> {
        targets
            .iter()
            .filter_map(|target| {
                let target = target.as_ref();
                match self.can_grant(target) {
                    Ok(true) => Some(target.to_string()),
                    Ok(false) => None,
                    Err(e) => {
                        warn!(
                            "Skipping grant target '{}' for subject {}: {}",
                            target,
                            self.subject_id(),
                            e
                        );
                        None
                    }
                }
            })
            .collect()
    }

    /// Raw grants as given
    pub fn grants(&self) -> &[String] {
        &self.grants
    }

    pub fn subject_id(&self) -> &str {
        self.context.subject_id()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.context.session_id()
    }

    pub fn access_checker(&self) -> &AccessChecker {
        &self.checker
    }
}

fn parse_all<S: AsRef<str>>(permissions: &[S]) -> Result<Vec<Permission<'_>>> {
    permissions
        .iter()
        .map(|p| Permission::parse(p.as_ref()))
        .collect()
}
