//! ACL engine with three cache layers
//!
//! ```text
//! grants + ctx ──► [checker cache] ──hit──────────────────────► AccessChecker
//!                        │ miss
//!                        ▼
//!         per grant: [substitution cache] ──► [pattern cache] ──► CompiledPattern
//! ```

use std::sync::Arc;

use blake3::Hasher;
use tracing::{debug, info, trace, warn};

use crate::acl::AclChecker;
use crate::cache::{BoundedCache, CacheStats};
use crate::checker::AccessChecker;
use crate::config::AclConfig;
use crate::context::EvaluationContext;
use crate::error::Result;
use crate::pattern::{compile, CompiledPattern, Permission};
use crate::reserved::{has_reserved_words, substitute};

/// Substitution cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SubstitutionKey {
    pattern: String,
    subject_id: String,
    session_id: Option<String>,
}

/// Checker cache key (BLAKE3 hash of the canonical grant tuple and context)
type CheckerKey = [u8; 32];

/// Statistics of every cache layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub patterns: CacheStats,
    pub substitutions: CacheStats,
    pub checkers: CacheStats,
}

/// Hierarchical ACL authorization engine
///
/// Construct once and share; every cache layer is internally synchronized.
///
/// # Examples
///
/// ```
/// use cretoai_acl::AclEngine;
///
/// let engine = AclEngine::default();
/// let grants = ["confd.users.*", "calld.#", "!confd.users.delete"];
///
/// assert!(engine.evaluate(&grants, "u1", None, "confd.users.read").unwrap());
/// assert!(!engine.evaluate(&grants, "u1", None, "confd.users.delete").unwrap());
/// ```
pub struct AclEngine {
    /// Substituted pattern string → compiled pattern
    patterns: BoundedCache<String, Arc<CompiledPattern>>,

    /// (pattern, subject, session) → substituted pattern string
    substitutions: BoundedCache<SubstitutionKey, Arc<str>>,

    /// (subject, session, sorted grants) → access checker
    checkers: BoundedCache<CheckerKey, Arc<AccessChecker>>,

    config: AclConfig,
}

impl AclEngine {
    /// Create an engine with the given configuration
    ///
    /// # Errors
    ///
    /// Returns [`crate::AclError::InvalidConfig`] if the configuration does
    /// not validate.
    pub fn new(config: AclConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: AclConfig) -> Self {
        info!(
            "AclEngine initialized with pattern_cache={}, substitution_cache={}, checker_cache={}, shards={}",
            config.pattern_cache_capacity,
            config.substitution_cache_capacity,
            config.checker_cache_capacity,
            config.shards
        );

        Self {
            patterns: BoundedCache::new(config.pattern_cache_capacity, config.shards),
            substitutions: BoundedCache::new(config.substitution_cache_capacity, config.shards),
            checkers: BoundedCache::new(config.checker_cache_capacity, config.shards),
            config,
        }
    }

    /// Evaluates one requested permission against a grant list
    ///
    /// # Errors
    ///
    /// Returns [`crate::AclError::MalformedPermission`] if `requested` is not
    /// a concrete permission. Malformed grants never error; they are skipped.
    pub fn evaluate<S: AsRef<str>>(
        &self,
        grants: &[S],
        subject_id: &str,
        session_id: Option<&str>,
        requested: &str,
    ) -> Result<bool> {
        let permission = Permission::parse(requested)?;

        let mut ctx = EvaluationContext::new(subject_id);
        ctx.session_id = session_id.map(str::to_string);

        let allowed = self.checker(grants, &ctx).matches_permission(&permission);
        debug!(
            "ACL decision: subject={}, permission={}, allowed={}",
            subject_id, requested, allowed
        );
        Ok(allowed)
    }

    /// Returns the access checker for a grant list, building it on a miss
    ///
    /// Grant lists differing only in order or duplicates share one entry.
    pub fn checker<S: AsRef<str>>(&self, grants: &[S], ctx: &EvaluationContext) -> Arc<AccessChecker> {
        let canonical = canonicalize(grants);
        let key = checker_key(ctx, &canonical);

        if let Some(checker) = self.checkers.get(&key) {
            trace!("Checker cache hit for subject {}", ctx.subject_id());
            return checker;
        }

        debug!(
            "Checker cache miss for subject {}, compiling {} grants",
            ctx.subject_id(),
            canonical.len()
        );
        let checker = Arc::new(self.build_checker(&canonical, ctx));
        self.checkers.insert(key, Arc::clone(&checker));
        checker
    }

    /// Returns the ACL facade for a grant list
    pub fn acl<S: AsRef<str>>(&self, grants: &[S], ctx: EvaluationContext) -> AclChecker {
        let checker = self.checker(grants, &ctx);
        AclChecker::new(checker, grants, ctx)
    }

    fn build_checker(&self, grants: &[&str], ctx: &EvaluationContext) -> AccessChecker {
        let patterns = grants.iter().filter_map(|grant| {
            let substituted = self.substitute(grant, ctx);
            match self.compile(&substituted) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Skipping grant '{}' for subject {}: {}", grant, ctx.subject_id(), e);
                    None
                }
            }
        });
        AccessChecker::new(patterns)
    }

    /// Compiles a pattern through the pattern cache
    ///
    /// Failures are not cached.
    pub fn compile(&self, pattern: &str) -> Result<Arc<CompiledPattern>> {
        self.patterns
            .try_get_or_insert_with(pattern.to_string(), || compile(pattern).map(Arc::new))
    }

    /// Substitutes reserved words through the substitution cache
    ///
    /// Patterns without reserved words are returned as is and never occupy
    /// a slot, since their substitution does not depend on the context.
    pub fn substitute(&self, pattern: &str, ctx: &EvaluationContext) -> Arc<str> {
        if !has_reserved_words(pattern) {
            return Arc::from(pattern);
        }

        let key = SubstitutionKey {
            pattern: pattern.to_string(),
            subject_id: ctx.subject_id.clone(),
            session_id: ctx.session_id.clone(),
        };
        self.substitutions
            .get_or_insert_with(key, || Arc::from(substitute(pattern, ctx)))
    }

    /// Returns statistics for every cache layer
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            patterns: self.patterns.stats(),
            substitutions: self.substitutions.stats(),
            checkers: self.checkers.stats(),
        }
    }

    /// Empties every cache layer; decisions are unaffected
    pub fn clear_caches(&self) {
        self.patterns.clear();
        self.substitutions.clear();
        self.checkers.clear();
        info!("ACL caches cleared");
    }

    pub fn config(&self) -> &AclConfig {
        &self.config
    }
}

impl Default for AclEngine {
    fn default() -> Self {
        Self::build(AclConfig::default())
    }
}

/// Sorted, deduplicated view of a grant list
fn canonicalize<S: AsRef<str>>(grants: &[S]) -> Vec<&str> {
    let mut canonical: Vec<&str> = grants.iter().map(|g| g.as_ref()).collect();
    canonical.sort_unstable();
    canonical.dedup();
    canonical
}

/// Compute the checker cache key
///
/// Every field is length-prefixed so distinct tuples never hash the same
/// byte stream.
fn checker_key(ctx: &EvaluationContext, canonical: &[&str]) -> CheckerKey {
    let mut hasher = Hasher::new();

    update_field(&mut hasher, ctx.subject_id.as_bytes());
    match &ctx.session_id {
        Some(session) => {
            hasher.update(&[1u8]);
            update_field(&mut hasher, session.as_bytes());
        }
        None => {
            hasher.update(&[0u8]);
        }
    }

    hasher.update(&(canonical.len() as u64).to_le_bytes());
    for grant in canonical {
        update_field(&mut hasher, grant.as_bytes());
    }

    *hasher.finalize().as_bytes()
}

fn update_field(hasher: &mut Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
