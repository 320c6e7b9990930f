//! # CretoAI ACL Engine
//!
//! Hierarchical dot-notation ACL authorization: decides whether a flat list
//! of permission grants allows a requested permission.
//!
//! ## Features
//!
//! - **Segment AST patterns** with `*` (one segment) and `#` (one or more
//!   trailing segments)
//! - **Negation** with `!`: deny patterns always win
//! - **Reserved words** `me` and `my_session` bound to the subject and session
//! - **Three bounded LRU cache layers** (compiled patterns, substitutions,
//!   access checkers), sharded for concurrent callers
//! - **Delegation checks**: a subject can only grant what it holds
//!
//! ## Example
//!
//! ```rust
//! use cretoai_acl::{AclEngine, EvaluationContext};
//!
//! let engine = AclEngine::default();
//! let grants = ["confd.users.*", "calld.#", "!confd.users.delete"];
//!
//! assert!(engine.evaluate(&grants, "u1", None, "calld.calls.hangup").unwrap());
//! assert!(!engine.evaluate(&grants, "u1", None, "admin.reset").unwrap());
//!
//! let acl = engine.acl(&grants, EvaluationContext::new("u1"));
//! assert!(acl.has_any_permission(&["admin.reset", "confd.users.read"]).unwrap());
//! assert!(!acl.is_superuser());
//! ```

pub mod acl;
pub mod cache;
pub mod checker;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod pattern;
pub mod reserved;

// Re-export commonly used types
pub use acl::AclChecker;
pub use cache::{BoundedCache, CacheStats};
pub use checker::AccessChecker;
pub use config::AclConfig;
pub use context::EvaluationContext;
pub use engine::{AclEngine, EngineStats};
pub use error::{AclError, PatternError, Result};
pub use pattern::{compile, CompiledPattern, Permission, Segment};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
