/// Dot-notation permission patterns
///
/// This module compiles grant patterns into a segment AST and matches them
/// structurally against concrete permissions.
///
/// # Examples
///
/// ```
/// use cretoai_acl::pattern::{compile, Permission};
///
/// let permission = Permission::parse("calld.calls.hangup").unwrap();
///
/// assert!(compile("calld.#").unwrap().matches(&permission));
/// assert!(compile("calld.*.hangup").unwrap().matches(&permission));
/// assert!(!compile("calld.*").unwrap().matches(&permission));
/// ```

mod compiler;
mod types;


pub use compiler::compile;
pub(crate) use compiler::is_literal_segment;
pub use types::{
    CompiledPattern, Permission, ReservedWord, Segment, MULTI_WILDCARD, NEGATION_PREFIX,
    SEPARATOR, SINGLE_WILDCARD,
};
