//! Evaluation context bound to reserved words

use serde::{Deserialize, Serialize};

use crate::pattern::{is_literal_segment, ReservedWord};

/// Subject and session an evaluation runs for
///
/// Only used to resolve reserved words; the engine never inspects it
/// otherwise.
///
/// An id is substituted only when it is a single literal segment
/// (`[A-Za-z0-9_-]+`, not `me` or `my_session`). Empty ids and ids holding
/// `.`, `*`, `#`, `!` or any other character outside that set resolve to
/// nothing, so the reserved word stays unresolved and never matches.
///
/// Resolution and caching see the fields differently: an empty subject id
/// and an absent session both resolve to nothing, yet `""`, `None` and
/// `Some("")` remain distinct cache keys. Decisions for them are identical;
/// they only occupy separate checker cache entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluationContext {
    /// Authenticated subject id (e.g., user uuid)
    pub subject_id: String,

    /// Session id, when the token is bound to one
    #[serde(default)]
    pub session_id: Option<String>,
}

impl EvaluationContext {
    /// Create a context for a subject with no session
    pub fn new(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            session_id: None,
        }
    }

    /// Bind a session id
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Value a reserved word stands for, if the context carries it as a
    /// single literal segment.
    ///
    /// Empty ids and ids outside the literal grammar count as absent.
    pub fn resolve(&self, word: ReservedWord) -> Option<&str> {
        let value = match word {
            ReservedWord::Me => Some(self.subject_id.as_str()),
            ReservedWord::MySession => self.session_id.as_deref(),
        };
        value.filter(|v| is_literal_segment(v))
    }
}
