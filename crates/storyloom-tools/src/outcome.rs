//! Tool outcomes with copy-on-write state.
//!
//! A rejected or no-op tool hands back the caller's own state reference
//! (`Cow::Borrowed`); a successful mutation hands back an owned clone. The
//! caller's state is never modified in place.

use std::borrow::Cow;

use storyloom_types::{EntityId, GameState};

/// What a tool did with the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// The state was changed.
    Applied,
    /// The request was valid but already satisfied; nothing changed.
    Unchanged,
    /// The request was refused; nothing changed.
    Rejected,
}

/// Result of applying a tool.
#[derive(Debug, Clone)]
pub struct ToolOutcome<'a> {
    /// The resulting state.
    pub state: Cow<'a, GameState>,
    /// Human-readable message naming the entities involved.
    pub message: String,
    /// Id of an entity created by this call, if any.
    pub created_id: Option<EntityId>,
    /// Classification of the outcome.
    pub kind: OutcomeKind,
}

impl<'a> ToolOutcome<'a> {
    /// Refuse the request and return the caller's state untouched.
    pub fn rejected(state: &'a GameState, message: impl Into<String>) -> Self {
        Self {
            state: Cow::Borrowed(state),
            message: message.into(),
            created_id: None,
            kind: OutcomeKind::Rejected,
        }
    }

    /// Accept the request without changing anything.
    pub fn unchanged(state: &'a GameState, message: impl Into<String>) -> Self {
        Self {
            state: Cow::Borrowed(state),
            message: message.into(),
            created_id: None,
            kind: OutcomeKind::Unchanged,
        }
    }

    /// Accept the request with a modified clone.
    pub fn applied(state: GameState, message: impl Into<String>) -> Self {
        Self {
            state: Cow::Owned(state),
            message: message.into(),
            created_id: None,
            kind: OutcomeKind::Applied,
        }
    }

    /// Attach the id of a newly created entity.
    #[must_use]
    pub fn with_created(mut self, id: EntityId) -> Self {
        self.created_id = Some(id);
        self
    }

    /// Take ownership of the resulting state.
    pub fn into_state(self) -> GameState {
        self.state.into_owned()
    }
}
