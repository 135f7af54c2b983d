//! State machine for tracking one build session
//!
//! A session moves `Idle -> Started -> Ended`. The history of transitions is
//! kept for the session report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// Session state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Idle,
    Started,
    Ended,
}

/// State transition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateTransition {
    /// From state
    pub from: SessionState,

    /// To state
    pub to: SessionState,

    /// Timestamp
    pub timestamp: DateTime<Utc>,

    /// Additional metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

/// State machine for tracking a build session
#[derive(Debug)]
pub struct SessionStateMachine {
    session_id: Uuid,
    current_state: SessionState,
    transitions: Vec<StateTransition>,
}

impl SessionStateMachine {
    /// Create a new state machine
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            current_state: SessionState::Idle,
            transitions: Vec::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Transition to a new state
    ///
    /// Repeating the current state is recorded like any other transition;
    /// the host decides the event order.
    pub fn transition(
        &mut self,
        to: SessionState,
        metadata: Option<HashMap<String, serde_json::Value>>,
    ) {
        debug!(
            "Session {}: {:?} -> {:?}",
            self.session_id, self.current_state, to
        );

        self.transitions.push(StateTransition {
            from: self.current_state,
            to,
            timestamp: Utc::now(),
            metadata,
        });
        self.current_state = to;
    }

    /// Get current state
    pub fn get_state(&self) -> SessionState {
        self.current_state
    }

    /// Get transition history
    pub fn get_history(&self) -> &[StateTransition] {
        &self.transitions
    }
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
