//! Transaction state machine
//!
//! ```text
//! Idle → BackingUp → Switching → Verifying → Committed
//!                        │            │
//!                        └────────────┴──→ RolledBack
//! ```

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SwitchState {
    Idle,
    BackingUp,
    Switching,
    Verifying,
    Committed,
    RolledBack,
}

impl SwitchState {
    pub fn as_str(self) -> &'static str {
        match self {
            SwitchState::Idle => "idle",
            SwitchState::BackingUp => "backing-up",
            SwitchState::Switching => "switching",
            SwitchState::Verifying => "verifying",
            SwitchState::Committed => "committed",
            SwitchState::RolledBack => "rolled-back",
        }
    }
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the state of one transaction and logs every transition.
#[derive(Debug)]
pub struct Transaction {
    label: String,
    state: SwitchState,
}

impl Transaction {
    pub(crate) fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            state: SwitchState::Idle,
        }
    }

    pub fn state(&self) -> SwitchState {
        self.state
    }

    pub fn enter(&mut self, next: SwitchState) {
        tracing::debug!(transaction = %self.label, from = %self.state, to = %next, "state transition");
        self.state = next;
    }
}
