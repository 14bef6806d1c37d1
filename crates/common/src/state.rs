//! Common state machine error types
//!
//! Shared across all domain crates that implement state machines.

use thiserror::Error;

use crate::error::Error;

/// Errors that can occur during state transitions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("Invalid transition: cannot move from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Guard condition failed: {0}")]
    GuardFailed(String),

    #[error("Terminal state: {0} is a terminal state and cannot transition")]
    TerminalState(String),
}

impl StateError {
    pub fn invalid(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        StateError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl From<StateError> for Error {
    fn from(err: StateError) -> Self {
        Error::validation(err.to_string())
    }
}

/// A status enum with a fixed transition table.
///
/// Implementors list the states reachable from each state; `transition_to`
/// enforces the table and reports terminal states separately.
pub trait StateMachine: Copy + PartialEq + std::fmt::Display + 'static {
    /// All valid next states from this state
    fn valid_transitions(&self) -> &'static [Self];

    /// Whether no transition leaves this state
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }

    /// Check if a transition is valid without performing it
    fn can_transition_to(&self, next: Self) -> bool {
        self.valid_transitions().contains(&next)
    }

    /// Validate a transition and return the new state
    fn transition_to(self, next: Self) -> Result<Self, StateError> {
        if self.is_terminal() {
            return Err(StateError::TerminalState(self.to_string()));
        }
        if !self.can_transition_to(next) {
            return Err(StateError::invalid(self, next));
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Light {
        Red,
        Green,
        Off,
    }

    impl std::fmt::Display for Light {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    impl StateMachine for Light {
        fn valid_transitions(&self) -> &'static [Self] {
            match self {
                Light::Red => &[Light::Green, Light::Off],
                Light::Green => &[Light::Red],
                Light::Off => &[],
            }
        }
    }

    #[test]
    fn test_valid_transition() {
        assert_eq!(Light::Red.transition_to(Light::Green), Ok(Light::Green));
    }

    #[test]
    fn test_invalid_transition() {
        assert_eq!(
            Light::Green.transition_to(Light::Off),
            Err(StateError::InvalidTransition {
                from: "Green".to_string(),
                to: "Off".to_string()
            })
        );
    }

    #[test]
    fn test_terminal_state() {
        assert!(Light::Off.is_terminal());
        assert!(matches!(
            Light::Off.transition_to(Light::Red),
            Err(StateError::TerminalState(_))
        ));
    }

    #[test]
    fn test_state_error_maps_to_validation() {
        let err: Error = StateError::invalid("A", "B").into();
        assert!(matches!(err, Error::Validation(_)));
    }
}
