/*
[INPUT]:  AuthAction values from sign-in and logout flows
[OUTPUT]: Validated AuthState transitions and WalletSession snapshots
[POS]:    Session layer - state machine for the login screen
[UPDATE]: When login states or transitions change
*/

use serde::Serialize;
use thiserror::Error;

use crate::types::SignInMethod;

/// Login screen state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Idle,
    Connecting {
        method: SignInMethod,
    },
    Authenticated {
        address: String,
    },
    Failed {
        notice: String,
    },
}

/// Actions that can trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    Begin(SignInMethod),
    Succeed(String),
    Fail(String),
    /// Attempt cancelled before it settled
    Abandon,
    Logout,
}

/// Errors occurring during state transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("Invalid transition: {from:?} -> {action:?}")]
    InvalidTransition { from: AuthState, action: AuthAction },
}

/// Snapshot of the in-memory wallet session handed to rendering code
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WalletSession {
    pub address: Option<String>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl WalletSession {
    pub fn authenticated(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            is_authenticated: true,
            is_loading: false,
        }
    }
}

impl AuthState {
    /// Check if the given action is valid from the current state
    pub fn can_transition(&self, action: &AuthAction) -> bool {
        matches!(
            (self, action),
            (AuthState::Idle | AuthState::Failed { .. }, AuthAction::Begin(_))
                | (AuthState::Connecting { .. }, AuthAction::Succeed(_))
                | (AuthState::Connecting { .. }, AuthAction::Fail(_))
                | (AuthState::Connecting { .. }, AuthAction::Abandon)
                | (_, AuthAction::Logout)
        )
    }

    /// Perform a state transition
    pub fn transition(&mut self, action: AuthAction) -> Result<(), StateError> {
        if !self.can_transition(&action) {
            return Err(StateError::InvalidTransition {
                from: self.clone(),
                action,
            });
        }

        *self = match action {
            AuthAction::Begin(method) => AuthState::Connecting { method },
            AuthAction::Succeed(address) => AuthState::Authenticated { address },
            AuthAction::Fail(notice) => AuthState::Failed { notice },
            AuthAction::Abandon | AuthAction::Logout => AuthState::Idle,
        };
        Ok(())
    }

    /// True while an attempt is in flight; sign-in controls must be disabled
    pub fn is_busy(&self) -> bool {
        matches!(self, AuthState::Connecting { .. })
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }

    pub fn address(&self) -> Option<&str> {
        match self {
            AuthState::Authenticated { address } => Some(address),
            _ => None,
        }
    }

    /// Notice to surface after a failed attempt
    pub fn notice(&self) -> Option<&str> {
        match self {
            AuthState::Failed { notice } => Some(notice),
            _ => None,
        }
    }

    pub fn session(&self) -> WalletSession {
        WalletSession {
            address: self.address().map(str::to_string),
            is_authenticated: self.is_authenticated(),
            is_loading: self.is_busy(),
        }
    }
}
