/*
[INPUT]:  SiweAuthenticator and user-triggered actions
[OUTPUT]: AuthState transitions, SSO handoffs and session snapshots
[POS]:    Session layer - owns login screen state
[UPDATE]: When sign-in paths or busy/cancel handling change
*/

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use reqwest::Url;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::auth::SiweAuthenticator;
use crate::http::{AuthError, Result};
use crate::session::{AuthAction, AuthState, WalletSession};
use crate::types::SignInMethod;

/// Navigation target produced by the SSO path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsoHandoff {
    pub url: Url,
}

/// Owns the login screen state and routes user actions through it.
///
/// The busy check and the `Begin` transition share one write lock, so a
/// second attempt started while one is in flight fails with
/// [`AuthError::AlreadyInProgress`]. Each attempt carries an id; only the
/// current attempt may settle the state. Locks are never held across `.await`.
pub struct LoginController {
    authenticator: SiweAuthenticator,
    slot: Arc<RwLock<StateSlot>>,
}

#[derive(Debug, Default)]
struct StateSlot {
    state: AuthState,
    attempt: u64,
    cancel: Option<CancellationToken>,
}

/// Handle on the attempt started by `begin`
struct Attempt {
    id: u64,
    cancel: CancellationToken,
}

impl LoginController {
    pub fn new(authenticator: SiweAuthenticator) -> Self {
        Self {
            authenticator,
            slot: Arc::new(RwLock::new(StateSlot::default())),
        }
    }

    pub fn authenticator(&self) -> &SiweAuthenticator {
        &self.authenticator
    }

    pub fn state(&self) -> AuthState {
        self.read_slot().state.clone()
    }

    pub fn session(&self) -> WalletSession {
        self.read_slot().state.session()
    }

    pub fn is_busy(&self) -> bool {
        self.read_slot().state.is_busy()
    }

    /// Run the SIWE handshake
    ///
    /// Ends in `Authenticated` or `Failed`. If `cancel` fires first the
    /// attempt is abandoned and the state returns to `Idle`. An attempt
    /// superseded by [`LoginController::logout`] returns
    /// [`AuthError::Cancelled`] and leaves the state alone.
    pub async fn sign_in_with_ethereum(&self, cancel: &CancellationToken) -> Result<WalletSession> {
        let attempt = self.begin(SignInMethod::Ethereum, cancel.child_token())?;

        match self.authenticator.authenticate(&attempt.cancel).await {
            Ok(session) => {
                let address = session.address.clone().unwrap_or_default();
                if self.settle(&attempt, AuthAction::Succeed(address)) {
                    Ok(session)
                } else {
                    debug!(attempt = attempt.id, "ethereum sign-in superseded");
                    Err(AuthError::Cancelled)
                }
            }
            Err(AuthError::Cancelled) => {
                self.settle(&attempt, AuthAction::Abandon);
                debug!(attempt = attempt.id, "ethereum sign-in abandoned");
                Err(AuthError::Cancelled)
            }
            Err(err) => {
                warn!(error = %err, "ethereum sign-in failed");
                self.settle(&attempt, AuthAction::Fail(err.user_notice().to_string()));
                Err(err)
            }
        }
    }

    /// Start the redirect-based SSO path
    ///
    /// Navigation leaves the page, so the state stays `Connecting`.
    pub fn sign_in_with_sso(&self) -> Result<SsoHandoff> {
        let attempt = self.begin(SignInMethod::Sso, CancellationToken::new())?;

        match self.authenticator.client().sso_url() {
            Ok(url) => {
                info!(url = %url, "handing off to sso");
                Ok(SsoHandoff { url })
            }
            Err(err) => {
                warn!(error = %err, "sso handoff failed");
                self.settle(&attempt, AuthAction::Fail(err.user_notice().to_string()));
                Err(err)
            }
        }
    }

    /// End the session
    ///
    /// Any in-flight attempt is cancelled and local state is cleared before
    /// the backend is called, whatever it answers.
    pub async fn logout(&self) -> Result<()> {
        {
            let mut slot = self.write_slot();
            if let Some(cancel) = slot.cancel.take() {
                cancel.cancel();
                debug!(attempt = slot.attempt, "cancelled in-flight sign-in");
            }
            slot.attempt += 1;
            slot.state.transition(AuthAction::Logout)?;
        }
        info!("session cleared");

        let outcome = self.authenticator.logout().await;
        if let Err(err) = &outcome {
            warn!(error = %err, "logout request failed; local session already cleared");
        }
        outcome
    }

    fn begin(&self, method: SignInMethod, cancel: CancellationToken) -> Result<Attempt> {
        let mut slot = self.write_slot();
        if slot.state.is_busy() {
            return Err(AuthError::AlreadyInProgress);
        }
        slot.state.transition(AuthAction::Begin(method))?;
        slot.attempt += 1;
        slot.cancel = Some(cancel.clone());
        info!(method = %method, attempt = slot.attempt, "sign-in started");
        Ok(Attempt {
            id: slot.attempt,
            cancel,
        })
    }

    /// Apply `action` if `attempt` still owns the `Connecting` state
    fn settle(&self, attempt: &Attempt, action: AuthAction) -> bool {
        let mut slot = self.write_slot();
        if slot.attempt != attempt.id || !slot.state.is_busy() {
            return false;
        }
        slot.cancel = None;
        slot.state.transition(action).is_ok()
    }

    fn read_slot(&self) -> RwLockReadGuard<'_, StateSlot> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, StateSlot> {
        self.slot.write().unwrap_or_else(PoisonError::into_inner)
    }
}
