use crate::error::AeroError;
use crate::models::Session;
use tokio::sync::watch;
use tracing::debug;

pub const LOGIN_LOCATION: &str = "/login";
pub const HOME_LOCATION: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Session restore has not completed yet.
    Loading,
    Authenticated,
    Unauthenticated,
}

/// What to show for a requested protected location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Neutral waiting indicator; no protected content, no redirect.
    Waiting,
    Render { location: String },
    RedirectToLogin { from: String },
}

impl GuardDecision {
    /// The location to render, or why it cannot be rendered yet.
    pub fn admit(self) -> Result<String, AeroError> {
        match self {
            GuardDecision::Render { location } => Ok(location),
            GuardDecision::RedirectToLogin { from } => Err(AeroError::LoginRequired { from }),
            GuardDecision::Waiting => Err(AeroError::SessionPending),
        }
    }
}

/// Gate in front of every protected view.
#[derive(Debug)]
pub struct RouteGuard {
    state: GuardState,
    return_to: Option<String>,
}

impl RouteGuard {
    pub fn new() -> Self {
        Self {
            state: GuardState::Loading,
            return_to: None,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Apply the outcome of session restore, or any later session change.
    pub fn sync(&mut self, session: Option<&Session>) {
        let next = match session {
            Some(_) => GuardState::Authenticated,
            None => GuardState::Unauthenticated,
        };
        if next != self.state {
            debug!(from = ?self.state, to = ?next, "route guard transition");
            self.state = next;
        }
    }

    /// Pick up a pending change from the session store's change feed.
    ///
    /// Returns whether anything changed.
    pub fn follow(&mut self, changes: &mut watch::Receiver<Option<Session>>) -> bool {
        match changes.has_changed() {
            Ok(true) => {
                let session = changes.borrow_and_update().clone();
                self.sync(session.as_ref());
                true
            }
            _ => false,
        }
    }

    /// A request was rejected as unauthenticated somewhere in the process.
    pub fn on_auth_failure(&mut self) {
        if self.state != GuardState::Unauthenticated {
            debug!(from = ?self.state, "route guard transition on authentication failure");
        }
        self.state = GuardState::Unauthenticated;
    }

    pub fn evaluate(&mut self, location: &str) -> GuardDecision {
        match self.state {
            GuardState::Loading => GuardDecision::Waiting,
            GuardState::Unauthenticated => {
                self.return_to = Some(location.to_string());
                GuardDecision::RedirectToLogin {
                    from: location.to_string(),
                }
            }
            GuardState::Authenticated => GuardDecision::Render {
                location: location.to_string(),
            },
        }
    }

    /// Restore a location remembered by an earlier run.
    pub fn remember(&mut self, location: impl Into<String>) {
        self.return_to = Some(location.into());
    }

    /// Location remembered by the last redirect.
    pub fn remembered(&self) -> Option<&str> {
        self.return_to.as_deref()
    }

    /// Where to go after a successful login; consumes the remembered location.
    pub fn take_return_location(&mut self) -> String {
        self.return_to
            .take()
            .filter(|l| l != LOGIN_LOCATION)
            .unwrap_or_else(|| HOME_LOCATION.to_string())
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new()
    }
}
