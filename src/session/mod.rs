mod filesystem;
mod memory;
mod storage;

pub use filesystem::FilesystemStorage;
pub use memory::MemoryStorage;
pub use storage::SessionStorage;

use crate::error::SessionError;
use crate::models::{Session, StoredUser};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Storage key of the serialized identity.
pub const USER_KEY: &str = "user";
/// Storage key of the raw token string.
pub const TOKEN_KEY: &str = "token";
/// Storage key of the location to return to after the next login.
pub const RETURN_KEY: &str = "return_to";

/// Single source of truth for who is logged in.
///
/// The current value lives in a `watch` channel: reads are synchronous and
/// interested parties (the route guard) can follow changes without polling.
pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    state: watch::Sender<Option<Session>>,
}

impl SessionStore {
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            storage: Box::new(storage),
            state,
        }
    }

    /// Restore a previously persisted session.
    ///
    /// Both keys must be present and the identity must parse. Anything else is
    /// treated as "not authenticated" and both keys are discarded.
    pub fn load(&self) -> Option<Session> {
        let restored = self.restore();
        self.state.send_replace(restored.clone());
        restored
    }

    fn restore(&self) -> Option<Session> {
        let user = self.storage.read(USER_KEY);
        let token = self.storage.read(TOKEN_KEY);

        let (user, token) = match (user, token) {
            (Ok(None), Ok(None)) => {
                debug!("no persisted session");
                return None;
            }
            (Ok(Some(user)), Ok(Some(token))) => (user, token),
            (Ok(user), Ok(token)) => {
                warn!(
                    user_present = user.is_some(),
                    token_present = token.is_some(),
                    "partial session in storage, discarding"
                );
                self.discard();
                return None;
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "failed to read persisted session, discarding");
                self.discard();
                return None;
            }
        };

        match serde_json::from_str::<StoredUser>(&user) {
            Ok(user) if !token.trim().is_empty() => {
                info!(username = %user.username, "session restored");
                Some(Session {
                    username: user.username,
                    role: user.role,
                    token,
                })
            }
            Ok(_) => {
                warn!("persisted token is empty, discarding session");
                self.discard();
                None
            }
            Err(e) => {
                warn!(error = %e, "error parsing saved user, discarding session");
                self.discard();
                None
            }
        }
    }

    fn discard(&self) {
        for key in [USER_KEY, TOKEN_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(error = %e, "failed to discard session entry");
            }
        }
    }

    /// Replace the current session and persist it.
    ///
    /// On a storage failure neither memory nor disk keeps the new session;
    /// both keep the previous one.
    pub fn set(&self, session: Session) -> Result<(), SessionError> {
        let user = serde_json::to_string(&session.user())?;
        let previous_user = self.storage.read(USER_KEY)?;

        self.storage.write(USER_KEY, &user)?;
        if let Err(e) = self.storage.write(TOKEN_KEY, &session.token) {
            self.roll_back_user(previous_user.as_deref());
            return Err(e);
        }

        debug!(username = %session.username, role = %session.role, "session stored");
        self.state.send_replace(Some(session));
        Ok(())
    }

    fn roll_back_user(&self, previous: Option<&str>) {
        let rollback = match previous {
            Some(user) => self.storage.write(USER_KEY, user),
            None => self.storage.remove(USER_KEY),
        };
        if let Err(e) = rollback {
            // Disk now pairs the new user with the old token: drop both sides.
            warn!(error = %e, "failed to roll back session user entry, discarding session");
            self.state.send_replace(None);
            self.discard();
        }
    }

    /// Drop the current session and both durable keys.
    ///
    /// Memory is always cleared; the first storage error, if any, is returned.
    pub fn clear(&self) -> Result<(), SessionError> {
        self.state.send_replace(None);

        let mut first_error = None;
        for key in [USER_KEY, TOKEN_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(error = %e, "failed to remove session entry");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.state.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().as_ref().map(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// Keep a location for the next login, across restarts.
    pub fn remember_location(&self, location: &str) -> Result<(), SessionError> {
        self.storage.write(RETURN_KEY, location)
    }

    pub fn remembered_location(&self) -> Option<String> {
        match self.storage.read(RETURN_KEY) {
            Ok(location) => location.filter(|l| !l.trim().is_empty()),
            Err(e) => {
                warn!(error = %e, "failed to read return location");
                None
            }
        }
    }

    pub fn forget_location(&self) -> Result<(), SessionError> {
        self.storage.remove(RETURN_KEY)
    }

    /// Follow session changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }
}
