use crate::api::{ApiClient, AuthSignal, ClientSettings, ResourceClient, LOGIN_PATH};
use crate::auth::AuthController;
use crate::config::Config;
use crate::error::{AuthError, Result};
use crate::guard::{GuardDecision, RouteGuard};
use crate::models::{Credentials, ResourceKind, Session};
use crate::session::{FilesystemStorage, MemoryStorage, SessionStorage, SessionStore};
use crate::view::ResourceView;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

/// Process-wide wiring: one session store, one HTTP client, one guard.
pub struct Console {
    store: Arc<SessionStore>,
    client: Arc<ApiClient>,
    auth: AuthController,
    resources: ResourceClient,
    guard: RouteGuard,
    session_changes: watch::Receiver<Option<Session>>,
    signals: broadcast::Receiver<AuthSignal>,
}

impl Console {
    pub fn open(config: &Config) -> Result<Self> {
        if config.ephemeral {
            Self::with_storage(config.client_settings(), MemoryStorage::new())
        } else {
            Self::with_storage(
                config.client_settings(),
                FilesystemStorage::new(&config.storage_dir),
            )
        }
    }

    /// Build the shared instances and restore any persisted session.
    pub fn with_storage(
        settings: ClientSettings,
        storage: impl SessionStorage + 'static,
    ) -> Result<Self> {
        let store = Arc::new(SessionStore::new(storage));
        let session_changes = store.subscribe();
        let client = Arc::new(ApiClient::new(settings, Arc::clone(&store))?);
        let signals = client.subscribe();
        let auth = AuthController::new(Arc::clone(&client), Arc::clone(&store));
        let resources = ResourceClient::new(Arc::clone(&client));

        let mut console = Self {
            store,
            client,
            auth,
            resources,
            guard: RouteGuard::new(),
            session_changes,
            signals,
        };

        let restored = console.store.load();
        console.guard.sync(restored.as_ref());
        if let Some(location) = console.store.remembered_location() {
            console.guard.remember(location);
        }
        console.refresh();

        debug!(
            base_url = console.client.base_url(),
            credential_mode = %console.client.credential_mode(),
            authenticated = restored.is_some(),
            "console ready"
        );
        Ok(console)
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn auth(&self) -> &AuthController {
        &self.auth
    }

    pub fn resources(&self) -> &ResourceClient {
        &self.resources
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn view(&self, kind: ResourceKind) -> ResourceView {
        ResourceView::new(kind, self.resources.clone())
    }

    /// Apply pending auth signals and session changes to the guard.
    pub fn refresh(&mut self) {
        loop {
            match self.signals.try_recv() {
                Ok(AuthSignal::AuthenticationFailed { path, token }) => {
                    // A failed login is reported by the login call itself.
                    if path == LOGIN_PATH {
                        continue;
                    }
                    if token != self.store.token() {
                        debug!(path, "rejected request belonged to an earlier session");
                        continue;
                    }
                    warn!(path, "credentials rejected, ending session");
                    self.auth.expire();
                    self.guard.on_auth_failure();
                }
                Ok(AuthSignal::AuthorizationDenied { path }) => {
                    debug!(path, "authorization denied");
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "auth signals dropped");
                }
                Err(_) => break,
            }
        }
        self.guard.follow(&mut self.session_changes);
    }

    /// Ask the guard whether a protected location may be shown.
    pub fn enter(&mut self, location: &str) -> GuardDecision {
        self.refresh();
        let decision = self.guard.evaluate(location);
        if let GuardDecision::RedirectToLogin { from } = &decision {
            if let Err(e) = self.store.remember_location(from) {
                warn!(error = %e, "return location kept for this run only");
            }
        }
        decision
    }

    /// Log in and return where the user should land next.
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> std::result::Result<(Session, String), AuthError> {
        let credentials = Credentials::new(username, password);
        let result = self.auth.login_with(&credentials).await;
        self.refresh();
        let session = result?;
        let next = self.guard.take_return_location();
        if let Err(e) = self.store.forget_location() {
            warn!(error = %e, "failed to forget return location");
        }
        info!(next = %next, "returning after login");
        Ok((session, next))
    }

    pub fn logout(&mut self) {
        self.auth.logout();
        self.refresh();
    }
}
