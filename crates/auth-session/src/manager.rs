//! Session manager with FSM-based state tracking.
//!
//! The manager owns the in-memory session, is the only writer of the
//! persisted credential record, and is the authentication failure handler
//! of the shared [`ApiClient`]. A generation counter, bumped on every login
//! and teardown, lets results of in-flight profile checks be dropped when
//! the session moved on while they were pending. A 401 only invalidates
//! the session when the rejected request carried the token still stored.

use crate::auth_fsm::{SessionMachine, SessionMachineInput, SessionMachineState};
use crate::{AuthError, AuthResult};
use api_client::{ApiClient, ApiResult, AuthFailureHandler, Method, RequestFailure, RequestOptions};
use inventory_config_and_utils::Config;
use inventory_types::{Role, SessionStatus, User};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use session_store::{SessionStore, StoredSession};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Read-only view of the session. Never carries the token itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub user: Option<User>,
    pub has_token: bool,
    pub generation: u64,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.status.is_authenticated()
    }

    /// Role of the current user, if any.
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(User::role)
    }
}

/// Emitted on every status change or profile replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub generation: u64,
}

/// `POST /login` success body.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: User,
}

struct SessionState {
    machine: SessionMachine,
    user: Option<User>,
    generation: u64,
    bootstrap_started: bool,
}

/// Shared core. Also the client's auth failure handler, so the client
/// holds this rather than the manager.
struct SessionInner {
    store: Arc<SessionStore>,
    state: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionInner {
    fn new(store: Arc<SessionStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            state: Mutex::new(SessionState {
                machine: SessionMachine::new(),
                user: None,
                generation: 0,
                bootstrap_started: false,
            }),
            events,
        }
    }

    /// Apply `input` and replace the profile with `user`.
    ///
    /// Callers hold the state lock, so the persisted record and the
    /// in-memory state change together.
    fn transition(
        &self,
        state: &mut SessionState,
        input: SessionMachineInput,
        user: Option<User>,
    ) -> AuthResult<SessionStatus> {
        let old_status = SessionStatus::from(state.machine.state());

        state.machine.consume(&input).map_err(|_| {
            AuthError::InvalidStateTransition(format!(
                "Cannot apply {:?} in state {:?}",
                input,
                state.machine.state()
            ))
        })?;

        let new_status = SessionStatus::from(state.machine.state());
        let profile_changed = state.user != user;
        state.user = user;

        if old_status != new_status || profile_changed {
            debug!(
                old_status = %old_status,
                new_status = %new_status,
                generation = state.generation,
                "Session state transition"
            );
            // No receivers is fine.
            let _ = self.events.send(SessionEvent {
                status: new_status,
                user_id: state.user.as_ref().map(|u| u.id),
                email: state.user.as_ref().map(|u| u.email.clone()),
                generation: state.generation,
            });
        }

        Ok(new_status)
    }

    /// Mark bootstrap as started. `None` if it already ran.
    fn begin_bootstrap(&self) -> Option<u64> {
        let mut state = self.state.lock();
        if state.bootstrap_started {
            return None;
        }
        state.bootstrap_started = true;
        Some(state.generation)
    }

    /// Let a cancelled bootstrap run again, unless a login or teardown
    /// already settled the session in the meantime.
    fn abandon_bootstrap(&self, generation: u64) {
        let mut state = self.state.lock();
        if state.generation == generation {
            state.bootstrap_started = false;
        }
    }

    /// Adopt the cached profile optimistically.
    fn adopt_cached(&self, generation: u64, user: User) -> AuthResult<bool> {
        let mut state = self.state.lock();
        if state.generation != generation {
            return Ok(false);
        }
        // Already adopted by a bootstrap that was cancelled.
        if state.machine.state() == &SessionMachineState::Authenticated {
            return Ok(true);
        }
        self.transition(&mut state, SessionMachineInput::CachedProfile, Some(user))?;
        Ok(true)
    }

    /// Settle as anonymous when there is no credential to check.
    fn settle_without_credential(&self, generation: u64, stray_user: bool) -> AuthResult<bool> {
        let mut state = self.state.lock();
        if state.generation != generation {
            return Ok(false);
        }
        if stray_user {
            info!("Clearing cached profile without a token");
            self.store.clear()?;
        }
        self.transition(&mut state, SessionMachineInput::NoCredential, None)?;
        Ok(true)
    }

    /// Accept the profile returned by `/me`.
    fn confirm_profile(&self, generation: u64, token: &str, user: User) -> AuthResult<bool> {
        let mut state = self.state.lock();
        if state.generation != generation {
            debug!(
                expected = generation,
                current = state.generation,
                "Discarding stale profile result"
            );
            return Ok(false);
        }
        self.store.save(token, &user)?;
        self.transition(&mut state, SessionMachineInput::ProfileConfirmed, Some(user))?;
        Ok(true)
    }

    /// The stored credential could not be confirmed.
    fn reject_credential(&self, generation: u64, failure: &RequestFailure) -> AuthResult<bool> {
        let mut state = self.state.lock();
        if state.generation != generation {
            debug!(
                expected = generation,
                current = state.generation,
                "Discarding stale profile failure"
            );
            return Ok(false);
        }
        info!(kind = ?failure.kind, status = ?failure.status, "Stored session could not be confirmed");
        let cleared = self.store.clear();
        state.generation += 1;
        self.transition(&mut state, SessionMachineInput::Invalidated, None)?;
        cleared?;
        Ok(true)
    }

    /// Persist a fresh login.
    fn establish(&self, token: &str, user: User) -> AuthResult<()> {
        let mut state = self.state.lock();
        self.store.save(token, &user)?;
        state.generation += 1;
        self.transition(&mut state, SessionMachineInput::LoginSucceeded, Some(user))?;
        Ok(())
    }

    /// Local teardown shared by logout and invalidation. The in-memory
    /// session goes anonymous even when clearing the store fails.
    fn teardown(&self, input: SessionMachineInput) -> AuthResult<()> {
        let mut state = self.state.lock();
        self.teardown_locked(&mut state, input)
    }

    fn teardown_locked(
        &self,
        state: &mut SessionState,
        input: SessionMachineInput,
    ) -> AuthResult<()> {
        let cleared = self.store.clear();
        state.generation += 1;
        self.transition(state, input, None)?;
        cleared?;
        Ok(())
    }

    /// Tear down after a 401, unless the rejected request carried a token
    /// that has since been replaced. Returns whether the session ended.
    fn invalidate(&self, sent_with: Option<&str>) -> AuthResult<bool> {
        let mut state = self.state.lock();
        if let Some(sent) = sent_with {
            match self.store.token() {
                Ok(current) if current.as_deref() != Some(sent) => {
                    debug!(
                        generation = state.generation,
                        "Ignoring 401 for a credential that was already replaced"
                    );
                    return Ok(false);
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Failed to read stored token, invalidating anyway"),
            }
        }
        info!("Credential rejected by server, invalidating session");
        self.teardown_locked(&mut state, SessionMachineInput::Invalidated)?;
        Ok(true)
    }

    fn snapshot(&self) -> SessionSnapshot {
        let has_token = match self.store.token() {
            Ok(token) => token.is_some(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored token");
                false
            }
        };
        let state = self.state.lock();
        SessionSnapshot {
            status: SessionStatus::from(state.machine.state()),
            user: state.user.clone(),
            has_token,
            generation: state.generation,
        }
    }
}

impl AuthFailureHandler for SessionInner {
    fn on_auth_failure(&self, failure: &RequestFailure, sent_with: Option<&str>) {
        debug!(status = ?failure.status, "Auth failure reported by client");
        if let Err(e) = self.invalidate(sent_with) {
            warn!(error = %e, "Session invalidation incomplete");
        }
    }
}

/// Pick the payload out of `{data: ...}` / `{user: ...}` style envelopes.
///
/// `marker` is a field only the bare payload has.
fn unwrap_envelope(body: Value, marker: &str, keys: &[&str]) -> Value {
    if let Value::Object(map) = &body {
        if !map.contains_key(marker) {
            for key in keys {
                if let Some(inner) = map.get(*key).filter(|v| v.is_object()) {
                    return inner.clone();
                }
            }
        }
    }
    body
}

fn decode_profile(status: u16, body: Value) -> ApiResult<User> {
    let body = unwrap_envelope(body, "id", &["data", "user"]);
    serde_json::from_value(body).map_err(|e| {
        RequestFailure::decode(Some(status), format!("Unexpected profile shape: {}", e))
    })
}

fn decode_login(status: u16, body: Value) -> ApiResult<LoginResponse> {
    let body = unwrap_envelope(body, "token", &["data"]);
    let response: LoginResponse = serde_json::from_value(body).map_err(|e| {
        RequestFailure::decode(Some(status), format!("Unexpected login response: {}", e))
    })?;
    if response.token.trim().is_empty() {
        return Err(RequestFailure::decode(
            Some(status),
            "Login response carried an empty token",
        ));
    }
    Ok(response)
}

/// Resolves once shutdown is signalled. A closed channel never resolves.
async fn shutdown_signalled(shutdown: &mut broadcast::Receiver<()>) {
    if let Err(broadcast::error::RecvError::Closed) = shutdown.recv().await {
        std::future::pending::<()>().await;
    }
}

/// Owns the client session: bootstrap, login, logout and invalidation.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
    client: ApiClient,
}

impl SessionManager {
    /// Create a new session manager and its API client.
    ///
    /// # Arguments
    /// * `base_url` - API base address
    /// * `store` - persisted credential record
    /// * `timeout` - transport timeout per request
    pub fn new(
        base_url: impl Into<String>,
        store: Arc<SessionStore>,
        timeout: Duration,
    ) -> AuthResult<Self> {
        let inner = Arc::new(SessionInner::new(store.clone()));
        let handler: Arc<dyn AuthFailureHandler> = inner.clone();
        let client = ApiClient::new(base_url, store, handler, timeout)?;
        Ok(Self { inner, client })
    }

    /// Create a session manager from the client configuration.
    pub fn from_config(config: &Config, store: Arc<SessionStore>) -> AuthResult<Self> {
        let base_url = config.api_base_url()?;
        Self::new(
            base_url.as_str(),
            store,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// The shared API client. Every request made through it is subject to
    /// the same 401 policy.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.snapshot()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus::from(self.inner.state.lock().machine.state())
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner.state.lock().user.clone()
    }

    /// Whether the current user's role is in the admin-like set.
    pub fn is_admin_like(&self) -> bool {
        self.inner
            .state
            .lock()
            .user
            .as_ref()
            .is_some_and(User::is_admin_like)
    }

    /// Lab of the current user: direct `lab_id`, else `lab.id`.
    pub fn current_lab_id(&self) -> Option<u64> {
        self.inner
            .state
            .lock()
            .user
            .as_ref()
            .and_then(User::current_lab_id)
    }

    /// Restore the session from the persisted record.
    ///
    /// A cached profile makes the session authenticated right away; the
    /// token is then confirmed with `GET /me`. Any failure to confirm
    /// clears the record. Runs once per manager; later calls return the
    /// current snapshot. A shutdown signal aborts the wait for `/me` and
    /// returns [`AuthError::Cancelled`] with the session left as it was;
    /// bootstrap may then be called again.
    pub async fn bootstrap(
        &self,
        mut shutdown: broadcast::Receiver<()>,
    ) -> AuthResult<SessionSnapshot> {
        let Some(generation) = self.inner.begin_bootstrap() else {
            debug!("Bootstrap already ran");
            return Ok(self.snapshot());
        };

        let stored = match self.inner.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Failed to read session record, starting anonymous");
                StoredSession::default()
            }
        };

        let Some(token) = stored.token else {
            self.inner
                .settle_without_credential(generation, stored.user.is_some())?;
            info!("No stored session");
            return Ok(self.snapshot());
        };

        if let Some(user) = stored.user {
            if self.inner.adopt_cached(generation, user)? {
                debug!("Adopted cached profile");
            }
        }

        let result = tokio::select! {
            result = self.client.get("/me") => result,
            _ = shutdown_signalled(&mut shutdown) => {
                info!("Session bootstrap cancelled");
                self.inner.abandon_bootstrap(generation);
                return Err(AuthError::Cancelled);
            }
        };

        let outcome = result.and_then(|response| decode_profile(response.status, response.body));
        match outcome {
            Ok(user) => {
                if self.inner.confirm_profile(generation, &token, user)? {
                    info!("Stored session confirmed");
                }
            }
            Err(failure) => {
                self.inner.reject_credential(generation, &failure)?;
            }
        }

        Ok(self.snapshot())
    }

    /// Exchange credentials for a token and start an authenticated session.
    ///
    /// Failures are returned unchanged and leave the current session alone.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<User> {
        let body = json!({ "email": email, "password": password });
        let response = self
            .client
            .send(Method::POST, "/login", Some(&body), RequestOptions::without_auth())
            .await?;
        let LoginResponse { token, user } = decode_login(response.status, response.body)?;

        self.inner.establish(&token, user.clone())?;
        info!(user_id = user.id, role = %user.role(), "Logged in");
        Ok(user)
    }

    /// Tell the server (best effort) and drop the local session.
    pub async fn logout(&self) -> AuthResult<()> {
        let has_token = matches!(self.inner.store.token(), Ok(Some(_)));
        if has_token {
            if let Err(e) = self
                .client
                .send(Method::POST, "/logout", None, RequestOptions::default())
                .await
            {
                debug!(error = %e, "Server logout failed, continuing with local logout");
            }
        }

        self.inner.teardown(SessionMachineInput::LoggedOut)?;
        info!("Logged out");
        Ok(())
    }
}
