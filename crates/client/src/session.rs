//! Session core: login, silent renewal, logout and authorization queries.
//!
//! State machine:
//!
//! ```text
//! Unknown ──restore──▶ Authenticated ◀──login── Anonymous
//!    │                  │    ▲   │                  ▲
//!    └──restore──▶ Anonymous │   └─logout / renewal failure─┘
//!                            └── renewal (tokens only)
//! ```
//!
//! Every entry into `Authenticated` bumps the session epoch and (re)starts the
//! renewal timer; every teardown bumps the epoch and cancels it. A transport
//! call remembers the epoch it was issued under and its completion is a no-op
//! when the epoch has moved on, so a late response can never resurrect a
//! cleared session.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use shopdesk_auth::{
    AuthState, Privilege, Role, SessionSnapshot, UserIdentity, effective_renewal_interval,
};
use tokio::sync::watch;

use crate::config::ClientConfig;
use crate::error::SessionError;
use crate::storage::{MemoryStorage, SessionStorage};
use crate::store::SessionStore;
use crate::timer::RenewalTimer;
use crate::transport::{CredentialTransport, HttpTransport, TransportError};
use crate::types::ApiResponse;

/// Result of one renewal attempt.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenewalOutcome {
    /// Token pair replaced.
    Renewed,
    /// No session to renew.
    Skipped,
    /// The session this renewal was issued for ended or changed meanwhile.
    Discarded,
    /// Renewal failed; the session was torn down.
    SessionEnded,
}

/// Diagnostics about the active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub identity: UserIdentity,
    pub established_at: DateTime<Utc>,
    pub last_renewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum Phase {
    Unknown,
    Anonymous,
    Authenticated(SessionInfo),
}

impl Phase {
    fn snapshot(&self) -> SessionSnapshot {
        match self {
            Phase::Unknown => SessionSnapshot::Unknown,
            Phase::Anonymous => SessionSnapshot::Anonymous,
            Phase::Authenticated(info) => SessionSnapshot::Authenticated(info.identity.clone()),
        }
    }

    fn is_authenticated(&self) -> bool {
        matches!(self, Phase::Authenticated(_))
    }
}

#[derive(Debug)]
struct CoreState {
    phase: Phase,
    epoch: u64,
    /// Period the renewal timer currently runs at.
    period: Duration,
    timer: RenewalTimer,
}

struct Inner {
    transport: Arc<dyn CredentialTransport>,
    store: SessionStore,
    renewal_interval: Duration,
    state: Mutex<CoreState>,
    snapshot: watch::Sender<SessionSnapshot>,
}

/// Handle to the session. Cheap to clone; all clones share one session.
///
/// Construct once at application start and pass it to whatever needs to
/// log in, log out or ask authorization questions.
#[derive(Clone)]
pub struct SessionCore {
    inner: Arc<Inner>,
}

impl SessionCore {
    pub fn new(
        transport: Arc<dyn CredentialTransport>,
        storage: Arc<dyn SessionStorage>,
        config: &ClientConfig,
    ) -> Self {
        let (snapshot, _) = watch::channel(SessionSnapshot::Unknown);

        Self {
            inner: Arc::new(Inner {
                transport,
                store: SessionStore::new(storage),
                renewal_interval: config.renewal_interval,
                state: Mutex::new(CoreState {
                    phase: Phase::Unknown,
                    epoch: 0,
                    period: config.renewal_interval,
                    timer: RenewalTimer::new(),
                }),
                snapshot,
            }),
        }
    }

    /// HTTP transport and tab-scoped in-memory storage.
    pub fn with_http(config: &ClientConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(
            Arc::new(transport),
            Arc::new(MemoryStorage::new()),
            config,
        ))
    }

    fn lock(&self) -> MutexGuard<'_, CoreState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────

    /// Resolve the initial `Unknown` state from persisted storage.
    ///
    /// The persisted access token is trusted as is; it is not re-validated
    /// against the server. Calling this again after the state is known is a
    /// no-op.
    pub async fn restore(&self) -> AuthState {
        let mut state = self.lock();
        if !matches!(state.phase, Phase::Unknown) {
            return state.phase.snapshot().state();
        }

        match self.inner.store.load() {
            Some(record) => {
                tracing::info!(
                    user_id = %record.identity.user_id,
                    username = %record.identity.username,
                    "restored persisted session"
                );
                let ttl = self.inner.store.token_lifetime();
                self.establish(&mut state, record.identity, ttl);
                AuthState::Authenticated
            }
            None => {
                tracing::info!("no persisted session; starting anonymous");
                state.phase = Phase::Anonymous;
                self.publish(&state);
                AuthState::Anonymous
            }
        }
    }

    /// Sign in with a username (or email) and password.
    ///
    /// Resolves a still-`Unknown` state first, so a failed login leaves the
    /// client `Anonymous` (or on the restored session). On failure nothing is
    /// persisted.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<UserIdentity, SessionError> {
        self.restore().await;
        let issued_epoch = self.lock().epoch;

        let response = self
            .inner
            .transport
            .login(identifier, password)
            .await
            .inspect_err(|err| {
                tracing::info!(username = %identifier, error = %err, "login rejected");
            })?;

        let payload = match response {
            ApiResponse {
                success: true,
                data: Some(payload),
                ..
            } => payload,
            ApiResponse { message, .. } => {
                tracing::info!(username = %identifier, %message, "login unsuccessful");
                return Err(SessionError::Rejected(message_or(message, "Login failed")));
            }
        };

        let ttl = payload.expires_in.map(Duration::from_secs);
        let record = payload.into_record();

        let mut state = self.lock();
        if state.epoch != issued_epoch {
            tracing::debug!(
                username = %identifier,
                "discarding login response overtaken by a session change"
            );
            return Err(SessionError::Superseded);
        }

        let persisted = self
            .inner
            .store
            .save(&record)
            .and_then(|()| self.inner.store.save_token_lifetime(ttl));
        if let Err(err) = persisted {
            tracing::error!(error = %err, "failed to persist session");
            self.teardown_locked(&mut state, "persist failure");
            return Err(err.into());
        }

        let identity = record.identity.clone();
        self.establish(&mut state, record.identity, ttl);

        tracing::info!(
            user_id = %identity.user_id,
            username = %identity.username,
            role = %identity.role,
            privilege = %identity.privilege,
            "login successful"
        );
        Ok(identity)
    }

    /// Sign out. Always leaves the client `Anonymous`.
    ///
    /// The server call is best-effort: its failure is logged and otherwise
    /// ignored.
    pub async fn logout(&self) {
        let access_token = self.inner.store.access_token();

        match self.inner.transport.logout(access_token.as_deref()).await {
            Ok(_) => tracing::debug!("server acknowledged logout"),
            Err(err) => {
                tracing::warn!(error = %err, "logout request failed; clearing local session anyway")
            }
        }

        self.teardown("logout");
    }

    /// Run one silent-renewal attempt now. Also the body of every timer tick.
    pub async fn renew_now(&self) -> RenewalOutcome {
        let epoch = {
            let state = self.lock();
            if !state.phase.is_authenticated() {
                return RenewalOutcome::Skipped;
            }
            state.epoch
        };
        self.renew(epoch).await
    }

    async fn renew(&self, epoch: u64) -> RenewalOutcome {
        let refresh_token = {
            let mut state = self.lock();
            if state.epoch != epoch || !state.phase.is_authenticated() {
                return RenewalOutcome::Discarded;
            }
            match self.inner.store.refresh_token() {
                Some(token) => token,
                None => {
                    tracing::warn!("no refresh token available; ending session");
                    self.teardown_locked(&mut state, "missing refresh token");
                    return RenewalOutcome::SessionEnded;
                }
            }
        };

        tracing::debug!("renewing access token");
        let result = self.inner.transport.refresh(&refresh_token).await;

        let mut state = self.lock();
        if state.epoch != epoch {
            tracing::debug!("discarding refresh response for a session that has ended");
            return RenewalOutcome::Discarded;
        }

        let fresh = match result {
            Ok(ApiResponse {
                success: true,
                data: Some(fresh),
                ..
            }) => fresh,
            Ok(ApiResponse { message, .. }) => {
                tracing::warn!(%message, "token refresh unsuccessful; ending session");
                self.teardown_locked(&mut state, "renewal failure");
                return RenewalOutcome::SessionEnded;
            }
            Err(err) => {
                tracing::warn!(error = %err, "token refresh failed; ending session");
                self.teardown_locked(&mut state, "renewal failure");
                return RenewalOutcome::SessionEnded;
            }
        };

        // A refresh without a lifetime keeps the current schedule.
        let ttl = fresh.expires_in.map(Duration::from_secs);
        let persisted = self
            .inner
            .store
            .replace_tokens(&fresh.into_pair())
            .and_then(|()| match ttl {
                Some(_) => self.inner.store.save_token_lifetime(ttl),
                None => Ok(()),
            });
        if let Err(err) = persisted {
            tracing::error!(error = %err, "failed to persist renewed tokens; ending session");
            self.teardown_locked(&mut state, "persist failure");
            return RenewalOutcome::SessionEnded;
        }

        if let Phase::Authenticated(info) = &mut state.phase {
            info.last_renewed_at = Some(Utc::now());
        }

        if let Some(ttl) = ttl {
            let period = effective_renewal_interval(self.inner.renewal_interval, Some(ttl));
            if period != state.period {
                tracing::info!(
                    previous_secs = state.period.as_secs_f64(),
                    period_secs = period.as_secs_f64(),
                    "token lifetime changed; rescheduling renewal"
                );
                state.period = period;
                self.schedule_renewal(&mut state);
            }
        }

        tracing::debug!("access token renewed");
        RenewalOutcome::Renewed
    }

    /// Enter `Authenticated` for `identity` and start a fresh renewal loop.
    fn establish(&self, state: &mut CoreState, identity: UserIdentity, ttl: Option<Duration>) {
        state.epoch += 1;
        state.phase = Phase::Authenticated(SessionInfo {
            identity,
            established_at: Utc::now(),
            last_renewed_at: None,
        });

        state.period = effective_renewal_interval(self.inner.renewal_interval, ttl);
        self.schedule_renewal(state);
        self.publish(state);
    }

    /// (Re)start the renewal loop for the current epoch at `state.period`.
    fn schedule_renewal(&self, state: &mut CoreState) {
        let epoch = state.epoch;
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);

        state.timer.start(state.period, move || {
            let weak = weak.clone();
            async move {
                let Some(inner) = weak.upgrade() else {
                    return ControlFlow::Break(());
                };
                match (SessionCore { inner }).renew(epoch).await {
                    RenewalOutcome::Renewed => ControlFlow::Continue(()),
                    _ => ControlFlow::Break(()),
                }
            }
        });
    }

    fn teardown(&self, reason: &'static str) -> bool {
        let mut state = self.lock();
        self.teardown_locked(&mut state, reason)
    }

    /// Clear everything. Safe to call any number of times; only the call
    /// that actually ends a session publishes a change.
    fn teardown_locked(&self, state: &mut CoreState, reason: &'static str) -> bool {
        self.inner.store.clear();
        state.timer.cancel();
        state.epoch += 1;

        if matches!(state.phase, Phase::Anonymous) {
            return false;
        }

        state.phase = Phase::Anonymous;
        self.publish(state);
        tracing::info!(reason, "session ended");
        true
    }

    fn publish(&self, state: &CoreState) {
        self.inner.snapshot.send_replace(state.phase.snapshot());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries (pure, no I/O)
    // ─────────────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Receive every published snapshot (for UI re-rendering).
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.snapshot.subscribe()
    }

    pub fn state(&self) -> AuthState {
        self.inner.snapshot.borrow().state()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.snapshot.borrow().is_authenticated()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.inner.snapshot.borrow().has_role(role)
    }

    pub fn has_privilege(&self, privilege: Privilege) -> bool {
        self.inner.snapshot.borrow().has_privilege(privilege)
    }

    pub fn current_user(&self) -> Option<UserIdentity> {
        self.inner.snapshot.borrow().user().cloned()
    }

    pub fn session_info(&self) -> Option<SessionInfo> {
        match &self.lock().phase {
            Phase::Authenticated(info) => Some(info.clone()),
            _ => None,
        }
    }

    /// Bearer token for other API clients, while a session is active.
    pub fn access_token(&self) -> Option<String> {
        let state = self.lock();
        if !state.phase.is_authenticated() {
            return None;
        }
        self.inner.store.access_token()
    }

    pub fn renewal_active(&self) -> bool {
        self.lock().timer.is_running()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Account operations
    // ─────────────────────────────────────────────────────────────────────

    /// Change the signed-in user's password. Returns the server's message.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<String, SessionError> {
        let access_token = self.access_token().ok_or(SessionError::NotAuthenticated)?;
        let response = self
            .inner
            .transport
            .change_password(&access_token, current_password, new_password)
            .await?;
        settle(response, "Password change failed")
    }

    pub async fn forgot_password(&self, email: &str) -> Result<String, SessionError> {
        let response = self.inner.transport.forgot_password(email).await?;
        settle(response, "Failed to send reset email")
    }

    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<String, SessionError> {
        let response = self
            .inner
            .transport
            .reset_password(token, new_password)
            .await?;
        settle(response, "Password reset failed")
    }
}

fn message_or(message: String, fallback: &str) -> String {
    if message.is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

fn settle(response: ApiResponse<Value>, fallback: &str) -> Result<String, SessionError> {
    if response.success {
        Ok(response.message)
    } else {
        Err(SessionError::Rejected(message_or(response.message, fallback)))
    }
}
