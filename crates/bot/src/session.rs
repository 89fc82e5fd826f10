use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use model::report::ReportKind;
use tokio::sync::RwLock;

/// What a user asked for and still owes a location to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingRequest {
    Report(ReportKind),
    Traffic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingLocation {
        request: PendingRequest,
        since: Instant,
    },
}

impl SessionState {
    fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        match self {
            Self::Idle => false,
            Self::AwaitingLocation { since, .. } => now.saturating_duration_since(*since) >= timeout,
        }
    }
}

/// Per user conversation state. Users without an entry are `Idle`; an entry
/// exists only while a command waits for its location.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<i64, SessionState>>,
    timeout: Duration,
}

impl SessionStore {
    pub fn new(timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            timeout,
        }
    }

    /// A new command replaces whatever the user was asked before.
    pub async fn await_location(&self, user: i64, request: PendingRequest, now: Instant) {
        self.sessions.write().await.insert(
            user,
            SessionState::AwaitingLocation {
                request,
                since: now,
            },
        );
    }

    /// Consumes the pending request of `user`, leaving the session `Idle`.
    /// Expired requests are dropped and yield `None`.
    pub async fn take_pending(&self, user: i64, now: Instant) -> Option<PendingRequest> {
        let state = self.sessions.write().await.remove(&user)?;
        if state.is_expired(now, self.timeout) {
            log::debug!("pending request of user {} expired", user);
            return None;
        }
        match state {
            SessionState::AwaitingLocation { request, .. } => Some(request),
            SessionState::Idle => None,
        }
    }

    pub async fn state(&self, user: i64, now: Instant) -> SessionState {
        match self.sessions.read().await.get(&user) {
            Some(state) if !state.is_expired(now, self.timeout) => *state,
            _ => SessionState::Idle,
        }
    }

    pub async fn cancel(&self, user: i64) {
        self.sessions.write().await.remove(&user);
    }

    /// Drops all expired sessions and returns how many were removed.
    pub async fn evict_expired(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, state| !state.is_expired(now, self.timeout));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(600);

    #[tokio::test]
    async fn users_start_idle() {
        let sessions = SessionStore::new(TIMEOUT);
        let now = Instant::now();
        assert_eq!(sessions.state(1, now).await, SessionState::Idle);
        assert_eq!(sessions.take_pending(1, now).await, None);
    }

    #[tokio::test]
    async fn location_completes_pending_request() {
        let sessions = SessionStore::new(TIMEOUT);
        let now = Instant::now();
        sessions
            .await_location(1, PendingRequest::Report(ReportKind::Hazard), now)
            .await;
        assert!(matches!(
            sessions.state(1, now).await,
            SessionState::AwaitingLocation {
                request: PendingRequest::Report(ReportKind::Hazard),
                ..
            }
        ));

        let later = now + Duration::from_secs(5);
        assert_eq!(
            sessions.take_pending(1, later).await,
            Some(PendingRequest::Report(ReportKind::Hazard))
        );
        assert_eq!(sessions.state(1, later).await, SessionState::Idle);
        assert_eq!(sessions.take_pending(1, later).await, None);
    }

    #[tokio::test]
    async fn newer_command_replaces_older() {
        let sessions = SessionStore::new(TIMEOUT);
        let now = Instant::now();
        sessions
            .await_location(1, PendingRequest::Report(ReportKind::Roadblock), now)
            .await;
        sessions.await_location(1, PendingRequest::Traffic, now).await;
        assert_eq!(
            sessions.take_pending(1, now).await,
            Some(PendingRequest::Traffic)
        );
    }

    #[tokio::test]
    async fn sessions_are_per_user() {
        let sessions = SessionStore::new(TIMEOUT);
        let now = Instant::now();
        sessions.await_location(1, PendingRequest::Traffic, now).await;
        assert_eq!(sessions.take_pending(2, now).await, None);
        assert_eq!(
            sessions.take_pending(1, now).await,
            Some(PendingRequest::Traffic)
        );
    }

    #[tokio::test]
    async fn pending_requests_expire() {
        let sessions = SessionStore::new(TIMEOUT);
        let now = Instant::now();
        sessions.await_location(1, PendingRequest::Traffic, now).await;
        let expired = now + TIMEOUT;
        assert_eq!(sessions.state(1, expired).await, SessionState::Idle);
        assert_eq!(sessions.take_pending(1, expired).await, None);
        assert_eq!(sessions.len().await, 0);
    }

    #[tokio::test]
    async fn eviction_only_removes_expired() {
        let sessions = SessionStore::new(TIMEOUT);
        let now = Instant::now();
        sessions.await_location(1, PendingRequest::Traffic, now).await;
        sessions
            .await_location(2, PendingRequest::Traffic, now + Duration::from_secs(300))
            .await;

        let removed = sessions.evict_expired(now + Duration::from_secs(700)).await;
        assert_eq!(removed, 1);
        assert_eq!(sessions.len().await, 1);
        assert_eq!(
            sessions.take_pending(2, now + Duration::from_secs(700)).await,
            Some(PendingRequest::Traffic)
        );
    }

    #[tokio::test]
    async fn cancel_resets_to_idle() {
        let sessions = SessionStore::new(TIMEOUT);
        let now = Instant::now();
        sessions.await_location(1, PendingRequest::Traffic, now).await;
        sessions.cancel(1).await;
        assert_eq!(sessions.state(1, now).await, SessionState::Idle);
    }
}
