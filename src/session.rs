//! Operator session shared by every screen.
//!
//! [`SessionContext`] is a cheap handle around a `watch` channel. Screens clone it, read the
//! current [`Session`] and subscribe to changes, so a logout on one screen is seen by the
//! others on their next command.

use crate::{
    backend::{AuthUser, Backend},
    core::RecordId,
    errors::{Error, Result},
};
use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{info, instrument, warn};

/// Token and operator of the current login, both empty when logged out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    /// Opaque token issued by the backend
    pub token: Option<String>,
    /// Logged-in operator
    pub user: Option<AuthUser>,
}

impl Session {
    /// A session is valid when it carries a token and a user.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    /// Id of the logged-in operator.
    #[must_use]
    pub fn current_user_id(&self) -> Option<&RecordId> {
        self.user.as_ref().map(|user| &user.id)
    }
}

/// Shared handle to the session.
#[derive(Clone, Debug)]
pub struct SessionContext {
    tx: Arc<watch::Sender<Session>>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    /// Logged-out context.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Session::default());
        Self { tx: Arc::new(tx) }
    }

    /// Authenticates against the backend and stores the session.
    ///
    /// A failed attempt leaves the context logged out.
    ///
    /// # Errors
    /// [`Error::AuthenticationFailure`] for bad credentials, or the backend's error.
    #[instrument(skip(self, backend, secret))]
    pub async fn login<B: Backend>(
        &self,
        backend: &B,
        identity: &str,
        secret: &str,
    ) -> Result<AuthUser> {
        match backend.authenticate(identity, secret).await {
            Ok(auth) => {
                let user = auth.user.clone();
                self.tx.send_replace(Session {
                    token: Some(auth.token),
                    user: Some(auth.user),
                });
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.clear();
                Err(e)
            }
        }
    }

    /// Clears the session.
    pub fn logout(&self) {
        self.clear();
    }

    fn clear(&self) {
        self.tx.send_if_modified(|session| {
            if *session == Session::default() {
                return false;
            }
            *session = Session::default();
            true
        });
    }

    /// Whether an operator is logged in.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.tx.borrow().is_valid()
    }

    /// The logged-in operator.
    #[must_use]
    pub fn current_user(&self) -> Option<AuthUser> {
        self.tx.borrow().user.clone()
    }

    /// The logged-in operator, for screens that need one.
    ///
    /// # Errors
    /// [`Error::Unauthenticated`] when nobody is logged in.
    pub fn require_user(&self) -> Result<AuthUser> {
        let session = self.tx.borrow();
        match (&session.token, &session.user) {
            (Some(_), Some(user)) => Ok(user.clone()),
            _ => Err(Error::Unauthenticated),
        }
    }

    /// Receiver notified on every login and logout.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Logs every session change until the context is dropped.
    #[must_use = "dropping the handle detaches the logger"]
    pub fn spawn_change_logger(&self) -> JoinHandle<()> {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let session = rx.borrow_and_update().clone();
                match session.user {
                    Some(user) => info!(user = %user.username, "Session started"),
                    None => info!("Session ended"),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    async fn backend_with_operator() -> Result<crate::backend::SeaOrmBackend> {
        let backend = setup_backend().await?;
        backend
            .register_user("caja1", "caja1@kiosko.local", "Caja Uno", "secreto")
            .await?;
        Ok(backend)
    }

    #[tokio::test]
    async fn test_login_and_logout() -> Result<()> {
        init_test_tracing();
        let backend = backend_with_operator().await?;
        let session = SessionContext::new();
        assert!(!session.is_valid());
        assert!(matches!(session.require_user(), Err(Error::Unauthenticated)));

        let user = session.login(&backend, "caja1", "secreto").await?;
        assert_eq!(user.username, "caja1");
        assert!(session.is_valid());
        assert_eq!(session.current_user().unwrap().name, "Caja Uno");

        session.logout();
        assert!(!session.is_valid());
        assert!(session.current_user().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_login_clears_previous_session() -> Result<()> {
        let backend = backend_with_operator().await?;
        let session = SessionContext::new();
        session.login(&backend, "caja1", "secreto").await?;

        let result = session.login(&backend, "caja1", "wrong").await;
        assert!(matches!(result, Err(Error::AuthenticationFailure)));
        assert!(!session.is_valid());
        Ok(())
    }

    #[tokio::test]
    async fn test_clones_share_state_and_notify_subscribers() -> Result<()> {
        let backend = backend_with_operator().await?;
        let session = SessionContext::new();
        let screen = session.clone();
        let mut rx = screen.subscribe();
        let logger = session.spawn_change_logger();

        session.login(&backend, "caja1@kiosko.local", "secreto").await?;
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_valid());
        assert!(screen.is_valid());

        screen.logout();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().current_user_id().is_none());

        // Logging out twice is not a change.
        screen.logout();
        assert!(!rx.has_changed().unwrap());

        logger.abort();
        Ok(())
    }
}
