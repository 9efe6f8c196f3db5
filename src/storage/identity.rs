use tokio::sync::watch;

use crate::common::Identity;
use crate::error::SessionError;

use super::session::{AuthSession, SessionStore};

/// Owns the stored sign-in and broadcasts changes to whoever subscribed.
///
/// The view and the API client each hold a receiver: the view to re-resolve
/// the active username, the client to pick up the current bearer token.
pub struct IdentityProvider {
    store: SessionStore,
    sender: watch::Sender<Option<AuthSession>>,
}

impl IdentityProvider {
    /// Load the stored session. An unreadable file is logged and treated as signed out.
    pub fn open(store: SessionStore) -> Self {
        let session = match store.load() {
            Ok(session) => session,
            Err(err) => {
                log::warn!(
                    "Ignoring unreadable session file {}: {err}",
                    store.path().display()
                );
                None
            }
        };
        let (sender, _) = watch::channel(session);
        Self { store, sender }
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.sender.borrow().as_ref().map(AuthSession::identity)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<AuthSession>> {
        self.sender.subscribe()
    }

    pub fn sign_in(&self, session: AuthSession) -> Result<(), SessionError> {
        self.store.save(&session)?;
        log::info!("Signed in as {}", session.username);
        self.sender.send_replace(Some(session));
        Ok(())
    }

    pub fn sign_out(&self) -> Result<(), SessionError> {
        self.store.clear()?;
        log::info!("Signed out");
        self.sender.send_replace(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn subscribers_see_sign_in_and_sign_out() {
        let dir = tempdir().unwrap();
        let provider = IdentityProvider::open(SessionStore::new(dir.path().join("session.json")));
        let mut receiver = provider.subscribe();
        assert_eq!(provider.current_identity(), None);

        provider
            .sign_in(AuthSession {
                username: "alice".to_string(),
                token: "t".to_string(),
            })
            .unwrap();
        assert!(receiver.has_changed().unwrap());
        assert_eq!(
            receiver.borrow_and_update().as_ref().map(|s| s.username.clone()),
            Some("alice".to_string())
        );

        provider.sign_out().unwrap();
        assert!(receiver.has_changed().unwrap());
        assert_eq!(*receiver.borrow_and_update(), None);
        assert_eq!(provider.current_identity(), None);
    }

    #[test]
    fn open_reads_existing_session() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store
            .save(&AuthSession {
                username: "bob".to_string(),
                token: "t".to_string(),
            })
            .unwrap();

        let provider = IdentityProvider::open(store);
        assert_eq!(
            provider.current_identity(),
            Some(Identity {
                username: "bob".to_string()
            })
        );
    }

    #[test]
    fn corrupt_session_opens_signed_out() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "garbage").unwrap();
        let provider = IdentityProvider::open(SessionStore::new(&path));
        assert_eq!(provider.current_identity(), None);
    }
}
