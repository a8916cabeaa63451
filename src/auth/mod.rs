use parking_lot::RwLock;
use std::sync::Arc;

/// Name-only login flag. Created once at the application root and handed to
/// whatever needs to know who is signed in; clones share the same state.
#[derive(Clone, Default)]
pub struct AuthSession {
    user: Arc<RwLock<Option<String>>>,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank names are ignored and leave the session logged out.
    pub fn login(&self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        *self.user.write() = Some(name.to_string());
        tracing::info!(user = name, "logged in");
        true
    }

    pub fn logout(&self) {
        if let Some(name) = self.user.write().take() {
            tracing::info!(user = %name, "logged out");
        }
    }

    pub fn logged_in(&self) -> bool {
        self.user.read().is_some()
    }

    pub fn user_name(&self) -> Option<String> {
        self.user.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_login_state() {
        let root = AuthSession::new();
        let handle = root.clone();
        assert!(!handle.logged_in());
        assert!(root.login("  Ada "));
        assert_eq!(handle.user_name().as_deref(), Some("Ada"));
        handle.logout();
        assert!(!root.logged_in());
    }

    #[test]
    fn blank_name_does_not_log_in() {
        let auth = AuthSession::new();
        assert!(!auth.login("   "));
        assert!(!auth.logged_in());
    }
}
