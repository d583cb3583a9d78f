use std::sync::Arc;

use crate::error::Result;
use crate::trait_store::KeyValueStore;

pub const TOKEN_KEY: &str = "token";
pub const REMEMBERED_EMAIL_KEY: &str = "remembered_email";

/// Auth token and login conveniences
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn token(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(TOKEN_KEY)?
            .filter(|token| !token.trim().is_empty()))
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        self.store.set(TOKEN_KEY, token.trim())
    }

    /// Logout
    pub fn clear_token(&self) -> Result<()> {
        self.store.delete(TOKEN_KEY)
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.token()?.is_some())
    }

    pub fn remembered_email(&self) -> Result<Option<String>> {
        self.store.get(REMEMBERED_EMAIL_KEY)
    }

    pub fn remember_email(&self, email: &str) -> Result<()> {
        self.store.set(REMEMBERED_EMAIL_KEY, email.trim())
    }

    pub fn forget_email(&self) -> Result<()> {
        self.store.delete(REMEMBERED_EMAIL_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn test_login_logout() {
        let session = Session::new(Arc::new(MemoryStore::new()));
        assert!(!session.is_authenticated().unwrap());

        session.set_token(" abc ").unwrap();
        assert_eq!(session.token().unwrap().as_deref(), Some("abc"));

        session.clear_token().unwrap();
        assert!(!session.is_authenticated().unwrap());
    }

    #[test]
    fn test_remembered_email_survives_logout() {
        let session = Session::new(Arc::new(MemoryStore::new()));
        session.set_token("abc").unwrap();
        session.remember_email("ops@loja.com").unwrap();

        session.clear_token().unwrap();
        assert_eq!(
            session.remembered_email().unwrap().as_deref(),
            Some("ops@loja.com")
        );
    }
}
