use tokio::sync::watch;

/// Accessor for the bearer token of the current session.
pub trait TokenSource: Send + Sync + 'static {
    fn token(&self) -> Option<String>;
}

/// Requests are sent without an `Authorization` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

impl TokenSource for NoToken {
    fn token(&self) -> Option<String> {
        None
    }
}

/// A fixed token, typically from configuration.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenSource for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Token cell updated on sign-in and sign-out.
///
/// Cloning shares the cell, so the handle kept by the auth layer and the
/// one given to the HTTP client see the same value.
#[derive(Clone)]
pub struct SessionToken {
    tx: watch::Sender<Option<String>>,
}

impl SessionToken {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn set(&self, token: impl Into<String>) {
        self.tx.send_replace(Some(token.into()));
    }

    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    pub fn is_signed_in(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Watch sign-in state changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenSource for SessionToken {
    fn token(&self) -> Option<String> {
        self.tx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_token_is_shared_between_clones() {
        let session = SessionToken::new();
        let client_side = session.clone();
        assert_eq!(client_side.token(), None);

        session.set("abc");
        assert_eq!(client_side.token().as_deref(), Some("abc"));
        assert!(client_side.is_signed_in());

        session.clear();
        assert_eq!(client_side.token(), None);
    }
}
