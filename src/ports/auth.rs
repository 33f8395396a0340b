/// Seam to the auth collaborator. The gateway only ever asks for the current
/// bearer token; credential lifecycle lives entirely on the other side.
pub trait AuthPort: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Anonymous access, used by the demo binary and most tests.
pub struct NoAuth;

impl AuthPort for NoAuth {
    fn token(&self) -> Option<String> {
        None
    }
}

/// A fixed token, handy when the caller already holds a session.
pub struct StaticToken(pub String);

impl AuthPort for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}
