use rentdesk_auth::Identity;

/// Caller context for a request (the verified token's identity).
///
/// This is immutable and present on every protected route. Handlers never
/// re-read the caller's account to authorize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    identity: Identity,
}

impl CallerContext {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}
