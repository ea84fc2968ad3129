//! Access to the authenticated session.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::actor::Actor;

/// Resolves the user behind the current session.
///
/// Authentication itself lives outside this workspace; implementations
/// adapt whatever session mechanism the host application uses.
#[async_trait]
pub trait SessionProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the signed-in actor, or `None` when nobody is signed in.
    async fn current_actor(&self) -> AppResult<Option<Actor>>;
}

/// A session fixed to a single actor (CLI invocations, tests).
#[derive(Debug, Clone)]
pub struct StaticSession {
    actor: Option<Actor>,
}

impl StaticSession {
    /// A session signed in as `actor`.
    pub fn signed_in(actor: Actor) -> Self {
        Self { actor: Some(actor) }
    }

    /// A session with nobody signed in.
    pub fn anonymous() -> Self {
        Self { actor: None }
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_actor(&self) -> AppResult<Option<Actor>> {
        Ok(self.actor.clone())
    }
}
