//! Request context carrying the acting user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bugtrack_core::error::AppError;
use bugtrack_core::traits::SessionProvider;
use bugtrack_core::types::actor::Actor;

/// Context for the current operation.
///
/// Passed into service methods so that every operation knows *who* is
/// acting; audit rows take their actor id and email from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user.
    pub actor: Actor,
    /// Correlation id for log lines of one operation.
    pub request_id: Uuid,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context for `actor`.
    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            request_id: Uuid::new_v4(),
            request_time: Utc::now(),
        }
    }

    /// Builds a context from the signed-in session.
    pub async fn from_session(session: &dyn SessionProvider) -> Result<Self, AppError> {
        let actor = session
            .current_actor()
            .await?
            .ok_or_else(|| AppError::authentication("No signed-in user"))?;
        Ok(Self::new(actor))
    }

    /// The acting user's id.
    pub fn actor_id(&self) -> Uuid {
        self.actor.id
    }

    /// Returns whether the acting user is an admin.
    pub fn is_admin(&self) -> bool {
        self.actor.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bugtrack_core::traits::StaticSession;

    #[tokio::test]
    async fn test_from_session() {
        let actor = Actor::admin(Uuid::new_v4(), "root@example.com");
        let ctx = RequestContext::from_session(&StaticSession::signed_in(actor.clone()))
            .await
            .unwrap();
        assert_eq!(ctx.actor_id(), actor.id);
        assert!(ctx.is_admin());

        assert!(
            RequestContext::from_session(&StaticSession::anonymous())
                .await
                .is_err()
        );
    }
}
