//! Activity logger service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error};
use uuid::Uuid;

use bugtrack_core::error::AppError;
use bugtrack_core::types::pagination::{PageRequest, PageResponse};
use bugtrack_database::store::{ActivityFilter, ActivityLogStore};
use bugtrack_entity::activity::{ActivityAction, ActivityLogEntry, BugAction, CommentAction};

use super::contract::{ActivityInput, LogContractViolation};
use crate::context::RequestContext;

/// Result of one logging call that passed the contract.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityOutcome {
    /// Whether the row was stored.
    pub success: bool,
    /// Store failure, when `success` is false.
    pub error: Option<String>,
    /// The stored row.
    pub entry: Option<ActivityLogEntry>,
}

/// Writes every audit row.
///
/// Contract violations come back as `Err` and nothing is written. Store
/// failures come back as an unsuccessful [`ActivityOutcome`].
#[derive(Debug, Clone)]
pub struct ActivityLogger {
    store: Arc<dyn ActivityLogStore>,
}

impl ActivityLogger {
    /// Creates a new activity logger.
    pub fn new(store: Arc<dyn ActivityLogStore>) -> Self {
        Self { store }
    }

    /// Validate and store one row.
    pub async fn log_activity(
        &self,
        input: ActivityInput,
    ) -> Result<ActivityOutcome, LogContractViolation> {
        let row = match input.validate() {
            Ok(row) => row,
            Err(violation) => {
                error!(error = %violation, "Rejected activity log entry");
                return Err(violation);
            }
        };

        match self.store.insert(&row).await {
            Ok(entry) => {
                debug!(
                    action = %entry.action,
                    entity_type = %entry.entity_type,
                    entity_id = %entry.entity_id,
                    "Recorded activity"
                );
                Ok(ActivityOutcome {
                    success: true,
                    error: None,
                    entry: Some(entry),
                })
            }
            Err(e) => {
                error!(
                    action = %row.action,
                    entity_id = %row.entity_id,
                    error = %e,
                    "Failed to store activity log entry"
                );
                Ok(ActivityOutcome {
                    success: false,
                    error: Some(e.message),
                    entry: None,
                })
            }
        }
    }

    /// Record a bug action against `bug_id`.
    pub async fn log_bug_activity(
        &self,
        ctx: &RequestContext,
        bug_id: Uuid,
        action: BugAction,
    ) -> Result<ActivityOutcome, LogContractViolation> {
        self.log_typed(ctx, bug_id, Some(bug_id), action.into())
            .await
    }

    /// Record a comment action against `comment_id` on `bug_id`.
    pub async fn log_comment_activity(
        &self,
        ctx: &RequestContext,
        comment_id: Uuid,
        bug_id: Uuid,
        action: CommentAction,
    ) -> Result<ActivityOutcome, LogContractViolation> {
        self.log_typed(ctx, comment_id, Some(bug_id), action.into())
            .await
    }

    async fn log_typed(
        &self,
        ctx: &RequestContext,
        entity_id: Uuid,
        bug_id: Option<Uuid>,
        action: ActivityAction,
    ) -> Result<ActivityOutcome, LogContractViolation> {
        self.log_activity(ActivityInput {
            action: action.tag().to_string(),
            entity_type: action.entity_type().as_str().to_string(),
            entity_id: Some(entity_id),
            actor_id: ctx.actor.id,
            actor_email: ctx.actor.email.clone(),
            bug_id,
            field: action.field().map(String::from),
            old_value: action.old_value(),
            new_value: action.new_value(),
        })
        .await
    }

    /// Full history of one bug, oldest first.
    pub async fn history(&self, bug_id: Uuid) -> Result<Vec<ActivityLogEntry>, AppError> {
        self.store.find_by_bug(bug_id).await
    }

    /// Searches the activity log, newest first.
    pub async fn search(
        &self,
        filter: &ActivityFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<ActivityLogEntry>, AppError> {
        self.store.search(filter, page).await
    }

    /// Entries recorded at or after `since`, oldest first.
    pub async fn export_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActivityLogEntry>, AppError> {
        self.store.find_since(since).await
    }
}
