//! Mutation facade: update first, then log.
//!
//! A failed update logs nothing. A failed log after a committed update
//! still reports success; the audit failure is returned in `log_error`.
//! An audit row rejected by the logging contract is never absorbed: the
//! mutation reports failure with [`LifecycleError::Contract`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use bugtrack_core::error::AppError;
use bugtrack_database::store::BugStore;
use bugtrack_entity::activity::BugAction;
use bugtrack_entity::bug::{Bug, BugPriority, BugStatus, CreateBug};

use crate::activity::{ActivityLogger, LogContractViolation};
use crate::context::RequestContext;
use crate::error::LifecycleError;

/// Outcome of a facade mutation.
#[derive(Debug, Clone, Serialize)]
pub struct MutationResult {
    /// Whether the mutation completed. False when the update was refused or
    /// failed, or when its audit row broke the logging contract.
    pub success: bool,
    /// Why the mutation did not complete.
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<LifecycleError>,
    /// Audit failure after a successful update.
    pub log_error: Option<String>,
    /// The bug as stored after the mutation.
    pub bug: Option<Bug>,
}

fn serialize_error<S: serde::Serializer>(
    error: &Option<LifecycleError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

impl MutationResult {
    fn applied(bug: Bug, log_error: Option<String>) -> Self {
        Self {
            success: true,
            error: None,
            log_error,
            bug: Some(bug),
        }
    }

    fn violated(bug: Bug, violation: LogContractViolation) -> Self {
        Self {
            success: false,
            error: Some(LifecycleError::Contract(violation)),
            log_error: None,
            bug: Some(bug),
        }
    }

    fn rejected(error: LifecycleError) -> Self {
        Self {
            success: false,
            error: Some(error),
            log_error: None,
            bug: None,
        }
    }
}

/// Pairs every bug state change with exactly one audit row.
#[derive(Debug, Clone)]
pub struct MutationFacade {
    bugs: Arc<dyn BugStore>,
    logger: Arc<ActivityLogger>,
}

impl MutationFacade {
    /// Creates a new mutation facade.
    pub fn new(bugs: Arc<dyn BugStore>, logger: Arc<ActivityLogger>) -> Self {
        Self { bugs, logger }
    }

    /// Report a new bug owned by `data.owner_id`.
    pub async fn create_bug(&self, ctx: &RequestContext, data: CreateBug) -> MutationResult {
        if data.title.trim().is_empty() {
            return MutationResult::rejected(LifecycleError::Validation(
                "Bug title is required".to_string(),
            ));
        }
        if !ctx.actor.can_modify(data.owner_id) {
            return MutationResult::rejected(LifecycleError::Permission);
        }

        let bug = match self.bugs.create(&data).await {
            Ok(bug) => bug,
            Err(e) => return self.update_failed(ctx, "create", e),
        };
        let action = BugAction::Created {
            title: bug.title.clone(),
        };
        self.record(ctx, bug, action).await
    }

    /// Change the workflow status.
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        bug: &Bug,
        status: BugStatus,
    ) -> MutationResult {
        if let Err(e) = self.check(ctx, bug) {
            return MutationResult::rejected(e);
        }
        if bug.status == status {
            return MutationResult::applied(bug.clone(), None);
        }

        let updated = match self.bugs.update_status(bug.id, status).await {
            Ok(updated) => updated,
            Err(e) => return self.update_failed(ctx, "update_status", e),
        };
        let action = BugAction::StatusChanged {
            old: bug.status,
            new: status,
        };
        self.record(ctx, updated, action).await
    }

    /// Change the priority.
    pub async fn update_priority(
        &self,
        ctx: &RequestContext,
        bug: &Bug,
        priority: BugPriority,
    ) -> MutationResult {
        if let Err(e) = self.check(ctx, bug) {
            return MutationResult::rejected(e);
        }
        if bug.priority == priority {
            return MutationResult::applied(bug.clone(), None);
        }

        let updated = match self.bugs.update_priority(bug.id, priority).await {
            Ok(updated) => updated,
            Err(e) => return self.update_failed(ctx, "update_priority", e),
        };
        let action = BugAction::PriorityChanged {
            old: bug.priority,
            new: priority,
        };
        self.record(ctx, updated, action).await
    }

    /// Hide the bug from the default listing.
    pub async fn archive_bug(&self, ctx: &RequestContext, bug: &Bug) -> MutationResult {
        self.set_archived(ctx, bug, true).await
    }

    /// Return an archived bug to the default listing.
    pub async fn unarchive_bug(&self, ctx: &RequestContext, bug: &Bug) -> MutationResult {
        self.set_archived(ctx, bug, false).await
    }

    async fn set_archived(&self, ctx: &RequestContext, bug: &Bug, archived: bool) -> MutationResult {
        if let Err(e) = self.check(ctx, bug) {
            return MutationResult::rejected(e);
        }
        if bug.is_archived == archived {
            return MutationResult::applied(bug.clone(), None);
        }

        let updated = match self.bugs.set_archived(bug.id, archived).await {
            Ok(updated) => updated,
            Err(e) => return self.update_failed(ctx, "set_archived", e),
        };
        let action = if archived {
            BugAction::Archived
        } else {
            BugAction::Restored
        };
        self.record(ctx, updated, action).await
    }

    fn check(&self, ctx: &RequestContext, bug: &Bug) -> Result<(), LifecycleError> {
        if bug.id.is_nil() {
            return Err(LifecycleError::Validation("Bug id is required".to_string()));
        }
        if !ctx.actor.can_modify(bug.owner_id) {
            warn!(
                bug_id = %bug.id,
                actor_id = %ctx.actor_id(),
                "Mutation denied: actor is neither owner nor admin"
            );
            return Err(LifecycleError::Permission);
        }
        Ok(())
    }

    fn update_failed(&self, ctx: &RequestContext, op: &str, e: AppError) -> MutationResult {
        warn!(
            op,
            actor_id = %ctx.actor_id(),
            request_id = %ctx.request_id,
            error = %e,
            "Bug update failed; nothing logged"
        );
        MutationResult::rejected(LifecycleError::Update(e))
    }

    async fn record(&self, ctx: &RequestContext, bug: Bug, action: BugAction) -> MutationResult {
        let tag = action.tag();
        let log_error = match self.logger.log_bug_activity(ctx, bug.id, action).await {
            Ok(outcome) if outcome.success => None,
            Ok(outcome) => outcome.error,
            Err(violation) => {
                error!(
                    bug_id = %bug.id,
                    actor_id = %ctx.actor_id(),
                    action = tag,
                    error = %violation,
                    "Bug updated but its audit row broke the logging contract"
                );
                return MutationResult::violated(bug, violation);
            }
        };

        match &log_error {
            None => info!(bug_id = %bug.id, actor_id = %ctx.actor_id(), action = tag, "Bug updated"),
            Some(e) => warn!(
                bug_id = %bug.id,
                actor_id = %ctx.actor_id(),
                action = tag,
                error = %e,
                "Bug updated but activity was not recorded"
            ),
        }
        MutationResult::applied(bug, log_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bugtrack_core::result::AppResult;
    use bugtrack_core::types::actor::Actor;
    use bugtrack_database::memory::{MemoryActivityLogStore, MemoryBugStore};
    use uuid::Uuid;

    /// Hands back rows without an id, as a broken adapter would.
    #[derive(Debug, Default)]
    struct IdlessBugStore(MemoryBugStore);

    #[async_trait]
    impl BugStore for IdlessBugStore {
        async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Bug>> {
            self.0.find_by_id(id).await
        }

        async fn create(&self, data: &CreateBug) -> AppResult<Bug> {
            let mut bug = self.0.create(data).await?;
            bug.id = Uuid::nil();
            Ok(bug)
        }

        async fn update_status(&self, id: Uuid, status: BugStatus) -> AppResult<Bug> {
            self.0.update_status(id, status).await
        }

        async fn update_priority(&self, id: Uuid, priority: BugPriority) -> AppResult<Bug> {
            self.0.update_priority(id, priority).await
        }

        async fn set_archived(&self, id: Uuid, archived: bool) -> AppResult<Bug> {
            self.0.set_archived(id, archived).await
        }

        async fn delete(&self, id: Uuid) -> AppResult<bool> {
            self.0.delete(id).await
        }
    }

    struct Fixture {
        bugs: Arc<MemoryBugStore>,
        logs: Arc<MemoryActivityLogStore>,
        facade: MutationFacade,
        owner: RequestContext,
    }

    fn fixture() -> Fixture {
        let bugs = Arc::new(MemoryBugStore::new());
        let logs = Arc::new(MemoryActivityLogStore::new());
        let logger = Arc::new(ActivityLogger::new(logs.clone()));
        let facade = MutationFacade::new(bugs.clone(), logger);
        let owner = RequestContext::new(Actor::member(Uuid::new_v4(), "owner@example.com"));
        Fixture {
            bugs,
            logs,
            facade,
            owner,
        }
    }

    async fn create(f: &Fixture) -> Bug {
        let result = f
            .facade
            .create_bug(
                &f.owner,
                CreateBug {
                    owner_id: f.owner.actor_id(),
                    title: "Crash on save".to_string(),
                    description: None,
                    priority: BugPriority::Medium,
                    reported_by_email: Some("owner@example.com".to_string()),
                    reported_by_name: Some("Owner".to_string()),
                    category: None,
                },
            )
            .await;
        assert!(result.success);
        result.bug.unwrap()
    }

    #[tokio::test]
    async fn test_status_change_records_transition() {
        let f = fixture();
        let bug = create(&f).await;

        let result = f
            .facade
            .update_status(&f.owner, &bug, BugStatus::Resolved)
            .await;
        assert!(result.success);
        assert_eq!(result.bug.unwrap().status, BugStatus::Resolved);

        let rows = f.logs.all().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].action, "bug_created");
        assert_eq!(rows[1].action, "status_changed");
        assert_eq!(rows[1].old_value.as_deref(), Some("open"));
        assert_eq!(rows[1].new_value.as_deref(), Some("resolved"));
    }

    #[tokio::test]
    async fn test_failed_update_logs_nothing() {
        let f = fixture();
        let bug = create(&f).await;
        f.bugs.failures.arm("update");

        let result = f.facade.archive_bug(&f.owner, &bug).await;
        assert!(!result.success);
        assert!(matches!(result.error, Some(LifecycleError::Update(_))));
        assert_eq!(f.logs.all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_log_keeps_update() {
        let f = fixture();
        let bug = create(&f).await;
        f.logs.failures.arm("insert");

        let result = f
            .facade
            .update_priority(&f.owner, &bug, BugPriority::High)
            .await;
        assert!(result.success);
        assert!(result.log_error.is_some());
        let stored = f.bugs.find_by_id(bug.id).await.unwrap().unwrap();
        assert_eq!(stored.priority, BugPriority::High);
    }

    #[tokio::test]
    async fn test_non_owner_is_denied() {
        let f = fixture();
        let bug = create(&f).await;
        let stranger = RequestContext::new(Actor::member(Uuid::new_v4(), "x@example.com"));

        let result = f.facade.archive_bug(&stranger, &bug).await;
        assert_eq!(result.error, Some(LifecycleError::Permission));
        assert!(!f.bugs.find_by_id(bug.id).await.unwrap().unwrap().is_archived);

        let admin = RequestContext::new(Actor::admin(Uuid::new_v4(), "root@example.com"));
        assert!(f.facade.archive_bug(&admin, &bug).await.success);
    }

    #[tokio::test]
    async fn test_contract_violation_fails_the_mutation() {
        let logs = Arc::new(MemoryActivityLogStore::new());
        let facade = MutationFacade::new(
            Arc::new(IdlessBugStore::default()),
            Arc::new(ActivityLogger::new(logs.clone())),
        );
        let owner = RequestContext::new(Actor::member(Uuid::new_v4(), "owner@example.com"));

        let result = facade
            .create_bug(
                &owner,
                CreateBug {
                    owner_id: owner.actor_id(),
                    title: "Lost id".to_string(),
                    description: None,
                    priority: BugPriority::Low,
                    reported_by_email: None,
                    reported_by_name: None,
                    category: None,
                },
            )
            .await;

        assert!(!result.success);
        assert!(matches!(
            result.error,
            Some(LifecycleError::Contract(LogContractViolation::MissingEntityId { .. }))
        ));
        assert!(result.log_error.is_none());
        assert!(result.bug.is_some());
        assert!(logs.all().await.is_empty());
    }

    #[tokio::test]
    async fn test_unchanged_value_is_a_no_op() {
        let f = fixture();
        let bug = create(&f).await;
        let result = f.facade.unarchive_bug(&f.owner, &bug).await;
        assert!(result.success);
        assert_eq!(f.logs.all().await.len(), 1);
    }
}
