mod helpers;

use std::time::Duration;

use bugtrack_database::store::{BugStore, DeletedBugStore};
use bugtrack_entity::bug::Bug;
use bugtrack_service::{DeletionState, LifecycleError};
use uuid::Uuid;

use helpers::{Harness, admin, ctx, member};

#[tokio::test]
async fn test_successful_delete_runs_steps_in_order() {
    let h = Harness::new();
    let owner = member("owner@example.com");
    let bug = h.seed_bug(&owner, "Crash on save").await;
    h.seed_image(&owner, &bug, "Jane Doe").await;
    h.seed_image(&owner, &bug, "John Roe").await;

    let result = h.orchestrator.delete_bug(Some(&bug), &ctx(&owner)).await;

    assert!(result.success);
    assert_eq!(result.deleted_bug_id, Some(bug.id));
    assert!(result.error.is_none());
    assert!(result.cleanup_warning.is_none());

    let writes: Vec<_> = h
        .journal
        .writes()
        .into_iter()
        .filter(|c| *c != "storage.upload")
        .collect();
    assert_eq!(
        writes,
        vec![
            "deleted_bugs.insert",
            "activity_logs.insert",
            "bugs.delete",
            "storage.remove",
        ]
    );

    let snapshots = h.snapshots.all().await;
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].original_bug_id, bug.id);
    assert_eq!(snapshots[0].deleted_by, owner.id);
    assert_eq!(snapshots[0].reported_by_email.as_deref(), Some("owner@example.com"));
    assert_eq!(snapshots[0].metadata["deleted_by_admin"], serde_json::json!(false));

    let rows = h.logs.all().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].action, "bug_deleted");
    assert_eq!(rows[0].entity_id, bug.id);
    assert_eq!(rows[0].bug_id, Some(bug.id));
    assert_eq!(rows[0].old_value.as_deref(), Some("Crash on save"));
    assert_eq!(rows[0].new_value.as_deref(), Some("deleted_by_owner"));

    assert!(h.bugs.find_by_id(bug.id).await.unwrap().is_none());
    assert!(h.objects.paths().await.is_empty());
    assert_eq!(
        result.trace,
        vec![
            DeletionState::Idle,
            DeletionState::Validating,
            DeletionState::Snapshotting,
            DeletionState::Logging,
            DeletionState::Deleting,
            DeletionState::CleaningUp,
            DeletionState::Done,
        ]
    );
}

#[tokio::test]
async fn test_concurrent_double_delete_has_one_winner() {
    let h = Harness::new();
    let owner = member("owner@example.com");
    let bug = h.seed_bug(&owner, "Race").await;
    let ctx = ctx(&owner);

    let (a, b) = tokio::join!(
        h.orchestrator.delete_bug(Some(&bug), &ctx),
        h.orchestrator.delete_bug(Some(&bug), &ctx)
    );

    let results = [a, b];
    assert_eq!(results.iter().filter(|r| r.success).count(), 1);
    let loser = results.iter().find(|r| !r.success).unwrap();
    assert_eq!(loser.error, Some(LifecycleError::AlreadyInProgress));
    assert_eq!(
        loser.error.as_ref().unwrap().to_string(),
        "Delete already in progress"
    );
    assert_eq!(h.snapshots.all().await.len(), 1);
    assert_eq!(h.logs.all().await.len(), 1);
}

#[tokio::test]
async fn test_late_duplicate_is_rejected_by_retained_guard() {
    let h = Harness::new();
    let owner = member("owner@example.com");
    let bug = h.seed_bug(&owner, "Twice").await;

    assert!(h.orchestrator.delete_bug(Some(&bug), &ctx(&owner)).await.success);
    assert!(h.registry.is_retained(bug.id));

    let again = h.orchestrator.delete_bug(Some(&bug), &ctx(&owner)).await;
    assert_eq!(again.error, Some(LifecycleError::AlreadyInProgress));
    assert_eq!(h.snapshots.all().await.len(), 1);
    assert!(h.registry.is_retained(bug.id));
}

#[tokio::test(start_paused = true)]
async fn test_stalled_delete_keeps_its_guard() {
    let h = Harness::new();
    let owner = member("owner@example.com");
    let bug = h.seed_bug(&owner, "Slow storage").await;
    let ctx = ctx(&owner);
    h.stall_next_snapshot(Duration::from_secs(400));

    let late = async {
        tokio::time::sleep(Duration::from_secs(301)).await;
        assert_eq!(h.registry.stalled(), vec![bug.id]);
        h.orchestrator.delete_bug(Some(&bug), &ctx).await
    };
    let (first, second) = tokio::join!(h.orchestrator.delete_bug(Some(&bug), &ctx), late);

    assert!(first.success, "{:?}", first.error);
    assert_eq!(second.error, Some(LifecycleError::AlreadyInProgress));
    assert_eq!(h.snapshots.all().await.len(), 1);
    assert_eq!(h.logs.all().await.len(), 1);
    assert!(h.registry.is_retained(bug.id));
    assert!(h.registry.stalled().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_run_that_lost_its_guard_stops_before_logging() {
    let h = Harness::new();
    let owner = member("owner@example.com");
    let bug = h.seed_bug(&owner, "Force released").await;
    let ctx = ctx(&owner);
    h.stall_next_snapshot(Duration::from_secs(400));

    let takeover = async {
        tokio::time::sleep(Duration::from_secs(100)).await;
        assert!(h.registry.release(bug.id));
        h.orchestrator.delete_bug(Some(&bug), &ctx).await
    };
    let (original, replacement) =
        tokio::join!(h.orchestrator.delete_bug(Some(&bug), &ctx), takeover);

    assert!(replacement.success);
    assert_eq!(original.error, Some(LifecycleError::AlreadyInProgress));
    assert_eq!(
        original.trace,
        vec![
            DeletionState::Idle,
            DeletionState::Validating,
            DeletionState::Snapshotting,
            DeletionState::Failed,
        ]
    );
    assert_eq!(h.logs.all().await.len(), 1);
    assert!(h.registry.is_retained(bug.id));
}

#[tokio::test]
async fn test_non_owner_is_denied_and_bug_survives() {
    let h = Harness::new();
    let owner = member("owner@example.com");
    let other = member("other@example.com");
    let bug = h.seed_bug(&owner, "Mine").await;

    let result = h.orchestrator.delete_bug(Some(&bug), &ctx(&other)).await;

    assert!(!result.success);
    assert_eq!(result.error, Some(LifecycleError::Permission));
    assert_eq!(result.error.unwrap().to_string(), "Permission denied");
    assert!(h.bugs.find_by_id(bug.id).await.unwrap().is_some());
    assert!(h.journal.writes().is_empty());
    assert_eq!(h.registry.state_of(bug.id), None);
}

#[tokio::test]
async fn test_admin_may_delete_any_bug() {
    let h = Harness::new();
    let owner = member("owner@example.com");
    let root = admin("root@example.com");
    let bug = h.seed_bug(&owner, "Spam").await;

    let result = h.orchestrator.delete_bug(Some(&bug), &ctx(&root)).await;

    assert!(result.success);
    let rows = h.logs.all().await;
    assert_eq!(rows[0].actor_id, root.id);
    assert_eq!(rows[0].new_value.as_deref(), Some("deleted_by_admin"));
    let snapshot = &h.snapshots.all().await[0];
    assert_eq!(snapshot.deleted_by, root.id);
    assert_eq!(snapshot.owner_id, owner.id);
}

#[tokio::test]
async fn test_missing_bug_is_a_validation_error() {
    let h = Harness::new();
    let owner = member("owner@example.com");

    let result = h.orchestrator.delete_bug(None, &ctx(&owner)).await;
    assert!(matches!(result.error, Some(LifecycleError::Validation(_))));

    let mut nil = h.seed_bug(&owner, "Nil").await;
    nil.id = Uuid::nil();
    let result = h.orchestrator.delete_bug(Some(&nil), &ctx(&owner)).await;
    assert!(matches!(result.error, Some(LifecycleError::Validation(_))));
    assert!(h.registry.is_empty());
    assert!(h.journal.writes().is_empty());
}

async fn assert_released_and_retryable(h: &Harness, bug: &Bug, owner: &bugtrack_core::types::Actor) {
    assert_eq!(h.registry.state_of(bug.id), None);
    assert!(h.bugs.find_by_id(bug.id).await.unwrap().is_some());

    h.snapshots.failures.disarm("insert");
    h.logs.failures.disarm("insert");
    h.bugs.failures.disarm("delete");
    let retry = h.orchestrator.delete_bug(Some(bug), &ctx(owner)).await;
    assert!(retry.success, "retry should succeed: {:?}", retry.error);
}

#[tokio::test]
async fn test_snapshot_failure_aborts_before_anything_else() {
    let h = Harness::new();
    let owner = member("owner@example.com");
    let bug = h.seed_bug(&owner, "Snapshot").await;
    h.snapshots.failures.arm("insert");

    let result = h.orchestrator.delete_bug(Some(&bug), &ctx(&owner)).await;

    assert!(matches!(result.error, Some(LifecycleError::Snapshot(_))));
    assert_eq!(result.trace.last(), Some(&DeletionState::Failed));
    assert_eq!(h.journal.writes(), vec!["deleted_bugs.insert"]);
    assert!(h.logs.all().await.is_empty());
    assert_released_and_retryable(&h, &bug, &owner).await;
}

#[tokio::test]
async fn test_log_failure_aborts_before_delete() {
    let h = Harness::new();
    let owner = member("owner@example.com");
    let bug = h.seed_bug(&owner, "Log").await;
    h.logs.failures.arm("insert");

    let result = h.orchestrator.delete_bug(Some(&bug), &ctx(&owner)).await;

    assert!(matches!(result.error, Some(LifecycleError::LogStore(_))));
    assert_eq!(
        h.journal.writes(),
        vec!["deleted_bugs.insert", "activity_logs.insert"]
    );
    assert_eq!(h.snapshots.all().await.len(), 1);
    assert_released_and_retryable(&h, &bug, &owner).await;
}

#[tokio::test]
async fn test_delete_failure_releases_guard() {
    let h = Harness::new();
    let owner = member("owner@example.com");
    let bug = h.seed_bug(&owner, "Delete").await;
    h.bugs.failures.arm("delete");

    let result = h.orchestrator.delete_bug(Some(&bug), &ctx(&owner)).await;

    assert!(matches!(result.error, Some(LifecycleError::Delete(_))));
    assert!(!h.journal.writes().contains(&"storage.remove"));
    assert!(!h.journal.calls().contains(&"storage.list"));
    assert_released_and_retryable(&h, &bug, &owner).await;
}

#[tokio::test]
async fn test_already_removed_row_is_a_delete_error() {
    let h = Harness::new();
    let owner = member("owner@example.com");
    let bug = h.seed_bug(&owner, "Gone").await;
    h.bugs.delete(bug.id).await.unwrap();

    let result = h.orchestrator.delete_bug(Some(&bug), &ctx(&owner)).await;
    assert!(matches!(result.error, Some(LifecycleError::Delete(_))));
    assert_eq!(h.registry.state_of(bug.id), None);
}

#[tokio::test]
async fn test_cleanup_failure_is_only_a_warning() {
    let h = Harness::new();
    let owner = member("owner@example.com");
    let bug = h.seed_bug(&owner, "Images").await;
    h.seed_image(&owner, &bug, "Jane").await;
    h.objects.set_fail_remove(true);

    let result = h.orchestrator.delete_bug(Some(&bug), &ctx(&owner)).await;

    assert!(result.success);
    assert!(result.error.is_none());
    assert!(matches!(
        result.cleanup_warning,
        Some(LifecycleError::Cleanup(_))
    ));
    assert_eq!(result.trace.last(), Some(&DeletionState::Done));
    assert!(h.bugs.find_by_id(bug.id).await.unwrap().is_none());
    assert!(h.registry.is_retained(bug.id));
    assert_eq!(h.objects.paths().await.len(), 1);
}

#[tokio::test]
async fn test_bug_without_images_skips_remove() {
    let h = Harness::new();
    let owner = member("owner@example.com");
    let bug = h.seed_bug(&owner, "Plain").await;

    let result = h.orchestrator.delete_bug(Some(&bug), &ctx(&owner)).await;

    assert!(result.success);
    assert!(h.journal.calls().contains(&"storage.list"));
    assert!(!h.journal.calls().contains(&"storage.remove"));
    assert_eq!(h.objects.remove_calls(), 0);
}

#[tokio::test]
async fn test_registries_are_isolated_per_orchestrator() {
    let first = Harness::new();
    let second = Harness::new();
    let owner = member("owner@example.com");
    let bug = first.seed_bug(&owner, "Shared id").await;
    second.bugs.seed(bug.clone()).await;

    assert!(first.orchestrator.delete_bug(Some(&bug), &ctx(&owner)).await.success);
    assert!(second.registry.is_empty());
    assert!(second.orchestrator.delete_bug(Some(&bug), &ctx(&owner)).await.success);
}

#[tokio::test]
async fn test_reconciler_reports_interrupted_deletes() {
    let h = Harness::new();
    let owner = member("owner@example.com");
    let interrupted = h.seed_bug(&owner, "Interrupted").await;
    let completed = h.seed_bug(&owner, "Completed").await;

    h.bugs.failures.arm("delete");
    assert!(!h.orchestrator.delete_bug(Some(&interrupted), &ctx(&owner)).await.success);
    h.bugs.failures.disarm("delete");
    assert!(h.orchestrator.delete_bug(Some(&completed), &ctx(&owner)).await.success);

    let report = h.reconciler.run(chrono::Duration::hours(1)).await.unwrap();
    assert_eq!(report.scanned, 2);
    assert!(!report.is_clean());
    assert_eq!(report.orphaned.len(), 1);
    assert_eq!(report.orphaned[0].original_bug_id, interrupted.id);
    assert!(h.bugs.find_by_id(interrupted.id).await.unwrap().is_some());
    assert_eq!(
        h.snapshots.find_by_original_id(interrupted.id).await.unwrap().len(),
        1
    );
}
