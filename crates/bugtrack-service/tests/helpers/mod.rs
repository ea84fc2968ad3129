//! Shared fixtures: in-memory stores wrapped in recorders that append
//! every call to one journal, so tests can assert call order across stores.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use bugtrack_core::config::StorageConfig;
use bugtrack_core::result::AppResult;
use bugtrack_core::traits::storage::StorageObjectMeta;
use bugtrack_core::traits::{ObjectStore, StaticSession};
use bugtrack_core::types::actor::Actor;
use bugtrack_core::types::pagination::{PageRequest, PageResponse};
use bugtrack_database::memory::{MemoryActivityLogStore, MemoryBugStore, MemoryDeletedBugStore};
use bugtrack_database::store::{ActivityFilter, ActivityLogStore, BugStore, DeletedBugStore};
use bugtrack_entity::activity::{ActivityLogEntry, CreateActivityLogEntry};
use bugtrack_entity::bug::{Bug, BugPriority, BugStatus, CreateBug};
use bugtrack_entity::deleted::{CreateDeletedBug, DeletedBugSnapshot};
use bugtrack_service::{
    ActivityLogger, DeletionOrchestrator, InFlightRegistry, MutationFacade, RequestContext,
    SnapshotReconciler,
};
use bugtrack_storage::providers::memory::MemoryStorageProvider;
use bugtrack_storage::{BUG_IMAGES_BUCKET, BugImageGateway, UrlSigner};

/// Ordered record of store calls.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<&'static str>>>);

impl Journal {
    pub fn push(&self, call: &'static str) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }

    /// Calls that mutate a store, in order.
    pub fn writes(&self) -> Vec<&'static str> {
        self.calls()
            .into_iter()
            .filter(|c| !c.ends_with(".read") && !c.ends_with(".list"))
            .collect()
    }
}

#[derive(Debug)]
pub struct RecordingBugStore {
    pub inner: Arc<MemoryBugStore>,
    journal: Journal,
}

#[async_trait]
impl BugStore for RecordingBugStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Bug>> {
        self.journal.push("bugs.read");
        self.inner.find_by_id(id).await
    }

    async fn create(&self, data: &CreateBug) -> AppResult<Bug> {
        self.journal.push("bugs.create");
        self.inner.create(data).await
    }

    async fn update_status(&self, id: Uuid, status: BugStatus) -> AppResult<Bug> {
        self.journal.push("bugs.update");
        self.inner.update_status(id, status).await
    }

    async fn update_priority(&self, id: Uuid, priority: BugPriority) -> AppResult<Bug> {
        self.journal.push("bugs.update");
        self.inner.update_priority(id, priority).await
    }

    async fn set_archived(&self, id: Uuid, archived: bool) -> AppResult<Bug> {
        self.journal.push("bugs.update");
        self.inner.set_archived(id, archived).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        self.journal.push("bugs.delete");
        self.inner.delete(id).await
    }
}

#[derive(Debug)]
pub struct RecordingDeletedBugStore {
    pub inner: Arc<MemoryDeletedBugStore>,
    journal: Journal,
    stall_next: Mutex<Option<Duration>>,
}

#[async_trait]
impl DeletedBugStore for RecordingDeletedBugStore {
    async fn insert(&self, data: &CreateDeletedBug) -> AppResult<DeletedBugSnapshot> {
        self.journal.push("deleted_bugs.insert");
        let stall = self.stall_next.lock().unwrap().take();
        if let Some(pause) = stall {
            tokio::time::sleep(pause).await;
        }
        self.inner.insert(data).await
    }

    async fn find_by_original_id(&self, bug_id: Uuid) -> AppResult<Vec<DeletedBugSnapshot>> {
        self.journal.push("deleted_bugs.read");
        self.inner.find_by_original_id(bug_id).await
    }

    async fn find_since(&self, since: DateTime<Utc>) -> AppResult<Vec<DeletedBugSnapshot>> {
        self.journal.push("deleted_bugs.read");
        self.inner.find_since(since).await
    }

    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<DeletedBugSnapshot>> {
        self.journal.push("deleted_bugs.read");
        self.inner.list(page).await
    }
}

#[derive(Debug)]
pub struct RecordingActivityLogStore {
    pub inner: Arc<MemoryActivityLogStore>,
    journal: Journal,
}

#[async_trait]
impl ActivityLogStore for RecordingActivityLogStore {
    async fn insert(&self, data: &CreateActivityLogEntry) -> AppResult<ActivityLogEntry> {
        self.journal.push("activity_logs.insert");
        self.inner.insert(data).await
    }

    async fn find_by_bug(&self, bug_id: Uuid) -> AppResult<Vec<ActivityLogEntry>> {
        self.journal.push("activity_logs.read");
        self.inner.find_by_bug(bug_id).await
    }

    async fn search(
        &self,
        filter: &ActivityFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ActivityLogEntry>> {
        self.journal.push("activity_logs.read");
        self.inner.search(filter, page).await
    }

    async fn find_since(&self, since: DateTime<Utc>) -> AppResult<Vec<ActivityLogEntry>> {
        self.journal.push("activity_logs.read");
        self.inner.find_since(since).await
    }
}

#[derive(Debug)]
pub struct RecordingObjectStore {
    pub inner: Arc<MemoryStorageProvider>,
    journal: Journal,
}

#[async_trait]
impl ObjectStore for RecordingObjectStore {
    fn provider_type(&self) -> &str {
        self.inner.provider_type()
    }

    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn upload(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
        upsert: bool,
    ) -> AppResult<StorageObjectMeta> {
        self.journal.push("storage.upload");
        self.inner.upload(path, data, content_type, upsert).await
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        self.inner.read_bytes(path).await
    }

    async fn list(&self, prefix: &str, limit: usize) -> AppResult<Vec<StorageObjectMeta>> {
        self.journal.push("storage.list");
        self.inner.list(prefix, limit).await
    }

    async fn remove(&self, paths: &[String]) -> AppResult<usize> {
        self.journal.push("storage.remove");
        self.inner.remove(paths).await
    }

    async fn create_signed_url(&self, path: &str, expires_in: Duration) -> AppResult<String> {
        self.inner.create_signed_url(path, expires_in).await
    }
}

pub fn signer() -> UrlSigner {
    UrlSigner::new("test-secret", "http://localhost:8080/storage/v1").unwrap()
}

/// Every service wired to recorded in-memory stores.
pub struct Harness {
    pub journal: Journal,
    pub bugs: Arc<MemoryBugStore>,
    pub snapshots: Arc<MemoryDeletedBugStore>,
    pub logs: Arc<MemoryActivityLogStore>,
    pub objects: Arc<MemoryStorageProvider>,
    pub registry: Arc<InFlightRegistry>,
    pub logger: Arc<ActivityLogger>,
    pub facade: MutationFacade,
    pub orchestrator: DeletionOrchestrator,
    pub reconciler: SnapshotReconciler,
    bug_store: Arc<RecordingBugStore>,
    snapshot_store: Arc<RecordingDeletedBugStore>,
    object_store: Arc<RecordingObjectStore>,
}

impl Harness {
    pub fn new() -> Self {
        let journal = Journal::default();
        let bugs = Arc::new(MemoryBugStore::new());
        let snapshots = Arc::new(MemoryDeletedBugStore::new());
        let logs = Arc::new(MemoryActivityLogStore::new());
        let objects = Arc::new(MemoryStorageProvider::new(BUG_IMAGES_BUCKET, signer()));

        let bug_store = Arc::new(RecordingBugStore {
            inner: bugs.clone(),
            journal: journal.clone(),
        });
        let snapshot_store = Arc::new(RecordingDeletedBugStore {
            inner: snapshots.clone(),
            journal: journal.clone(),
            stall_next: Mutex::new(None),
        });
        let log_store = Arc::new(RecordingActivityLogStore {
            inner: logs.clone(),
            journal: journal.clone(),
        });
        let object_store = Arc::new(RecordingObjectStore {
            inner: objects.clone(),
            journal: journal.clone(),
        });

        let registry = Arc::new(InFlightRegistry::new(Duration::from_secs(300)));
        let logger = Arc::new(ActivityLogger::new(log_store));
        let facade = MutationFacade::new(bug_store.clone(), logger.clone());
        let cleanup_gateway = Arc::new(
            BugImageGateway::new(
                object_store.clone(),
                Arc::new(StaticSession::anonymous()),
                &StorageConfig::default(),
            )
            .unwrap(),
        );
        let orchestrator = DeletionOrchestrator::new(
            bug_store.clone(),
            snapshot_store.clone(),
            logger.clone(),
            cleanup_gateway,
            registry.clone(),
        );
        let reconciler = SnapshotReconciler::new(bug_store.clone(), snapshot_store.clone());

        Self {
            journal,
            bugs,
            snapshots,
            logs,
            objects,
            registry,
            logger,
            facade,
            orchestrator,
            reconciler,
            bug_store,
            snapshot_store,
            object_store,
        }
    }

    /// Make the next snapshot insert hang for `pause` before it lands.
    pub fn stall_next_snapshot(&self, pause: Duration) {
        *self.snapshot_store.stall_next.lock().unwrap() = Some(pause);
    }

    /// A gateway whose session is signed in as `actor`.
    pub fn gateway_for(&self, actor: &Actor) -> BugImageGateway {
        BugImageGateway::new(
            self.object_store.clone(),
            Arc::new(StaticSession::signed_in(actor.clone())),
            &StorageConfig::default(),
        )
        .unwrap()
    }

    /// Insert a bug owned by `owner` directly into the store.
    pub async fn seed_bug(&self, owner: &Actor, title: &str) -> Bug {
        let now = Utc::now();
        let bug = Bug {
            id: Uuid::new_v4(),
            owner_id: owner.id,
            title: title.to_string(),
            description: Some("Steps to reproduce".to_string()),
            status: BugStatus::Open,
            priority: BugPriority::Medium,
            is_archived: false,
            reported_by_email: Some(owner.email.clone()),
            reported_by_name: Some("Reporter".to_string()),
            category: Some("editor".to_string()),
            created_at: now,
            updated_at: now,
        };
        self.bugs.seed(bug.clone()).await;
        bug
    }

    /// Upload one image for `bug` as its owner.
    pub async fn seed_image(&self, owner: &Actor, bug: &Bug, reporter: &str) -> String {
        self.gateway_for(owner)
            .upload_bug_image(Bytes::from_static(b"\x89PNG"), bug.id, &bug.title, reporter)
            .await
            .unwrap()
    }
}

pub fn member(email: &str) -> Actor {
    Actor::member(Uuid::new_v4(), email)
}

pub fn admin(email: &str) -> Actor {
    Actor::admin(Uuid::new_v4(), email)
}

pub fn ctx(actor: &Actor) -> RequestContext {
    RequestContext::new(actor.clone())
}
