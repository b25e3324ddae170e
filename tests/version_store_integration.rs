//! Integration tests for the content version store.
//!
//! Exercises the append/list/diff/revert/prune handlers against the
//! in-memory repository, which enforces the same contiguity contract as the
//! Postgres adapter.

use std::sync::Arc;

use campaign_content_core::adapters::events::InMemoryEventBus;
use campaign_content_core::adapters::memory::{
    InMemoryContentGateway, InMemoryVersionRepository,
};
use campaign_content_core::application::handlers::version::{
    AppendVersionCommand, AppendVersionHandler, DiffVersionsHandler, DiffVersionsQuery,
    ListVersionsHandler, ListVersionsQuery, PruneVersionsCommand, PruneVersionsHandler,
    RevertToVersionCommand, RevertToVersionHandler,
};
use campaign_content_core::domain::foundation::{
    CommandMetadata, ContentId, Timestamp, UserId,
};
use campaign_content_core::domain::version::{
    ContentVersion, RetentionPolicy, VersionNumber,
};
use campaign_content_core::ports::VersionRepository;

struct TestStore {
    versions: Arc<InMemoryVersionRepository>,
    content: Arc<InMemoryContentGateway>,
    append: AppendVersionHandler,
    list: ListVersionsHandler,
    diff: DiffVersionsHandler,
    revert: RevertToVersionHandler,
    prune: PruneVersionsHandler,
}

fn test_store() -> TestStore {
    let versions = Arc::new(InMemoryVersionRepository::new());
    let content = Arc::new(InMemoryContentGateway::new());
    let bus = Arc::new(InMemoryEventBus::new());

    TestStore {
        append: AppendVersionHandler::new(versions.clone(), content.clone(), bus.clone()),
        list: ListVersionsHandler::new(versions.clone()),
        diff: DiffVersionsHandler::new(versions.clone()),
        revert: RevertToVersionHandler::new(versions.clone(), bus),
        prune: PruneVersionsHandler::new(versions.clone()),
        versions,
        content,
    }
}

fn author() -> CommandMetadata {
    CommandMetadata::new(UserId::new("author-1").unwrap())
}

fn v(n: u32) -> VersionNumber {
    VersionNumber::new(n).unwrap()
}

async fn append_body(store: &TestStore, content_id: ContentId, body: &str) -> VersionNumber {
    store
        .append
        .handle(
            AppendVersionCommand {
                content_id,
                body: body.to_string(),
                change_summary: None,
            },
            author(),
        )
        .await
        .unwrap()
        .version
        .version_number()
}

#[tokio::test]
async fn history_is_ordered_and_contiguous() {
    let store = test_store();
    let content_id = ContentId::new();
    store.content.register(content_id);

    for body in ["one", "two", "three"] {
        append_body(&store, content_id, body).await;
    }

    let summaries = store
        .list
        .handle(ListVersionsQuery { content_id })
        .await
        .unwrap();
    assert_eq!(summaries.len(), 3);
    for (index, summary) in summaries.iter().enumerate() {
        assert_eq!(summary.version_number.get() as usize, index + 1);
    }
}

#[tokio::test]
async fn concurrent_writers_never_leave_gaps() {
    let store = test_store();
    let content_id = ContentId::new();
    store.content.register(content_id);

    let handler = Arc::new(AppendVersionHandler::new(
        store.versions.clone(),
        store.content.clone(),
        Arc::new(InMemoryEventBus::new()),
    ));

    let mut tasks = Vec::new();
    for n in 0..12 {
        let handler = handler.clone();
        tasks.push(tokio::spawn(async move {
            handler
                .handle(
                    AppendVersionCommand {
                        content_id,
                        body: format!("writer {}", n),
                        change_summary: None,
                    },
                    author(),
                )
                .await
        }));
    }

    let mut succeeded = 0usize;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            succeeded += 1;
        }
    }
    assert!(succeeded > 0);

    let history = store.versions.list_for_content(&content_id).await.unwrap();
    assert_eq!(history.len(), succeeded);
    for (index, version) in history.iter().enumerate() {
        assert_eq!(version.version_number().get() as usize, index + 1);
    }
}

#[tokio::test]
async fn diff_is_empty_for_identical_bodies_and_detects_changes() {
    let store = test_store();
    let content_id = ContentId::new();
    store.content.register(content_id);

    append_body(&store, content_id, "headline\nbody copy").await;
    append_body(&store, content_id, "headline\nbetter body copy").await;

    let self_diff = store
        .diff
        .handle(DiffVersionsQuery {
            content_id,
            from: v(1),
            to: v(1),
        })
        .await
        .unwrap();
    assert!(self_diff.is_empty());

    let diff = store
        .diff
        .handle(DiffVersionsQuery {
            content_id,
            from: v(1),
            to: v(2),
        })
        .await
        .unwrap();
    assert_eq!(diff.deletions(), 1);
    assert_eq!(diff.additions(), 1);
}

#[tokio::test]
async fn revert_round_trip_restores_the_old_body_as_a_new_version() {
    let store = test_store();
    let content_id = ContentId::new();
    store.content.register(content_id);

    append_body(&store, content_id, "original").await;
    append_body(&store, content_id, "edited").await;

    let result = store
        .revert
        .handle(
            RevertToVersionCommand {
                content_id,
                target: v(1),
            },
            author(),
        )
        .await
        .unwrap();

    assert_eq!(result.version.version_number(), v(3));
    assert_eq!(result.version.body(), "original");

    // v3 vs v1 is a no-op diff; history still holds all three versions
    let diff = store
        .diff
        .handle(DiffVersionsQuery {
            content_id,
            from: v(1),
            to: v(3),
        })
        .await
        .unwrap();
    assert!(diff.is_empty());

    let summaries = store
        .list
        .handle(ListVersionsQuery { content_id })
        .await
        .unwrap();
    assert_eq!(summaries.len(), 3);
}

#[tokio::test]
async fn prune_removes_aged_versions_but_keeps_the_latest() {
    let store = test_store();
    let content_id = ContentId::new();
    let author_id = UserId::new("author-1").unwrap();

    // Seed backdated history directly; the handlers always stamp "now"
    for (n, age_days) in [(1u32, 400i64), (2, 200), (3, 120)] {
        let version = ContentVersion::reconstitute(
            content_id,
            v(n),
            format!("body {}", n),
            author_id.clone(),
            Timestamp::now().minus_days(age_days),
            None,
        );
        store.versions.append(&version).await.unwrap();
    }

    let result = store
        .prune
        .handle(
            PruneVersionsCommand {
                content_id,
                policy: RetentionPolicy::new(90).unwrap(),
            },
            author(),
        )
        .await
        .unwrap();

    // v1 and v2 are past the window; v3 is also past it but is the latest
    assert_eq!(result.removed, 2);
    let history = store.versions.list_for_content(&content_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].version_number(), v(3));
}
