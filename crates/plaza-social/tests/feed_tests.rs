//! Integration tests for feed pagination.
//!
//! Covers the cursor walk over a seeded store, the terminal state, the
//! single-flight guard (no second remote request while a page fetch is in
//! flight), de-duplication of already-loaded posts, and retry after a
//! failed fetch.

use plaza_core::effects::to_document;
use plaza_core::{PostId, Timestamp, UserId};
use plaza_social::{PageLoad, PostDoc, SocialService, PAGE_SIZE};
use plaza_testkit::TestEffects;
use std::sync::Arc;

async fn seed_post(effects: &TestEffects, id: &str, created_at_ms: u64) {
    let doc = PostDoc::Original {
        post_id: PostId::new(id),
        org_post_id: PostId::new(id),
        creator: UserId::new("alice"),
        created_at: Timestamp::from_millis(created_at_ms),
        content: "seeded post body".to_string(),
        attachments: Vec::new(),
    };
    effects
        .documents
        .set("posts", id, to_document(&doc).expect("doc"))
        .await
        .expect("seed post");
}

async fn seed_posts(effects: &TestEffects, count: usize) {
    for i in 0..count {
        seed_post(effects, &format!("p{i}"), 1_000 + i as u64).await;
    }
}

#[tokio::test]
async fn test_eight_posts_paginate_as_six_then_two_then_nothing() {
    let effects = TestEffects::new();
    seed_posts(&effects, 8).await;
    let service = SocialService::new();

    let first = service.load_posts(&effects).await.expect("page 1");
    assert_eq!(first, PageLoad::Loaded { fetched: PAGE_SIZE });
    assert_eq!(service.posts_snapshot().await.len(), 6);
    assert!(!service.feed().is_exhausted());

    let second = service.load_posts(&effects).await.expect("page 2");
    assert_eq!(second, PageLoad::Loaded { fetched: 2 });
    assert_eq!(service.posts_snapshot().await.len(), 8);
    assert!(service.feed().is_exhausted());

    let third = service.load_posts(&effects).await.expect("page 3");
    assert_eq!(third, PageLoad::Exhausted);
    assert_eq!(service.posts_snapshot().await.len(), 8);
}

#[tokio::test]
async fn test_feed_is_newest_first() {
    let effects = TestEffects::new();
    seed_posts(&effects, 3).await;
    let service = SocialService::new();

    service.load_posts(&effects).await.expect("page");

    let posts: Vec<String> = service
        .posts_snapshot()
        .await
        .iter()
        .map(|post| post.id().as_str().to_string())
        .collect();
    assert_eq!(posts, vec!["p2", "p1", "p0"]);
}

#[tokio::test]
async fn test_exactly_one_page_needs_an_empty_fetch_to_terminate() {
    let effects = TestEffects::new();
    seed_posts(&effects, PAGE_SIZE).await;
    let service = SocialService::new();

    let first = service.load_posts(&effects).await.expect("page 1");
    assert_eq!(first, PageLoad::Loaded { fetched: PAGE_SIZE });
    assert!(!service.feed().is_exhausted());

    let second = service.load_posts(&effects).await.expect("page 2");
    assert_eq!(second, PageLoad::Loaded { fetched: 0 });
    assert!(service.feed().is_exhausted());
}

#[tokio::test]
async fn test_concurrent_load_posts_issues_one_remote_request() {
    let effects = Arc::new(TestEffects::new());
    seed_posts(&effects, 3).await;
    let service = Arc::new(SocialService::new());

    // Hold the first page fetch at the store...
    effects.documents.hold_page_queries();
    let first_call = tokio::spawn({
        let effects = Arc::clone(&effects);
        let service = Arc::clone(&service);
        async move { service.load_posts(effects.as_ref()).await }
    });
    while effects.documents.page_query_count() == 0 {
        tokio::task::yield_now().await;
    }
    assert!(service.feed().is_loading());

    // ...and race a second call against it: no new request, no side effects.
    let second = service.load_posts(effects.as_ref()).await.expect("second call");
    assert_eq!(second, PageLoad::InFlight);
    assert_eq!(effects.documents.page_query_count(), 1);

    effects.documents.release_page_queries();
    let first = first_call.await.expect("join").expect("first call");
    assert_eq!(first, PageLoad::Loaded { fetched: 3 });
    assert_eq!(service.posts_snapshot().await.len(), 3);
}

#[tokio::test]
async fn test_already_loaded_posts_are_not_fetched_again() {
    let effects = TestEffects::new();
    seed_posts(&effects, 3).await;
    let service = SocialService::new();

    // p2 loaded directly before any pagination: one event-log query
    service
        .load_post(&effects, &PostId::new("p2"), None)
        .await
        .expect("direct load");
    assert_eq!(effects.documents.child_query_count(), 1);

    // the page contains p2, which is skipped; only p1 and p0 load
    service.load_posts(&effects).await.expect("page");
    assert_eq!(effects.documents.child_query_count(), 3);
    assert_eq!(service.posts_snapshot().await.len(), 3);
}

#[tokio::test]
async fn test_failed_page_fetch_is_retryable() {
    let effects = TestEffects::new();
    seed_posts(&effects, 2).await;
    let service = SocialService::new();

    effects.documents.set_offline(true);
    service.load_posts(&effects).await.expect_err("offline");
    assert!(!service.feed().is_loading());
    assert!(!service.feed().is_exhausted());
    assert!(service.posts_snapshot().await.is_empty());

    effects.documents.set_offline(false);
    let retried = service.load_posts(&effects).await.expect("retry");
    assert_eq!(retried, PageLoad::Loaded { fetched: 2 });
    assert_eq!(service.posts_snapshot().await.len(), 2);
}

#[tokio::test]
async fn test_reset_rewinds_to_the_first_page() {
    let effects = TestEffects::new();
    seed_posts(&effects, 8).await;
    let service = SocialService::new();

    service.load_posts(&effects).await.expect("page 1");
    service.load_posts(&effects).await.expect("page 2");
    assert!(service.feed().is_exhausted());

    service.reset().await;
    assert!(service.posts_snapshot().await.is_empty());

    let first = service.load_posts(&effects).await.expect("page 1 again");
    assert_eq!(first, PageLoad::Loaded { fetched: PAGE_SIZE });
}
