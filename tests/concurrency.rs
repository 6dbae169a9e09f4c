use std::collections::HashSet;
use std::sync::Arc;

use slug_shortener::application::services::{CreateLink, LinkService};
use slug_shortener::domain::entities::NewShortLink;
use slug_shortener::domain::repositories::ShortLinkRepository;
use slug_shortener::error::AppError;
use slug_shortener::infrastructure::memory::MemoryStore;

fn service(store: &MemoryStore) -> Arc<LinkService<MemoryStore>> {
    Arc::new(LinkService::new(Arc::new(store.clone()), "http://sho.rt"))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_get_distinct_slugs() {
    let store = MemoryStore::new();
    let service = service(&store);

    let handles: Vec<_> = (0..64)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .create_link(
                        None,
                        CreateLink {
                            original_url: format!("https://example.com/{i}"),
                            ..Default::default()
                        },
                    )
                    .await
            })
        })
        .collect();

    let mut slugs = HashSet::new();
    for handle in handles {
        let link = handle.await.unwrap().unwrap();
        assert!(slugs.insert(link.slug));
    }
    assert_eq!(slugs.len(), 64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_for_same_slug_have_one_winner() {
    let store = MemoryStore::new();
    let service = service(&store);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .create_link(
                        Some(i),
                        CreateLink {
                            original_url: format!("https://example.com/{i}"),
                            slug: Some("launch".to_string()),
                            ..Default::default()
                        },
                    )
                    .await
            })
        })
        .collect();

    let mut won = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(link) => {
                assert_eq!(link.slug, "launch");
                won += 1;
            }
            Err(AppError::SlugConflict { .. }) | Err(AppError::DuplicateSlug { .. }) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(won, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_visits_are_all_counted() {
    let store = MemoryStore::new();
    let link = store
        .create(NewShortLink {
            slug: "busy".to_string(),
            original_url: "https://example.com/".to_string(),
            title: None,
            description: None,
            owner_id: None,
            expires_at: None,
        })
        .await
        .unwrap();

    let handles: Vec<_> = (0..200)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.record_visit(link.id).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = store.find_by_slug("busy").await.unwrap().unwrap();
    assert_eq!(stored.visit_count, 200);
}
