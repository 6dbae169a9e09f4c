#![allow(dead_code)]

use axum_test::TestServer;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;

use slug_shortener::application::services::auth_service::{generate_token, hash_token};
use slug_shortener::domain::click_event::ClickEvent;
use slug_shortener::domain::entities::{NewShortLink, ShortLink};
use slug_shortener::domain::repositories::{ShortLinkRepository, TokenRepository, UserRepository};
use slug_shortener::infrastructure::memory::MemoryStore;
use slug_shortener::routes::core_router;
use slug_shortener::state::{AppState, Repositories};

pub const BASE_URL: &str = "http://sho.rt";
pub const SIGNING_SECRET: &str = "test-signing-secret";

/// A router over an in-memory store, with the click queue left undrained.
pub struct TestApp {
    pub server: TestServer,
    pub store: MemoryStore,
    pub clicks: mpsc::Receiver<ClickEvent>,
}

pub fn create_test_state(
    store: &MemoryStore,
    queue_capacity: usize,
) -> (AppState, mpsc::Receiver<ClickEvent>) {
    let (tx, rx) = mpsc::channel(queue_capacity);

    let state = AppState::new(
        Repositories {
            links: Arc::new(store.clone()),
            clicks: Arc::new(store.clone()),
            tokens: Arc::new(store.clone()),
        },
        tx,
        BASE_URL,
        SIGNING_SECRET.to_string(),
        false,
    );

    (state, rx)
}

pub fn spawn_app() -> TestApp {
    let store = MemoryStore::new();
    let (state, clicks) = create_test_state(&store, 100);
    let server = TestServer::new(core_router(state)).unwrap();

    TestApp {
        server,
        store,
        clicks,
    }
}

/// Creates a user with a fresh token. Returns `(user_id, raw_token)`.
pub async fn create_user_with_token(store: &MemoryStore, email: &str) -> (i64, String) {
    let user = store.create_user(email.to_string(), None).await.unwrap();
    let token = generate_token();

    store
        .create_token(
            user.id,
            &format!("{email}-token"),
            &hash_token(SIGNING_SECRET, &token),
        )
        .await
        .unwrap();

    (user.id, token)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub async fn insert_link(
    store: &MemoryStore,
    slug: &str,
    url: &str,
    owner_id: Option<i64>,
    expires_at: Option<DateTime<Utc>>,
) -> ShortLink {
    store
        .create(NewShortLink {
            slug: slug.to_string(),
            original_url: url.to_string(),
            title: None,
            description: None,
            owner_id,
            expires_at,
        })
        .await
        .unwrap()
}
