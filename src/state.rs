//! Shared application state injected into every handler.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::{AuthService, LinkService, RedirectResolver, StatsService};
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::{ClickRepository, ShortLinkRepository, TokenRepository};

/// Storage backends the services are built on.
#[derive(Clone)]
pub struct Repositories {
    pub links: Arc<dyn ShortLinkRepository>,
    pub clicks: Arc<dyn ClickRepository>,
    pub tokens: Arc<dyn TokenRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<dyn ShortLinkRepository>>,
    pub redirect_resolver: Arc<RedirectResolver<dyn ShortLinkRepository>>,
    pub stats_service: Arc<StatsService<dyn ShortLinkRepository, dyn ClickRepository>>,
    pub auth_service: Arc<AuthService<dyn TokenRepository>>,
    /// Used directly by the health check.
    pub links: Arc<dyn ShortLinkRepository>,
    pub click_sender: mpsc::Sender<ClickEvent>,
    /// Trust proxy headers for the visitor IP.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        click_sender: mpsc::Sender<ClickEvent>,
        base_url: impl Into<String>,
        token_signing_secret: String,
        behind_proxy: bool,
    ) -> Self {
        Self {
            link_service: Arc::new(LinkService::new(repos.links.clone(), base_url)),
            redirect_resolver: Arc::new(RedirectResolver::new(
                repos.links.clone(),
                Some(click_sender.clone()),
            )),
            stats_service: Arc::new(StatsService::new(repos.links.clone(), repos.clicks)),
            auth_service: Arc::new(AuthService::new(repos.tokens, token_signing_secret)),
            links: repos.links,
            click_sender,
            behind_proxy,
        }
    }
}
