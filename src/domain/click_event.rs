//! Click event passed from the redirect path to the background worker.

use chrono::{DateTime, Utc};

use crate::domain::entities::NewClick;

/// Visitor metadata captured at redirect time.
///
/// Redirects push these onto a bounded channel with `try_send`, so a slow database never
/// delays a redirect. Missing headers simply leave fields empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub link_id: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub clicked_at: DateTime<Utc>,
}

impl ClickEvent {
    pub fn new(link_id: i64, visitor: VisitorInfo) -> Self {
        Self {
            link_id,
            ip_address: visitor.ip_address,
            user_agent: visitor.user_agent,
            referer: visitor.referer,
            clicked_at: Utc::now(),
        }
    }
}

impl From<ClickEvent> for NewClick {
    fn from(ev: ClickEvent) -> Self {
        Self {
            link_id: ev.link_id,
            ip_address: ev.ip_address,
            user_agent: ev.user_agent,
            referer: ev.referer,
            clicked_at: ev.clicked_at,
        }
    }
}

/// Request-derived data about whoever followed a link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_carries_visitor_fields() {
        let event = ClickEvent::new(
            42,
            VisitorInfo {
                ip_address: Some("192.168.1.1".to_string()),
                user_agent: Some("Mozilla/5.0".to_string()),
                referer: None,
            },
        );

        assert_eq!(event.link_id, 42);
        assert_eq!(event.ip_address.as_deref(), Some("192.168.1.1"));
        assert_eq!(event.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert!(event.referer.is_none());
    }

    #[test]
    fn test_into_new_click() {
        let event = ClickEvent::new(7, VisitorInfo::default());
        let at = event.clicked_at;
        let click: NewClick = event.into();

        assert_eq!(click.link_id, 7);
        assert_eq!(click.clicked_at, at);
        assert!(click.ip_address.is_none());
    }
}
