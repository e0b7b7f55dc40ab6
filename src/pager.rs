//! Infinite-scroll loader for older posts.

use tracing::{debug, warn};

use crate::feed::PostList;
use crate::model::{StreamItem, Timestamp};
use crate::render::{Editability, Renderer};
use crate::service::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// `None` asks for the newest page.
    pub before: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Loaded(usize),
    /// The server had nothing older than the boundary.
    Exhausted,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollMetrics {
    pub scroll_top: usize,
    pub document_height: usize,
    pub viewport_height: usize,
}

impl ScrollMetrics {
    pub fn at_bottom(&self) -> bool {
        self.scroll_top >= self.document_height.saturating_sub(self.viewport_height)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pager {
    loading: bool,
    oldest_seen: Option<Timestamp>,
    trigger_visible: bool,
    indicator_visible: bool,
    exhausted: bool,
}

impl Pager {
    pub fn new(anchor: Option<Timestamp>) -> Self {
        let mut pager = Self::default();
        pager.initialize(anchor);
        pager
    }

    pub fn initialize(&mut self, anchor: Option<Timestamp>) {
        self.oldest_seen = anchor;
        self.loading = false;
        self.trigger_visible = true;
        self.indicator_visible = false;
        self.exhausted = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn oldest_seen(&self) -> Option<Timestamp> {
        self.oldest_seen
    }

    pub fn trigger_visible(&self) -> bool {
        self.trigger_visible
    }

    pub fn indicator_visible(&self) -> bool {
        self.indicator_visible
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Start fetching the next page unless one is already on its way.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if self.loading {
            return None;
        }
        self.loading = true;
        self.trigger_visible = false;
        self.indicator_visible = true;
        debug!(before = ?self.oldest_seen, "loading older posts");
        Some(PageRequest {
            before: self.oldest_seen,
        })
    }

    /// Scroll hook: fires on every scroll event. Once history has run out,
    /// only the manual trigger fetches again.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> Option<PageRequest> {
        if self.exhausted || !metrics.at_bottom() {
            return None;
        }
        self.load_more()
    }

    pub fn complete_load(
        &mut self,
        result: Result<Vec<StreamItem>, ServiceError>,
        posts: &mut PostList,
        renderer: &Renderer,
    ) -> PageOutcome {
        let outcome = match result {
            Ok(items) if items.is_empty() => {
                self.exhausted = true;
                debug!("no older posts");
                PageOutcome::Exhausted
            }
            Ok(items) => {
                let count = items.len();
                for item in items {
                    self.oldest_seen = Some(item.posted);
                    posts.append(renderer.render(&item.into_post(), Editability::ReadOnly));
                }
                self.exhausted = false;
                debug!(count, oldest = ?self.oldest_seen, "appended older posts");
                PageOutcome::Loaded(count)
            }
            Err(err) => {
                warn!(error = %err, "loading older posts failed");
                PageOutcome::Failed(err.to_string())
            }
        };
        self.indicator_visible = false;
        self.trigger_visible = true;
        self.loading = false;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrustedHtml;
    use chrono::DateTime;

    fn item(id: &str, posted: &str) -> StreamItem {
        StreamItem {
            id: id.into(),
            html: TrustedHtml::from_sanitized(format!("post {id}")),
            posted: DateTime::parse_from_rfc3339(posted).unwrap(),
            permalink: format!("/post/{id}"),
        }
    }

    #[test]
    fn second_trigger_while_loading_is_ignored() {
        let mut pager = Pager::new(None);
        assert_eq!(pager.load_more(), Some(PageRequest { before: None }));
        assert!(pager.is_loading());
        assert!(!pager.trigger_visible());
        assert!(pager.indicator_visible());
        assert_eq!(pager.load_more(), None);
        assert!(pager.is_loading());
        assert_eq!(pager.oldest_seen(), None);
    }

    #[test]
    fn appends_in_order_and_moves_boundary() {
        let mut pager = Pager::new(None);
        let mut posts = PostList::new();
        let renderer = Renderer::default();
        pager.load_more();
        let outcome = pager.complete_load(
            Ok(vec![
                item("3", "2024-03-03T00:00:00Z"),
                item("2", "2024-03-02T00:00:00Z"),
                item("1", "2024-03-01T00:00:00Z"),
            ]),
            &mut posts,
            &renderer,
        );
        assert_eq!(outcome, PageOutcome::Loaded(3));
        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["3", "2", "1"]);
        assert!(posts.iter().all(|p| !p.editable));
        assert_eq!(
            pager.oldest_seen(),
            Some(DateTime::parse_from_rfc3339("2024-03-01T00:00:00Z").unwrap())
        );
        assert!(!pager.is_loading());
        assert!(pager.trigger_visible());
        assert!(!pager.indicator_visible());
        assert_eq!(
            pager.load_more().and_then(|req| req.before),
            pager.oldest_seen()
        );
    }

    #[test]
    fn failure_adds_nothing_and_allows_retry() {
        let mut pager = Pager::new(None);
        let mut posts = PostList::new();
        pager.load_more();
        let outcome = pager.complete_load(
            Err(ServiceError::Transport("timed out".into())),
            &mut posts,
            &Renderer::default(),
        );
        assert!(matches!(outcome, PageOutcome::Failed(_)));
        assert!(posts.is_empty());
        assert!(!pager.is_loading());
        assert!(pager.trigger_visible());
        assert!(pager.load_more().is_some());
    }

    #[test]
    fn scroll_triggers_only_at_bottom() {
        let mut pager = Pager::new(None);
        let near = ScrollMetrics {
            scroll_top: 10,
            document_height: 40,
            viewport_height: 20,
        };
        assert_eq!(pager.on_scroll(near), None);
        let bottom = ScrollMetrics {
            scroll_top: 20,
            ..near
        };
        assert!(pager.on_scroll(bottom).is_some());
        // rapid ticks while loading stay harmless
        assert_eq!(pager.on_scroll(bottom), None);
    }

    #[test]
    fn short_document_counts_as_bottom() {
        let metrics = ScrollMetrics {
            scroll_top: 0,
            document_height: 5,
            viewport_height: 20,
        };
        assert!(metrics.at_bottom());
    }

    #[test]
    fn exhausted_history_stops_scroll_but_not_manual() {
        let mut pager = Pager::new(None);
        let mut posts = PostList::new();
        pager.load_more();
        let outcome = pager.complete_load(Ok(vec![]), &mut posts, &Renderer::default());
        assert_eq!(outcome, PageOutcome::Exhausted);
        assert!(pager.is_exhausted());
        let bottom = ScrollMetrics {
            scroll_top: 0,
            document_height: 0,
            viewport_height: 10,
        };
        assert_eq!(pager.on_scroll(bottom), None);
        assert!(pager.load_more().is_some());
    }
}
