use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use reqwest::StatusCode;

use crate::markup;
use crate::model::{CreatedPost, StreamItem, Timestamp, TrustedHtml};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("server returned {status}: {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Text shown to the user. For a rejected request this is the server's
    /// body, untouched.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Rejected { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}

/// The blog server. Implementations are responsible for returning markup
/// that is safe to insert verbatim.
pub trait BlogService: Send + Sync {
    fn publish(&self, html: &str) -> Result<CreatedPost, ServiceError>;
    /// Posts older than `before`, newest first. `None` means "now".
    fn stream(&self, before: Option<Timestamp>) -> Result<Vec<StreamItem>, ServiceError>;
}

/// An in-process blog, for the demo mode and tests.
pub struct MemoryService {
    inner: Mutex<MemoryState>,
    page_size: usize,
}

#[derive(Default)]
struct MemoryState {
    posts: Vec<StreamItem>,
    next_id: u64,
    fail_next: Option<ServiceError>,
    published: Vec<String>,
    stream_requests: Vec<Option<Timestamp>>,
}

impl Default for MemoryService {
    fn default() -> Self {
        Self::new(20)
    }
}

impl MemoryService {
    pub fn new(page_size: usize) -> Self {
        Self {
            inner: Mutex::new(MemoryState {
                next_id: 1,
                ..MemoryState::default()
            }),
            page_size: page_size.max(1),
        }
    }

    /// A blog with `count` posts, one hour apart, ending at `newest`.
    pub fn seeded(count: usize, newest: DateTime<Utc>, page_size: usize) -> Self {
        let service = Self::new(page_size);
        for n in 0..count {
            let posted = newest - Duration::hours(n as i64);
            service.insert(
                &format!(
                    "Post number {} with a <a href=\"https://example.com/{}\">link</a>.",
                    count - n,
                    count - n
                ),
                posted.into(),
            );
        }
        service
    }

    pub fn insert(&self, html: &str, posted: Timestamp) -> StreamItem {
        let mut state = self.inner.lock();
        let id = state.next_id.to_string();
        state.next_id += 1;
        let item = StreamItem {
            permalink: crate::model::permalink_for(&id, &posted),
            id,
            html: TrustedHtml::from_sanitized(markup::clean_html(html)),
            posted,
        };
        state.posts.push(item.clone());
        state.posts.sort_by(|a, b| b.posted.cmp(&a.posted));
        item
    }

    /// Make the next call fail with `err`.
    pub fn fail_next(&self, err: ServiceError) {
        self.inner.lock().fail_next = Some(err);
    }

    pub fn published(&self) -> Vec<String> {
        self.inner.lock().published.clone()
    }

    pub fn stream_requests(&self) -> Vec<Option<Timestamp>> {
        self.inner.lock().stream_requests.clone()
    }
}

impl BlogService for MemoryService {
    fn publish(&self, html: &str) -> Result<CreatedPost, ServiceError> {
        {
            let mut state = self.inner.lock();
            state.published.push(html.to_string());
            if let Some(err) = state.fail_next.take() {
                return Err(err);
            }
        }
        if html.is_empty() {
            return Err(ServiceError::Rejected {
                status: StatusCode::BAD_REQUEST,
                body: "html value is required".into(),
            });
        }
        let item = self.insert(html, crate::model::now());
        Ok(CreatedPost {
            html: item.html,
            posted: item.posted,
            id: item.id,
        })
    }

    fn stream(&self, before: Option<Timestamp>) -> Result<Vec<StreamItem>, ServiceError> {
        let mut state = self.inner.lock();
        state.stream_requests.push(before);
        if let Some(err) = state.fail_next.take() {
            return Err(err);
        }
        let boundary = before.unwrap_or_else(crate::model::now);
        Ok(state
            .posts
            .iter()
            .filter(|item| item.posted < boundary)
            .take(self.page_size)
            .cloned()
            .collect())
    }
}
