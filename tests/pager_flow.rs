use chrono::{Duration, Utc};
use reqwest::StatusCode;

use cares::feed::PostList;
use cares::locale;
use cares::pager::{PageOutcome, Pager, ScrollMetrics};
use cares::render::{DisplayZone, Renderer};
use cares::service::{BlogService, MemoryService, ServiceError};

fn renderer() -> Renderer {
    Renderer::new(locale::lookup("en"), DisplayZone::Utc)
}

fn fetch(pager: &mut Pager, service: &MemoryService, posts: &mut PostList) -> PageOutcome {
    let request = pager.load_more().expect("not already loading");
    let result = service.stream(request.before);
    pager.complete_load(result, posts, &renderer())
}

#[test]
fn pages_continue_from_the_oldest_post_seen() {
    let newest = Utc::now() - Duration::minutes(1);
    let service = MemoryService::seeded(3, newest, 3);
    let mut posts = PostList::new();
    let mut pager = Pager::new(None);

    assert_eq!(fetch(&mut pager, &service, &mut posts), PageOutcome::Loaded(3));
    let oldest = posts.get(2).unwrap().posted;
    assert_eq!(pager.oldest_seen(), Some(oldest));

    assert_eq!(fetch(&mut pager, &service, &mut posts), PageOutcome::Exhausted);
    assert_eq!(service.stream_requests(), vec![None, Some(oldest)]);
    assert_eq!(posts.len(), 3);
    assert!(posts.iter().all(|post| !post.editable));
}

#[test]
fn second_request_waits_for_the_first() {
    let mut pager = Pager::new(None);
    assert!(pager.load_more().is_some());
    assert!(pager.is_loading());
    assert!(pager.indicator_visible());
    assert!(!pager.trigger_visible());
    assert!(pager.load_more().is_none());
}

#[test]
fn failure_clears_the_loading_flag() {
    let service = MemoryService::seeded(2, Utc::now() - Duration::minutes(1), 2);
    service.fail_next(ServiceError::Rejected {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: "boom".into(),
    });
    let mut posts = PostList::new();
    let mut pager = Pager::new(None);

    assert!(matches!(
        fetch(&mut pager, &service, &mut posts),
        PageOutcome::Failed(_)
    ));
    assert!(!pager.is_loading());
    assert!(pager.trigger_visible());
    assert!(posts.is_empty());
    assert_eq!(fetch(&mut pager, &service, &mut posts), PageOutcome::Loaded(2));
}

#[test]
fn scrolling_to_the_bottom_requests_a_page() {
    let mut pager = Pager::new(None);
    let top = ScrollMetrics {
        scroll_top: 0,
        document_height: 100,
        viewport_height: 30,
    };
    assert!(pager.on_scroll(top).is_none());
    let bottom = ScrollMetrics {
        scroll_top: 70,
        ..top
    };
    assert!(pager.on_scroll(bottom).is_some());
    assert!(pager.on_scroll(bottom).is_none());
}
