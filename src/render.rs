use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::locale::{self, Locale};
use crate::markup::{self, Inline};
use crate::model::{Post, Timestamp};

pub const POSTED_FORMAT: &str = "%i:%M <small>%p</small> %D %b %Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayZone {
    #[default]
    Local,
    Utc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Editability {
    Editable,
    ReadOnly,
}

/// A post ready to be placed in the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPost {
    pub dom_id: String,
    pub id: String,
    /// Server markup, inserted without re-escaping.
    pub body_html: String,
    pub body: Vec<Inline>,
    pub permalink: String,
    pub posted: Timestamp,
    pub posted_text: String,
    pub editable: bool,
}

impl RenderedPost {
    pub fn to_html(&self) -> String {
        format!(
            "<div class=\"post\" id=\"{}\"><div class=\"body\" contenteditable=\"{}\">{}</div><p class=\"time\"><a href=\"{}\">{}</a></p></div>",
            self.dom_id,
            self.editable,
            self.body_html,
            self.permalink,
            self.posted_text
        )
    }

    /// `posted_text` without the `<small>` markup.
    pub fn posted_plain(&self) -> String {
        markup::plain_text(&markup::parse(&self.posted_text))
    }
}

#[derive(Debug, Clone)]
pub struct Renderer {
    locale: &'static Locale,
    zone: DisplayZone,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&locale::ENGLISH, DisplayZone::Local)
    }
}

impl Renderer {
    pub fn new(locale: &'static Locale, zone: DisplayZone) -> Self {
        Self { locale, zone }
    }

    pub fn locale(&self) -> &'static Locale {
        self.locale
    }

    pub fn render(&self, post: &Post, editability: Editability) -> RenderedPost {
        RenderedPost {
            dom_id: format!("post-{}", post.id),
            id: post.id.clone(),
            body_html: post.html.as_str().to_string(),
            body: markup::parse(post.html.as_str()),
            permalink: post.permalink.clone(),
            posted: post.posted,
            posted_text: self.format_posted(&post.posted),
            editable: matches!(editability, Editability::Editable),
        }
    }

    pub fn format_posted(&self, posted: &Timestamp) -> String {
        match self.zone {
            DisplayZone::Local => self.format_in(&posted.with_timezone(&Local)),
            DisplayZone::Utc => self.format_in(&posted.with_timezone(&Utc)),
        }
    }

    fn format_in<Tz: TimeZone>(&self, posted: &DateTime<Tz>) -> String {
        locale::strftime(posted, POSTED_FORMAT, self.locale)
    }

    pub fn relative(&self, post: &RenderedPost, now: DateTime<Utc>) -> String {
        locale::relative(&post.posted, &now, self.locale, false)
    }
}
