use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

pub type Timestamp = DateTime<FixedOffset>;

pub fn now() -> Timestamp {
    Utc::now().into()
}

/// Markup that the blog server has already cleaned. It is inserted into the
/// feed verbatim; producing it safely is the service's job, not ours.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustedHtml(String);

impl TrustedHtml {
    /// Only services should call this, after they have cleaned the markup.
    pub fn from_sanitized(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TrustedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub html: TrustedHtml,
    pub posted: Timestamp,
    pub permalink: String,
}

/// Body of a successful `POST /post`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPost {
    #[serde(rename = "Html")]
    pub html: TrustedHtml,
    #[serde(rename = "Posted")]
    pub posted: Timestamp,
    #[serde(rename = "Id", deserialize_with = "id_string")]
    pub id: String,
}

impl CreatedPost {
    pub fn into_post(self) -> Post {
        let permalink = permalink_for(&self.id, &self.posted);
        Post {
            id: self.id,
            html: self.html,
            posted: self.posted,
            permalink,
        }
    }
}

/// One element of a `GET /stream` page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamItem {
    #[serde(rename = "Id", deserialize_with = "id_string")]
    pub id: String,
    #[serde(rename = "Html")]
    pub html: TrustedHtml,
    #[serde(rename = "Posted")]
    pub posted: Timestamp,
    #[serde(rename = "Permalink", default)]
    pub permalink: String,
}

impl StreamItem {
    pub fn into_post(self) -> Post {
        let permalink = if self.permalink.is_empty() {
            permalink_for(&self.id, &self.posted)
        } else {
            self.permalink
        };
        Post {
            id: self.id,
            html: self.html,
            posted: self.posted,
            permalink,
        }
    }
}

/// `/<UTC year>/<id>`
pub fn permalink_for(id: &str, posted: &Timestamp) -> String {
    format!("/{}/{}", posted.with_timezone(&Utc).year(), id)
}

// The server emits ids as bare numbers; older payloads quote them.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a post id as a string or integer")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<String, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_post_builds_year_permalink() {
        let created: CreatedPost = serde_json::from_str(
            r#"{"Html":"<b>hi</b>","Posted":"2024-03-01T10:00:00Z","Id":"42"}"#,
        )
        .unwrap();
        let post = created.into_post();
        assert_eq!(post.permalink, "/2024/42");
        assert_eq!(post.html.as_str(), "<b>hi</b>");
    }

    #[test]
    fn permalink_uses_utc_year() {
        let posted = DateTime::parse_from_rfc3339("2024-12-31T20:00:00-05:00").unwrap();
        assert_eq!(permalink_for("7", &posted), "/2025/7");
    }

    #[test]
    fn stream_item_accepts_numeric_id_and_extra_fields() {
        let items: Vec<StreamItem> = serde_json::from_str(
            r#"[{"Id":9,"Html":"x","Posted":"2023-05-01T08:30:00.123456-07:00","Permalink":"/post/BE","Created":"2023-05-01T15:30:00Z"}]"#,
        )
        .unwrap();
        assert_eq!(items[0].id, "9");
        let post = items[0].clone().into_post();
        assert_eq!(post.permalink, "/post/BE");
    }
}
