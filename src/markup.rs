//! Inline markup for post bodies: plain text, anchors, and opaque tags.
//!
//! Bodies arrive from the server already reduced to text and `<a>` elements,
//! so this is a tokenizer rather than an HTML parser. Any other tag is kept
//! verbatim as [`Inline::Raw`] so that serializing gives the markup back.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<(/?)([A-Za-z][A-Za-z0-9]*)([^>]*)>").expect("valid tag regex")
});

static HREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).expect("valid href regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Link { id: LinkId, href: String, text: String },
    Raw(String),
}

impl Inline {
    /// Visible characters this segment contributes.
    pub fn visible_len(&self) -> usize {
        match self {
            Inline::Text(text) | Inline::Link { text, .. } => text.chars().count(),
            Inline::Raw(_) => 0,
        }
    }
}

pub fn parse(html: &str) -> Vec<Inline> {
    let mut next_id = 1;
    parse_with(html, &mut next_id)
}

/// Parse, numbering links from `next_id` and advancing it past the last one.
///
/// Tags nested inside an anchor are dropped; only the anchor's text is kept.
pub fn parse_with(html: &str, next_id: &mut u64) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::new();
    let mut open_link: Option<(String, String)> = None;
    let mut last = 0;

    for caps in TAG_RE.captures_iter(html) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let between = &html[last..whole.start()];
        last = whole.end();

        if !between.is_empty() {
            let text = decode_entities(between);
            match open_link.as_mut() {
                Some((_, link_text)) => link_text.push_str(&text),
                None => push_text(&mut out, &text),
            }
        }

        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let name = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

        if name.eq_ignore_ascii_case("a") {
            if closing {
                match open_link.take() {
                    Some((href, text)) => out.push(new_link(next_id, href, text)),
                    None => out.push(Inline::Raw(whole.as_str().to_string())),
                }
            } else {
                if let Some((href, text)) = open_link.take() {
                    out.push(new_link(next_id, href, text));
                }
                let attrs = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
                open_link = Some((href_of(attrs), String::new()));
            }
        } else if open_link.is_none() {
            out.push(Inline::Raw(whole.as_str().to_string()));
        }
    }

    let tail = &html[last..];
    if !tail.is_empty() {
        let text = decode_entities(tail);
        match open_link.as_mut() {
            Some((_, link_text)) => link_text.push_str(&text),
            None => push_text(&mut out, &text),
        }
    }
    if let Some((href, text)) = open_link.take() {
        out.push(new_link(next_id, href, text));
    }

    out
}

pub fn to_html(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(&escape_text(text)),
            Inline::Link { href, text, .. } => {
                out.push_str("<a href=\"");
                out.push_str(&escape_attr(href));
                out.push_str("\">");
                out.push_str(&escape_text(text));
                out.push_str("</a>");
            }
            Inline::Raw(raw) => out.push_str(raw),
        }
    }
    out
}

pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) | Inline::Link { text, .. } => out.push_str(text),
            Inline::Raw(_) => {}
        }
    }
    out
}

/// Keep text and anchors, unwrapping every other element.
pub fn clean_html(html: &str) -> String {
    let kept: Vec<Inline> = parse(html)
        .into_iter()
        .filter(|inline| !matches!(inline, Inline::Raw(_)))
        .collect();
    to_html(&merge_text(kept))
}

/// Join neighbouring text segments and drop empty ones.
pub fn merge_text(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::with_capacity(inlines.len());
    for inline in inlines {
        match inline {
            Inline::Text(text) => push_text(&mut out, &text),
            other => out.push(other),
        }
    }
    out
}

fn push_text(out: &mut Vec<Inline>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text(prev)) = out.last_mut() {
        prev.push_str(text);
    } else {
        out.push(Inline::Text(text.to_string()));
    }
}

fn new_link(next_id: &mut u64, href: String, text: String) -> Inline {
    let id = LinkId(*next_id);
    *next_id += 1;
    Inline::Link { id, href, text }
}

fn href_of(attrs: &str) -> String {
    HREF_RE
        .captures(attrs)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| decode_entities(m.as_str()))
        .unwrap_or_default()
}

pub fn decode_entities(input: &str) -> String {
    html_escape::decode_html_entities(input).into_owned()
}

/// Escape text content. Non-breaking spaces go back out as `&nbsp;` so the
/// editor keeps them visible in the markup.
pub fn escape_text(input: &str) -> String {
    html_escape::encode_text(input).replace('\u{a0}', "&nbsp;")
}

fn escape_attr(input: &str) -> String {
    html_escape::encode_double_quoted_attribute(input).replace('\u{a0}', "&nbsp;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_unknown_tags_verbatim() {
        let html = "  <b>hi</b>  ";
        let parsed = parse(html);
        assert_eq!(
            parsed,
            vec![
                Inline::Text("  ".into()),
                Inline::Raw("<b>".into()),
                Inline::Text("hi".into()),
                Inline::Raw("</b>".into()),
                Inline::Text("  ".into()),
            ]
        );
        assert_eq!(to_html(&parsed), html);
    }

    #[test]
    fn parses_anchor_with_entities() {
        let parsed = parse(r#"see <a href="http://x.test/?a=1&amp;b=2">the &lt;docs&gt;</a>."#);
        assert_eq!(parsed.len(), 3);
        match &parsed[1] {
            Inline::Link { id, href, text } => {
                assert_eq!(*id, LinkId(1));
                assert_eq!(href, "http://x.test/?a=1&b=2");
                assert_eq!(text, "the <docs>");
            }
            other => panic!("expected link, got {other:?}"),
        }
        assert_eq!(plain_text(&parsed), "see the <docs>.");
        assert_eq!(
            to_html(&parsed),
            r#"see <a href="http://x.test/?a=1&amp;b=2">the &lt;docs&gt;</a>."#
        );
    }

    #[test]
    fn unterminated_anchor_still_becomes_link() {
        let parsed = parse("<a href='/x'>tail");
        assert!(matches!(
            &parsed[0],
            Inline::Link { href, text, .. } if href == "/x" && text == "tail"
        ));
    }

    #[test]
    fn clean_html_unwraps_everything_but_anchors() {
        let cleaned =
            clean_html(r#"<p>one <em>two</em> <a href="/t">three</a></p><script>x</script>"#);
        assert_eq!(cleaned, r#"one two <a href="/t">three</a>x"#);
    }

    #[test]
    fn numeric_entities_decode() {
        assert_eq!(decode_entities("&#65;&#x42;&bogus;"), "AB&bogus;");
    }

    #[test]
    fn named_entities_decode() {
        assert_eq!(decode_entities("caf&eacute; &mdash; ok"), "café — ok");
        let parsed = parse("a&nbsp;b &eacute;");
        assert_eq!(plain_text(&parsed), "a\u{a0}b é");
        assert_eq!(to_html(&parsed), "a&nbsp;b é");
    }

    #[test]
    fn href_quotes_are_escaped() {
        let parsed = parse(r#"<a href="/q?x=&quot;y&quot;">q</a>"#);
        assert_eq!(to_html(&parsed), r#"<a href="/q?x=&quot;y&quot;">q</a>"#);
    }
}
