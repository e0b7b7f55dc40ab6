use crate::markup::{self, Inline, LinkId};

/// The composer's editable region: inline content, a cursor measured in
/// visible characters, and an optional selection.
#[derive(Debug, Clone, Default)]
pub struct EditableSurface {
    content: Vec<Inline>,
    cursor: usize,
    selection: Option<(usize, usize)>,
    visible: bool,
    focused: bool,
    next_link_id: u64,
}

impl EditableSurface {
    pub fn new() -> Self {
        Self {
            next_link_id: 1,
            ..Self::default()
        }
    }

    pub fn content(&self) -> &[Inline] {
        &self.content
    }

    pub fn html(&self) -> String {
        markup::to_html(&self.content)
    }

    pub fn text(&self) -> String {
        markup::plain_text(&self.content)
    }

    pub fn len(&self) -> usize {
        self.content.iter().map(Inline::visible_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The cursor, when the surface has focus.
    pub fn focused_cursor(&self) -> Option<usize> {
        self.focused.then_some(self.cursor)
    }

    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Replace the content with markup, leaving the cursor at the end.
    pub fn set_html(&mut self, html: &str) {
        self.content = markup::merge_text(markup::parse_with(html, &mut self.next_link_id));
        self.selection = None;
        self.cursor = self.len();
    }

    /// Replace the content with plain text.
    pub fn set_text(&mut self, text: &str) {
        self.content = markup::merge_text(vec![Inline::Text(text.to_string())]);
        self.selection = None;
        self.cursor = self.len();
    }

    pub fn select_all(&mut self) {
        let len = self.len();
        self.selection = Some((0, len));
        self.cursor = len;
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn move_to(&mut self, offset: usize) {
        self.selection = None;
        self.cursor = offset.min(self.len());
    }

    pub fn move_left(&mut self) {
        match self.selection.take() {
            Some((start, _)) => self.cursor = start,
            None => self.cursor = self.cursor.saturating_sub(1),
        }
    }

    pub fn move_right(&mut self) {
        match self.selection.take() {
            Some((_, end)) => self.cursor = end,
            None => self.cursor = (self.cursor + 1).min(self.len()),
        }
    }

    /// Type `text` at the cursor, replacing any selection.
    pub fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.selection.is_some() {
            self.delete_selection();
        }
        let added = text.chars().count();
        match self.locate_for_typing(self.cursor) {
            Some((idx, inner)) => match &mut self.content[idx] {
                Inline::Text(existing) | Inline::Link { text: existing, .. } => {
                    let at = byte_index(existing, inner);
                    existing.insert_str(at, text);
                }
                Inline::Raw(_) => {}
            },
            None => self.insert_segment_at(self.cursor, Inline::Text(text.to_string())),
        }
        self.cursor += added;
        self.content = markup::merge_text(std::mem::take(&mut self.content));
    }

    pub fn backspace(&mut self) {
        if self.selection.is_some() {
            self.delete_selection();
            return;
        }
        if self.cursor == 0 {
            return;
        }
        self.selection = Some((self.cursor - 1, self.cursor));
        self.delete_selection();
    }

    pub fn delete_selection(&mut self) {
        let Some((start, end)) = self.selection.take() else {
            return;
        };
        let total = self.len();
        if start == 0 && end >= total {
            self.content.clear();
            self.cursor = 0;
            return;
        }

        let mut offset = 0;
        let mut kept = Vec::with_capacity(self.content.len());
        for inline in std::mem::take(&mut self.content) {
            let len = inline.visible_len();
            let local_start = start.saturating_sub(offset).min(len);
            let local_end = end.saturating_sub(offset).min(len);
            match inline {
                Inline::Text(text) => {
                    kept.push(Inline::Text(remove_chars(&text, local_start, local_end)));
                }
                Inline::Link { id, href, text } => {
                    let text = remove_chars(&text, local_start, local_end);
                    if !text.is_empty() {
                        kept.push(Inline::Link { id, href, text });
                    }
                }
                Inline::Raw(raw) => {
                    if !(start < offset && offset < end) {
                        kept.push(Inline::Raw(raw));
                    }
                }
            }
            offset += len;
        }
        self.content = markup::merge_text(kept);
        self.cursor = start;
    }

    pub fn link_at_cursor(&self) -> Option<LinkId> {
        match self.segment_at(self.cursor) {
            Some((idx, _, _)) => match &self.content[idx] {
                Inline::Link { id, .. } => Some(*id),
                _ => None,
            },
            None => None,
        }
    }

    pub fn link_href(&self, link: LinkId) -> Option<&str> {
        self.content.iter().find_map(|inline| match inline {
            Inline::Link { id, href, .. } if *id == link => Some(href.as_str()),
            _ => None,
        })
    }

    pub fn set_link_href(&mut self, link: LinkId, value: &str) -> bool {
        for inline in &mut self.content {
            if let Inline::Link { id, href, .. } = inline {
                if *id == link {
                    *href = value.to_string();
                    return true;
                }
            }
        }
        false
    }

    /// Visible character range the link covers.
    pub fn link_range(&self, link: LinkId) -> Option<(usize, usize)> {
        let mut offset = 0;
        for inline in &self.content {
            let len = inline.visible_len();
            if let Inline::Link { id, .. } = inline {
                if *id == link {
                    return Some((offset, offset + len));
                }
            }
            offset += len;
        }
        None
    }

    pub fn place_cursor_after_link(&mut self, link: LinkId) -> bool {
        let Some((_, end)) = self.link_range(link) else {
            return false;
        };
        self.focused = true;
        self.selection = None;
        self.cursor = end;
        true
    }

    /// Wrap the selection in a link with an empty href.
    ///
    /// With nothing selected the word "link" is inserted and wrapped. When
    /// the selection starts inside an existing link that link is returned.
    /// A selection that crosses segments is clamped to the first one.
    pub fn wrap_selection_in_link(&mut self) -> Option<LinkId> {
        let (start, end) = match self.selection {
            Some((start, end)) if start < end => (start, end),
            _ => (self.cursor, self.cursor),
        };

        if let Some((idx, _, _)) = self.segment_at(start) {
            if let Inline::Link { id, .. } = &self.content[idx] {
                return Some(*id);
            }
        }

        let id = LinkId(self.next_link_id);
        self.next_link_id += 1;

        if start == end {
            self.insert_segment_at(
                start,
                Inline::Link {
                    id,
                    href: String::new(),
                    text: "link".into(),
                },
            );
            self.selection = Some((start, start + 4));
            self.cursor = start + 4;
            return Some(id);
        }

        let (idx, seg_start, seg_len) = self.segment_at(start)?;
        let Inline::Text(text) = self.content[idx].clone() else {
            return None;
        };
        let local_start = start - seg_start;
        let local_end = (end - seg_start).min(seg_len);
        let before: String = text.chars().take(local_start).collect();
        let middle: String = text
            .chars()
            .skip(local_start)
            .take(local_end - local_start)
            .collect();
        let after: String = text.chars().skip(local_end).collect();

        let replacement = vec![
            Inline::Text(before),
            Inline::Link {
                id,
                href: String::new(),
                text: middle,
            },
            Inline::Text(after),
        ];
        self.content.splice(idx..=idx, replacement);
        self.content = markup::merge_text(std::mem::take(&mut self.content));
        self.selection = Some((start, seg_start + local_end));
        self.cursor = seg_start + local_end;
        Some(id)
    }

    /// Visible segment holding the character at `offset`.
    fn segment_at(&self, offset: usize) -> Option<(usize, usize, usize)> {
        let mut start = 0;
        for (idx, inline) in self.content.iter().enumerate() {
            let len = inline.visible_len();
            if len > 0 && start <= offset && offset < start + len {
                return Some((idx, start, len));
            }
            start += len;
        }
        None
    }

    /// Where typed text lands: a text segment touching `offset`, otherwise
    /// the inside of a link that strictly contains it.
    fn locate_for_typing(&self, offset: usize) -> Option<(usize, usize)> {
        let mut inside_link = None;
        let mut start = 0;
        for (idx, inline) in self.content.iter().enumerate() {
            let len = inline.visible_len();
            match inline {
                Inline::Text(_) if start <= offset && offset <= start + len => {
                    return Some((idx, offset - start));
                }
                Inline::Link { .. } if start < offset && offset < start + len => {
                    inside_link = Some((idx, offset - start));
                }
                _ => {}
            }
            start += len;
        }
        inside_link
    }

    fn insert_segment_at(&mut self, offset: usize, segment: Inline) {
        match self.segment_at(offset) {
            Some((idx, start, _)) if start < offset => {
                if let Inline::Text(text) = self.content[idx].clone() {
                    let split = offset - start;
                    let before: String = text.chars().take(split).collect();
                    let after: String = text.chars().skip(split).collect();
                    self.content.splice(
                        idx..=idx,
                        vec![Inline::Text(before), segment, Inline::Text(after)],
                    );
                } else {
                    self.content.insert(idx + 1, segment);
                }
            }
            Some((idx, _, _)) => self.content.insert(idx, segment),
            None => self.content.push(segment),
        }
        self.content = markup::merge_text(std::mem::take(&mut self.content));
    }
}

fn byte_index(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

fn remove_chars(text: &str, start: usize, end: usize) -> String {
    if start >= end {
        return text.to_string();
    }
    text.chars()
        .enumerate()
        .filter(|(idx, _)| *idx < start || *idx >= end)
        .map(|(_, ch)| ch)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(html: &str) -> EditableSurface {
        let mut surface = EditableSurface::new();
        surface.set_html(html);
        surface
    }

    #[test]
    fn typed_text_is_escaped_on_serialization() {
        let mut s = EditableSurface::new();
        s.insert_text("a < b & c");
        assert_eq!(s.html(), "a &lt; b &amp; c");
        assert_eq!(s.cursor(), 9);
    }

    #[test]
    fn typing_replaces_selection() {
        let mut s = EditableSurface::new();
        s.set_text("new post");
        s.select_all();
        s.insert_text("hello");
        assert_eq!(s.html(), "hello");
    }

    #[test]
    fn select_all_then_delete_drops_markup_too() {
        let mut s = surface("<b>hi</b>");
        s.select_all();
        s.backspace();
        assert!(s.is_empty());
        assert_eq!(s.html(), "");
    }

    #[test]
    fn backspace_removes_previous_character() {
        let mut s = surface("abc");
        s.backspace();
        assert_eq!(s.text(), "ab");
        assert_eq!(s.cursor(), 2);
    }

    #[test]
    fn wraps_selected_word_in_empty_link() {
        let mut s = surface("read this now");
        s.move_to(5);
        s.selection = Some((5, 9));
        let id = s.wrap_selection_in_link().unwrap();
        assert_eq!(s.html(), r#"read <a href="">this</a> now"#);
        assert_eq!(s.link_range(id), Some((5, 9)));
        assert_eq!(s.link_href(id), Some(""));
    }

    #[test]
    fn collapsed_cursor_inserts_placeholder_link() {
        let mut s = surface("go ");
        let id = s.wrap_selection_in_link().unwrap();
        assert_eq!(s.html(), r#"go <a href="">link</a>"#);
        assert_eq!(s.link_range(id), Some((3, 7)));
    }

    #[test]
    fn cursor_inside_link_reuses_it() {
        let mut s = surface(r#"<a href="/a">abc</a> tail"#);
        s.move_to(1);
        let existing = s.link_at_cursor().unwrap();
        assert_eq!(s.wrap_selection_in_link(), Some(existing));
        assert_eq!(s.html(), r#"<a href="/a">abc</a> tail"#);
    }

    #[test]
    fn typing_after_link_stays_outside_it() {
        let mut s = surface(r#"x <a href="/a">abc</a> y"#);
        let link = s.content().iter().find_map(|i| match i {
            Inline::Link { id, .. } => Some(*id),
            _ => None,
        });
        assert!(s.place_cursor_after_link(link.unwrap()));
        s.insert_text("!");
        assert_eq!(s.html(), r#"x <a href="/a">abc</a>! y"#);
    }

    #[test]
    fn href_updates_in_place() {
        let mut s = surface(r#"<a href="">x</a>"#);
        s.move_to(0);
        let id = s.link_at_cursor().unwrap();
        assert!(s.set_link_href(id, "http://e.test"));
        assert_eq!(s.html(), r#"<a href="http://e.test">x</a>"#);
    }
}
