//! The post composer: one editable region, a global activation shortcut,
//! and the floating link editor.

use tracing::{debug, warn};

use crate::feed::PostList;
use crate::markup::LinkId;
use crate::model::CreatedPost;
use crate::render::{Editability, Renderer};
use crate::service::ServiceError;
use crate::surface::EditableSurface;

pub const DEFAULT_PLACEHOLDER: &str = "new post";
pub const ACTIVATION_KEY: char = 'p';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerState {
    Dormant,
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Published { dom_id: String },
    /// Raw error text for the user; the draft is left as it was.
    Failed(String),
}

/// A link under the pointer or cursor, and whether its container is editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkRef {
    pub link: LinkId,
    pub editable: bool,
}

impl LinkRef {
    pub fn editable(link: LinkId) -> Self {
        Self {
            link,
            editable: true,
        }
    }

    pub fn read_only(link: LinkId) -> Self {
        Self {
            link,
            editable: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKeyCode {
    Char(char),
    Backspace,
    Tab,
    Enter,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkKey {
    pub code: LinkKeyCode,
    pub alt: bool,
    pub shift: bool,
    pub ctrl: bool,
}

impl LinkKey {
    pub fn plain(code: LinkKeyCode) -> Self {
        Self {
            code,
            alt: false,
            shift: false,
            ctrl: false,
        }
    }

    fn modified(&self) -> bool {
        self.alt || self.shift || self.ctrl
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    Handled,
    PassThrough,
}

/// Floating href editor bound to one link of the surface.
#[derive(Debug, Clone, Default)]
pub struct LinkEditor {
    target: Option<LinkId>,
    text: String,
    visible: bool,
    focused: bool,
    text_selected: bool,
    cue: bool,
}

impl LinkEditor {
    pub fn target(&self) -> Option<LinkId> {
        self.target
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Background tracks the link colour once the href has been edited.
    pub fn cue_active(&self) -> bool {
        self.cue
    }
}

pub struct Composer {
    state: ComposerState,
    surface: EditableSurface,
    placeholder: String,
    shortcut_bound: bool,
    link_editor: LinkEditor,
    in_flight: usize,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER)
    }
}

impl Composer {
    pub fn new(placeholder: impl Into<String>) -> Self {
        let placeholder = placeholder.into();
        let mut surface = EditableSurface::new();
        surface.set_text(&placeholder);
        Self {
            state: ComposerState::Dormant,
            surface,
            placeholder,
            shortcut_bound: true,
            link_editor: LinkEditor::default(),
            in_flight: 0,
        }
    }

    pub fn state(&self) -> ComposerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ComposerState::Active
    }

    pub fn shortcut_bound(&self) -> bool {
        self.shortcut_bound
    }

    pub fn surface(&self) -> &EditableSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut EditableSurface {
        &mut self.surface
    }

    pub fn link_editor(&self) -> &LinkEditor {
        &self.link_editor
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn submissions_in_flight(&self) -> usize {
        self.in_flight
    }

    /// Document-level keypress. Only the activation key does anything, and
    /// only while the shortcut is bound.
    pub fn handle_shortcut(&mut self, ch: char) -> bool {
        if !self.shortcut_bound || ch != ACTIVATION_KEY {
            return false;
        }
        self.activate()
    }

    pub fn activate(&mut self) -> bool {
        if self.state == ComposerState::Active {
            return false;
        }
        self.surface.show();
        self.surface.focus();
        self.surface.select_all();
        self.shortcut_bound = false;
        self.state = ComposerState::Active;
        debug!("composer activated");
        true
    }

    /// Build the request for the current draft, or nothing when it is blank.
    pub fn submit(&mut self) -> Option<SubmitRequest> {
        let html = self.surface.html().trim().to_string();
        if html.is_empty() {
            debug!("composer submit skipped: empty draft");
            return None;
        }
        if self.in_flight > 0 {
            warn!(
                in_flight = self.in_flight,
                "submitting while an earlier post is still in flight"
            );
        }
        self.in_flight += 1;
        debug!(bytes = html.len(), "composer submitting post");
        Some(SubmitRequest { html })
    }

    pub fn complete_submit(
        &mut self,
        result: Result<CreatedPost, ServiceError>,
        posts: &mut PostList,
        renderer: &Renderer,
    ) -> SubmitOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        match result {
            Ok(created) => {
                self.reset();
                let node = renderer.render(&created.into_post(), Editability::Editable);
                let dom_id = node.dom_id.clone();
                posts.insert_after_editor(node);
                debug!(%dom_id, "post published");
                SubmitOutcome::Published { dom_id }
            }
            Err(err) => {
                warn!(error = %err, "post submission failed");
                SubmitOutcome::Failed(err.user_message())
            }
        }
    }

    pub fn reset(&mut self) {
        self.deactivate_link_editor();
        self.surface.blur();
        self.surface.set_text(&self.placeholder);
        self.surface.hide();
        self.shortcut_bound = true;
        self.state = ComposerState::Dormant;
        debug!("composer reset");
    }

    /// Turn the selection (or cursor point) into a link and edit its href.
    /// A cursor already inside a link edits that link, href and all.
    pub fn make_link(&mut self) -> Option<LinkId> {
        if self.state != ComposerState::Active {
            return None;
        }
        let link = self.surface.wrap_selection_in_link()?;
        self.activate_link_editor(LinkRef::editable(link));
        Some(link)
    }

    pub fn show_link_editor(&mut self, link: LinkRef) -> bool {
        if !link.editable {
            return false;
        }
        let Some(href) = self.surface.link_href(link.link) else {
            return false;
        };
        self.link_editor = LinkEditor {
            target: Some(link.link),
            text: href.to_string(),
            visible: true,
            focused: false,
            text_selected: false,
            cue: false,
        };
        true
    }

    pub fn activate_link_editor(&mut self, link: LinkRef) -> bool {
        if !self.show_link_editor(link) {
            return false;
        }
        self.surface.blur();
        self.link_editor.focused = true;
        self.link_editor.text_selected = true;
        true
    }

    pub fn deactivate_link_editor(&mut self) {
        self.link_editor = LinkEditor::default();
    }

    pub fn link_hover_ended(&mut self) {
        if self.link_editor.visible && !self.link_editor.focused {
            self.deactivate_link_editor();
        }
    }

    pub fn link_editor_blurred(&mut self) {
        self.deactivate_link_editor();
    }

    /// Hover tracking for the terminal: a cursor resting on a link opens the
    /// editor, leaving it closes an editor that was never focused.
    pub fn cursor_moved(&mut self) {
        if self.link_editor.focused {
            return;
        }
        match self.surface.link_at_cursor() {
            Some(link) if self.link_editor.target != Some(link) => {
                self.show_link_editor(LinkRef::editable(link));
            }
            Some(_) => {}
            None => self.link_hover_ended(),
        }
    }

    pub fn link_editor_key(&mut self, key: LinkKey) -> KeyDisposition {
        let Some(link) = self.link_editor.target else {
            return KeyDisposition::PassThrough;
        };
        if !self.link_editor.focused {
            return KeyDisposition::PassThrough;
        }

        match key.code {
            LinkKeyCode::Tab | LinkKeyCode::Enter => {
                if key.modified() {
                    return KeyDisposition::PassThrough;
                }
                self.surface.place_cursor_after_link(link);
                self.link_editor_blurred();
                KeyDisposition::Handled
            }
            LinkKeyCode::Char(ch) if !key.ctrl && !key.alt => {
                if self.link_editor.text_selected {
                    self.link_editor.text.clear();
                    self.link_editor.text_selected = false;
                }
                self.link_editor.text.push(ch);
                self.sync_href(link);
                KeyDisposition::Handled
            }
            LinkKeyCode::Backspace if !key.ctrl && !key.alt => {
                if self.link_editor.text_selected {
                    self.link_editor.text.clear();
                    self.link_editor.text_selected = false;
                } else {
                    self.link_editor.text.pop();
                }
                self.sync_href(link);
                KeyDisposition::Handled
            }
            _ => KeyDisposition::PassThrough,
        }
    }

    fn sync_href(&mut self, link: LinkId) {
        let href = self.link_editor.text.clone();
        self.surface.set_link_href(link, &href);
        self.link_editor.cue = true;
    }
}
