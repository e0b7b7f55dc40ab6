use std::io::{self, Stdout};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use crossbeam_channel::{unbounded, Receiver, Sender};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::{Frame, Terminal};
use textwrap::core::Fragment;
use textwrap::wrap_algorithms::wrap_first_fit;
use textwrap::{wrap, Options as WrapOptions};
use tracing::info;
use unicode_width::UnicodeWidthChar;

use crate::composer::{
    Composer, KeyDisposition, LinkKey, LinkKeyCode, SubmitOutcome, SubmitRequest,
};
use crate::feed::PostList;
use crate::markup::Inline;
use crate::model::{CreatedPost, StreamItem};
use crate::pager::{PageOutcome, PageRequest, Pager, ScrollMetrics};
use crate::render::{RenderedPost, Renderer};
use crate::service::{BlogService, ServiceError};

const COLOR_BG: Color = Color::Rgb(18, 20, 26);
const COLOR_PANEL_BG: Color = Color::Rgb(28, 31, 40);
const COLOR_TEXT_PRIMARY: Color = Color::Rgb(220, 223, 230);
const COLOR_TEXT_SECONDARY: Color = Color::Rgb(140, 146, 160);
const COLOR_LINK: Color = Color::Rgb(110, 180, 255);
const COLOR_ERROR: Color = Color::Rgb(235, 110, 110);
const SPINNER_FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];
const MOUSE_SCROLL_STEP: isize = 3;
const MAX_COMPOSER_ROWS: usize = 8;

pub struct Options {
    pub service: Arc<dyn BlogService>,
    pub renderer: Renderer,
    pub placeholder: String,
    pub status_message: String,
}

enum AsyncResponse {
    Published {
        result: Result<CreatedPost, ServiceError>,
    },
    Page {
        result: Result<Vec<StreamItem>, ServiceError>,
    },
}

struct Spinner {
    index: usize,
    last_tick: Instant,
}

impl Spinner {
    fn new() -> Self {
        Self {
            index: 0,
            last_tick: Instant::now(),
        }
    }

    fn frame(&self) -> &'static str {
        SPINNER_FRAMES[self.index % SPINNER_FRAMES.len()]
    }

    fn advance(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.last_tick) >= Duration::from_millis(120) {
            self.index = (self.index + 1) % SPINNER_FRAMES.len();
            self.last_tick = now;
            true
        } else {
            false
        }
    }

    fn reset(&mut self) {
        self.index = 0;
        self.last_tick = Instant::now();
    }
}

pub struct Model {
    composer: Composer,
    pager: Pager,
    posts: PostList,
    renderer: Renderer,
    service: Arc<dyn BlogService>,
    response_tx: Sender<AsyncResponse>,
    response_rx: Receiver<AsyncResponse>,
    status_message: String,
    notification: Option<String>,
    scroll: usize,
    document_height: usize,
    viewport_height: usize,
    needs_redraw: bool,
    spinner: Spinner,
}

impl Model {
    pub fn new(options: Options) -> Self {
        let (response_tx, response_rx) = unbounded();
        Self {
            composer: Composer::new(options.placeholder),
            pager: Pager::new(None),
            posts: PostList::new(),
            renderer: options.renderer,
            service: options.service,
            response_tx,
            response_rx,
            status_message: options.status_message,
            notification: None,
            scroll: 0,
            document_height: 0,
            viewport_height: 0,
            needs_redraw: true,
            spinner: Spinner::new(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        self.request_page(None);
        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(DisableMouseCapture)?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        let tick_rate = Duration::from_millis(120);

        loop {
            if self.poll_async() {
                self.mark_dirty();
            }

            if self.needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
                self.needs_redraw = false;
            }

            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(16));

            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        match self.handle_key(key) {
                            Ok(true) => break,
                            Ok(false) => {}
                            Err(err) => {
                                self.status_message = format!("Error: {}", err);
                                self.mark_dirty();
                            }
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize(_, _) => self.mark_dirty(),
                    _ => {}
                }
            }

            if last_tick.elapsed() >= tick_rate {
                last_tick = Instant::now();
                if self.is_loading() {
                    if self.spinner.advance() {
                        self.mark_dirty();
                    }
                } else {
                    self.spinner.reset();
                }
            }
        }

        Ok(())
    }

    fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    fn is_loading(&self) -> bool {
        self.pager.is_loading() || self.composer.submissions_in_flight() > 0
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        self.mark_dirty();
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('c') {
            return Ok(true);
        }

        // Blocking notification: swallow the key that dismisses it.
        if self.notification.take().is_some() {
            return Ok(false);
        }

        if self.composer.link_editor().is_focused() {
            self.handle_link_editor_key(key);
            return Ok(false);
        }

        if self.composer.is_active() {
            self.handle_composer_key(key);
            return Ok(false);
        }

        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char(ch) if !ctrl && self.composer.handle_shortcut(ch) => {
                self.status_message =
                    "Writing. Enter publishes, Esc discards, Ctrl-L adds a link.".to_string();
            }
            KeyCode::Char('j') | KeyCode::Down => self.scroll_by(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_by(-1),
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll_by(self.page_step()),
            KeyCode::PageUp => self.scroll_by(-self.page_step()),
            KeyCode::Char('g') | KeyCode::Home => self.scroll_by(-(self.scroll as isize)),
            KeyCode::Char('G') | KeyCode::End => self.scroll_by(self.document_height as isize),
            KeyCode::Char('m') => {
                if let Some(request) = self.pager.load_more() {
                    self.dispatch_page(request);
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_composer_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => {
                if let Some(request) = self.composer.submit() {
                    self.status_message = "Publishing…".to_string();
                    self.dispatch_submit(request);
                }
            }
            KeyCode::Esc => {
                self.composer.reset();
                self.status_message = "Draft discarded.".to_string();
            }
            KeyCode::Char('l') if ctrl => {
                self.composer.make_link();
            }
            KeyCode::Backspace => {
                self.composer.surface_mut().backspace();
                self.composer.cursor_moved();
            }
            KeyCode::Left => {
                self.composer.surface_mut().move_left();
                self.composer.cursor_moved();
            }
            KeyCode::Right => {
                self.composer.surface_mut().move_right();
                self.composer.cursor_moved();
            }
            KeyCode::Home => {
                self.composer.surface_mut().move_to(0);
                self.composer.cursor_moved();
            }
            KeyCode::End => {
                let end = self.composer.surface().len();
                self.composer.surface_mut().move_to(end);
                self.composer.cursor_moved();
            }
            KeyCode::Char(ch) if !ctrl => {
                let mut buf = [0u8; 4];
                self.composer.surface_mut().insert_text(ch.encode_utf8(&mut buf));
                self.composer.cursor_moved();
            }
            _ => {}
        }
    }

    fn handle_link_editor_key(&mut self, key: KeyEvent) {
        let code = match key.code {
            KeyCode::Char(ch) => LinkKeyCode::Char(ch),
            KeyCode::Backspace => LinkKeyCode::Backspace,
            KeyCode::Tab | KeyCode::BackTab => LinkKeyCode::Tab,
            KeyCode::Enter => LinkKeyCode::Enter,
            _ => LinkKeyCode::Other,
        };
        let link_key = LinkKey {
            code,
            alt: key.modifiers.contains(KeyModifiers::ALT),
            // Shift only matters for keys it does not already spell out.
            shift: (key.modifiers.contains(KeyModifiers::SHIFT)
                && !matches!(code, LinkKeyCode::Char(_)))
                || key.code == KeyCode::BackTab,
            ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        };
        let disposition = self.composer.link_editor_key(link_key);
        if disposition == KeyDisposition::PassThrough && key.code == KeyCode::Esc {
            // Leaving the popup blurs it, which dismisses it.
            self.composer.link_editor_blurred();
            self.composer.surface_mut().focus();
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollDown => self.scroll_by(MOUSE_SCROLL_STEP),
            MouseEventKind::ScrollUp => self.scroll_by(-MOUSE_SCROLL_STEP),
            _ => {}
        }
    }

    fn page_step(&self) -> isize {
        self.viewport_height.max(1) as isize
    }

    /// Move the feed viewport and give the pager its scroll event.
    fn scroll_by(&mut self, delta: isize) {
        let max_scroll = self.document_height.saturating_sub(self.viewport_height);
        let next = (self.scroll as isize + delta).clamp(0, max_scroll as isize);
        self.scroll = next as usize;
        self.mark_dirty();

        let metrics = ScrollMetrics {
            scroll_top: self.scroll,
            document_height: self.document_height,
            viewport_height: self.viewport_height,
        };
        if let Some(request) = self.pager.on_scroll(metrics) {
            self.dispatch_page(request);
        }
    }

    fn request_page(&mut self, anchor: Option<crate::model::Timestamp>) {
        self.pager.initialize(anchor);
        if let Some(request) = self.pager.load_more() {
            self.dispatch_page(request);
        }
    }

    fn dispatch_page(&mut self, request: PageRequest) {
        let service = self.service.clone();
        let tx = self.response_tx.clone();
        thread::spawn(move || {
            let result = service.stream(request.before);
            let _ = tx.send(AsyncResponse::Page { result });
        });
    }

    fn dispatch_submit(&mut self, request: SubmitRequest) {
        let service = self.service.clone();
        let tx = self.response_tx.clone();
        thread::spawn(move || {
            let result = service.publish(&request.html);
            let _ = tx.send(AsyncResponse::Published { result });
        });
    }

    fn poll_async(&mut self) -> bool {
        let mut changed = false;
        while let Ok(message) = self.response_rx.try_recv() {
            self.handle_async_response(message);
            changed = true;
        }
        changed
    }

    fn handle_async_response(&mut self, message: AsyncResponse) {
        match message {
            AsyncResponse::Published { result } => {
                match self
                    .composer
                    .complete_submit(result, &mut self.posts, &self.renderer)
                {
                    SubmitOutcome::Published { dom_id } => {
                        info!(%dom_id, "published");
                        self.status_message = "Published.".to_string();
                        self.scroll = 0;
                    }
                    SubmitOutcome::Failed(message) => {
                        self.status_message = "Publishing failed.".to_string();
                        self.notification = Some(format!("ERROR: {message}"));
                    }
                }
            }
            AsyncResponse::Page { result } => {
                match self
                    .pager
                    .complete_load(result, &mut self.posts, &self.renderer)
                {
                    PageOutcome::Loaded(count) => {
                        self.status_message = format!("Loaded {count} older posts.");
                    }
                    PageOutcome::Exhausted => {
                        self.status_message = "No older posts.".to_string();
                    }
                    PageOutcome::Failed(message) => {
                        self.status_message = format!("Could not load older posts: {message}");
                    }
                }
            }
        }
        self.mark_dirty();
    }

    fn draw(&mut self, frame: &mut Frame<'_>) {
        let full = frame.size();
        frame.render_widget(Block::default().style(Style::default().bg(COLOR_BG)), full);

        let composer_width = full.width.saturating_sub(2).max(1) as usize;
        let composer_lines = if self.composer.surface().is_visible() {
            composer_text(&self.composer, composer_width)
        } else {
            vec![Line::from(Span::styled(
                "Press p to write a new post.",
                Style::default().fg(COLOR_TEXT_SECONDARY),
            ))]
        };
        let composer_height = if self.composer.surface().is_visible() {
            composer_lines.len().clamp(1, MAX_COMPOSER_ROWS) as u16 + 2
        } else {
            1
        };

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(composer_height),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(full);

        let status_text = if self.is_loading() {
            format!("{} {}", self.spinner.frame(), self.status_message)
        } else {
            self.status_message.clone()
        };
        frame.render_widget(
            Paragraph::new(status_text).style(
                Style::default()
                    .fg(COLOR_TEXT_PRIMARY)
                    .bg(COLOR_PANEL_BG)
                    .add_modifier(Modifier::BOLD),
            ),
            layout[0],
        );

        if self.composer.surface().is_visible() {
            let block = Block::default()
                .borders(Borders::ALL)
                .title("New post")
                .border_style(Style::default().fg(COLOR_LINK));
            frame.render_widget(Paragraph::new(composer_lines).block(block), layout[1]);
        } else {
            frame.render_widget(Paragraph::new(composer_lines), layout[1]);
        }

        self.draw_feed(frame, layout[2]);

        frame.render_widget(
            Paragraph::new(self.footer_text())
                .style(
                    Style::default()
                        .fg(COLOR_TEXT_SECONDARY)
                        .bg(COLOR_PANEL_BG)
                        .add_modifier(Modifier::ITALIC),
                )
                .alignment(Alignment::Center),
            layout[3],
        );

        if self.composer.link_editor().is_visible() {
            self.draw_link_editor(frame, layout[1], full);
        }

        if let Some(message) = &self.notification {
            draw_notification(frame, full, message);
        }
    }

    fn draw_feed(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let inner_width = area.width.saturating_sub(2).max(1) as usize;
        let lines = self.feed_lines(inner_width);
        self.document_height = lines.len();
        self.viewport_height = area.height.saturating_sub(2) as usize;
        let max_scroll = self.document_height.saturating_sub(self.viewport_height);
        self.scroll = self.scroll.min(max_scroll);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Posts ({})", self.posts.len()))
            .border_style(Style::default().fg(COLOR_TEXT_SECONDARY));
        frame.render_widget(
            Paragraph::new(Text::from(lines))
                .block(block)
                .scroll((self.scroll.min(u16::MAX as usize) as u16, 0)),
            area,
        );
    }

    fn feed_lines(&self, width: usize) -> Vec<Line<'static>> {
        let now = Utc::now();
        let mut lines = Vec::new();
        for post in self.posts.iter() {
            lines.extend(post_lines(post, width));
            lines.push(Line::from(Span::styled(
                format!(
                    "{} · {} · {}",
                    post.posted_plain(),
                    self.renderer.relative(post, now),
                    post.permalink
                ),
                Style::default().fg(COLOR_TEXT_SECONDARY),
            )));
            lines.push(Line::default());
        }

        let trailer = if self.pager.indicator_visible() {
            format!("{} loading…", self.spinner.frame())
        } else if self.pager.is_exhausted() {
            "No older posts. [m] check again".to_string()
        } else if self.pager.trigger_visible() {
            "[m] Load more".to_string()
        } else {
            String::new()
        };
        lines.push(Line::from(Span::styled(
            trailer,
            Style::default().fg(COLOR_TEXT_SECONDARY),
        )));
        lines
    }

    fn draw_link_editor(&self, frame: &mut Frame<'_>, anchor: Rect, full: Rect) {
        let editor = self.composer.link_editor();
        let width = full.width.min(60);
        let y = (anchor.y + anchor.height).min(full.height.saturating_sub(3));
        let area = Rect::new(anchor.x, y, width, 3.min(full.height));

        let mut style = Style::default().fg(COLOR_TEXT_PRIMARY).bg(COLOR_PANEL_BG);
        if editor.cue_active() {
            style = style.bg(COLOR_LINK).fg(COLOR_BG);
        }
        let title = if editor.is_focused() {
            "Link (Enter/Tab to return)"
        } else {
            "Link"
        };
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(editor.text().to_string())
                .style(style)
                .block(Block::default().borders(Borders::ALL).title(title)),
            area,
        );
    }

    fn footer_text(&self) -> String {
        if self.composer.link_editor().is_focused() {
            "type the address · Enter/Tab back to the post".to_string()
        } else if self.composer.is_active() {
            "Enter publish · Esc discard · Ctrl-L link · ←/→ move".to_string()
        } else {
            "p new post · j/k scroll · m load more · q quit".to_string()
        }
    }
}

fn draw_notification(frame: &mut Frame<'_>, full: Rect, message: &str) {
    let width = full.width.saturating_sub(4).min(70);
    let body = notification_lines(message, width.saturating_sub(2) as usize);
    let height = (body.len() as u16 + 4).min(full.height);
    let area = Rect::new(
        full.x + (full.width.saturating_sub(width)) / 2,
        full.y + (full.height.saturating_sub(height)) / 2,
        width,
        height,
    );
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(format!("{}\n\nPress any key to continue.", body.join("\n")))
            .style(Style::default().fg(COLOR_TEXT_PRIMARY).bg(COLOR_PANEL_BG))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Error")
                    .border_style(Style::default().fg(COLOR_ERROR)),
            ),
        area,
    );
}

fn notification_lines(message: &str, width: usize) -> Vec<String> {
    let options = WrapOptions::new(width.max(1)).break_words(true);
    wrap(message, options)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

fn post_lines(post: &RenderedPost, width: usize) -> Vec<Line<'static>> {
    let mut text = StyledText::default();
    for inline in &post.body {
        match inline {
            Inline::Text(body) => text.push(body, Style::default().fg(COLOR_TEXT_PRIMARY)),
            Inline::Link { text: body, .. } => text.push(
                body,
                Style::default()
                    .fg(COLOR_LINK)
                    .add_modifier(Modifier::UNDERLINED),
            ),
            Inline::Raw(tag) => {
                let lower = tag.to_ascii_lowercase();
                if ["<br", "</p", "</div"]
                    .iter()
                    .any(|prefix| lower.starts_with(prefix))
                {
                    text.line_break();
                }
            }
        }
    }
    text.into_lines(width, true)
}

fn composer_text(composer: &Composer, width: usize) -> Vec<Line<'static>> {
    let surface = composer.surface();
    let selection = surface.selection();
    let cursor = surface.focused_cursor();
    let mut text = StyledText::default();
    let mut offset = 0;
    for inline in surface.content() {
        let (body, base) = match inline {
            Inline::Text(body) => (body, Style::default().fg(COLOR_TEXT_PRIMARY)),
            Inline::Link { text: body, .. } => (
                body,
                Style::default()
                    .fg(COLOR_LINK)
                    .add_modifier(Modifier::UNDERLINED),
            ),
            Inline::Raw(_) => continue,
        };
        for ch in body.chars() {
            let mut style = base;
            if selection.is_some_and(|(start, end)| offset >= start && offset < end) {
                style = style.bg(COLOR_TEXT_SECONDARY);
            }
            if cursor == Some(offset) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            text.push_char(ch, style);
            offset += 1;
        }
    }
    if cursor == Some(offset) {
        text.push_char(' ', Style::default().add_modifier(Modifier::REVERSED));
    }
    text.into_lines(width, false)
}

/// A word and the whitespace after it, as styled spans.
#[derive(Debug, Default)]
struct StyledWord {
    word: Vec<Span<'static>>,
    gap: Vec<Span<'static>>,
    width: usize,
    gap_width: usize,
}

impl Fragment for StyledWord {
    fn width(&self) -> f64 {
        self.width as f64
    }

    fn whitespace_width(&self) -> f64 {
        self.gap_width as f64
    }

    fn penalty_width(&self) -> f64 {
        0.0
    }
}

/// Styled words grouped into paragraphs at hard line breaks.
#[derive(Debug, Default)]
struct StyledText {
    paragraphs: Vec<Vec<StyledWord>>,
    paragraph: Vec<StyledWord>,
    current: StyledWord,
}

impl StyledText {
    fn push(&mut self, text: &str, style: Style) {
        for ch in text.chars() {
            self.push_char(ch, style);
        }
    }

    fn push_char(&mut self, ch: char, style: Style) {
        if ch == '\n' {
            self.line_break();
        } else if ch.is_whitespace() {
            push_span(&mut self.current.gap, ' ', style);
            self.current.gap_width += 1;
        } else {
            if !self.current.gap.is_empty() {
                self.finish_word();
            }
            push_span(&mut self.current.word, ch, style);
            self.current.width += UnicodeWidthChar::width(ch).unwrap_or(0);
        }
    }

    fn line_break(&mut self) {
        self.finish_word();
        self.paragraphs.push(std::mem::take(&mut self.paragraph));
    }

    fn finish_word(&mut self) {
        let word = std::mem::take(&mut self.current);
        if !word.word.is_empty() || !word.gap.is_empty() {
            self.paragraph.push(word);
        }
    }

    /// Wrap every paragraph first-fit. With `trim`, leading and trailing
    /// whitespace is dropped from each line.
    fn into_lines(mut self, width: usize, trim: bool) -> Vec<Line<'static>> {
        self.finish_word();
        if !self.paragraph.is_empty() || self.paragraphs.is_empty() {
            self.paragraphs.push(std::mem::take(&mut self.paragraph));
        }

        let width = width.max(1);
        let mut lines = Vec::new();
        for paragraph in self.paragraphs {
            let words: Vec<StyledWord> = paragraph
                .into_iter()
                .filter(|word| !(trim && word.word.is_empty()))
                .flat_map(|word| split_long_word(word, width))
                .collect();
            if words.is_empty() {
                lines.push(Line::default());
                continue;
            }
            for row in wrap_first_fit(&words, &[width as f64]) {
                let mut spans = Vec::new();
                for (idx, word) in row.iter().enumerate() {
                    spans.extend(word.word.iter().cloned());
                    if !trim || idx + 1 < row.len() {
                        spans.extend(word.gap.iter().cloned());
                    }
                }
                lines.push(Line::from(spans));
            }
        }
        lines
    }
}

fn push_span(spans: &mut Vec<Span<'static>>, ch: char, style: Style) {
    match spans.last_mut() {
        Some(last) if last.style == style => last.content.to_mut().push(ch),
        _ => spans.push(Span::styled(ch.to_string(), style)),
    }
}

/// Break a word wider than the line into line-sized pieces.
fn split_long_word(word: StyledWord, width: usize) -> Vec<StyledWord> {
    if word.width <= width {
        return vec![word];
    }
    let mut pieces = Vec::new();
    let mut current = StyledWord::default();
    for span in word.word {
        for ch in span.content.chars() {
            let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
            if current.width + ch_width > width && current.width > 0 {
                pieces.push(std::mem::take(&mut current));
            }
            push_span(&mut current.word, ch, span.style);
            current.width += ch_width;
        }
    }
    current.gap = word.gap;
    current.gap_width = word.gap_width;
    pieces.push(current);
    pieces
}
