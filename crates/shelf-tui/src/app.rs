//! Picker application state and the main event loop.
//!
//! [`App::run`] sets up the terminal, drives the crossterm event loop, and
//! tears everything down cleanly on exit or panic. Remote search results are
//! picked up by [`App::tick`] on every loop iteration, so the loop must run
//! inside a `tokio` runtime context.

use std::cell::Cell;
use std::io;
use std::time::{Duration, Instant};

use crate::{
    event::{self, AppEvent, Keymap},
    theme::Theme,
    widgets::{
        help::HelpPopup,
        query_bar::{QueryBar, QueryInputState},
        result_list::{ResultList, ResultListState},
        trigger::Trigger,
    },
};
use crossterm::{
    event::{
        self as ct_event, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste,
        EnableMouseCapture, Event, KeyEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDir, Layout, Position, Rect},
    style::{Modifier, Style},
    Frame, Terminal,
};
use shelf_core::{
    cache::CachedSelection,
    config::Config,
    selector::Key,
    view::{SelectorView, ViewOptions},
    SearchSource, Selector,
};

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Screen areas from the last frame, for mouse hit-testing.
#[derive(Debug, Clone, Copy, Default)]
struct Hitboxes {
    trigger: Rect,
    clear: Option<Rect>,
    /// Query bar plus result list; empty while closed.
    dropdown: Rect,
}

pub struct AppState<S> {
    pub selector: Selector<S>,
    pub input: QueryInputState,
    pub list: ResultListState,
    pub theme: Theme,
    pub keymap: Keymap,
    pub view_opts: ViewOptions,
    /// When the search field takes focus after the dropdown opened.
    pub search_focus_at: Option<Instant>,
    pub search_focused: bool,
    /// Characters typed before the search field had focus.
    pub pending_input: String,
    pub show_help: bool,
    pub quit: bool,
    hitboxes: Cell<Hitboxes>,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App<S> {
    state: AppState<S>,
}

impl<S: SearchSource> App<S> {
    pub fn new(selector: Selector<S>, config: &Config) -> anyhow::Result<Self> {
        let theme = Theme::resolve(&config.ui.theme)?;
        let keymap = Keymap::from_config(&config.keybindings)?;
        let state = AppState {
            selector,
            input: QueryInputState::default(),
            list: ResultListState::default(),
            theme,
            keymap,
            view_opts: ViewOptions::from(&config.ui),
            search_focus_at: None,
            search_focused: false,
            pending_input: String::new(),
            show_help: false,
            quit: false,
            hitboxes: Cell::new(Hitboxes::default()),
        };
        Ok(App { state })
    }

    pub fn state(&self) -> &AppState<S> {
        &self.state
    }

    /// Set up the terminal, run the event loop, and restore the terminal on
    /// exit. Returns whatever is selected when the user quits.
    pub fn run(mut self) -> anyhow::Result<CachedSelection> {
        install_panic_hook();

        enable_raw_mode()?;
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste
        )?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = terminal.show_cursor();

        result?;
        let selection = self.state.selector.selection().current().clone();
        self.state.selector.unmount();
        Ok(selection)
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        loop {
            self.tick(Instant::now());
            terminal.draw(|frame| self.render(frame))?;

            if self.state.quit {
                break;
            }

            if ct_event::poll(Duration::from_millis(16))? {
                let raw = ct_event::read()?;
                if let Event::Key(key) = &raw {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                }
                // The search input is live while the dropdown is open
                let app_event = if self.state.selector.is_open() {
                    event::to_app_event_insert(raw, &self.state.keymap)
                } else {
                    event::to_app_event(raw, &self.state.keymap)
                };
                if let Some(ev) = app_event {
                    tracing::debug!(open = self.state.selector.is_open(), event = ?ev, "input event");
                    self.handle(ev, Instant::now());
                }
            }
        }
        Ok(())
    }

    /// Time-driven work: apply arrived search results and move focus into
    /// the search field once the open delay has passed. Returns whether
    /// anything visible changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let s = &mut self.state;
        let mut changed = s.selector.poll();
        if changed {
            s.list.reset();
        }

        if let Some(at) = s.search_focus_at {
            if now >= at && s.selector.is_open() {
                tracing::debug!("search field focused");
                s.search_focus_at = None;
                s.search_focused = true;
                if !s.pending_input.is_empty() {
                    let pending = std::mem::take(&mut s.pending_input);
                    s.input.insert_str(&pending);
                    s.selector.set_query(s.input.text.clone());
                    s.list.reset();
                }
                changed = true;
            }
        }

        self.sync();
        changed
    }

    pub fn handle(&mut self, event: AppEvent, now: Instant) {
        let s = &mut self.state;

        // Help popup intercepts all events; only close keys pass through.
        if s.show_help {
            if matches!(event, AppEvent::Help | AppEvent::Escape | AppEvent::Quit) {
                tracing::debug!("help popup closed");
                s.show_help = false;
            }
            return;
        }

        match event {
            AppEvent::Quit => {
                tracing::debug!("quit");
                s.quit = true;
            }
            AppEvent::Help => {
                tracing::debug!("help popup opened");
                s.show_help = true;
            }
            AppEvent::Clear => {
                s.selector.clear();
            }
            // Terminal resize is handled automatically by ratatui
            AppEvent::Resize(_, _) => {}
            AppEvent::Paste(text) => {
                if !s.selector.is_open() {
                    self.open(now);
                }
                self.state.selector.paste(&text);
                self.state.list.reset();
            }
            AppEvent::Click { column, row } => self.click(column, row, now),
            AppEvent::Hover { column, row } => {
                if s.selector.is_open() {
                    if let Some(i) = s.list.item_at(column, row, s.selector.results().len()) {
                        s.selector.hover(i);
                    }
                }
            }
            other if !s.selector.is_open() => self.handle_closed(other, now),
            other => self.handle_open(other),
        }

        self.sync();
    }

    fn handle_closed(&mut self, event: AppEvent, now: Instant) {
        match event {
            AppEvent::Enter | AppEvent::Down | AppEvent::Char(' ') => {
                self.open(now);
            }
            // Typing on the trigger opens it and starts the search
            AppEvent::Char(c) => {
                if self.open(now) {
                    self.state.pending_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn handle_open(&mut self, event: AppEvent) {
        let s = &mut self.state;
        match event {
            AppEvent::Up => {
                s.selector.handle_key(Key::Up);
            }
            AppEvent::Down => {
                s.selector.handle_key(Key::Down);
            }
            AppEvent::Enter => {
                s.selector.handle_key(Key::Enter);
            }
            AppEvent::Escape => {
                s.selector.handle_key(Key::Escape);
            }
            AppEvent::Char(c) if !s.search_focused => s.pending_input.push(c),
            edit if s.search_focused => {
                if s.input.handle(&edit) {
                    s.selector.set_query(s.input.text.clone());
                    s.list.reset();
                }
            }
            _ => {}
        }
    }

    fn open(&mut self, now: Instant) -> bool {
        let s = &mut self.state;
        let Some(effect) = s.selector.open() else {
            return false;
        };
        s.search_focused = false;
        s.search_focus_at = Some(now + effect.focus_search_after);
        s.pending_input.clear();
        s.list.reset();
        true
    }

    fn click(&mut self, column: u16, row: u16, now: Instant) {
        let pos = Position::new(column, row);
        let hb = self.state.hitboxes.get();
        let s = &mut self.state;

        if hb.clear.is_some_and(|r| r.contains(pos)) {
            s.selector.clear();
        } else if hb.trigger.contains(pos) {
            if s.selector.is_open() {
                s.selector.close();
            } else {
                self.open(now);
            }
        } else if s.selector.is_open() {
            if hb.dropdown.contains(pos) {
                if let Some(i) = s.list.item_at(column, row, s.selector.results().len()) {
                    s.selector.select_index(i);
                }
            } else {
                tracing::debug!(column, row, "click outside dropdown");
                s.selector.outside_click();
            }
        }
    }

    /// Pull selector-owned state back into the widgets.
    fn sync(&mut self) {
        let s = &mut self.state;
        s.input.sync(s.selector.query());
        if !s.selector.is_open() {
            s.search_focused = false;
            s.search_focus_at = None;
            s.pending_input.clear();
        }
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    pub fn render(&self, frame: &mut Frame) {
        let state = &self.state;
        let view = state.selector.view(&state.view_opts);
        draw(frame, state, &view);
    }
}

fn draw<S: SearchSource>(frame: &mut Frame, state: &AppState<S>, view: &SelectorView) {
    let area = frame.area();
    let kind = state.selector.kind();

    // Vertical: 1-line header | 3-line trigger | dropdown
    let vert = Layout::default()
        .direction(LayoutDir::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Fill(1),
        ])
        .split(area);

    draw_header(frame, vert[0], state, kind.plural());

    let title = capitalize(kind.singular());
    let clear_key = state.keymap.clear.to_string();
    let trigger = Trigger::new(
        &view.trigger,
        &title,
        view.open,
        !view.open,
        &clear_key,
        &state.theme,
    );
    let clear = trigger.clear_hint_area(vert[1]);
    frame.render_widget(trigger, vert[1]);

    let mut hitboxes = Hitboxes {
        trigger: vert[1],
        clear,
        dropdown: Rect::default(),
    };

    if view.open {
        let drop = Layout::default()
            .direction(LayoutDir::Vertical)
            .constraints([Constraint::Length(3), Constraint::Fill(1)])
            .split(vert[2]);
        hitboxes.dropdown = vert[2];

        let placeholder = format!("Search {}…", kind.plural());
        let bar = QueryBar::new(&state.input, &placeholder, state.search_focused, &state.theme);
        let cursor = state.search_focused.then(|| bar.cursor_position(drop[0]));
        frame.render_widget(bar, drop[0]);
        frame.render_widget(
            ResultList::new(
                &view.items,
                view.status.as_ref(),
                &view.query,
                &state.list,
                &state.theme,
            ),
            drop[1],
        );

        if let Some((cx, cy)) = cursor {
            if !state.show_help {
                frame.set_cursor_position((cx, cy));
            }
        }
    }
    state.hitboxes.set(hitboxes);

    if state.show_help {
        frame.render_widget(HelpPopup::new(&state.keymap, &state.theme), area);
    }
}

fn draw_header<S>(frame: &mut Frame, area: Rect, state: &AppState<S>, plural: &str) {
    let buf = frame.buffer_mut();
    buf.set_string(
        area.x,
        area.y,
        format!(" shelf · {plural} "),
        Style::default().add_modifier(Modifier::BOLD),
    );

    // Keybinding hints at the right edge
    let hint = format!(" q:quit  {}:help ", state.keymap.help);
    let hint_x = area.right().saturating_sub(hint.chars().count() as u16);
    buf.set_string(
        hint_x,
        area.y,
        hint,
        Style::default().add_modifier(Modifier::DIM),
    );
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Terminal helpers
// ---------------------------------------------------------------------------

fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        original(info);
    }));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
