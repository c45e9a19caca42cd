use crate::config::{Settings, SettingsStore};
use crate::editor::{ConfigEditor, EditorField};
use crate::game::GameSession;
use crate::history::{HistoryRecord, HistoryStore};
use crate::runtime::GameEvent;
use crate::session::SessionEvent;
use crate::util::format_duration;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Playing,
    Results,
    History,
    ConfigEditor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Default)]
pub struct HistoryViewState {
    pub scroll_offset: usize,
    pub records: Vec<HistoryRecord>,
}

/// Top-level application state: the running game plus the screens around it.
pub struct App {
    pub game: GameSession,
    pub state: AppState,
    /// Screen to go back to when leaving history or the config editor.
    pub return_state: AppState,
    pub settings: Settings,
    pub history_view: HistoryViewState,
    pub editor: Option<ConfigEditor>,
    pub last_result: Option<HistoryRecord>,
    pub status: Option<String>,
    /// Time of the latest event or tick; screens render against it.
    pub clock: Instant,
    settings_store: Box<dyn SettingsStore>,
    history_store: Box<dyn HistoryStore>,
}

impl App {
    pub fn new(
        game: GameSession,
        settings: Settings,
        settings_store: Box<dyn SettingsStore>,
        history_store: Box<dyn HistoryStore>,
        now: Instant,
    ) -> Self {
        Self {
            game,
            state: AppState::Playing,
            return_state: AppState::Playing,
            settings,
            history_view: HistoryViewState::default(),
            editor: None,
            last_result: None,
            status: None,
            clock: now,
            settings_store,
            history_store,
        }
    }

    pub fn submit_answer(&mut self, now: Instant) {
        if self.state != AppState::Playing {
            return;
        }
        let events = self.game.submit_answer(now);
        self.apply_events(events);
    }

    pub fn start_new_game(&mut self, now: Instant) {
        match self.game.start_new_game(now) {
            Ok(events) => {
                self.last_result = None;
                self.status = None;
                self.state = AppState::Playing;
                self.apply_events(events);
            }
            Err(e) => {
                log::warn!("could not start a new game: {}", e);
                self.status = Some(e.to_string());
            }
        }
    }

    pub fn open_config_editor(&mut self) {
        self.editor = Some(ConfigEditor::open(self.game.config()));
        self.enter(AppState::ConfigEditor);
    }

    /// Validates and applies the editor's rows. On success the config is
    /// persisted and a new game is dealt; on failure the editor stays open
    /// with the reason and the active config is untouched.
    pub fn save_config(&mut self, now: Instant) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        let rows = editor.rows().to_vec();
        match self.game.save_config(rows.clone()) {
            Ok(()) => {
                self.settings.config_override = Some(rows);
                self.persist_settings();
                self.editor = None;
                self.start_new_game(now);
            }
            Err(e) => editor.error = Some(e.to_string()),
        }
    }

    pub fn reset_config_to_default(&mut self) {
        self.game.reset_config_to_default();
        self.settings.config_override = None;
        self.persist_settings();
        if let Some(editor) = self.editor.as_mut() {
            editor.reset_to_default();
        }
    }

    pub fn view_history(&mut self) {
        self.history_view = match self.history_store.list() {
            Ok(records) => HistoryViewState {
                scroll_offset: 0,
                records,
            },
            Err(e) => {
                log::warn!("could not read history: {}", e);
                HistoryViewState::default()
            }
        };
        self.enter(AppState::History);
    }

    pub fn on_tick(&mut self, now: Instant) -> bool {
        self.clock = now;
        let fired = self.game.tick(now);
        // the clock display and lockout countdown move every tick
        fired || self.state == AppState::Playing
    }

    /// Fires any due timers, then dispatches the event to the current screen.
    pub fn handle_event(&mut self, event: GameEvent, now: Instant) -> Flow {
        self.on_tick(now);
        match event {
            GameEvent::Tick | GameEvent::Resize => Flow::Continue,
            GameEvent::Mouse(mouse) => {
                self.on_mouse(mouse, now);
                Flow::Continue
            }
            GameEvent::Key(key) => self.on_key(key, now),
        }
    }

    fn enter(&mut self, state: AppState) {
        if matches!(self.state, AppState::Playing | AppState::Results) {
            self.return_state = self.state;
        }
        self.state = state;
    }

    fn leave(&mut self) {
        self.editor = None;
        self.state = self.return_state;
    }

    fn persist_settings(&self) {
        if let Err(e) = self.settings_store.save(&self.settings) {
            log::warn!("could not save settings: {}", e);
        }
    }

    fn apply_events(&mut self, events: Vec<SessionEvent>) {
        for event in events {
            match event {
                SessionEvent::StepSolved {
                    value,
                    duration_label,
                    ..
                } => {
                    self.status = Some(format!("{} is right! ({})", value, duration_label));
                }
                SessionEvent::WrongAnswer { .. } => {
                    self.status = Some(format!(
                        "Not quite. Try again in {}.",
                        format_duration(self.game.options().lockout)
                    ));
                }
                SessionEvent::GameFinished(record) => {
                    if let Err(e) = self.history_store.append(&record) {
                        log::warn!("could not save game history: {}", e);
                    }
                    self.last_result = Some(record);
                    self.status = None;
                    self.state = AppState::Results;
                }
            }
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        if self.state != AppState::Playing {
            return;
        }
        let roller = self.game.roller_mut();
        let y = mouse.row as f64;
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => roller.begin_drag(y),
            MouseEventKind::Drag(MouseButton::Left) => roller.drag_to(y),
            MouseEventKind::Up(MouseButton::Left) => {
                roller.end_drag();
            }
            MouseEventKind::ScrollDown => {
                roller.scroll(1.0);
            }
            MouseEventKind::ScrollUp => {
                roller.scroll(-1.0);
            }
            MouseEventKind::Down(MouseButton::Right) => self.submit_answer(now),
            _ => {}
        }
    }

    fn on_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match self.state {
            AppState::Playing => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
                KeyCode::Up | KeyCode::Char('k') => {
                    self.game.roller_mut().scroll(-1.0);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.game.roller_mut().scroll(1.0);
                }
                KeyCode::PageUp => {
                    self.game.roller_mut().scroll(-10.0);
                }
                KeyCode::PageDown => {
                    self.game.roller_mut().scroll(10.0);
                }
                KeyCode::Enter | KeyCode::Char(' ') => self.submit_answer(now),
                KeyCode::Char('n') => self.start_new_game(now),
                KeyCode::Char('h') => self.view_history(),
                KeyCode::Char('c') => self.open_config_editor(),
                _ => {}
            },
            AppState::Results => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
                KeyCode::Enter | KeyCode::Char('n') => self.start_new_game(now),
                KeyCode::Char('h') => self.view_history(),
                KeyCode::Char('c') => self.open_config_editor(),
                _ => {}
            },
            AppState::History => match key.code {
                KeyCode::Esc | KeyCode::Char('b') | KeyCode::Backspace => self.leave(),
                KeyCode::Up | KeyCode::Char('k') => {
                    self.history_view.scroll_offset = self.history_view.scroll_offset.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    // clamped against the visible height when rendering
                    self.history_view.scroll_offset += 1;
                }
                KeyCode::Home => self.history_view.scroll_offset = 0,
                _ => {}
            },
            AppState::ConfigEditor => self.on_editor_key(key, now),
        }
        Flow::Continue
    }

    fn on_editor_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Esc => {
                self.leave();
                return;
            }
            KeyCode::Char('s') => {
                self.save_config(now);
                return;
            }
            KeyCode::Char('r') => {
                self.reset_config_to_default();
                return;
            }
            _ => {}
        }

        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => editor.select_up(),
            KeyCode::Down | KeyCode::Char('j') => editor.select_down(),
            KeyCode::Left | KeyCode::BackTab => editor.prev_field(),
            KeyCode::Right | KeyCode::Tab => editor.next_field(),
            KeyCode::Char('+') | KeyCode::Char('=') => editor.adjust(1),
            KeyCode::Char('-') => editor.adjust(-1),
            KeyCode::PageUp => editor.adjust(10),
            KeyCode::PageDown => editor.adjust(-10),
            KeyCode::Char('o') | KeyCode::Enter => {
                editor.selected_field = EditorField::Operator;
                editor.adjust(1);
            }
            KeyCode::Char('a') => editor.add_row(),
            KeyCode::Char('d') => editor.remove_row(),
            _ => {}
        }
    }
}
