use std::sync::mpsc;
use std::time::{Duration, Instant};

use arcmath::app::{App, AppState, Flow};
use arcmath::config::{FileSettingsStore, GameConfig, Settings};
use arcmath::equation::ScriptedSource;
use arcmath::game::{GameOptions, GameSession};
use arcmath::history::SqliteHistoryStore;
use arcmath::runtime::{FixedTicker, GameEvent, Runner, TestEventSource};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// Headless integration using the internal runtime + App without a TTY.
// Time is virtual: every event moves the clock forward by `step`.

fn scenario_app(now: Instant, dir: &tempfile::TempDir) -> App {
    let game = GameSession::new(
        GameConfig::default(),
        GameOptions::default(),
        Box::new(ScriptedSource::new([10, 15, 7])),
        now,
    )
    .unwrap();
    App::new(
        game,
        Settings {
            player_name: "Ada".into(),
            config_override: None,
        },
        Box::new(FileSettingsStore::with_path(dir.path().join("settings.json"))),
        Box::new(SqliteHistoryStore::open(dir.path().join("history.db")).unwrap()),
        now,
    )
}

fn key(code: KeyCode) -> GameEvent {
    GameEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn dial_and_submit(value: usize) -> Vec<GameEvent> {
    let mut events = vec![key(KeyCode::Down); value];
    events.push(key(KeyCode::Enter));
    events
}

/// Feeds `events` through a Runner, then a few idle ticks. Returns the final
/// virtual time and whether the app asked to quit.
fn drive(app: &mut App, events: Vec<GameEvent>, start: Instant, step: Duration) -> (Instant, Flow) {
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(TestEventSource::new(rx), FixedTicker::new(Duration::from_millis(2)));

    let count = events.len() + 3;
    for event in events {
        tx.send(event).unwrap();
    }

    let mut now = start;
    for _ in 0..count {
        now += step;
        if app.handle_event(runner.step(), now) == Flow::Quit {
            return (now, Flow::Quit);
        }
    }
    (now, Flow::Continue)
}

#[test]
fn headless_game_completes_and_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let t0 = Instant::now();
    let mut app = scenario_app(t0, &dir);

    let (now, flow) = drive(&mut app, dial_and_submit(25), t0, Duration::from_millis(100));
    assert_eq!(flow, Flow::Continue);
    assert_eq!(app.game.session().current_index(), Some(1));
    assert_eq!(app.game.roller().value(), 0, "roller resets for the next step");

    let (_, flow) = drive(&mut app, dial_and_submit(18), now, Duration::from_millis(100));
    assert_eq!(flow, Flow::Continue);
    assert_eq!(app.state, AppState::Results);
    assert_eq!(app.game.session().score().value(), 5.0);

    let record = app.last_result.clone().unwrap();
    assert_eq!(record.equation_text, "10 + 15 - 7 = 18");
    assert_eq!(record.steps.len(), 2);
    assert_eq!(record.total_wrong(), 0);
    assert_eq!(app.settings.congratulation(), "Well done, Ada! All steps solved!");

    // history screen reads back from the store
    drive(&mut app, vec![key(KeyCode::Char('h'))], t0, Duration::from_millis(1));
    assert_eq!(app.state, AppState::History);
    assert_eq!(app.history_view.records, vec![record]);
}

#[test]
fn headless_lockout_blocks_until_cooldown() {
    let dir = tempfile::tempdir().unwrap();
    let t0 = Instant::now();
    let mut app = scenario_app(t0, &dir);

    // wrong answer, then the right one dialled in quickly
    let mut events = dial_and_submit(24);
    events.push(key(KeyCode::Down));
    events.push(key(KeyCode::Enter));
    let (now, _) = drive(&mut app, events, t0, Duration::from_millis(10));

    assert!(app.game.session().is_locked_out());
    assert_eq!(app.game.session().current_index(), Some(0));
    assert_eq!(app.game.session().steps()[0].wrong_count, 1);
    assert_eq!(app.game.session().score().value(), 4.5);
    assert_eq!(app.game.roller().value(), 25);

    // after the cooldown the same value goes through
    let (_, _) = drive(&mut app, vec![key(KeyCode::Enter)], now + Duration::from_secs(10), Duration::from_millis(10));
    assert!(!app.game.session().is_locked_out());
    assert_eq!(app.game.session().current_index(), Some(1));
    assert_eq!(app.game.session().score().value(), 4.5);
}

#[test]
fn headless_new_game_resets_everything() {
    let dir = tempfile::tempdir().unwrap();
    let t0 = Instant::now();
    let mut app = scenario_app(t0, &dir);

    let (now, _) = drive(&mut app, dial_and_submit(3), t0, Duration::from_millis(10));
    assert!(app.game.session().is_locked_out());

    drive(&mut app, vec![key(KeyCode::Char('n'))], now, Duration::from_millis(10));
    assert_eq!(app.state, AppState::Playing);
    assert!(!app.game.session().is_locked_out());
    assert_eq!(app.game.session().score().value(), 5.0);
    assert_eq!(app.game.session().current_index(), Some(0));
    assert_eq!(app.game.roller().value(), 0);
}

#[test]
fn headless_config_editor_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let t0 = Instant::now();
    let mut app = scenario_app(t0, &dir);

    // trimming to two rows is rejected and the editor stays open
    let events = vec![
        key(KeyCode::Char('c')),
        key(KeyCode::Down),
        key(KeyCode::Down),
        key(KeyCode::Char('d')),
        key(KeyCode::Char('s')),
    ];
    let (now, _) = drive(&mut app, events, t0, Duration::from_millis(10));
    assert_eq!(app.state, AppState::ConfigEditor);
    assert!(app.editor.as_ref().unwrap().error.is_some());
    assert_eq!(app.game.config(), &GameConfig::default());

    // re-add a row, make the first one a multiplication and save
    let events = vec![
        key(KeyCode::Char('a')),
        key(KeyCode::Up),
        key(KeyCode::Up),
        key(KeyCode::Char('o')),
        key(KeyCode::Char('o')),
        key(KeyCode::Char('s')),
    ];
    drive(&mut app, events, now, Duration::from_millis(10));
    assert_eq!(app.state, AppState::Playing);
    assert_eq!(app.game.config().rows().len(), 3);
    assert_eq!(app.game.config().rows()[0].operator.to_string(), "*");

    let saved = arcmath::config::SettingsStore::load(&FileSettingsStore::with_path(dir.path().join("settings.json")));
    assert_eq!(saved.config_override.as_deref(), Some(app.game.config().rows()));
}

#[test]
fn headless_quit() {
    let dir = tempfile::tempdir().unwrap();
    let t0 = Instant::now();
    let mut app = scenario_app(t0, &dir);
    let (_, flow) = drive(&mut app, vec![key(KeyCode::Esc)], t0, Duration::from_millis(10));
    assert_eq!(flow, Flow::Quit);
}
