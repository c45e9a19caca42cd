use crate::config::{ConfigRow, GameConfig, MAX_MAGNITUDE};
use crate::equation::{generate, NumberSource};
use crate::error::Result;
use crate::roller::{RollerInput, DEFAULT_ITEM_PITCH};
use crate::runtime::{Scheduler, TimerKind};
use crate::session::{SessionEvent, StepSession};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub struct GameOptions {
    /// How long submission stays locked after a wrong answer.
    pub lockout: Duration,
    /// Pause between a solved step and the next one becoming active.
    pub advance_pause: Duration,
    pub roller_min: i64,
    pub roller_max: i64,
    pub item_pitch: f64,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            lockout: Duration::from_secs(10),
            advance_pause: Duration::from_millis(500),
            roller_min: 0,
            roller_max: 100,
            item_pitch: DEFAULT_ITEM_PITCH,
        }
    }
}

/// Owns everything belonging to the current game: config, equation, step
/// session, roller and pending timers.
#[derive(Debug)]
pub struct GameSession {
    options: GameOptions,
    config: GameConfig,
    source: Box<dyn NumberSource>,
    session: StepSession,
    roller: RollerInput,
    scheduler: Scheduler,
}

impl GameSession {
    /// Builds the session and starts the first game.
    pub fn new(
        config: GameConfig,
        options: GameOptions,
        source: Box<dyn NumberSource>,
        now: Instant,
    ) -> Result<Self> {
        let roller = RollerInput::new(options.roller_min, options.roller_max, options.item_pitch);
        let mut game = Self {
            options,
            config,
            source,
            session: StepSession::new(Vec::new(), Vec::new()),
            roller,
            scheduler: Scheduler::new(),
        };
        game.start_new_game(now)?;
        Ok(game)
    }

    /// Throws away the current game, including any pending timers, and deals
    /// a fresh equation from the active config.
    pub fn start_new_game(&mut self, now: Instant) -> Result<Vec<SessionEvent>> {
        self.scheduler.cancel_all();

        let tokens = generate(self.config.rows(), self.source.as_mut())?;
        let mut session = StepSession::from_tokens(tokens)?;

        // every expected answer must be reachable on the roller
        let (lo, hi) = session.steps().iter().fold(
            (
                self.options.roller_min.clamp(-MAX_MAGNITUDE, MAX_MAGNITUDE),
                self.options.roller_max.clamp(-MAX_MAGNITUDE, MAX_MAGNITUDE),
            ),
            |(lo, hi), step| (lo.min(step.expected_result), hi.max(step.expected_result)),
        );
        self.roller = RollerInput::new(lo, hi, self.options.item_pitch);

        let events = session.start(now);
        self.session = session;
        log::info!("new game with {} steps", self.session.steps().len());
        Ok(events)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn options(&self) -> &GameOptions {
        &self.options
    }

    pub fn session(&self) -> &StepSession {
        &self.session
    }

    pub fn roller(&self) -> &RollerInput {
        &self.roller
    }

    pub fn roller_mut(&mut self) -> &mut RollerInput {
        &mut self.roller
    }

    /// True during the pause after a solved step.
    pub fn is_advancing(&self) -> bool {
        self.scheduler.is_pending(TimerKind::AdvanceStep)
    }

    pub fn lockout_remaining(&self, now: Instant) -> Option<Duration> {
        self.scheduler
            .deadline(TimerKind::ReleaseLockout)
            .map(|due| due.saturating_duration_since(now))
    }

    /// Submits whatever the roller currently shows.
    pub fn submit_answer(&mut self, now: Instant) -> Vec<SessionEvent> {
        if self.roller.is_dragging() {
            self.roller.end_drag();
        }
        let value = self.roller.value();
        self.submit_value(value, now)
    }

    pub fn submit_value(&mut self, value: i64, now: Instant) -> Vec<SessionEvent> {
        if self.is_advancing() {
            return Vec::new();
        }

        let events = self.session.submit(value, now);
        for event in &events {
            match event {
                SessionEvent::StepSolved { .. } => {
                    self.roller.reset();
                    if !self.session.is_finished() {
                        self.scheduler
                            .schedule(TimerKind::AdvanceStep, now + self.options.advance_pause);
                    }
                }
                SessionEvent::WrongAnswer { .. } => {
                    self.scheduler
                        .schedule(TimerKind::ReleaseLockout, now + self.options.lockout);
                }
                SessionEvent::GameFinished(_) => self.scheduler.cancel_all(),
            }
        }
        events
    }

    /// Fires due timers. Returns whether anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let due = self.scheduler.take_due(now);
        for kind in &due {
            match kind {
                TimerKind::ReleaseLockout => self.session.release_lockout(),
                TimerKind::AdvanceStep => self.session.begin_step(now),
            }
        }
        !due.is_empty()
    }

    /// Replaces the active config for the next game. Rejected configs leave the
    /// current one and the running game untouched.
    pub fn save_config(&mut self, rows: Vec<ConfigRow>) -> Result<()> {
        let config = GameConfig::new(rows)?;
        log::info!("config replaced ({} rows)", config.rows().len());
        self.config = config;
        Ok(())
    }

    pub fn reset_config_to_default(&mut self) {
        self.config = GameConfig::default();
    }
}
