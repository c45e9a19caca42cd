use crate::equation::Token;
use crate::error::Result;
use crate::history::{HistoryRecord, StepRecord};
use crate::score::Score;
use crate::steps::{display_text, final_result, plan, step_expression, Step};
use crate::util::format_duration;
use chrono::Local;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Ready,
    AwaitingInput(usize),
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StepSolved {
        index: usize,
        value: i64,
        duration_label: String,
    },
    WrongAnswer {
        index: usize,
        wrong_count: u32,
        score: Score,
    },
    GameFinished(HistoryRecord),
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub running_result: Option<i64>,
    pub score: Score,
    pub step_started_at: Option<Instant>,
    pub session_started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

/// Walks the player through the steps of one equation, strictly in order.
///
/// A wrong answer locks submission until [`StepSession::release_lockout`];
/// any submit while locked, or outside `AwaitingInput`, is ignored.
#[derive(Debug, Clone)]
pub struct StepSession {
    tokens: Vec<Token>,
    steps: Vec<Step>,
    status: SessionStatus,
    state: SessionState,
    locked_out: bool,
}

impl StepSession {
    pub fn new(tokens: Vec<Token>, steps: Vec<Step>) -> Self {
        Self {
            tokens,
            steps,
            status: SessionStatus::Ready,
            state: SessionState::default(),
            locked_out: false,
        }
    }

    pub fn from_tokens(tokens: Vec<Token>) -> Result<Self> {
        let steps = plan(&tokens)?;
        Ok(Self::new(tokens, steps))
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn score(&self) -> Score {
        self.state.score
    }

    pub fn is_locked_out(&self) -> bool {
        self.locked_out
    }

    pub fn is_finished(&self) -> bool {
        self.status == SessionStatus::Finished
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.status {
            SessionStatus::AwaitingInput(idx) => Some(idx),
            _ => None,
        }
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.current_index().and_then(|idx| self.steps.get(idx))
    }

    /// Total play time so far, frozen once finished.
    pub fn elapsed(&self, now: Instant) -> Duration {
        let end = self.state.finished_at.map_or(now, |at| at.min(now));
        self.state
            .session_started_at
            .map(|start| end.saturating_duration_since(start))
            .unwrap_or_default()
    }

    pub fn start(&mut self, now: Instant) -> Vec<SessionEvent> {
        self.state = SessionState {
            session_started_at: Some(now),
            step_started_at: Some(now),
            ..SessionState::default()
        };
        self.locked_out = false;
        if self.steps.is_empty() {
            return vec![self.finish(now)];
        }
        self.status = SessionStatus::AwaitingInput(0);
        log::debug!("session started with {} steps", self.steps.len());
        Vec::new()
    }

    /// Restarts the per-step clock, used when the post-answer pause ends.
    pub fn begin_step(&mut self, now: Instant) {
        if self.current_index().is_some() {
            self.state.step_started_at = Some(now);
        }
    }

    pub fn release_lockout(&mut self) {
        self.locked_out = false;
    }

    pub fn submit(&mut self, value: i64, now: Instant) -> Vec<SessionEvent> {
        let index = match self.status {
            SessionStatus::AwaitingInput(idx) if !self.locked_out => idx,
            _ => return Vec::new(),
        };

        if value != self.steps[index].expected_result {
            let step = &mut self.steps[index];
            step.wrong_count += 1;
            self.state.score.penalize();
            self.locked_out = true;
            log::debug!("step {}: {} is wrong (attempt {})", index, value, step.wrong_count);
            return vec![SessionEvent::WrongAnswer {
                index,
                wrong_count: step.wrong_count,
                score: self.state.score,
            }];
        }

        let started = self.state.step_started_at.unwrap_or(now);
        let duration_label = format_duration(now.saturating_duration_since(started));
        self.steps[index].duration_label = Some(duration_label.clone());
        self.state.running_result = Some(value);
        self.state.step_started_at = Some(now);
        self.locked_out = false;

        let mut events = vec![SessionEvent::StepSolved {
            index,
            value,
            duration_label,
        }];
        if index + 1 == self.steps.len() {
            events.push(self.finish(now));
        } else {
            self.status = SessionStatus::AwaitingInput(index + 1);
        }
        events
    }

    fn finish(&mut self, now: Instant) -> SessionEvent {
        self.status = SessionStatus::Finished;
        self.state.finished_at = Some(now);
        let answer = self
            .state
            .running_result
            .or_else(|| final_result(&self.tokens).ok())
            .unwrap_or_default();

        let steps = (0..self.steps.len())
            .map(|idx| StepRecord {
                expression: step_expression(&self.tokens, &self.steps, idx),
                result: self.steps[idx].expected_result,
                time: self.steps[idx].duration_label.clone().unwrap_or_default(),
                wrong_count: self.steps[idx].wrong_count,
            })
            .collect();

        let record = HistoryRecord {
            timestamp: Local::now(),
            total_time: format_duration(self.elapsed(now)),
            score: self.state.score.value(),
            equation_text: display_text(&self.tokens, answer),
            steps,
        };
        log::info!("game finished: {} in {}", record.equation_text, record.total_time);
        SessionEvent::GameFinished(record)
    }
}
