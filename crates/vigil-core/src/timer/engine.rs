//! Pomodoro engine implementation.
//!
//! The engine is a tick-driven state machine. It holds no timers or threads;
//! the caller invokes [`PomodoroEngine::tick`] once per time unit (nominally
//! one second) with the presence/focus booleans from an external detector.
//! Skipped or delayed ticks are not compensated for.
//!
//! ## State transitions
//!
//! ```text
//! NotStarted -> Running -> (Paused | PausedAway) -> Running
//! Running -> Completed -> (immediately) next session Running
//! any -> stop() -> NotStarted (session discarded)
//! ```
//!
//! During a work session only present ticks advance the countdown; away
//! ticks accumulate away time and leave the countdown untouched. Break
//! sessions run down on every tick regardless of presence.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::presence::PresenceMonitor;
use crate::error::EngineError;
use crate::events::Event;
use crate::session::{DailyGoal, Session, SessionState, SessionStatistics, SessionType};
use crate::storage::TimerConfig;

/// Core Pomodoro state machine.
///
/// Not internally thread-safe: all mutating calls must be serialized by the
/// caller. Every method is synchronous and does no I/O.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PomodoroEngine {
    /// Durations in seconds.
    work_duration: u32,
    short_break_duration: u32,
    long_break_duration: u32,
    sessions_until_long_break: u32,

    current: Option<Session>,
    /// May transiently go negative by one tick before completion clamps it.
    time_remaining: i64,
    /// Work sessions completed since construction; drives break alternation.
    session_count: u32,

    // Process-lifetime accumulators.
    total_focus_time: u64,
    total_break_time: u64,
    total_away_time: u64,

    // Per-session counters, reset at each work-session start.
    session_focus_time: u32,
    session_away_time: u32,
    distraction_count: u32,

    #[serde(default)]
    presence: PresenceMonitor,
    daily_goal: DailyGoal,
}

impl PomodoroEngine {
    /// Build an engine from a validated timer configuration.
    ///
    /// # Errors
    /// Returns an error if any duration is zero.
    pub fn new(config: &TimerConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let work_duration = config.work_duration.saturating_mul(60);
        Ok(Self {
            work_duration,
            short_break_duration: config.short_break_duration.saturating_mul(60),
            long_break_duration: config.long_break_duration.saturating_mul(60),
            sessions_until_long_break: config.sessions_until_long_break,
            current: None,
            time_remaining: i64::from(work_duration),
            session_count: 0,
            total_focus_time: 0,
            total_break_time: 0,
            total_away_time: 0,
            session_focus_time: 0,
            session_away_time: 0,
            distraction_count: 0,
            presence: PresenceMonitor::new(),
            daily_goal: DailyGoal::new(config.daily_goal),
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a new work session, replacing whatever was current.
    pub fn start_work_session(&mut self) -> Event {
        let mut session = Session::new(SessionType::Work, self.work_duration);
        session.start();
        self.time_remaining = i64::from(self.work_duration);
        self.session_focus_time = 0;
        self.session_away_time = 0;
        self.distraction_count = 0;
        self.presence.reset();
        self.current = Some(session);

        info!("work session started");
        Event::state_changed(SessionState::Running)
    }

    /// Start a break session. The break is long when the completed work
    /// session count is a positive multiple of `sessions_until_long_break`.
    pub fn start_break_session(&mut self) -> Event {
        let is_long = self.session_count > 0
            && self.session_count % self.sessions_until_long_break == 0;
        let (session_type, duration) = if is_long {
            (SessionType::LongBreak, self.long_break_duration)
        } else {
            (SessionType::ShortBreak, self.short_break_duration)
        };

        let mut session = Session::new(session_type, duration);
        session.start();
        self.time_remaining = i64::from(duration);
        self.current = Some(session);

        info!(break_type = session_type.as_str(), "break session started");
        Event::state_changed(SessionState::Running)
    }

    /// Pause the current session. No-op unless a session is running.
    pub fn pause(&mut self, is_away: bool) -> Option<Event> {
        let session = self.current.as_mut()?;
        if session.state != SessionState::Running {
            return None;
        }
        session.pause(is_away);
        info!(away = is_away, "session paused");
        Some(Event::state_changed(session.state))
    }

    /// Resume a paused session. No-op unless paused (either cause).
    pub fn resume(&mut self) -> Option<Event> {
        let session = self.current.as_mut()?;
        if !matches!(
            session.state,
            SessionState::Paused | SessionState::PausedAway
        ) {
            return None;
        }
        session.resume();
        info!("session resumed");
        Some(Event::state_changed(SessionState::Running))
    }

    /// Discard the current session without completing it. No statistics are
    /// recorded; the countdown resets to a full work duration.
    pub fn stop(&mut self) -> Option<Event> {
        self.current.take()?;
        self.time_remaining = i64::from(self.work_duration);
        info!("session stopped");
        Some(Event::state_changed(SessionState::NotStarted))
    }

    /// Advance the engine by one time unit.
    ///
    /// `present` gates accumulation during work sessions; `focused` is
    /// recorded for external reporting but never weighted. Returns the
    /// events produced this tick -- empty when no session is running.
    pub fn tick(&mut self, present: bool, focused: bool) -> Vec<Event> {
        let Some((session_type, state)) = self.current.as_ref().map(|s| (s.session_type, s.state))
        else {
            return Vec::new();
        };
        if state != SessionState::Running {
            return Vec::new();
        }

        let mut events = Vec::new();

        if session_type.is_work() {
            if present {
                self.time_remaining -= 1;
                self.total_focus_time += 1;
                self.session_focus_time += 1;
                self.presence.observe_present(focused);
            } else {
                // Away: the countdown holds, only away time accrues.
                self.total_away_time += 1;
                self.session_away_time += 1;
                if self.presence.observe_absent() {
                    self.distraction_count += 1;
                    debug!(
                        distractions = self.distraction_count,
                        "distraction recorded"
                    );
                }
            }
        } else {
            // Breaks run down on wall-clock time regardless of presence.
            self.time_remaining -= 1;
            self.total_break_time += 1;
        }

        if self.time_remaining <= 0 {
            self.complete_current(&mut events);
        }

        events.push(Event::tick(self.time_remaining()));
        events
    }

    /// Complete the current session, hand it off, and chain straight into
    /// the next one within the same tick.
    fn complete_current(&mut self, events: &mut Vec<Event>) {
        let Some(mut session) = self.current.take() else {
            return;
        };

        let statistics = SessionStatistics::from_counters(
            session.planned_duration,
            self.session_focus_time,
            self.session_away_time,
            self.distraction_count,
        );
        session.complete(statistics);

        let was_work = session.session_type.is_work();
        info!(
            session_type = session.session_type.as_str(),
            focus_score = session
                .statistics
                .as_ref()
                .map(SessionStatistics::focus_score),
            "session completed"
        );
        events.push(Event::session_completed(session));

        if was_work {
            self.session_count += 1;
            self.daily_goal.reset_if_new_day();
            self.daily_goal.increment();
            events.push(self.start_break_session());
        } else {
            events.push(self.start_work_session());
        }
    }

    /// Update session durations (minutes). Fails while a session is running;
    /// the long break duration is retained when `long_break_min` is `None`.
    pub fn set_durations(
        &mut self,
        work_min: u32,
        short_break_min: u32,
        long_break_min: Option<u32>,
    ) -> Result<(), EngineError> {
        if self
            .current
            .as_ref()
            .is_some_and(|s| s.state == SessionState::Running)
        {
            warn!("cannot change durations while a session is running");
            return Err(EngineError::SessionRunning);
        }
        if work_min == 0 {
            return Err(EngineError::InvalidDuration { field: "work" });
        }
        if short_break_min == 0 {
            return Err(EngineError::InvalidDuration {
                field: "short_break",
            });
        }
        if long_break_min == Some(0) {
            return Err(EngineError::InvalidDuration { field: "long_break" });
        }

        self.work_duration = work_min.saturating_mul(60);
        self.short_break_duration = short_break_min.saturating_mul(60);
        if let Some(long) = long_break_min {
            self.long_break_duration = long.saturating_mul(60);
        }
        if self.current.is_none() {
            self.time_remaining = i64::from(self.work_duration);
        }
        info!(
            work_min,
            short_break_min, long_break_min, "durations updated"
        );
        Ok(())
    }

    pub fn set_daily_goal(&mut self, target_sessions: u32) {
        self.daily_goal.target_sessions = target_sessions;
        info!(target_sessions, "daily goal updated");
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.current
            .as_ref()
            .map_or(SessionState::NotStarted, |s| s.state)
    }

    pub fn session_type(&self) -> Option<SessionType> {
        self.current.as_ref().map(|s| s.session_type)
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Remaining seconds in the current session, clamped to zero.
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining.max(0) as u32
    }

    /// Remaining time formatted as `MM:SS`.
    pub fn time_display(&self) -> String {
        let remaining = self.time_remaining();
        format!("{:02}:{:02}", remaining / 60, remaining % 60)
    }

    /// Progress through the current session, 0-100. Zero with no session.
    pub fn progress_percentage(&self) -> u8 {
        let Some(session) = self.current.as_ref() else {
            return 0;
        };
        if session.planned_duration == 0 {
            return 0;
        }
        let elapsed = session.planned_duration - self.time_remaining().min(session.planned_duration);
        (u64::from(elapsed) * 100 / u64::from(session.planned_duration)) as u8
    }

    /// Overall focus score across the engine's lifetime, 0-100. Reads 100
    /// when no work time has been observed yet.
    pub fn focus_score(&self) -> u8 {
        let total = self.total_focus_time + self.total_away_time;
        if total == 0 {
            return 100;
        }
        let pct = self.total_focus_time as f64 / total as f64 * 100.0;
        pct.min(100.0) as u8
    }

    pub fn daily_goal(&self) -> &DailyGoal {
        &self.daily_goal
    }

    pub fn session_count(&self) -> u32 {
        self.session_count
    }

    pub fn distraction_count(&self) -> u32 {
        self.distraction_count
    }

    pub fn total_focus_time(&self) -> u64 {
        self.total_focus_time
    }

    pub fn total_break_time(&self) -> u64 {
        self.total_break_time
    }

    pub fn total_away_time(&self) -> u64 {
        self.total_away_time
    }

    /// Whether the detector reported the stronger "focused" evidence on the
    /// last observed tick. Reporting only; never affects accumulation.
    pub fn last_focused(&self) -> bool {
        self.presence.last_focused()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_config() -> TimerConfig {
        TimerConfig {
            work_duration: 25,
            short_break_duration: 5,
            long_break_duration: 15,
            sessions_until_long_break: 4,
            daily_goal: 8,
        }
    }

    fn engine() -> PomodoroEngine {
        PomodoroEngine::new(&test_config()).unwrap()
    }

    /// Engine with second-granularity durations for fast completion tests.
    fn tiny_engine(work_secs: u32, short_secs: u32, long_secs: u32) -> PomodoroEngine {
        let mut engine = engine();
        engine.work_duration = work_secs;
        engine.short_break_duration = short_secs;
        engine.long_break_duration = long_secs;
        engine.time_remaining = i64::from(work_secs);
        engine
    }

    #[test]
    fn rejects_zero_durations() {
        let mut config = test_config();
        config.work_duration = 0;
        assert!(PomodoroEngine::new(&config).is_err());
    }

    #[test]
    fn start_pause_resume_stop() {
        let mut engine = engine();
        assert_eq!(engine.state(), SessionState::NotStarted);

        engine.start_work_session();
        assert_eq!(engine.state(), SessionState::Running);
        assert_eq!(engine.time_remaining(), 25 * 60);

        assert!(engine.pause(false).is_some());
        assert_eq!(engine.state(), SessionState::Paused);
        // Pausing a paused session is a tolerated no-op.
        assert!(engine.pause(true).is_none());

        assert!(engine.resume().is_some());
        assert_eq!(engine.state(), SessionState::Running);
        assert!(engine.resume().is_none());

        assert!(engine.pause(true).is_some());
        assert_eq!(engine.state(), SessionState::PausedAway);
        assert!(engine.resume().is_some());

        assert!(engine.stop().is_some());
        assert_eq!(engine.state(), SessionState::NotStarted);
        assert_eq!(engine.time_remaining(), 25 * 60);
        assert!(engine.stop().is_none());
    }

    #[test]
    fn tick_is_noop_without_running_session() {
        let mut engine = engine();
        assert!(engine.tick(true, true).is_empty());
        engine.start_work_session();
        engine.pause(false);
        assert!(engine.tick(true, true).is_empty());
        assert_eq!(engine.time_remaining(), 25 * 60);
    }

    #[test]
    fn present_ticks_decrement_absent_ticks_hold() {
        let mut engine = engine();
        engine.start_work_session();

        engine.tick(true, true);
        engine.tick(true, false);
        assert_eq!(engine.time_remaining(), 25 * 60 - 2);
        assert_eq!(engine.total_focus_time(), 2);

        engine.tick(false, false);
        assert_eq!(engine.time_remaining(), 25 * 60 - 2);
        assert_eq!(engine.total_away_time(), 1);
    }

    #[test]
    fn breaks_run_down_regardless_of_presence() {
        let mut engine = tiny_engine(1, 10, 20);
        engine.start_work_session();
        engine.tick(true, false);
        assert_eq!(engine.session_type(), Some(SessionType::ShortBreak));

        engine.tick(false, false);
        engine.tick(true, false);
        assert_eq!(engine.time_remaining(), 8);
        assert_eq!(engine.total_break_time(), 2);
        // Absence during a break never counts as away time.
        assert_eq!(engine.total_away_time(), 0);
    }

    #[test]
    fn distraction_debounce_pattern() {
        // Pattern [present, present, absent, absent, absent, present,
        // present] against a 5 second work session.
        let mut engine = tiny_engine(5, 10, 20);
        engine.start_work_session();

        for present in [true, true, false, false, false, true, true] {
            engine.tick(present, false);
        }

        assert_eq!(engine.time_remaining(), 1);
        assert_eq!(engine.state(), SessionState::Running);
        assert_eq!(engine.distraction_count(), 1);
        assert_eq!(engine.total_away_time(), 3);
    }

    #[test]
    fn distraction_requires_fresh_streak_after_presence() {
        let mut engine = tiny_engine(600, 10, 20);
        engine.start_work_session();

        for _ in 0..5 {
            engine.tick(false, false);
        }
        assert_eq!(engine.distraction_count(), 1);

        engine.tick(true, false);
        engine.tick(false, false);
        engine.tick(false, false);
        assert_eq!(engine.distraction_count(), 1);
        engine.tick(false, false);
        assert_eq!(engine.distraction_count(), 2);
    }

    #[test]
    fn completion_chains_into_break_within_one_tick() {
        let mut engine = tiny_engine(1, 10, 20);
        engine.start_work_session();

        let events = engine.tick(true, true);

        let completed = events.iter().find_map(|e| match e {
            Event::SessionCompleted { session, .. } => Some(session),
            _ => None,
        });
        let session = completed.expect("completion event");
        assert_eq!(session.session_type, SessionType::Work);
        let stats = session.statistics.as_ref().unwrap();
        assert_eq!(stats.focus_time, 1);
        assert_eq!(stats.away_time, 0);
        assert_eq!(stats.focus_percentage, 100.0);

        assert_eq!(engine.session_type(), Some(SessionType::ShortBreak));
        assert_eq!(engine.state(), SessionState::Running);
        assert_eq!(engine.time_remaining(), 10);

        // The tick event still fires, reporting the next session's clock.
        assert!(matches!(
            events.last(),
            Some(Event::Tick {
                remaining_secs: 10,
                ..
            })
        ));
    }

    #[test]
    fn break_completion_chains_into_work() {
        let mut engine = tiny_engine(1, 1, 20);
        engine.start_work_session();
        engine.tick(true, false);
        assert_eq!(engine.session_type(), Some(SessionType::ShortBreak));

        let events = engine.tick(false, false);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::SessionCompleted { session, .. }
                if session.session_type == SessionType::ShortBreak)));
        assert_eq!(engine.session_type(), Some(SessionType::Work));
        assert_eq!(engine.time_remaining(), 1);
    }

    #[test]
    fn long_break_every_fourth_work_session() {
        let mut engine = tiny_engine(1, 1, 2);

        let mut break_types = Vec::new();
        engine.start_work_session();
        for _ in 0..8 {
            // Finish the work session.
            engine.tick(true, false);
            break_types.push(engine.session_type().unwrap());
            // Finish the break (long breaks take two ticks).
            while engine.session_type() != Some(SessionType::Work) {
                engine.tick(false, false);
            }
        }

        assert_eq!(
            break_types,
            vec![
                SessionType::ShortBreak,
                SessionType::ShortBreak,
                SessionType::ShortBreak,
                SessionType::LongBreak,
                SessionType::ShortBreak,
                SessionType::ShortBreak,
                SessionType::ShortBreak,
                SessionType::LongBreak,
            ]
        );
        assert_eq!(engine.session_count(), 8);
    }

    #[test]
    fn work_completion_increments_daily_goal() {
        let mut engine = tiny_engine(1, 1, 2);
        engine.start_work_session();
        engine.tick(true, false);
        assert_eq!(engine.daily_goal().completed_sessions, 1);
    }

    #[test]
    fn set_durations_fails_while_running() {
        let mut engine = engine();
        engine.start_work_session();
        assert_eq!(
            engine.set_durations(30, 10, None),
            Err(EngineError::SessionRunning)
        );
        // Unchanged.
        assert_eq!(engine.time_remaining(), 25 * 60);

        engine.pause(false);
        assert!(engine.set_durations(30, 10, Some(20)).is_ok());
        // A current (paused) session exists, so the countdown is untouched.
        assert_eq!(engine.time_remaining(), 25 * 60);

        engine.stop();
        assert!(engine.set_durations(50, 10, None).is_ok());
        assert_eq!(engine.time_remaining(), 50 * 60);
    }

    #[test]
    fn set_durations_rejects_zero() {
        let mut engine = engine();
        assert!(engine.set_durations(0, 5, None).is_err());
        assert!(engine.set_durations(25, 0, None).is_err());
        assert!(engine.set_durations(25, 5, Some(0)).is_err());
    }

    #[test]
    fn focus_score_defaults_to_100() {
        let engine = engine();
        assert_eq!(engine.focus_score(), 100);
    }

    #[test]
    fn focus_score_reflects_totals() {
        let mut engine = tiny_engine(600, 10, 20);
        engine.start_work_session();
        for _ in 0..3 {
            engine.tick(true, false);
        }
        engine.tick(false, false);
        // 3 focus, 1 away -> 75.
        assert_eq!(engine.focus_score(), 75);
    }

    #[test]
    fn progress_and_display() {
        let mut engine = tiny_engine(100, 10, 20);
        assert_eq!(engine.progress_percentage(), 0);
        engine.start_work_session();
        for _ in 0..25 {
            engine.tick(true, false);
        }
        assert_eq!(engine.progress_percentage(), 25);
        assert_eq!(engine.time_display(), "01:15");
    }

    #[test]
    fn focused_flag_does_not_change_accumulation() {
        let mut a = tiny_engine(100, 10, 20);
        let mut b = tiny_engine(100, 10, 20);
        a.start_work_session();
        b.start_work_session();
        for _ in 0..10 {
            a.tick(true, true);
            b.tick(true, false);
        }
        assert_eq!(a.time_remaining(), b.time_remaining());
        assert_eq!(a.total_focus_time(), b.total_focus_time());
        assert!(a.last_focused());
        assert!(!b.last_focused());
    }

    #[test]
    fn engine_snapshot_round_trip() {
        let mut engine = engine();
        engine.start_work_session();
        engine.tick(true, true);
        engine.tick(false, false);

        let json = serde_json::to_string(&engine).unwrap();
        let back: PomodoroEngine = serde_json::from_str(&json).unwrap();
        assert_eq!(back.time_remaining(), engine.time_remaining());
        assert_eq!(back.state(), SessionState::Running);
        assert_eq!(back.total_away_time(), 1);
    }

    proptest! {
        /// During a single work session the countdown drops by exactly the
        /// number of present ticks, and focus/away totals partition the
        /// ticks, for any presence sequence short of completion.
        #[test]
        fn work_tick_accounting(pattern in proptest::collection::vec(any::<bool>(), 0..200)) {
            let mut engine = tiny_engine(1000, 10, 20);
            engine.start_work_session();

            let mut expected_focus = 0u64;
            let mut expected_away = 0u64;
            for &present in &pattern {
                engine.tick(present, false);
                if present {
                    expected_focus += 1;
                } else {
                    expected_away += 1;
                }
            }

            prop_assert_eq!(engine.total_focus_time(), expected_focus);
            prop_assert_eq!(engine.total_away_time(), expected_away);
            prop_assert_eq!(
                u64::from(engine.time_remaining()),
                1000 - expected_focus
            );
        }
    }
}
