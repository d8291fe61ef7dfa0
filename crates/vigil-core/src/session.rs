//! Session data model.
//!
//! A [`Session`] is one work or break interval. It is created by the engine,
//! started, optionally paused/resumed, and finally completed with a
//! [`SessionStatistics`] snapshot attached. After completion the session is
//! immutable and handed off to the history store.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    pub fn is_work(self) -> bool {
        self == SessionType::Work
    }

    /// String tag used in the persisted history format and CSV export.
    pub fn as_str(self) -> &'static str {
        match self {
            SessionType::Work => "work",
            SessionType::ShortBreak => "short_break",
            SessionType::LongBreak => "long_break",
        }
    }
}

/// Session lifecycle state.
///
/// `Paused` is user-initiated; `PausedAway` is system-initiated because the
/// user left. Both resume the same way, but the cause is kept distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NotStarted,
    Running,
    Paused,
    PausedAway,
    Completed,
}

/// Statistics for a completed session. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatistics {
    /// Planned duration of the session in seconds.
    pub total_duration: u32,
    /// Seconds the user was present during the session.
    pub focus_time: u32,
    /// Seconds the user was away during the session.
    pub away_time: u32,
    pub distraction_count: u32,
    /// `focus_time / (focus_time + away_time) * 100`, or 100.0 when no time
    /// was accumulated at all.
    pub focus_percentage: f64,
}

impl SessionStatistics {
    /// Build statistics from the engine's per-session counters.
    pub fn from_counters(
        planned_duration: u32,
        focus_time: u32,
        away_time: u32,
        distraction_count: u32,
    ) -> Self {
        let total = focus_time + away_time;
        let focus_percentage = if total > 0 {
            f64::from(focus_time) / f64::from(total) * 100.0
        } else {
            100.0
        };
        Self {
            total_duration: planned_duration,
            focus_time,
            away_time,
            distraction_count,
            focus_percentage,
        }
    }

    /// Focus score as an integer 0-100.
    pub fn focus_score(&self) -> u8 {
        self.focus_percentage.min(100.0) as u8
    }
}

/// One Pomodoro session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_type: SessionType,
    /// Planned duration in seconds.
    pub planned_duration: u32,
    pub start_time: Option<DateTime<Local>>,
    pub end_time: Option<DateTime<Local>>,
    pub state: SessionState,
    /// Present iff the session completed.
    pub statistics: Option<SessionStatistics>,
}

impl Session {
    pub fn new(session_type: SessionType, planned_duration: u32) -> Self {
        Self {
            session_type,
            planned_duration,
            start_time: None,
            end_time: None,
            state: SessionState::NotStarted,
            statistics: None,
        }
    }

    pub fn start(&mut self) {
        self.start_time = Some(Local::now());
        self.state = SessionState::Running;
    }

    pub fn pause(&mut self, is_away: bool) {
        self.state = if is_away {
            SessionState::PausedAway
        } else {
            SessionState::Paused
        };
    }

    pub fn resume(&mut self) {
        self.state = SessionState::Running;
    }

    pub fn complete(&mut self, statistics: SessionStatistics) {
        self.end_time = Some(Local::now());
        self.state = SessionState::Completed;
        self.statistics = Some(statistics);
    }

    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// Calendar date the session started on, if it was ever started.
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_time.map(|t| t.date_naive())
    }
}

/// Daily goal tracking: target vs. completed work sessions for the current
/// calendar day. The day rollover is checked lazily before incrementing,
/// never by a background timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyGoal {
    pub target_sessions: u32,
    pub completed_sessions: u32,
    /// Date the counter was last reset for.
    pub date: NaiveDate,
}

impl DailyGoal {
    pub fn new(target_sessions: u32) -> Self {
        Self {
            target_sessions,
            completed_sessions: 0,
            date: Local::now().date_naive(),
        }
    }

    pub fn increment(&mut self) {
        self.completed_sessions += 1;
    }

    /// Reset the counter if the wall-clock date has moved past `self.date`.
    pub fn reset_if_new_day(&mut self) {
        self.roll_over_to(Local::now().date_naive());
    }

    /// Reset the counter if `today` differs from the stored date.
    pub fn roll_over_to(&mut self, today: NaiveDate) {
        if self.date != today {
            self.completed_sessions = 0;
            self.date = today;
        }
    }

    /// Progress toward the target, 0-100. A zero target reads as 100.
    pub fn progress_percentage(&self) -> u8 {
        if self.target_sessions == 0 {
            return 100;
        }
        let pct = self.completed_sessions * 100 / self.target_sessions;
        pct.min(100) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.completed_sessions >= self.target_sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn statistics_percentage_exact() {
        let stats = SessionStatistics::from_counters(300, 4, 3, 1);
        assert_eq!(stats.focus_percentage, 4.0 / 7.0 * 100.0);
        assert_eq!(stats.focus_score(), 57);
    }

    #[test]
    fn statistics_with_no_accumulated_time_read_as_full_focus() {
        let stats = SessionStatistics::from_counters(300, 0, 0, 0);
        assert_eq!(stats.focus_percentage, 100.0);
        assert_eq!(stats.focus_score(), 100);
    }

    #[test]
    fn session_lifecycle() {
        let mut session = Session::new(SessionType::Work, 1500);
        assert_eq!(session.state, SessionState::NotStarted);
        assert!(session.start_time.is_none());

        session.start();
        assert_eq!(session.state, SessionState::Running);
        assert!(session.start_time.is_some());

        session.pause(true);
        assert_eq!(session.state, SessionState::PausedAway);
        session.resume();
        assert_eq!(session.state, SessionState::Running);

        session.complete(SessionStatistics::from_counters(1500, 1500, 0, 0));
        assert!(session.is_completed());
        assert!(session.end_time.is_some());
        assert!(session.statistics.is_some());
    }

    #[test]
    fn session_json_round_trip() {
        let mut session = Session::new(SessionType::LongBreak, 900);
        session.start();
        session.complete(SessionStatistics::from_counters(900, 850, 50, 2));

        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
        assert!(json.contains("\"long_break\""));
        assert!(json.contains("\"completed\""));
    }

    #[test]
    fn daily_goal_rolls_over_on_new_day() {
        let mut goal = DailyGoal::new(8);
        goal.increment();
        goal.increment();
        assert_eq!(goal.completed_sessions, 2);

        // Same day: no reset.
        let today = goal.date;
        goal.roll_over_to(today);
        assert_eq!(goal.completed_sessions, 2);

        let tomorrow = today + chrono::Duration::days(1);
        goal.roll_over_to(tomorrow);
        assert_eq!(goal.completed_sessions, 0);
        assert_eq!(goal.date, tomorrow);
    }

    #[test]
    fn daily_goal_progress_caps_at_100() {
        let mut goal = DailyGoal {
            target_sessions: 4,
            completed_sessions: 0,
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        };
        assert_eq!(goal.progress_percentage(), 0);
        goal.completed_sessions = 2;
        assert_eq!(goal.progress_percentage(), 50);
        goal.completed_sessions = 6;
        assert_eq!(goal.progress_percentage(), 100);
        assert!(goal.is_complete());
    }

    #[test]
    fn zero_target_goal_reads_complete() {
        let goal = DailyGoal::new(0);
        assert_eq!(goal.progress_percentage(), 100);
        assert!(goal.is_complete());
    }
}
