//! Aggregate statistics over completed sessions.
//!
//! Summaries only look at WORK sessions; breaks carry no focus data. An
//! empty input produces a zero-valued summary rather than an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::session::{Session, SessionStatistics};

/// Statistical summary over a set of work sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    /// Number of work sessions summarized.
    pub total_sessions: u32,
    /// Sum of focus time in seconds.
    pub total_focus_time: u64,
    /// Sum of away time in seconds.
    pub total_away_time: u64,
    pub total_distractions: u32,
    /// Mean of per-session focus scores.
    pub average_focus_score: f64,
    pub best_session_score: u8,
    pub worst_session_score: u8,
    pub focus_time_hours: f64,
    pub focus_time_minutes: f64,
}

/// One day's summary for trend displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStatistics {
    pub date: NaiveDate,
    /// Weekday name, e.g. "Monday".
    pub day_name: String,
    pub summary: StatisticsSummary,
}

/// Week-over-day productivity comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductivityTrends {
    pub week_summary: StatisticsSummary,
    pub today_summary: StatisticsSummary,
    pub daily_average_sessions: f64,
    pub daily_average_focus_minutes: f64,
    /// Today's session count relative to the weekly daily average; zero
    /// when there is no average to compare against.
    pub today_vs_average: f64,
}

/// Summarize the work sessions among `sessions`.
pub fn summarize<'a, I>(sessions: I) -> StatisticsSummary
where
    I: IntoIterator<Item = &'a Session>,
{
    let work_stats: Vec<&SessionStatistics> = sessions
        .into_iter()
        .filter(|s| s.session_type.is_work())
        .filter_map(|s| s.statistics.as_ref())
        .collect();

    if work_stats.is_empty() {
        return StatisticsSummary::default();
    }

    let total_focus_time: u64 = work_stats.iter().map(|s| u64::from(s.focus_time)).sum();
    let total_away_time: u64 = work_stats.iter().map(|s| u64::from(s.away_time)).sum();
    let total_distractions: u32 = work_stats.iter().map(|s| s.distraction_count).sum();
    let scores: Vec<u8> = work_stats.iter().map(|s| s.focus_score()).collect();
    let score_sum: u64 = scores.iter().map(|&s| u64::from(s)).sum();

    StatisticsSummary {
        total_sessions: work_stats.len() as u32,
        total_focus_time,
        total_away_time,
        total_distractions,
        average_focus_score: score_sum as f64 / scores.len() as f64,
        best_session_score: scores.iter().copied().max().unwrap_or(0),
        worst_session_score: scores.iter().copied().min().unwrap_or(0),
        focus_time_hours: total_focus_time as f64 / 3600.0,
        focus_time_minutes: total_focus_time as f64 / 60.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionStatistics, SessionType};

    fn work_session(focus: u32, away: u32, distractions: u32) -> Session {
        let mut session = Session::new(SessionType::Work, focus + away);
        session.start();
        session.complete(SessionStatistics::from_counters(
            focus + away,
            focus,
            away,
            distractions,
        ));
        session
    }

    #[test]
    fn empty_input_yields_zero_summary() {
        let summary = summarize([]);
        assert_eq!(summary, StatisticsSummary::default());
    }

    #[test]
    fn breaks_are_excluded() {
        let mut brk = Session::new(SessionType::ShortBreak, 300);
        brk.start();
        brk.complete(SessionStatistics::from_counters(300, 0, 0, 0));
        let sessions = vec![brk, work_session(100, 0, 0)];
        let summary = summarize(&sessions);
        assert_eq!(summary.total_sessions, 1);
        assert_eq!(summary.total_focus_time, 100);
    }

    #[test]
    fn aggregates_across_sessions() {
        let sessions = vec![
            work_session(90, 10, 1), // score 90
            work_session(50, 50, 3), // score 50
            work_session(70, 30, 2), // score 70
        ];
        let summary = summarize(&sessions);
        assert_eq!(summary.total_sessions, 3);
        assert_eq!(summary.total_focus_time, 210);
        assert_eq!(summary.total_away_time, 90);
        assert_eq!(summary.total_distractions, 6);
        assert_eq!(summary.average_focus_score, 70.0);
        assert_eq!(summary.best_session_score, 90);
        assert_eq!(summary.worst_session_score, 50);
        assert_eq!(summary.focus_time_minutes, 3.5);
    }
}
