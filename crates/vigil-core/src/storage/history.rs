//! Session history persistence and queries.
//!
//! Completed sessions are kept as an append-only in-memory list backed by a
//! JSON document on disk. Every `add_session` writes through immediately;
//! the write goes to a temp file first and is renamed into place so a
//! concurrent reader never observes a partial file.
//!
//! A missing file is not an error (fresh start), and a malformed file is
//! logged and replaced by an empty collection -- disk state never takes
//! down the session-tracking core.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::HistoryError;
use crate::session::Session;
use crate::stats::{self, DailyStatistics, ProductivityTrends, StatisticsSummary};

/// On-disk document: the session list plus bookkeeping fields.
#[derive(Debug, Serialize, Deserialize)]
struct HistoryFile {
    #[serde(default)]
    sessions: Vec<Session>,
    last_updated: Option<DateTime<Local>>,
    #[serde(default)]
    total_sessions: usize,
}

/// Durable store of completed sessions.
pub struct HistoryStore {
    path: PathBuf,
    sessions: Vec<Session>,
}

impl HistoryStore {
    /// Open the store at `path`, loading any existing history. A missing or
    /// unreadable file starts the store empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let sessions = match Self::load(&path) {
            Ok(sessions) => {
                info!(count = sessions.len(), "loaded session history");
                sessions
            }
            Err(HistoryError::ReadFailed { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                info!("no history file found, starting fresh");
                Vec::new()
            }
            Err(e) => {
                error!(error = %e, "failed to load history, starting empty");
                Vec::new()
            }
        };
        Self { path, sessions }
    }

    /// Open the store at its default location in the data directory.
    pub fn open_default() -> Result<Self, std::io::Error> {
        Ok(Self::open(super::data_dir()?.join("focus_history.json")))
    }

    fn load(path: &Path) -> Result<Vec<Session>, HistoryError> {
        let content = fs::read_to_string(path).map_err(|source| HistoryError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let file: HistoryFile =
            serde_json::from_str(&content).map_err(|source| HistoryError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(file.sessions)
    }

    /// Persist the full collection. Writes to a temp file in the same
    /// directory and renames it over the target.
    pub fn save(&self) -> Result<(), HistoryError> {
        let file = HistoryFile {
            sessions: self.sessions.clone(),
            last_updated: Some(Local::now()),
            total_sessions: self.sessions.len(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let tmp = self.path.with_extension("json.tmp");
        let write = |source| HistoryError::WriteFailed {
            path: self.path.clone(),
            source,
        };
        fs::write(&tmp, json).map_err(write)?;
        fs::rename(&tmp, &self.path).map_err(write)?;

        info!(count = self.sessions.len(), "saved session history");
        Ok(())
    }

    /// Append a completed session and write through. Sessions without
    /// statistics (never completed) are ignored with a warning.
    pub fn add_session(&mut self, session: Session) -> Result<(), HistoryError> {
        if session.statistics.is_none() {
            warn!("ignoring session without statistics");
            return Ok(());
        }
        info!(session_type = session.session_type.as_str(), "session added");
        self.sessions.push(session);
        self.save()
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Sessions started on the given calendar date.
    pub fn sessions_on(&self, date: NaiveDate) -> Vec<&Session> {
        self.sessions
            .iter()
            .filter(|s| s.start_date() == Some(date))
            .collect()
    }

    /// Sessions started within the date range, inclusive on both ends.
    /// Compared on calendar date only, ignoring time of day.
    pub fn sessions_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<&Session> {
        self.sessions
            .iter()
            .filter(|s| {
                s.start_date()
                    .is_some_and(|d| d >= start && d <= end)
            })
            .collect()
    }

    pub fn today_sessions(&self) -> Vec<&Session> {
        self.sessions_on(Local::now().date_naive())
    }

    /// Sessions from Monday of the current week through today.
    pub fn this_week_sessions(&self) -> Vec<&Session> {
        let today = Local::now().date_naive();
        let week_start = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
        self.sessions_between(week_start, today)
    }

    // ── Analytics ────────────────────────────────────────────────────

    /// Summary over the whole history.
    pub fn summary(&self) -> StatisticsSummary {
        stats::summarize(&self.sessions)
    }

    /// Per-day summaries for the last `days` calendar days ending today,
    /// ordered oldest to newest.
    pub fn daily_statistics(&self, days: u32) -> Vec<DailyStatistics> {
        let today = Local::now().date_naive();
        let mut daily: Vec<DailyStatistics> = (0..days)
            .map(|i| {
                let date = today - Duration::days(i64::from(i));
                DailyStatistics {
                    date,
                    day_name: date.format("%A").to_string(),
                    summary: stats::summarize(self.sessions_on(date)),
                }
            })
            .collect();
        daily.reverse();
        daily
    }

    /// Week and day summaries plus daily averages.
    pub fn productivity_trends(&self) -> ProductivityTrends {
        let week_summary = stats::summarize(self.this_week_sessions());
        let today_summary = stats::summarize(self.today_sessions());

        let daily_average_sessions = f64::from(week_summary.total_sessions) / 7.0;
        let daily_average_focus_minutes = week_summary.focus_time_minutes / 7.0;
        let today_vs_average = if daily_average_sessions > 0.0 {
            f64::from(today_summary.total_sessions) - daily_average_sessions
        } else {
            0.0
        };

        ProductivityTrends {
            week_summary,
            today_summary,
            daily_average_sessions,
            daily_average_focus_minutes,
            today_vs_average,
        }
    }

    // ── Maintenance ──────────────────────────────────────────────────

    /// Export sessions with statistics as CSV, one row per session.
    /// Returns the number of rows written.
    pub fn export_csv(&self, path: &Path) -> Result<usize, HistoryError> {
        let export = |source| HistoryError::ExportFailed {
            path: path.to_path_buf(),
            source,
        };

        let mut out = String::new();
        out.push_str("Date,Type,Duration (min),Focus Time (min),Away Time (min),Focus Score,Distractions\n");

        let mut rows = 0;
        for session in &self.sessions {
            let (Some(stats), Some(start)) = (&session.statistics, session.start_time) else {
                continue;
            };
            // Fields are numeric or fixed tags; no quoting needed.
            out.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                start.format("%Y-%m-%d %H:%M:%S"),
                session.session_type.as_str(),
                session.planned_duration / 60,
                stats.focus_time / 60,
                stats.away_time / 60,
                stats.focus_score(),
                stats.distraction_count,
            ));
            rows += 1;
        }

        fs::write(path, out).map_err(export)?;
        info!(rows, path = %path.display(), "exported sessions to CSV");
        Ok(rows)
    }

    /// Drop sessions whose start time is older than `days_to_keep` days.
    /// Persists only when something was removed. Returns the removed count.
    pub fn clear_old_sessions(&mut self, days_to_keep: u32) -> Result<usize, HistoryError> {
        let cutoff = Local::now() - Duration::days(i64::from(days_to_keep));
        let before = self.sessions.len();
        self.sessions
            .retain(|s| s.start_time.is_some_and(|t| t >= cutoff));

        let removed = before - self.sessions.len();
        if removed > 0 {
            self.save()?;
            info!(removed, "removed old sessions");
        }
        Ok(removed)
    }
}
