//! # Vigil Core Library
//!
//! Core business logic for Vigil, a presence-aware Pomodoro timer. The
//! work/break cycle is gated by an external "is the user present" signal
//! instead of wall-clock time alone: while the user is away, a work session
//! holds its countdown and accumulates away time instead.
//!
//! ## Architecture
//!
//! - **Engine**: a tick-driven state machine. The caller invokes
//!   [`PomodoroEngine::tick`] once per time unit with the presence/focus
//!   booleans from an external detector; the engine holds no timers,
//!   threads, or callbacks and returns [`Event`]s for the host to forward.
//! - **Storage**: JSON-file session history and TOML-based configuration.
//! - **Stats**: summaries, daily breakdowns, and productivity trends over
//!   completed sessions.
//!
//! ## Key components
//!
//! - [`PomodoroEngine`]: session state machine and tick accumulation
//! - [`HistoryStore`]: completed-session persistence and analytics
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod session;
pub mod stats;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, EngineError, HistoryError};
pub use events::Event;
pub use session::{DailyGoal, Session, SessionState, SessionStatistics, SessionType};
pub use stats::{DailyStatistics, ProductivityTrends, StatisticsSummary};
pub use storage::{Config, HistoryStore, TimerConfig};
pub use timer::{PomodoroEngine, DISTRACTION_THRESHOLD};
