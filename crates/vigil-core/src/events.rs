use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::session::{Session, SessionState};

/// Notifications the engine hands back to its host.
///
/// The engine stores no callbacks; mutating calls return the events they
/// produced and the host (CLI, GUI, test driver) forwards them wherever they
/// need to go -- typically `SessionCompleted` into the history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A session finished and carries its final statistics.
    SessionCompleted {
        session: Session,
        at: DateTime<Local>,
    },
    /// The engine's session state changed (start, pause, resume, stop).
    StateChanged {
        state: SessionState,
        at: DateTime<Local>,
    },
    /// One time unit elapsed. `remaining_secs` is clamped to zero; on a
    /// completion tick it reports the freshly started next session.
    Tick {
        remaining_secs: u32,
        at: DateTime<Local>,
    },
}

impl Event {
    pub(crate) fn session_completed(session: Session) -> Self {
        Event::SessionCompleted {
            session,
            at: Local::now(),
        }
    }

    pub(crate) fn state_changed(state: SessionState) -> Self {
        Event::StateChanged {
            state,
            at: Local::now(),
        }
    }

    pub(crate) fn tick(remaining_secs: u32) -> Self {
        Event::Tick {
            remaining_secs,
            at: Local::now(),
        }
    }
}
