mod engine;
mod presence;

pub use engine::PomodoroEngine;
pub use presence::{PresenceMonitor, DISTRACTION_THRESHOLD};
