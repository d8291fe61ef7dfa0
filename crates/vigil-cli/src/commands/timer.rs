use clap::Subcommand;
use vigil_core::storage::{data_dir, Config, HistoryStore};
use vigil_core::{Event, PomodoroEngine};

const ENGINE_FILE: &str = "engine.json";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a work session
    Start,
    /// Pause the current session
    Pause {
        /// Mark the pause as absence-driven rather than user-initiated
        #[arg(long)]
        away: bool,
    },
    /// Resume a paused session
    Resume,
    /// Stop and discard the current session
    Stop,
    /// Advance the engine by one or more ticks
    Tick {
        /// The user was not detected
        #[arg(long)]
        absent: bool,
        /// The user was actively looking at the screen
        #[arg(long)]
        focused: bool,
        /// Number of ticks to apply
        #[arg(long, default_value = "1")]
        count: u32,
    },
    /// Print current engine state
    Status,
    /// Update session durations (minutes)
    SetDurations {
        #[arg(long)]
        work: u32,
        #[arg(long)]
        short_break: u32,
        #[arg(long)]
        long_break: Option<u32>,
    },
    /// Set the daily work-session goal
    SetGoal { target: u32 },
}

fn engine_path() -> Result<std::path::PathBuf, Box<dyn std::error::Error>> {
    Ok(data_dir()?.join(ENGINE_FILE))
}

fn load_engine() -> Result<PomodoroEngine, Box<dyn std::error::Error>> {
    if let Ok(json) = std::fs::read_to_string(engine_path()?) {
        if let Ok(engine) = serde_json::from_str::<PomodoroEngine>(&json) {
            return Ok(engine);
        }
    }
    let config = Config::load_or_default();
    Ok(PomodoroEngine::new(&config.timer)?)
}

fn save_engine(engine: &PomodoroEngine) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(engine)?;
    std::fs::write(engine_path()?, json)?;
    Ok(())
}

/// Forward events to their consumers: completed sessions go to the history
/// store, everything is echoed as JSON.
fn handle_events(events: Vec<Event>) -> Result<(), Box<dyn std::error::Error>> {
    if events.is_empty() {
        return Ok(());
    }
    let mut history = HistoryStore::open_default()?;
    for event in events {
        println!("{}", serde_json::to_string_pretty(&event)?);
        if let Event::SessionCompleted { session, .. } = event {
            history.add_session(session)?;
        }
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct StatusView {
    state: vigil_core::SessionState,
    session_type: Option<vigil_core::SessionType>,
    time_display: String,
    remaining_secs: u32,
    progress_pct: u8,
    focus_score: u8,
    session_count: u32,
    distraction_count: u32,
    daily_goal_completed: u32,
    daily_goal_target: u32,
    daily_goal_pct: u8,
}

fn status(engine: &PomodoroEngine) -> StatusView {
    let goal = engine.daily_goal();
    StatusView {
        state: engine.state(),
        session_type: engine.session_type(),
        time_display: engine.time_display(),
        remaining_secs: engine.time_remaining(),
        progress_pct: engine.progress_percentage(),
        focus_score: engine.focus_score(),
        session_count: engine.session_count(),
        distraction_count: engine.distraction_count(),
        daily_goal_completed: goal.completed_sessions,
        daily_goal_target: goal.target_sessions,
        daily_goal_pct: goal.progress_percentage(),
    }
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = load_engine()?;

    match action {
        TimerAction::Start => {
            let event = engine.start_work_session();
            handle_events(vec![event])?;
        }
        TimerAction::Pause { away } => {
            if let Some(event) = engine.pause(away) {
                handle_events(vec![event])?;
            } else {
                println!("{}", serde_json::to_string_pretty(&status(&engine))?);
            }
        }
        TimerAction::Resume => {
            if let Some(event) = engine.resume() {
                handle_events(vec![event])?;
            } else {
                println!("{}", serde_json::to_string_pretty(&status(&engine))?);
            }
        }
        TimerAction::Stop => {
            if let Some(event) = engine.stop() {
                handle_events(vec![event])?;
            }
        }
        TimerAction::Tick {
            absent,
            focused,
            count,
        } => {
            let mut events = Vec::new();
            for _ in 0..count {
                events.extend(engine.tick(!absent, focused));
            }
            handle_events(events)?;
            println!("{}", serde_json::to_string_pretty(&status(&engine))?);
        }
        TimerAction::Status => {
            println!("{}", serde_json::to_string_pretty(&status(&engine))?);
        }
        TimerAction::SetDurations {
            work,
            short_break,
            long_break,
        } => {
            engine.set_durations(work, short_break, long_break)?;
            println!("{}", serde_json::to_string_pretty(&status(&engine))?);
        }
        TimerAction::SetGoal { target } => {
            engine.set_daily_goal(target);
            println!("{}", serde_json::to_string_pretty(&status(&engine))?);
        }
    }

    save_engine(&engine)?;
    Ok(())
}
