use clap::Subcommand;
use vigil_core::storage::{Config, HistoryStore};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Remove sessions older than the retention window
    ClearOld {
        /// Days of history to keep; defaults to the configured retention
        #[arg(long)]
        days_to_keep: Option<u32>,
    },
    /// Print the number of stored sessions
    Count,
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut history = HistoryStore::open_default()?;

    match action {
        HistoryAction::ClearOld { days_to_keep } => {
            let days = days_to_keep
                .unwrap_or_else(|| Config::load_or_default().data.retention_days);
            let removed = history.clear_old_sessions(days)?;
            println!("removed {removed} sessions older than {days} days");
        }
        HistoryAction::Count => {
            println!("{}", history.len());
        }
    }
    Ok(())
}
