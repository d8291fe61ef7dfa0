use clap::Subcommand;
use vigil_core::storage::HistoryStore;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Summary over all, today's, this week's, or the last N days' sessions
    Summary {
        #[arg(long, conflicts_with_all = ["week", "days"])]
        today: bool,
        #[arg(long, conflicts_with = "days")]
        week: bool,
        #[arg(long)]
        days: Option<u32>,
    },
    /// Per-day breakdown for the last N days
    Daily {
        #[arg(long, default_value = "7")]
        days: u32,
    },
    /// Week-over-day productivity trends
    Trends,
    /// Export session history as CSV
    Export {
        /// Output file path
        #[arg(long)]
        output: std::path::PathBuf,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let history = HistoryStore::open_default()?;

    match action {
        StatsAction::Summary { today, week, days } => {
            let summary = if today {
                vigil_core::stats::summarize(history.today_sessions())
            } else if week {
                vigil_core::stats::summarize(history.this_week_sessions())
            } else if let Some(days) = days {
                let end = chrono::Local::now().date_naive();
                let start = end - chrono::Duration::days(i64::from(days.saturating_sub(1)));
                vigil_core::stats::summarize(history.sessions_between(start, end))
            } else {
                history.summary()
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        StatsAction::Daily { days } => {
            let daily = history.daily_statistics(days);
            println!("{}", serde_json::to_string_pretty(&daily)?);
        }
        StatsAction::Trends => {
            let trends = history.productivity_trends();
            println!("{}", serde_json::to_string_pretty(&trends)?);
        }
        StatsAction::Export { output } => {
            let rows = history.export_csv(&output)?;
            println!("exported {rows} sessions to {}", output.display());
        }
    }

    Ok(())
}
