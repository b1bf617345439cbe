mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use daybook_core::{DaybookConfig, FileStore, Session};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use commands::entry::{EditArgs, NewArgs};
use commands::tasks::GroupArg;

#[derive(Parser)]
#[command(name = "daybook")]
#[command(about = "Keep your events and tasks in a local daybook and export them as .ics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an event
    Add(NewArgs),
    /// Create a task (the end date, if given, is its due date)
    Task(NewArgs),
    /// Change an existing event or task
    Edit(EditArgs),
    /// Show one day (YYYY-MM-DD, defaults to today)
    Day { date: Option<String> },
    /// Show the week containing a day
    Week { date: Option<String> },
    /// Show a month grid with marker dots (YYYY-MM, defaults to this month)
    Month {
        month: Option<String>,

        /// Print the per-day marker summary as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// List tasks grouped by due date and completion
    Tasks {
        /// Collapse a group (can be repeated)
        #[arg(long, value_enum)]
        collapse: Vec<GroupArg>,
    },
    /// Remove an entry from a day
    Remove { date: String, id: String },
    /// Write every entry to a timestamped .ics file
    Export {
        /// Directory to write to (defaults to export_dir from config)
        #[arg(long)]
        dir: Option<std::path::PathBuf>,

        /// Open the exported file with the system handler
        #[arg(long)]
        open: bool,
    },
    /// Import events and tasks from an .ics file
    Import { file: std::path::PathBuf },
    /// Show or change display preferences
    Prefs {
        /// Use 24-hour time
        #[arg(long = "24h")]
        use_24_hour: Option<bool>,
    },
    /// List categories, or add one
    Categories { name: Option<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("DAYBOOK_LOG")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("daybook=warn,daybook_core=warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = DaybookConfig::load()?;
    tracing::debug!(data_dir = %config.data_path().display(), "loaded config");
    let mut session = Session::load(FileStore::new(config.data_path()));

    match cli.command {
        Commands::Add(args) => commands::entry::create(&mut session, &config, args, false),
        Commands::Task(args) => commands::entry::create(&mut session, &config, args, true),
        Commands::Edit(args) => commands::entry::edit(&mut session, args),
        Commands::Day { date } => commands::view::day(&session, date.as_deref()),
        Commands::Week { date } => commands::view::week(&session, date.as_deref()),
        Commands::Month { month, json } => {
            commands::view::month(&session, &config, month.as_deref(), json)
        }
        Commands::Tasks { collapse } => commands::tasks::run(&session, &collapse),
        Commands::Remove { date, id } => commands::remove::run(&mut session, &date, &id),
        Commands::Export { dir, open } => {
            let dir = dir.unwrap_or_else(|| config.export_path());
            commands::export::run(&session, &dir, open).await
        }
        Commands::Import { file } => commands::import::run(&mut session, &file).await,
        Commands::Prefs { use_24_hour } => commands::prefs::run(&mut session, use_24_hour),
        Commands::Categories { name } => commands::prefs::categories(&mut session, name.as_deref()),
    }
}

