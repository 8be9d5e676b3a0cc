use admission_predictor::{
    history::SqliteHistoryBackend,
    providers::{HttpProvider, JsonDirectoryProvider},
    PageRequest, PredictionEngine, PredictionOutcome, PredictorConfig, QueryForm, RefineFilter,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "admission-predictor")]
#[command(about = "Admission chance prediction from historical cutoffs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// History database path
    #[arg(long, default_value = "predictor-history.db")]
    db: String,

    /// JSON configuration file (defaults plus PREDICTOR_* env vars otherwise)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct DataSource {
    /// Directory of normalized datasets (<authority>/<year>/round-<round>.json)
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Remote cutoff store, consulted after the data directory
    #[arg(long)]
    remote: Option<String>,
}

#[derive(Args)]
struct Display {
    /// Institute substring filter
    #[arg(long)]
    institute: Option<String>,

    /// Program substring filter
    #[arg(long)]
    program: Option<String>,

    /// Page number
    #[arg(short, long, default_value = "1")]
    page: usize,

    /// Show every result instead of one page
    #[arg(long)]
    all: bool,

    /// Print the page as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict admission chances for a rank
    Predict {
        #[command(flatten)]
        source: DataSource,

        #[command(flatten)]
        display: Display,

        /// Counselling authority (JoSAA, CSAB, UPTAC, ...)
        #[arg(long)]
        authority: String,

        #[arg(long)]
        year: u16,

        /// Round number or AR
        #[arg(long)]
        round: String,

        #[arg(long)]
        rank: String,

        #[arg(long, default_value = "OPEN")]
        category: String,

        /// HS, OS or AI
        #[arg(long, default_value = "AI")]
        quota: String,

        #[arg(long, default_value = "Gender-Neutral")]
        gender: String,

        /// State, for state-scoped authorities
        #[arg(long)]
        state: Option<String>,
    },

    /// Inspect and manage prediction history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List recent searches
    List,

    /// Delete one entry
    Delete { index: usize },

    /// Remove all entries
    Clear,

    /// Run a stored search again
    Rerun {
        index: usize,

        #[command(flatten)]
        source: DataSource,

        #[command(flatten)]
        display: Display,
    },
}

async fn build_engine(cli: &Cli, source: Option<&DataSource>) -> anyhow::Result<PredictionEngine> {
    let config = match &cli.config {
        Some(path) => PredictorConfig::from_json_file(path)?,
        None => PredictorConfig::from_env()?,
    };

    let backend = Arc::new(SqliteHistoryBackend::new(&cli.db)?);
    let mut engine = PredictionEngine::with_history_backend(config, backend).await?;

    if let Some(source) = source {
        engine.add_provider(Arc::new(JsonDirectoryProvider::new(&source.data_dir)));
        if let Some(remote) = &source.remote {
            engine.add_provider(Arc::new(HttpProvider::new(remote.clone(), Duration::from_secs(10))?));
        }
    }

    Ok(engine)
}

fn print_outcome(engine: &PredictionEngine, outcome: &PredictionOutcome, display: &Display) -> anyhow::Result<()> {
    let mut view = engine.view(outcome);
    view.set_filter(RefineFilter::new(display.institute.as_deref(), display.program.as_deref()));
    view.apply(if display.all {
        PageRequest::All
    } else {
        PageRequest::Page(display.page)
    });
    let page = view.current();

    if display.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    println!("🎯 {}", outcome.query.display());
    if outcome.is_empty() {
        println!("\n📭 No matching cutoffs for this rank");
        return Ok(());
    }

    println!(
        "\n✅ {} matches (High {}, Medium {}, Low {})",
        page.total_matched, outcome.breakdown.high, outcome.breakdown.medium, outcome.breakdown.low
    );
    if !page.filter.is_empty() {
        println!("   After refinement: {}", page.total_after_refinement);
    }

    for (i, result) in page.page.results.iter().enumerate() {
        let position = if page.page.show_all {
            i + 1
        } else {
            (page.page.page_number - 1) * page.page.page_size + i + 1
        };
        println!("   {}. {}", position, result.display());
    }

    if !page.page.show_all && page.page.total_pages > 0 {
        println!("\n📄 Page {}/{}", page.page.page_number, page.page.total_pages);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "admission_predictor=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Predict {
            source,
            display,
            authority,
            year,
            round,
            rank,
            category,
            quota,
            gender,
            state,
        } => {
            let engine = build_engine(&cli, Some(source)).await?;

            let form = QueryForm {
                rank: Some(rank.clone()),
                category: category.clone(),
                quota: quota.clone(),
                gender: gender.clone(),
                round: round.clone(),
                year: *year,
                authority: authority.clone(),
                state: state.clone(),
            };

            let outcome = engine.submit(&form).await?;
            print_outcome(&engine, &outcome, display)?;
        }

        Commands::History { action } => match action {
            HistoryAction::List => {
                let engine = build_engine(&cli, None).await?;
                let entries = engine.history_entries().await;

                if entries.is_empty() {
                    println!("📭 No saved searches");
                }
                for (i, entry) in entries.iter().enumerate() {
                    println!("   {}. {}", i, entry.display());
                }
            }

            HistoryAction::Delete { index } => {
                let engine = build_engine(&cli, None).await?;
                let removed = engine.delete_history(*index).await?;
                println!("🗑️  Removed: {}", removed.query.display());
            }

            HistoryAction::Clear => {
                let engine = build_engine(&cli, None).await?;
                engine.clear_history().await?;
                println!("🧹 History cleared");
            }

            HistoryAction::Rerun { index, source, display } => {
                let engine = build_engine(&cli, Some(source)).await?;
                let outcome = engine.rerun(*index).await?;
                print_outcome(&engine, &outcome, display)?;
            }
        },
    }

    Ok(())
}
