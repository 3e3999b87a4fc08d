use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tdbp_dashboard::views;
use tdbp_dashboard::{
    filters, pages, report, AnalyticsCache, AnalyticsSource, Config, DashboardError,
    DashboardSession, FileAnalyticsSource, FilterState, HttpAnalyticsClient, PageKind, Slot,
    Viewer,
};

#[derive(Parser)]
#[command(name = "tdbp-dashboard")]
#[command(about = "Sliding-window learning analytics dashboard for a course", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Args)]
struct Scope {
    /// Course identifier, defaults to WARREN_COURSE_ID
    #[arg(long)]
    course_id: Option<String>,
    /// End date of the sliding window (YYYY-MM-DD), defaults to today
    #[arg(long)]
    until: Option<String>,
    /// Read the sliding window payload from a JSON file instead of the API
    #[arg(long)]
    window_file: Option<PathBuf>,
    /// Read the scores payload from a JSON file instead of the API
    #[arg(long, requires = "window_file")]
    scores_file: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every panel of a dashboard page
    Render {
        #[command(flatten)]
        scope: Scope,
        #[arg(long, value_enum, default_value_t = PageKind::Overview)]
        page: PageKind,
        /// Identifier of the viewing user
        #[arg(long)]
        user_id: Option<String>,
        /// View the page with instructor rights
        #[arg(long)]
        instructor: bool,
        /// Student compared to the cohort on the radar
        #[arg(long)]
        student: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the window, active actions and cohort size
    Summary {
        #[command(flatten)]
        scope: Scope,
    },
    /// Export cumulated student scores as CSV
    Export {
        #[command(flatten)]
        scope: Scope,
        #[arg(long, default_value = "scores.csv")]
        out: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_source(scope: &Scope, config: &Config) -> anyhow::Result<Arc<dyn AnalyticsSource>> {
    if let Some(window) = &scope.window_file {
        info!(path = %window.display(), "reading analytics payloads from files");
        return Ok(Arc::new(FileAnalyticsSource::new(
            window.clone(),
            scope.scores_file.clone(),
        )));
    }
    let api_url = config.api_url()?;
    Ok(Arc::new(HttpAnalyticsClient::new(
        api_url,
        config.api_token.clone(),
    )))
}

async fn load_session(
    scope: &Scope,
    config: &Config,
    course_id: &str,
) -> anyhow::Result<DashboardSession> {
    let until = scope
        .until
        .as_deref()
        .map(filters::parse_until)
        .transpose()
        .context("--until must be a YYYY-MM-DD date")?;

    let cache = AnalyticsCache::new(build_source(scope, config)?);
    let mut session = DashboardSession::new(course_id, FilterState::new(until));
    session.load(&cache).await;

    if let Slot::Failed(err) = session.window_slot() {
        warn!(%err, "sliding window unavailable");
    }
    if let Slot::Failed(err) = session.scores_slot() {
        warn!(%err, "scores unavailable");
    }
    Ok(session)
}

fn course_id(scope: &Scope, config: &Config, page: &'static str) -> Result<String, DashboardError> {
    scope
        .course_id
        .clone()
        .or_else(|| config.course_id.clone())
        .ok_or(DashboardError::MissingCourseContext { page })
}

fn emit(out: Option<&PathBuf>, content: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Written to {}.", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::from_env();

    match cli.command {
        Commands::Render {
            scope,
            page,
            user_id,
            instructor,
            student,
            format,
            out,
        } => {
            let viewer = Viewer {
                course_id: scope.course_id.clone().or_else(|| config.course_id.clone()),
                user_id,
                is_instructor: instructor,
            };
            let page = pages::compose(page, &viewer)?;
            let session = load_session(&scope, &config, page.course_id()).await?;
            let rendered = page.render(&session, student.as_deref());

            let content = match format {
                Format::Json => serde_json::to_string_pretty(&rendered)?,
                Format::Markdown => report::build_report(&rendered),
            };
            emit(out.as_ref(), &content)?;
        }
        Commands::Summary { scope } => {
            let course_id = course_id(&scope, &config, "summary")?;
            let session = load_session(&scope, &config, &course_id).await?;
            let summary = views::summary::summarize(session.window());

            println!("Fenêtre flottante: {}", summary.window);
            println!("Actions actives: {}", summary.actions);
            println!("Cohorte dynamique: {}", summary.cohort);
        }
        Commands::Export { scope, out } => {
            let course_id = course_id(&scope, &config, "export")?;
            let session = load_session(&scope, &config, &course_id).await?;
            let scores = session
                .scores()
                .context("scores are not available for this window")?;
            let totals = views::comparison::student_totals(scores)?;

            let mut writer = csv::Writer::from_path(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            for total in &totals {
                writer.serialize(total)?;
            }
            writer.flush()?;
            println!("Exported {} students to {}.", totals.len(), out.display());
        }
    }

    Ok(())
}
