use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::{Local, NaiveDateTime};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod csv_codec;
mod db;
mod error;
mod events;
mod export;
mod import;
mod merge;
mod models;
mod notify;
mod query;
mod requests;
mod validate;

use crate::events::NewEvent;
use crate::import::ImportBatch;
use crate::models::{EventStatus, Record, RequestKind, RequestStatus};
use crate::notify::Notification;
use crate::query::{ListQuery, PageView, SearchScope};

#[derive(Parser)]
#[command(name = "plenilune")]
#[command(about = "Alumni relationship management for the institute", long_about = None)]
struct Cli {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    database_url: Option<String>,
    #[arg(long, env = "PLENILUNE_MAX_CONNECTIONS", default_value_t = 5, global = true)]
    max_connections: u32,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load sample alumni, events and requests
    Seed,
    /// Import or update alumni from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
        /// How many rejection reasons to print
        #[arg(long, default_value_t = import::DEFAULT_PREVIEW)]
        preview: usize,
    },
    /// Export every alumnus to CSV
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write an import template with one sample row
    Template {
        #[arg(long, default_value = export::TEMPLATE_FILENAME)]
        out: PathBuf,
    },
    /// Search, filter and page through alumni
    Alumni {
        #[command(flatten)]
        filters: AlumniFilters,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        page_size: usize,
        #[arg(long)]
        json: bool,
    },
    /// Manage events and their funding
    Events {
        #[command(subcommand)]
        command: EventCommands,
    },
    /// Mentorship and seminar talk requests
    Requests {
        #[command(subcommand)]
        command: RequestCommands,
    },
    /// Queue one email to every alumnus matching the filters
    Notify {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        body: String,
        #[command(flatten)]
        filters: AlumniFilters,
    },
}

#[derive(Args)]
struct AlumniFilters {
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long, value_enum, default_value_t = Scope::All)]
    scope: Scope,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    year: Option<i32>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Scope {
    All,
    Name,
    Email,
    DigitalId,
}

impl From<Scope> for SearchScope {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::All => Self::All,
            Scope::Name => Self::Field("full_name".to_string()),
            Scope::Email => Self::Field("email".to_string()),
            Scope::DigitalId => Self::Field("digital_id".to_string()),
        }
    }
}

impl AlumniFilters {
    fn to_query(&self, page_size: usize) -> ListQuery {
        let query = ListQuery::new(page_size)
            .with_search(self.search.as_str(), self.scope.into())
            .with_filter("department", self.department.clone().unwrap_or_default());
        match self.year {
            Some(year) => query.with_filter("graduation_year", year.to_string()),
            None => query,
        }
    }
}

#[derive(Subcommand)]
enum EventCommands {
    /// List events, optionally by status tab
    List {
        #[arg(long, value_parser = parse_event_status)]
        status: Option<EventStatus>,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 6)]
        page_size: usize,
        #[arg(long)]
        json: bool,
    },
    /// Create an event
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Start time, e.g. 2026-03-15T09:00
        #[arg(long, value_parser = parse_datetime)]
        start: NaiveDateTime,
        #[arg(long, value_parser = parse_datetime)]
        end: Option<NaiveDateTime>,
        #[arg(long, default_value_t = 0)]
        goal: i64,
    },
    /// Record a contribution toward an event
    Donate {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        amount: i64,
    },
}

#[derive(Subcommand)]
enum RequestCommands {
    List {
        #[arg(long, value_parser = parse_request_status)]
        status: Option<RequestStatus>,
        #[arg(long, value_parser = parse_request_kind)]
        kind: Option<RequestKind>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        page_size: usize,
    },
    /// Ask an alumnus for mentorship or a seminar talk
    Create {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long, value_parser = parse_request_kind)]
        kind: RequestKind,
        #[arg(long)]
        message: String,
    },
    /// Accept or decline a pending request
    #[command(group(
        ArgGroup::new("decision")
            .args(["accept", "decline"])
            .required(true)
    ))]
    Respond {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        accept: bool,
        #[arg(long)]
        decline: bool,
    },
}

fn parse_event_status(value: &str) -> Result<EventStatus, String> {
    value.parse().map_err(|err: error::UnknownEventStatus| err.to_string())
}

fn parse_request_status(value: &str) -> Result<RequestStatus, String> {
    value.parse().map_err(|err: error::RequestError| err.to_string())
}

fn parse_request_kind(value: &str) -> Result<RequestKind, String> {
    value.parse().map_err(|err: error::RequestError| err.to_string())
}

fn parse_datetime(value: &str) -> Result<NaiveDateTime, String> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| format!("expected YYYY-MM-DDTHH:MM, got {value:?}"))
}

fn print_page<T: Record>(view: &PageView<'_, T>, columns: &[&str]) {
    println!(
        "Page {} of {} ({} matching)",
        view.page, view.total_pages, view.total_filtered
    );
    for item in &view.items {
        let cells: Vec<String> = columns
            .iter()
            .map(|name| item.field(name).map(|v| v.into_owned()).unwrap_or_default())
            .collect();
        println!("- {}", cells.join(" | "));
    }
}

impl Cli {
    async fn connect(&self) -> anyhow::Result<PgPool> {
        let database_url = self
            .database_url
            .as_deref()
            .context("DATABASE_URL must be set to a production Postgres instance")?;

        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(database_url)
            .await
            .context("failed to connect to Postgres")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Template { out } => {
            std::fs::write(out, export::template_csv()?)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Template written to {}.", out.display());
        }
        Commands::InitDb => {
            db::init_db(&cli.connect().await?).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&cli.connect().await?).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv, preview } => {
            let batch = ImportBatch::from_path(csv);
            if batch.is_success() {
                let pool = cli.connect().await?;
                let existing = db::fetch_alumni(&pool).await?;
                let (merged, stats) = merge::merge(existing, batch.accepted.clone());
                db::replace_alumni(&pool, &merged).await?;
                info!(
                    updated = stats.updated,
                    appended = stats.appended,
                    "import merged into alumni"
                );
            }
            print!("{}", batch.summary(*preview));
            if !batch.is_success() {
                bail!("no records were imported from {}", csv.display());
            }
        }
        Commands::Export { out } => {
            let alumni = db::fetch_alumni(&cli.connect().await?).await?;
            let out = out
                .clone()
                .unwrap_or_else(|| PathBuf::from(export::export_filename(Local::now().date_naive())));
            std::fs::write(&out, export::export_csv(&alumni)?)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Exported {} alumni to {}.", alumni.len(), out.display());
        }
        Commands::Alumni {
            filters,
            page,
            page_size,
            json,
        } => {
            let alumni = db::fetch_alumni(&cli.connect().await?).await?;
            let query = filters.to_query(*page_size).with_page(*page);
            let view = query::filter(&alumni, &query);
            if view.page != query.page() {
                debug!(requested = query.page(), shown = view.page, "page clamped");
            }

            if *json {
                let output = serde_json::json!({ "query": query, "view": view });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else if view.total_filtered == 0 {
                let mut everyone = query.clone();
                everyone.clear();
                println!(
                    "No alumni match {:?} ({:?}) with filters {:?}; {} alumni without filters.",
                    query.search_text(),
                    query.search_scope(),
                    query.exact_filters(),
                    query::filter(&alumni, &everyone).total_filtered
                );
            } else {
                print_page(
                    &view,
                    &["digital_id", "full_name", "email", "graduation_year", "department", "current_company"],
                );
            }
        }
        Commands::Events { command } => run_event_command(&cli.connect().await?, command).await?,
        Commands::Requests { command } => run_request_command(&cli.connect().await?, command).await?,
        Commands::Notify {
            subject,
            body,
            filters,
        } => {
            let pool = cli.connect().await?;
            let alumni = db::fetch_alumni(&pool).await?;
            let recipients = query::matching(&alumni, &filters.to_query(1))
                .into_iter()
                .map(|alumnus| alumnus.email.as_str());
            let message = Notification::compose(subject, body, recipients)?;
            let id = db::enqueue_notification(&pool, &message).await?;
            println!(
                "Queued message {id} for {} recipients ({} skipped).",
                message.recipients.len(),
                message.skipped.len()
            );
        }
    }

    Ok(())
}

async fn run_event_command(pool: &PgPool, command: &EventCommands) -> anyhow::Result<()> {
    let now = Local::now().naive_local();

    match command {
        EventCommands::List {
            status,
            search,
            page,
            page_size,
            json,
        } => {
            let mut all = db::fetch_events(pool).await?;
            for event in &mut all {
                event.refresh_status(now);
            }

            let mut query = ListQuery::new(*page_size).with_search(search.as_str(), SearchScope::All);
            if let Some(status) = status {
                query.set_filter("status", status.as_str());
            }
            query.set_page(*page);
            let view = query::filter(&all, &query);

            if *json {
                let output = serde_json::json!({ "query": query, "view": view });
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(());
            }

            println!(
                "Page {} of {} ({} matching)",
                view.page, view.total_pages, view.total_filtered
            );
            for event in &view.items {
                println!(
                    "- {} [{}] {} | raised {} of {} ({}% funded, {} donors)",
                    event.title,
                    event.status,
                    event.start_time.format("%d %b %Y %H:%M"),
                    event.current_funding,
                    event.funding_goal,
                    event.funding_percent(),
                    event.donors_count
                );
                let filled = usize::try_from(event.progress_percent() / 5).unwrap_or(0);
                println!("  [{}{}]", "#".repeat(filled), ".".repeat(20 - filled));
            }
        }
        EventCommands::Create {
            title,
            description,
            start,
            end,
            goal,
        } => {
            let event = events::create_event(
                NewEvent {
                    title: title.clone(),
                    description: description.clone(),
                    start_time: *start,
                    end_time: *end,
                    funding_goal: *goal,
                },
                now,
            )?;
            db::insert_event(pool, &event).await?;
            println!("Created event {} ({}).", event.id, event.status);
        }
        EventCommands::Donate { id, amount } => {
            let Some(mut event) = db::fetch_event(pool, *id).await? else {
                bail!("no event with id {id}");
            };
            event.record_donation(*amount)?;
            event.refresh_status(now);
            db::update_event_funding(pool, &event).await?;
            println!(
                "{} is now {}% funded ({} of {}).",
                event.title,
                event.funding_percent(),
                event.current_funding,
                event.funding_goal
            );
        }
    }

    Ok(())
}

async fn run_request_command(pool: &PgPool, command: &RequestCommands) -> anyhow::Result<()> {
    let now = Local::now().naive_local();

    match command {
        RequestCommands::List {
            status,
            kind,
            page,
            page_size,
        } => {
            let all = db::fetch_requests(pool).await?;
            let mut query = ListQuery::new(*page_size);
            if let Some(status) = status {
                query.set_filter("status", status.as_str());
            }
            if let Some(kind) = kind {
                query.set_filter("kind", kind.as_str());
            }
            let view = query::filter(&all, &query.with_page(*page));
            print_page(
                &view,
                &["id", "kind", "status", "requested_by", "requested_to", "message"],
            );
        }
        RequestCommands::Create {
            from,
            to,
            kind,
            message,
        } => {
            let request = requests::open_request(from, to, *kind, message, now)?;
            db::insert_request(pool, &request).await?;
            println!("Request {} sent to {}.", request.id, request.requested_to);
        }
        RequestCommands::Respond {
            id,
            accept,
            decline: _,
        } => {
            let Some(mut request) = db::fetch_request(pool, *id).await? else {
                bail!("no request with id {id}");
            };
            let decision = if *accept {
                RequestStatus::Accepted
            } else {
                RequestStatus::Declined
            };
            request.respond(decision, now)?;
            db::update_request_status(pool, &request).await?;
            println!("Request {} {}.", request.id, request.status);
        }
    }

    Ok(())
}
