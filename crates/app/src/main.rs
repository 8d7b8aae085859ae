use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use lamed_core::Clock;
use services::dashboard::{AggregateReport, DashboardService};
use storage::repository::Storage;
use tracing::debug;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidDays { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidDays { raw } => write!(f, "invalid --days value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct Args {
    db_url: String,
    days: i64,
    now: Option<DateTime<Utc>>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- report [--db <sqlite_url>] [--days <n>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite://dev.sqlite3)");
    eprintln!("  --days <n>                Trailing window in days (default: 7)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic output");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LAMED_DB_URL");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("LAMED_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://dev.sqlite3".into(), normalize_sqlite_url);
        let mut days = services::dashboard::DEFAULT_WINDOW_DAYS;
        let mut now: Option<DateTime<Utc>> = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--days" => {
                    let value = require_value(args, "--days")?;
                    days = value
                        .parse::<i64>()
                        .ok()
                        .filter(|parsed| *parsed > 0)
                        .ok_or(ArgsError::InvalidDays { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, days, now })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn print_report(report: &AggregateReport, days: i64) {
    println!("Parent dashboard, last {days} days");
    println!();
    println!(
        "  Average score: {}%    Questions: {}    Learning time: {} min",
        report.average_score,
        report.total_questions,
        report.total_time_secs / 60
    );

    if report.total_questions == 0 {
        println!();
        println!("  No practice recorded yet.");
        return;
    }

    println!();
    println!("  Strengths:");
    for group in &report.strengths {
        println!(
            "    {:<16} (range {:>2})  {:>3}%",
            group.category, group.item_range, group.score
        );
    }
    println!("  Weaknesses:");
    for group in &report.weaknesses {
        println!(
            "    {:<16} (range {:>2})  {:>3}%",
            group.category, group.item_range, group.score
        );
    }

    println!();
    println!("  Categories:");
    for category in &report.category_progress {
        println!(
            "    {:<16} {:>3}%  ({} questions)",
            category.category, category.score, category.total
        );
    }

    println!();
    println!(
        "  Weekly activity (consistency {}%):",
        report.consistency_score
    );
    for day in &report.daily_activity {
        println!("    {}  {}", day.date, "#".repeat(day.entries as usize));
    }

    if !report.performance_by_time_of_day.is_empty() {
        println!();
        println!("  Best times of day:");
        for bucket in &report.performance_by_time_of_day {
            println!(
                "    {:<10} {:>3}%  ({} questions)",
                bucket.period.as_str(),
                bucket.score,
                bucket.activities
            );
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // `report` is the only subcommand and the default.
    match argv.first().map(String::as_str) {
        None | Some("report") => {}
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => {}
        Some(first) => {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            return Err(Box::new(ArgsError::UnknownArg(first.to_string())));
        }
    }
    if argv.first().is_some_and(|arg| arg == "report") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so
    // core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;
    debug!(db = %args.db_url, "storage ready");

    let clock = match args.now {
        Some(at) => Clock::fixed(at),
        None => Clock::default_clock(),
    };
    let dashboard = DashboardService::new(clock, Arc::clone(&storage.progress));
    let report = dashboard.load_report(args.days, &Local).await?;
    print_report(&report, args.days);

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
