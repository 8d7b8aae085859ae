use std::fmt;

use chrono::{DateTime, Duration, Utc};
use lamed_core::model::{Category, DrillItem, ItemId, NewProgressEntry};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    entries: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidEntries { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidEntries { raw } => write!(f, "invalid --entries value: {raw}"),
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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("LAMED_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut entries = std::env::var("LAMED_ENTRIES")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(0);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--entries" => {
                    let value = require_value(&mut args, "--entries")?;
                    entries = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidEntries { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
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

        Ok(Self {
            db_url,
            entries,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --entries <n>             Sample progress entries to append (default: 0)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  LAMED_DB_URL, LAMED_ENTRIES");
}

/// Hebrew number words 1-20.
const NUMBERS: [&str; 20] = [
    "אחת",
    "שתיים",
    "שלוש",
    "ארבע",
    "חמש",
    "שש",
    "שבע",
    "שמונה",
    "תשע",
    "עשר",
    "אחת עשרה",
    "שתים עשרה",
    "שלוש עשרה",
    "ארבע עשרה",
    "חמש עשרה",
    "שש עשרה",
    "שבע עשרה",
    "שמונה עשרה",
    "תשע עשרה",
    "עשרים",
];

/// Hebrew alphabet: glyph and letter name.
const HEBREW_LETTERS: [(&str, &str); 22] = [
    ("א", "אלף"),
    ("ב", "בית"),
    ("ג", "גימל"),
    ("ד", "דלת"),
    ("ה", "הא"),
    ("ו", "וו"),
    ("ז", "זין"),
    ("ח", "חית"),
    ("ט", "טית"),
    ("י", "יוד"),
    ("כ", "כף"),
    ("ל", "למד"),
    ("מ", "מם"),
    ("נ", "נון"),
    ("ס", "סמך"),
    ("ע", "עין"),
    ("פ", "פה"),
    ("צ", "צדי"),
    ("ק", "קוף"),
    ("ר", "ריש"),
    ("ש", "שין"),
    ("ת", "תו"),
];

/// English alphabet: glyph and Hebrew phonetic name.
const ENGLISH_LETTERS: [(&str, &str); 26] = [
    ("A", "איי"),
    ("B", "בי"),
    ("C", "סי"),
    ("D", "די"),
    ("E", "אי"),
    ("F", "אף"),
    ("G", "ג'י"),
    ("H", "אייץ'"),
    ("I", "איי"),
    ("J", "ג'יי"),
    ("K", "קיי"),
    ("L", "אל"),
    ("M", "אם"),
    ("N", "אן"),
    ("O", "או"),
    ("P", "פי"),
    ("Q", "קיו"),
    ("R", "אר"),
    ("S", "אס"),
    ("T", "טי"),
    ("U", "יו"),
    ("V", "וי"),
    ("W", "דאבליו"),
    ("X", "אקס"),
    ("Y", "וואי"),
    ("Z", "זי"),
];

async fn seed_items(storage: &Storage) -> Result<usize, Box<dyn std::error::Error>> {
    let mut next_id = 1_u64;
    let mut count = 0_usize;

    for (index, spoken) in NUMBERS.iter().enumerate() {
        let item = DrillItem::new(
            ItemId::new(next_id),
            Category::Numbers,
            (index + 1).to_string(),
            *spoken,
            None,
        )?;
        storage.items.upsert_item(&item).await?;
        next_id += 1;
        count += 1;
    }

    for (glyph, name) in HEBREW_LETTERS {
        let item = DrillItem::new(
            ItemId::new(next_id),
            Category::HebrewLetters,
            glyph,
            name,
            None,
        )?;
        storage.items.upsert_item(&item).await?;
        next_id += 1;
        count += 1;
    }

    for (glyph, name) in ENGLISH_LETTERS {
        let item = DrillItem::new(
            ItemId::new(next_id),
            Category::EnglishLetters,
            glyph,
            name,
            None,
        )?;
        storage.items.upsert_item(&item).await?;
        next_id += 1;
        count += 1;
    }

    Ok(count)
}

fn item_range_for(category: Category) -> u32 {
    match category {
        Category::Numbers => NUMBERS.len() as u32,
        Category::HebrewLetters => HEBREW_LETTERS.len() as u32,
        Category::EnglishLetters => ENGLISH_LETTERS.len() as u32,
        Category::QuickMath => 10,
    }
}

async fn seed_entries(
    storage: &Storage,
    count: u32,
    now: DateTime<Utc>,
) -> Result<(), Box<dyn std::error::Error>> {
    for i in 0..count {
        let category = Category::ALL[(i as usize) % Category::ALL.len()];
        let correct = 2 + (i % 4);
        let recorded_at =
            now - Duration::days(i64::from(i % 7)) - Duration::hours(i64::from((i % 3) * 5));

        let entry = NewProgressEntry::from_parts(
            category,
            correct,
            5,
            30 + i * 5,
            item_range_for(category),
        )?;
        let _ = storage.progress.record_progress(&entry, recorded_at).await?;
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let item_count = seed_items(&storage).await?;
    seed_entries(&storage, args.entries, now).await?;

    println!(
        "Seeded {} drill items and {} progress entries into {}",
        item_count, args.entries, args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
