use clap::Parser;
use serde::Serialize;
use std::io;
use std::process;

use tracing_subscriber::EnvFilter;
use wordtally::{CorpusStore, Format, Outcome, TallyError};

mod cli;
use cli::display::{
    count_colored, escape_word, field, format_size, section_bot, section_top, status,
};
use cli::{Cli, Commands};

/// Exit status for `inspect` when there is no corpus file yet.
const EXIT_NO_CORPUS: i32 = 1;

/// Message the harness greps for when the tool runs from the wrong place.
const NOT_IN_ROOT: &str = "Please run this program from the root of the project";

#[derive(Serialize)]
struct ReportJson {
    total: u64,
    distinct: usize,
    duplicates: u64,
    words: Vec<WordJson>,
}

#[derive(Serialize)]
struct WordJson {
    count: u64,
    len: usize,
    /// Escaped, truncated to the report width
    word: String,
}

#[derive(Serialize)]
struct InspectJson {
    path: String,
    format: Format,
    size: u64,
    records: u64,
    distinct: usize,
    duplicates: u64,
    longest: Option<usize>,
    checksum_verified: bool,
}

fn main() {
    // Logs go to stderr; stdout belongs to report/inspect output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let store = CorpusStore::new(cli.store.to_config());

    let result = match cli.command.unwrap_or(Commands::Record) {
        Commands::Record => run_record(&store, cli.skipped_status),
        Commands::Report { limit, width, json } => run_report(&store, limit, width, json),
        Commands::Inspect { json } => run_inspect(&store, json),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn run_record(store: &CorpusStore, skipped_status: u8) -> Result<i32, TallyError> {
    match store.record_from(io::stdin().lock())? {
        Outcome::Recorded { .. } => Ok(0),
        Outcome::Skipped { marker } => {
            eprintln!("{}", NOT_IN_ROOT);
            tracing::debug!("marker {} not found, corpus untouched", marker.display());
            Ok(i32::from(skipped_status))
        }
    }
}

fn run_report(
    store: &CorpusStore,
    limit: Option<usize>,
    width: usize,
    json: bool,
) -> Result<i32, TallyError> {
    let corpus = store
        .snapshot()?
        .map(|snapshot| snapshot.decoded.corpus)
        .unwrap_or_default();

    let mut rows = corpus.distribution();
    if let Some(limit) = limit {
        // Rows are rarest first; keep the tail
        rows = rows.split_off(rows.len().saturating_sub(limit));
    }

    if json {
        let report = ReportJson {
            total: corpus.len(),
            distinct: corpus.distinct(),
            duplicates: corpus.duplicates(),
            words: rows
                .iter()
                .map(|row| WordJson {
                    count: row.count,
                    len: row.word.len(),
                    word: escape_word(&row.word, width),
                })
                .collect(),
        };
        print_json(&report);
        return Ok(0);
    }

    let count_width = rows
        .last()
        .map(|row| row.count.to_string().len())
        .unwrap_or(1);
    for row in &rows {
        println!(
            "{}: {}",
            count_colored(row.count, count_width),
            escape_word(&row.word, width)
        );
    }
    if !rows.is_empty() {
        println!();
    }
    println!(
        "{} words, {} distinct, {} duplicates",
        corpus.len(),
        corpus.distinct(),
        corpus.duplicates()
    );
    Ok(0)
}

fn run_inspect(store: &CorpusStore, json: bool) -> Result<i32, TallyError> {
    let path = store.corpus_path();
    let Some(snapshot) = store.snapshot()? else {
        eprintln!("❌ No corpus at {}", path.display());
        return Ok(EXIT_NO_CORPUS);
    };
    let corpus = &snapshot.decoded.corpus;
    let format = snapshot.decoded.format;

    if json {
        print_json(&InspectJson {
            path: path.display().to_string(),
            format,
            size: snapshot.size,
            records: corpus.len(),
            distinct: corpus.distinct(),
            duplicates: corpus.duplicates(),
            longest: corpus.longest(),
            checksum_verified: format == Format::Framed,
        });
        return Ok(0);
    }

    section_top("CORPUS");
    field("Path", &path.display().to_string());
    field("Format", format.as_str());
    field("Size", &format_size(snapshot.size));
    field("Records", &corpus.len().to_string());
    field("Distinct", &corpus.distinct().to_string());
    field("Duplicates", &corpus.duplicates().to_string());
    field(
        "Longest",
        &corpus
            .longest()
            .map_or_else(|| "-".to_string(), |n| format!("{} bytes", n)),
    );
    if format == Format::Framed {
        field("CRC32", &status(true, "verified"));
    }
    if snapshot.decoded.discarded > 0 {
        field(
            "Discarded",
            &status(false, &format!("{} trailing bytes", snapshot.decoded.discarded)),
        );
    }
    section_bot();
    Ok(0)
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("❌ Failed to serialize output: {}", e),
    }
}
