//! Interactive fuzzy prefix search over an entity file.
//!
//! Builds the index, then reads one query per line from stdin and prints the
//! best matches. An empty (normalized) query or end of input quits.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{json, Value};

use qgram_index::indexing::default_delta;
use qgram_index::{init_logger, normalize, Backend, IndexConfig, QGramIndex, QueryOutcome};

const WIKIDATA_URL: &str = "https://www.wikidata.org/wiki/";

#[derive(Parser, Debug)]
#[command(name = "qgram-search", version, about = "Fuzzy prefix search with a q-gram index")]
struct Args {
    /// Tab-separated entity file (name, score, synonyms, infos...) with header
    file: PathBuf,

    /// Size of the q-grams
    #[arg(short = 'q', long = "q-grams", default_value_t = 3)]
    q: usize,

    /// Index synonyms as well
    #[arg(short = 's', long = "use-synonyms")]
    use_synonyms: bool,

    /// Merge and distance implementations: reference or accelerated
    #[arg(long, default_value = "accelerated")]
    backend: Backend,

    /// Build the index on all cores
    #[arg(long)]
    parallel: bool,

    /// Fixed edit distance tolerance (default: one edit per q+1 chars)
    #[arg(short = 'd', long)]
    delta: Option<usize>,

    /// Number of results to show
    #[arg(short = 'k', long = "top", default_value_t = 5)]
    top: usize,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

fn print_text(index: &QGramIndex, query: &str, outcome: &QueryOutcome, total: usize) {
    if total > outcome.matches.len() {
        println!(
            "\nFound {} matches for {}\nShowing top {} results:",
            total,
            query,
            outcome.matches.len()
        );
    }

    for (rank, m) in outcome.matches.iter().enumerate() {
        let Some(entity) = index.get_info(m.id) else {
            continue;
        };
        println!();
        println!("{}. {} (PED {}, score {})", rank + 1, entity.name, m.distance, entity.score);
        if let Some(name) = index.matched_name(m).filter(|n| *n != entity.name) {
            println!("Matched synonym: {name}");
        }
        if let Some(description) = entity.info(1) {
            println!("Description: {description}");
        }
        if let Some(qid) = entity.info(0).filter(|s| !s.is_empty()) {
            println!("Wikidata URL: {WIKIDATA_URL}{qid}");
        }
        if let Some(url) = entity.info(2).filter(|s| !s.is_empty()) {
            println!("Wikipedia URL: {url}");
            println!("{}", "-".repeat(url.len()));
        }
    }
    println!();
}

fn json_report(index: &QGramIndex, outcome: &QueryOutcome, total: usize) -> Value {
    let results: Vec<_> = outcome
        .matches
        .iter()
        .filter_map(|m| {
            let entity = index.get_info(m.id)?;
            Some(json!({
                "id": m.id,
                "name": entity.name,
                "matched": index.matched_name(m),
                "distance": m.distance,
                "score": entity.score,
                "description": entity.info(1),
            }))
        })
        .collect();
    json!({
        "numTotalResults": total,
        "stats": outcome.stats,
        "results": results,
    })
}

fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();

    let config = IndexConfig::new(args.q)
        .with_synonyms(args.use_synonyms)
        .with_backend(args.backend)
        .with_parallel_build(args.parallel);

    let start = Instant::now();
    let index = QGramIndex::build_from_file(config, &args.file)
        .with_context(|| format!("failed to build index from {}", args.file.display()))?;
    eprintln!(
        "Indexed {} entities ({} q-grams) in {:.3}s",
        index.len(),
        index.num_grams(),
        start.elapsed().as_secs_f64()
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Query: ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let query = normalize(&line?);
        if query.is_empty() {
            break;
        }

        let len = query.chars().count();
        let delta = args.delta.unwrap_or_else(|| default_delta(len, args.q));

        let start = Instant::now();
        let mut outcome = match index.find_matches(&query, delta) {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("Invalid query: {e}");
                continue;
            }
        };
        let elapsed = start.elapsed();
        let total = outcome.matches.len();
        outcome.matches.truncate(args.top);

        if args.json {
            let report = json_report(&index, &outcome, total);
            println!("{}", serde_json::to_string_pretty(&report)?);
            continue;
        }

        println!("The query took {:.6} seconds", elapsed.as_secs_f64());
        println!("Number of inverted lists that were merged: {}", outcome.stats.lists_merged);
        println!("Number of potential PED computations: {}", outcome.stats.candidates);
        println!("Number of PED computations: {}", outcome.stats.ped_computations);
        print_text(&index, &query, &outcome, total);
    }

    Ok(())
}
