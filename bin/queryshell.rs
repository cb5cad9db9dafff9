use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use trawler::query::QueryProcessor;
use trawler::tokenizer::split_query;

#[derive(Parser)]
#[command(name = "queryshell")]
#[command(about = "Query one or more index files interactively", long_about = None)]
struct Args {
    /// Index files to query, in rank-merge order
    #[arg(required = true)]
    indices: Vec<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    // One validated processor for the whole session; a corrupt index
    // fails here, before the first prompt.
    let processor = QueryProcessor::open(&args.indices, true)?;

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        println!("Enter query:");
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        let words = split_query(&line);
        if words.is_empty() {
            continue;
        }

        let results = processor.process_query(&words)?;
        if results.is_empty() {
            println!("  [no results]");
        } else {
            for result in &results {
                println!("  {} ({})", result.document_name, result.rank);
            }
        }
    }

    Ok(())
}
