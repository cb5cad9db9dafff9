use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use trawler::crawl_file_tree;
use trawler::tokenizer::split_query;

#[derive(Parser)]
#[command(name = "searchshell")]
#[command(about = "Crawl a directory and query it interactively", long_about = None)]
struct Args {
    /// Directory to crawl and index
    docroot: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    println!("Indexing '{}'", args.docroot.display());
    let (doc_table, mem_index) = crawl_file_tree(&args.docroot)?;
    info!(
        docs = doc_table.num_docs(),
        words = mem_index.num_words(),
        "index ready"
    );

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        println!("enter query:");
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        let words = split_query(&line);
        if words.is_empty() {
            continue;
        }

        if let Some(results) = mem_index.search(&words) {
            // Results come back ascending by rank; show the best first.
            for result in results.iter().rev() {
                if let Some(name) = doc_table.get_doc_name(result.doc_id) {
                    println!("  {} ({})", name, result.rank);
                }
            }
        }
    }

    println!("shutting down...");
    Ok(())
}
