use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use trawler::index_file::write_index;
use trawler::crawl_file_tree;

#[derive(Parser)]
#[command(name = "buildindex")]
#[command(about = "Crawl a directory and serialize the index to a file", long_about = None)]
struct Args {
    /// Directory to crawl and index
    docroot: PathBuf,

    /// Index file to write
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!(docroot = %args.docroot.display(), "crawling");
    let (doc_table, mem_index) = crawl_file_tree(&args.docroot)?;

    let bytes = write_index(&mem_index, &doc_table, &args.output)?;
    println!(
        "Wrote {} ({} documents, {} words, {} bytes)",
        args.output.display(),
        doc_table.num_docs(),
        mem_index.num_words(),
        bytes
    );
    Ok(())
}
