use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use trawler::config::ServerConfig;
use trawler::index_file::FileIndexReader;
use trawler::{create_router, AppState, Shutdown};

#[derive(Parser)]
#[command(name = "trawlerd")]
#[command(about = "HTTP front end over one or more index files", long_about = None)]
struct Args {
    /// Port to listen on (1024-65535)
    port: u16,

    /// Directory of static files served under /static
    static_dir: PathBuf,

    /// Index files to query, in rank-merge order
    #[arg(required = true)]
    indices: Vec<PathBuf>,

    /// Worker threads serving requests
    #[arg(long, env = "TRAWLERD_WORKERS", default_value_t = trawler::config::DEFAULT_WORKER_THREADS)]
    workers: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = ServerConfig::new(args.port, args.static_dir, args.indices)
        .with_worker_threads(args.workers);

    if let Err(err) = config.validate() {
        eprintln!("{err}");
        eprintln!("Usage: trawlerd <port> <staticdir> <index files...>");
        std::process::exit(1);
    }

    // Refuse to start on an index that would fail mid-query anyway.
    for path in &config.index_paths {
        FileIndexReader::open(path, true)?;
        info!(index = %path.display(), "index validated");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .enable_all()
        .build()?;
    runtime.block_on(serve(config))
}

async fn serve(config: ServerConfig) -> Result<()> {
    let shutdown = Arc::new(Shutdown::new());
    let state = AppState {
        index_paths: config.index_paths.clone(),
        shutdown: shutdown.clone(),
    };
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(
        port = config.port,
        static_dir = %config.static_dir.display(),
        indices = config.index_paths.len(),
        workers = config.worker_threads,
        "trawlerd listening"
    );

    let waiter = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { waiter.wait().await })
        .await?;

    info!("server shut down cleanly");
    Ok(())
}
