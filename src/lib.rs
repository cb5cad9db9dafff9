//! trawler: full-text search over a directory of ASCII text files.
//!
//! Three layers: a crawl builds an in-memory inverted index
//! ([`memindex::MemIndex`] + [`doctable::DocTable`]); the index-file
//! writer serializes the pair into a CRC-checked binary file
//! ([`index_file`]); and the query processor ([`query::QueryProcessor`])
//! answers conjunctive queries across any number of those files, ranking
//! by total occurrence count. Shells and an HTTP front end sit on top.

pub mod api;
pub mod config;
pub mod crawler;
pub mod doctable;
pub mod error;
pub mod index_file;
pub mod memindex;
pub mod query;
pub mod table;
pub mod tokenizer;

pub use api::{create_router, AppState, Shutdown};
pub use config::ServerConfig;
pub use crawler::crawl_file_tree;
pub use doctable::{DocId, DocTable, INVALID_DOC_ID};
pub use error::{Result, TrawlerError};
pub use index_file::{write_index, FileIndexReader};
pub use memindex::{MemIndex, SearchResult};
pub use query::{QueryProcessor, QueryResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
