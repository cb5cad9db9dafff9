//! Multi-index query processor.
//!
//! Holds a `(DocTableReader, IndexTableReader)` pair per index file and
//! answers conjunctive queries over all of them at once. Document
//! identity across index files is the NAME string: two indices may well
//! have assigned the same document different numeric ids, so ids are
//! never compared across files. Every id is resolved through its own
//! file's doc table before it touches the accumulator.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrawlerError};
use crate::index_file::{DocTableReader, FileIndexReader, IndexTableReader};

/// One ranked query answer: a document name and the summed occurrence
/// count of every query word across every index file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub document_name: String,
    pub rank: u32,
}

/// Query processor over an ordered list of index files.
///
/// Construction opens and (optionally) validates every file and fails
/// loudly on the first bad one. Each processor owns its reader handles;
/// concurrent queries should construct one processor each rather than
/// share.
#[derive(Debug)]
pub struct QueryProcessor {
    readers: Vec<(DocTableReader, IndexTableReader)>,
}

impl QueryProcessor {
    pub fn open<P: AsRef<Path>>(index_paths: &[P], validate: bool) -> Result<Self> {
        if index_paths.is_empty() {
            return Err(TrawlerError::InvalidArgument(
                "at least one index file is required".to_string(),
            ));
        }

        let mut readers = Vec::with_capacity(index_paths.len());
        for path in index_paths {
            let index = FileIndexReader::open(path.as_ref(), validate)?;
            readers.push((index.doc_table_reader()?, index.index_table_reader()?));
        }
        Ok(Self { readers })
    }

    /// Answer a conjunctive query: a document is returned iff every query
    /// word occurs in it (in at least one index each), ranked by the
    /// total occurrence count across all indices, sorted descending.
    /// Ties keep discovery order; the sort is stable.
    pub fn process_query(&self, query: &[String]) -> Result<Vec<QueryResult>> {
        let first = query.first().ok_or_else(|| {
            TrawlerError::InvalidArgument("query must contain at least one word".to_string())
        })?;

        // Seed the accumulator with every document containing the first
        // word, merging occurrences of the same name across indices.
        let mut results: Vec<QueryResult> = Vec::new();
        for (doc_table, index_table) in &self.readers {
            let Some(doc_id_table) = index_table.lookup_word(first)? else {
                continue;
            };
            for (doc_id, num_positions) in doc_id_table.doc_id_list()? {
                let name = self.resolve_name(doc_table, doc_id)?;
                match results.iter_mut().find(|r| r.document_name == name) {
                    Some(result) => result.rank += num_positions,
                    None => results.push(QueryResult {
                        document_name: name,
                        rank: num_positions,
                    }),
                }
            }
        }

        // Each later word bumps the ranks of documents that contain it
        // and condemns the rest.
        for word in &query[1..] {
            if results.is_empty() {
                return Ok(results);
            }

            let mut survivors: HashSet<String> = HashSet::new();
            for (doc_table, index_table) in &self.readers {
                let Some(doc_id_table) = index_table.lookup_word(word)? else {
                    continue;
                };
                for (doc_id, num_positions) in doc_id_table.doc_id_list()? {
                    let name = self.resolve_name(doc_table, doc_id)?;
                    if let Some(result) = results.iter_mut().find(|r| r.document_name == name) {
                        result.rank += num_positions;
                        survivors.insert(name);
                    }
                }
            }
            results.retain(|r| survivors.contains(&r.document_name));
        }

        results.sort_by(|a, b| b.rank.cmp(&a.rank));
        Ok(results)
    }

    /// A doc id listed under a word must resolve in the same file's doc
    /// table; a dangling id means the file lies about itself.
    fn resolve_name(&self, doc_table: &DocTableReader, doc_id: u64) -> Result<String> {
        doc_table.lookup_doc_id(doc_id)?.ok_or_else(|| {
            doc_table.corruption(format!(
                "doc id {doc_id} is referenced by a word but missing from the doc table"
            ))
        })
    }
}
