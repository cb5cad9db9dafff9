//! In-memory inverted index.
//!
//! Maps each word to the documents containing it and, per document, the
//! ordered byte offsets of every occurrence. Built monotonically during a
//! crawl, then frozen: afterwards it is either serialized once or searched
//! in place.

use crate::doctable::DocId;
use crate::table::{fnv_hash_64, HashTable};

/// Everything the index knows about one word: the word bytes themselves
/// (lookups compare these, not just the 64-bit key) and a `doc id ->
/// positions` table.
#[derive(Debug)]
pub struct WordPostings {
    pub word: String,
    pub postings: HashTable<Vec<u32>>,
}

/// A single document matching a query, with the summed occurrence count of
/// every query word.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub doc_id: DocId,
    pub rank: u32,
}

/// The inverted index: `fnv_hash_64(word) -> WordPostings`.
#[derive(Debug, Default)]
pub struct MemIndex {
    table: HashTable<WordPostings>,
}

impl MemIndex {
    pub fn new() -> Self {
        Self {
            table: HashTable::new(),
        }
    }

    /// Number of distinct words in the index.
    pub fn num_words(&self) -> usize {
        self.table.len()
    }

    /// Record that `word` occurs in `doc_id` at the given byte offsets.
    ///
    /// Each document is added at most once per word; the crawler guarantees
    /// this by handing over a file's whole positions list in one call.
    /// Violating that, or presenting two distinct words with the same
    /// 64-bit hash, is a caller bug and panics.
    pub fn add_posting_list(&mut self, word: String, doc_id: DocId, positions: Vec<u32>) {
        assert!(!positions.is_empty(), "empty positions list for {word:?}");
        let key = fnv_hash_64(word.as_bytes());

        match self.table.find(key) {
            Some(entry) => assert!(
                entry.word == word,
                "hash collision between words {:?} and {:?}",
                entry.word,
                word
            ),
            None => {
                self.table.insert(
                    key,
                    WordPostings {
                        word,
                        postings: HashTable::new(),
                    },
                );
            }
        }

        let entry = self.table.find_mut(key).expect("present by construction");
        let prior = entry.postings.insert(doc_id, positions);
        assert!(
            prior.is_none(),
            "document {doc_id} added twice for word {:?}",
            entry.word
        );
    }

    /// Conjunctive search: a document is returned iff it contains every
    /// query word, ranked by the summed occurrence count, sorted ascending
    /// by rank. Callers that display best-first iterate in reverse.
    ///
    /// Returns `None` when the query is empty or any word misses entirely.
    pub fn search(&self, query: &[String]) -> Option<Vec<SearchResult>> {
        let first = query.first()?;

        let mut results: Vec<SearchResult> = self
            .lookup(first)?
            .postings
            .iter()
            .map(|(doc_id, positions)| SearchResult {
                doc_id,
                rank: positions.len() as u32,
            })
            .collect();

        for word in &query[1..] {
            let postings = &self.lookup(word)?.postings;
            results.retain_mut(|result| match postings.find(result.doc_id) {
                Some(positions) => {
                    result.rank += positions.len() as u32;
                    true
                }
                None => false,
            });
            if results.is_empty() {
                return None;
            }
        }

        results.sort_by_key(|result| result.rank);
        Some(results)
    }

    fn lookup(&self, word: &str) -> Option<&WordPostings> {
        self.table
            .find(fnv_hash_64(word.as_bytes()))
            // A key hit with different bytes is some other word entirely.
            .filter(|entry| entry.word == word)
    }

    /// The underlying table, as the serializer writes it.
    pub(crate) fn table(&self) -> &HashTable<WordPostings> {
        &self.table
    }
}
