//! Document table: a bijection between document names and numeric ids.
//!
//! Ids are handed out monotonically starting at 1; id 0 is reserved as the
//! invalid id. The table is built during a crawl and frozen afterwards,
//! either to be serialized next to the inverted index or queried directly.

use crate::table::{fnv_hash_64, HashTable};

/// Identifies a document within one index. 0 is never a valid id.
pub type DocId = u64;

pub const INVALID_DOC_ID: DocId = 0;

/// Two hash tables kept in lockstep: `id -> name` owns the name strings,
/// `fnv_hash_64(name) -> id` answers reverse lookups.
#[derive(Debug, Default)]
pub struct DocTable {
    id_to_name: HashTable<String>,
    name_to_id: HashTable<DocId>,
    next_id: DocId,
}

impl DocTable {
    pub fn new() -> Self {
        Self {
            id_to_name: HashTable::new(),
            name_to_id: HashTable::new(),
            next_id: 1,
        }
    }

    /// Register `name`, returning its id. Idempotent: adding a name that
    /// is already present returns the id it got the first time.
    pub fn add(&mut self, name: &str) -> DocId {
        if let Some(id) = self.get_doc_id(name) {
            return id;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.id_to_name.insert(id, name.to_string());
        self.name_to_id.insert(fnv_hash_64(name.as_bytes()), id);
        id
    }

    pub fn get_doc_id(&self, name: &str) -> Option<DocId> {
        self.name_to_id.find(fnv_hash_64(name.as_bytes())).copied()
    }

    pub fn get_doc_name(&self, id: DocId) -> Option<&str> {
        self.id_to_name.find(id).map(String::as_str)
    }

    pub fn num_docs(&self) -> usize {
        self.id_to_name.len()
    }

    /// The `id -> name` side, as the serializer writes it.
    pub(crate) fn id_to_name_table(&self) -> &HashTable<String> {
        &self.id_to_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut table = DocTable::new();
        let id = table.add("docs/alpha.txt");
        assert_eq!(table.add("docs/alpha.txt"), id);
        assert_eq!(table.num_docs(), 1);
    }

    #[test]
    fn test_ids_are_distinct_increasing_and_never_zero() {
        let mut table = DocTable::new();
        let mut last = INVALID_DOC_ID;
        for name in ["a", "b", "c", "d"] {
            let id = table.add(name);
            assert_ne!(id, INVALID_DOC_ID);
            assert!(id > last);
            last = id;
        }
        assert_eq!(table.num_docs(), 4);
    }

    #[test]
    fn test_both_directions_agree() {
        let mut table = DocTable::new();
        let names = ["one.txt", "two.txt", "sub/three.txt"];
        let ids: Vec<DocId> = names.iter().map(|n| table.add(n)).collect();

        for (name, id) in names.iter().zip(&ids) {
            assert_eq!(table.get_doc_id(name), Some(*id));
            assert_eq!(table.get_doc_name(*id), Some(*name));
        }
        assert_eq!(table.get_doc_id("absent.txt"), None);
        assert_eq!(table.get_doc_name(999), None);
    }
}
