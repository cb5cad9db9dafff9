use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use trawler::index_file::{write_index, FileIndexReader};
use trawler::table::fnv_hash_64;
use trawler::tokenizer::extract_word_positions;
use trawler::{crawl_file_tree, DocTable, MemIndex};

fn write_corpus(dir: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

fn build_index(corpus: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let docroot = tmp.path().join("docs");
    fs::create_dir(&docroot).unwrap();
    write_corpus(&docroot, corpus);

    let (doc_table, mem_index) = crawl_file_tree(&docroot).unwrap();
    let index_path = tmp.path().join("corpus.idx");
    write_index(&mem_index, &doc_table, &index_path).unwrap();
    (tmp, index_path)
}

#[test]
fn round_trip_preserves_every_posting() {
    let corpus: &[(&str, &str)] = &[
        ("alpha.txt", "the quick brown fox jumps over the lazy dog"),
        ("beta.txt", "dog eat dog world"),
        ("nested/gamma.txt", "Quick reflexes; quick wits.\nThe end."),
    ];

    let tmp = TempDir::new().unwrap();
    let docroot = tmp.path().join("docs");
    fs::create_dir(&docroot).unwrap();
    write_corpus(&docroot, corpus);

    let (doc_table, mem_index) = crawl_file_tree(&docroot).unwrap();
    let index_path = tmp.path().join("corpus.idx");
    write_index(&mem_index, &doc_table, &index_path).unwrap();

    let reader = FileIndexReader::open(&index_path, true).unwrap();
    let doc_reader = reader.doc_table_reader().unwrap();
    let index_reader = reader.index_table_reader().unwrap();

    // Every word of every file must come back with identical positions,
    // and every doc id must resolve to its path.
    for (name, content) in corpus {
        let path = docroot.join(name);
        let doc_id = doc_table.get_doc_id(path.to_str().unwrap()).unwrap();

        assert_eq!(
            doc_reader.lookup_doc_id(doc_id).unwrap().as_deref(),
            path.to_str()
        );

        let words = extract_word_positions(content.as_bytes()).unwrap();
        for (_, wp) in words.iter() {
            let doc_id_table = index_reader
                .lookup_word(&wp.word)
                .unwrap()
                .unwrap_or_else(|| panic!("word {:?} missing from index", wp.word));
            let positions = doc_id_table
                .lookup_doc_id(doc_id)
                .unwrap()
                .unwrap_or_else(|| panic!("doc {doc_id} missing under {:?}", wp.word));
            assert_eq!(positions, wp.positions, "positions differ for {:?}", wp.word);
        }
    }
}

#[test]
fn minimal_hand_built_index_round_trips() {
    let tmp = TempDir::new().unwrap();
    let index_path = tmp.path().join("tiny.idx");

    let mut doc_table = DocTable::new();
    let doc_id = doc_table.add("x.txt");
    assert_eq!(doc_id, 1);

    let mut mem_index = MemIndex::new();
    mem_index.add_posting_list("a".to_string(), doc_id, vec![0, 2]);

    write_index(&mem_index, &doc_table, &index_path).unwrap();

    let reader = FileIndexReader::open(&index_path, true).unwrap();
    let positions = reader
        .index_table_reader()
        .unwrap()
        .lookup_word("a")
        .unwrap()
        .unwrap()
        .lookup_doc_id(doc_id)
        .unwrap()
        .unwrap();
    assert_eq!(positions, vec![0, 2]);

    let name = reader
        .doc_table_reader()
        .unwrap()
        .lookup_doc_id(doc_id)
        .unwrap()
        .unwrap();
    assert_eq!(name, "x.txt");
}

#[test]
fn absent_word_and_doc_are_not_found() {
    let (_tmp, index_path) = build_index(&[("a.txt", "only these words")]);
    let reader = FileIndexReader::open(&index_path, true).unwrap();

    let index_reader = reader.index_table_reader().unwrap();
    assert!(index_reader.lookup_word("absent").unwrap().is_none());

    let doc_id_table = index_reader.lookup_word("only").unwrap().unwrap();
    assert!(doc_id_table.lookup_doc_id(999).unwrap().is_none());

    let doc_reader = reader.doc_table_reader().unwrap();
    assert!(doc_reader.lookup_doc_id(999).unwrap().is_none());
}

#[test]
fn rank_fast_path_agrees_with_positions() {
    let (_tmp, index_path) = build_index(&[("a.txt", "dog cat dog"), ("b.txt", "cat cat")]);
    let reader = FileIndexReader::open(&index_path, true).unwrap();
    let index_reader = reader.index_table_reader().unwrap();

    let doc_id_table = index_reader.lookup_word("cat").unwrap().unwrap();
    let mut list = doc_id_table.doc_id_list().unwrap();
    list.sort_by_key(|&(doc_id, _)| doc_id);

    for (doc_id, num_positions) in list {
        let positions = doc_id_table.lookup_doc_id(doc_id).unwrap().unwrap();
        assert_eq!(positions.len() as u32, num_positions);
    }
}

#[test]
fn word_keyed_by_stored_bytes_not_hash() {
    // A word that shares a bucket with another must not be confused with
    // it: lookups land on the stored bytes.
    let (_tmp, index_path) = build_index(&[("a.txt", "alpha beta gamma delta")]);
    let reader = FileIndexReader::open(&index_path, true).unwrap();
    let index_reader = reader.index_table_reader().unwrap();

    for word in ["alpha", "beta", "gamma", "delta"] {
        let doc_id_table = index_reader.lookup_word(word).unwrap().unwrap();
        assert_eq!(doc_id_table.doc_id_list().unwrap().len(), 1);
    }
    // Same-length absent word whose hash differs but bucket may collide.
    assert!(index_reader.lookup_word("omega").unwrap().is_none());
    assert_ne!(fnv_hash_64(b"alpha"), fnv_hash_64(b"omega"));
}

#[test]
fn unstamped_file_is_rejected() {
    // A writer that dies before patching the header leaves magic = 0.
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("torn.idx");
    let mut bytes = vec![0u8; 16];
    bytes.extend_from_slice(&[0xAB; 64]);
    fs::write(&path, bytes).unwrap();

    let err = FileIndexReader::open(&path, false).unwrap_err();
    assert!(err.is_corruption(), "got {err}");
}

#[test]
fn failed_write_unlinks_output() {
    let tmp = TempDir::new().unwrap();
    let index_path = tmp.path().join("doomed.idx");

    // A document name too long for the format's i16 length field forces
    // the writer down its failure path.
    let mut doc_table = DocTable::new();
    let long_name = "x".repeat(40_000);
    let doc_id = doc_table.add(&long_name);

    let mut mem_index = MemIndex::new();
    mem_index.add_posting_list("word".to_string(), doc_id, vec![0]);

    assert!(write_index(&mem_index, &doc_table, &index_path).is_err());
    assert!(!index_path.exists(), "failed write left a file behind");
}

#[test]
fn empty_index_round_trips() {
    let tmp = TempDir::new().unwrap();
    let index_path = tmp.path().join("empty.idx");

    write_index(&MemIndex::new(), &DocTable::new(), &index_path).unwrap();

    let reader = FileIndexReader::open(&index_path, true).unwrap();
    let index_reader = reader.index_table_reader().unwrap();
    assert!(index_reader.lookup_word("anything").unwrap().is_none());
}
