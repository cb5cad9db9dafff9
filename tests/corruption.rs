//! Byte-flip and truncation sweeps over a valid index file: validation
//! must catch every region corruption, the magic check must catch a
//! clobbered stamp, and unvalidated opens must not pretend to verify.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use trawler::index_file::{write_index, FileIndexReader, HEADER_SIZE};
use trawler::{crawl_file_tree, QueryProcessor};

fn build_small_index() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let docroot = tmp.path().join("docs");
    fs::create_dir(&docroot).unwrap();
    fs::write(docroot.join("f1.txt"), "dog cat dog").unwrap();
    fs::write(docroot.join("f2.txt"), "cat cat").unwrap();

    let (doc_table, mem_index) = crawl_file_tree(&docroot).unwrap();
    let index_path = tmp.path().join("small.idx");
    write_index(&mem_index, &doc_table, &index_path).unwrap();
    (tmp, index_path)
}

fn flip_byte(path: &PathBuf, offset: usize) {
    let mut bytes = fs::read(path).unwrap();
    bytes[offset] ^= 0xFF;
    fs::write(path, bytes).unwrap();
}

#[test]
fn single_flip_inside_regions_fails_validation() {
    let (_tmp, index_path) = build_small_index();

    flip_byte(&index_path, HEADER_SIZE as usize + 1);
    let err = FileIndexReader::open(&index_path, true).unwrap_err();
    assert!(err.is_corruption(), "got {err}");
}

#[test]
fn every_region_byte_is_covered_by_the_checksum() {
    let (_tmp, index_path) = build_small_index();
    let pristine = fs::read(&index_path).unwrap();

    for offset in HEADER_SIZE as usize..pristine.len() {
        flip_byte(&index_path, offset);
        assert!(
            FileIndexReader::open(&index_path, true).is_err(),
            "flip at offset {offset} went unnoticed"
        );
        fs::write(&index_path, &pristine).unwrap();
    }

    // Restored file is intact.
    assert!(FileIndexReader::open(&index_path, true).is_ok());
}

#[test]
fn region_flip_is_ignored_without_validation() {
    let (_tmp, index_path) = build_small_index();

    // The header stays honest, so an unvalidated open succeeds; the
    // damage surfaces only if a lookup happens to cross it.
    flip_byte(&index_path, HEADER_SIZE as usize + 1);
    assert!(FileIndexReader::open(&index_path, false).is_ok());
}

#[test]
fn clobbered_magic_fails_without_validation() {
    let (_tmp, index_path) = build_small_index();

    for offset in 0..4 {
        let pristine = fs::read(&index_path).unwrap();
        flip_byte(&index_path, offset);
        let err = FileIndexReader::open(&index_path, false).unwrap_err();
        assert!(err.is_corruption(), "magic byte {offset}: got {err}");
        fs::write(&index_path, pristine).unwrap();
    }
}

#[test]
fn truncated_or_padded_file_is_rejected() {
    let (_tmp, index_path) = build_small_index();
    let pristine = fs::read(&index_path).unwrap();

    let mut truncated = pristine.clone();
    truncated.pop();
    fs::write(&index_path, &truncated).unwrap();
    assert!(FileIndexReader::open(&index_path, false).is_err());

    let mut padded = pristine.clone();
    padded.push(0);
    fs::write(&index_path, &padded).unwrap();
    assert!(FileIndexReader::open(&index_path, false).is_err());
}

#[test]
fn query_processor_construction_fails_loud_on_corruption() {
    let (_tmp, index_path) = build_small_index();
    flip_byte(&index_path, HEADER_SIZE as usize + 3);

    let err = QueryProcessor::open(&[&index_path], true).unwrap_err();
    assert!(err.is_corruption(), "got {err}");
}
