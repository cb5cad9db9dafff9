//! Directory crawler: feeds a tree of text files into a fresh
//! `DocTable` + `MemIndex` pair.
//!
//! Only regular files are considered; symlinks are not followed. Entries
//! are visited in name order so two crawls of the same tree index
//! documents in the same order and assign the same ids. Files that are
//! not indexable (binary, non-ASCII, letterless, unreadable, or with a
//! non-UTF-8 path) are skipped, not fatal; a corpus directory routinely
//! contains a few of them.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::doctable::DocTable;
use crate::error::{Result, TrawlerError};
use crate::memindex::MemIndex;
use crate::tokenizer::extract_word_positions;

/// Crawl `root` recursively and build the in-memory index of every
/// indexable file underneath it.
///
/// Fails only if `root` itself is missing or not a directory; trouble with
/// individual files or subdirectories downgrades to a skip.
pub fn crawl_file_tree(root: &Path) -> Result<(DocTable, MemIndex)> {
    let metadata =
        fs::metadata(root).map_err(|_| TrawlerError::NotADirectory(root.to_path_buf()))?;
    if !metadata.is_dir() {
        return Err(TrawlerError::NotADirectory(root.to_path_buf()));
    }

    let mut doc_table = DocTable::new();
    let mut mem_index = MemIndex::new();
    descend(root, &mut doc_table, &mut mem_index);

    info!(
        docs = doc_table.num_docs(),
        words = mem_index.num_words(),
        root = %root.display(),
        "crawl complete"
    );
    Ok((doc_table, mem_index))
}

fn descend(dir: &Path, doc_table: &mut DocTable, mem_index: &mut MemIndex) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), %err, "skipping unreadable directory");
            return;
        }
    };

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    paths.sort();

    for path in paths {
        // symlink_metadata so links are seen as links, not their targets
        let file_type = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata.file_type(),
            Err(_) => continue,
        };
        if file_type.is_dir() {
            descend(&path, doc_table, mem_index);
        } else if file_type.is_file() {
            index_file(&path, doc_table, mem_index);
        }
    }
}

fn index_file(path: &Path, doc_table: &mut DocTable, mem_index: &mut MemIndex) {
    let Some(name) = path.to_str() else {
        warn!(path = %path.display(), "skipping non-UTF-8 path");
        return;
    };

    // fs::read retries interrupted reads internally until EOF.
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(err) => {
            warn!(path = name, %err, "skipping unreadable file");
            return;
        }
    };

    let Some(word_positions) = extract_word_positions(&content) else {
        debug!(path = name, "skipping unindexable file");
        return;
    };

    let doc_id = doc_table.add(name);
    for (_, wp) in word_positions {
        mem_index.add_posting_list(wp.word, doc_id, wp.positions);
    }
}
