//! ASCII text tokenizer.
//!
//! A file is indexable iff every byte is in `0x01..=0x7F` and at least one
//! byte is an ASCII letter; anything else (binary files, UTF-8 beyond
//! ASCII) is rejected whole and the caller skips the file. Words are
//! maximal runs of ASCII letters, lowercased, recorded with the byte
//! offset of the run's first byte.

use crate::table::{fnv_hash_64, HashTable};

/// One word of a single document, with every byte offset at which it
/// occurs, in document order.
#[derive(Debug)]
pub struct WordPositions {
    pub word: String,
    pub positions: Vec<u32>,
}

/// Split `content` into words and their byte offsets.
///
/// Returns `None` when the content is not indexable: empty, containing a
/// NUL or non-ASCII byte, or containing no letters at all. The returned
/// table is keyed by `fnv_hash_64(word)` and never contains an empty
/// positions list.
pub fn extract_word_positions(content: &[u8]) -> Option<HashTable<WordPositions>> {
    if content.is_empty() {
        return None;
    }
    if content.iter().any(|&b| b == 0x00 || b > 0x7F) {
        return None;
    }

    let mut table = HashTable::new();
    let mut run_start: Option<usize> = None;
    for (i, &byte) in content.iter().enumerate() {
        if byte.is_ascii_alphabetic() {
            if run_start.is_none() {
                run_start = Some(i);
            }
        } else if let Some(start) = run_start.take() {
            add_word_position(&mut table, &content[start..i], start as u32);
        }
    }
    // A run that reaches end-of-input still counts.
    if let Some(start) = run_start {
        add_word_position(&mut table, &content[start..], start as u32);
    }

    if table.is_empty() {
        None
    } else {
        Some(table)
    }
}

/// Split a query line into lowercased words, the same way the tokenizer
/// would. Shells and the HTTP front end share this so a query term always
/// matches what indexing produced.
pub fn split_query(line: &str) -> Vec<String> {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| token.to_ascii_lowercase())
        .collect()
}

fn add_word_position(table: &mut HashTable<WordPositions>, raw: &[u8], position: u32) {
    let word: String = raw.iter().map(|b| b.to_ascii_lowercase() as char).collect();
    let key = fnv_hash_64(word.as_bytes());

    match table.find_mut(key) {
        Some(entry) => {
            // The 64-bit key picked the slot; the stored bytes decide the
            // match. Two distinct words on one key would poison the index.
            assert!(
                entry.word == word,
                "hash collision between words {:?} and {:?}",
                entry.word,
                word
            );
            entry.positions.push(position);
        }
        None => {
            table.insert(
                key,
                WordPositions {
                    word,
                    positions: vec![position],
                },
            );
        }
    }
}
