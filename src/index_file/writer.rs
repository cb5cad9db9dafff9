//! Index-file writer.
//!
//! Serializes a frozen `MemIndex` + `DocTable` pair in one pass: both
//! regions first, then the CRC32 computed by re-reading exactly those
//! regions back from the file, then the header. The magic number is
//! patched in only after an fsync, so a crash mid-write can never leave
//! behind a file that looks valid. Any failure unlinks the output.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::fs::FileExt;
use std::path::Path;

use crc32fast::Hasher;
use tracing::info;

use crate::doctable::DocTable;
use crate::error::Result;
use crate::memindex::{MemIndex, WordPostings};
use crate::table::HashTable;

use super::layout::{
    checked_i16, checked_i32, BucketRecord, DocIdElementHeader, DoctableElementHeader,
    IndexFileHeader, WordPostingsHeader, BUCKET_LIST_HEADER_SIZE, BUCKET_RECORD_SIZE,
    DOCTABLE_ELEMENT_HEADER_SIZE, DOC_ID_ELEMENT_HEADER_SIZE, ELEMENT_POSITION_SIZE, HEADER_SIZE,
    MAGIC_NUMBER, WORD_POSTINGS_HEADER_SIZE,
};

/// Serialize `mem_index` and `doc_table` to a fresh index file at `path`,
/// returning the total number of bytes written. On failure the partial
/// file is removed.
pub fn write_index(mem_index: &MemIndex, doc_table: &DocTable, path: &Path) -> Result<u64> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;

    match write_index_body(&file, mem_index, doc_table) {
        Ok(total) => {
            info!(
                path = %path.display(),
                bytes = total,
                words = mem_index.num_words(),
                docs = doc_table.num_docs(),
                "index written"
            );
            Ok(total)
        }
        Err(err) => {
            drop(file);
            let _ = fs::remove_file(path);
            Err(err)
        }
    }
}

fn write_index_body(file: &File, mem_index: &MemIndex, doc_table: &DocTable) -> Result<u64> {
    // Regions first; their sizes feed the header we skipped over.
    let doctable_bytes = write_hash_table(
        file,
        HEADER_SIZE,
        doc_table.id_to_name_table(),
        write_doc_name_element,
    )?;
    let memindex_bytes = write_hash_table(
        file,
        HEADER_SIZE + doctable_bytes,
        mem_index.table(),
        write_word_postings_element,
    )?;

    let checksum = checksum_regions(file, HEADER_SIZE, doctable_bytes + memindex_bytes)?;

    let header = IndexFileHeader {
        magic: 0,
        checksum,
        doctable_bytes: checked_i32(doctable_bytes)? as u32,
        memindex_bytes: checked_i32(memindex_bytes)? as u32,
    };
    file.write_all_at(&header.to_bytes(), 0)?;
    file.sync_all()?;

    // Everything below the magic is durable; stamping it makes the file
    // real.
    file.write_all_at(&MAGIC_NUMBER.to_be_bytes(), 0)?;
    file.sync_all()?;

    Ok(HEADER_SIZE + doctable_bytes + memindex_bytes)
}

/// CRC32 over `len` bytes starting at `start`, read back from the file in
/// chunks. The reader recomputes the same quantity when validating.
pub(crate) fn checksum_regions(file: &File, start: u64, len: u64) -> io::Result<u32> {
    let mut hasher = Hasher::new();
    let mut buf = [0u8; 4096];
    let mut offset = start;
    let mut remaining = len;
    while remaining > 0 {
        let chunk = remaining.min(buf.len() as u64) as usize;
        file.read_exact_at(&mut buf[..chunk], offset)?;
        hasher.update(&buf[..chunk]);
        offset += chunk as u64;
        remaining -= chunk as u64;
    }
    Ok(hasher.finalize())
}

/// Serialize one hash table at `offset`: bucket-list header, one record
/// per bucket (empty buckets included), then each non-empty bucket's
/// element-position records and elements. Returns the table's size in
/// bytes.
fn write_hash_table<V>(
    file: &File,
    offset: u64,
    table: &HashTable<V>,
    write_element: fn(&File, u64, u64, &V) -> Result<u64>,
) -> Result<u64> {
    let num_buckets = table.num_buckets() as u64;
    file.write_all_at(&checked_i32(num_buckets)?.to_be_bytes(), offset)?;

    let mut record_pos = offset + BUCKET_LIST_HEADER_SIZE;
    let mut bucket_pos = record_pos + num_buckets * BUCKET_RECORD_SIZE;
    for chain in table.chains() {
        let record = BucketRecord {
            chain_len: checked_i32(chain.len() as u64)?,
            bucket_offset: checked_i32(bucket_pos)?,
        };
        file.write_all_at(&record.to_bytes(), record_pos)?;

        if !chain.is_empty() {
            bucket_pos += write_bucket(file, bucket_pos, chain, write_element)?;
        }
        record_pos += BUCKET_RECORD_SIZE;
    }

    Ok(bucket_pos - offset)
}

/// One bucket: `chain_len` absolute element offsets, then the elements.
fn write_bucket<V>(
    file: &File,
    offset: u64,
    chain: &[(u64, V)],
    write_element: fn(&File, u64, u64, &V) -> Result<u64>,
) -> Result<u64> {
    let mut record_pos = offset;
    let mut element_pos = offset + chain.len() as u64 * ELEMENT_POSITION_SIZE;
    for (key, value) in chain {
        file.write_all_at(&checked_i32(element_pos)?.to_be_bytes(), record_pos)?;
        element_pos += write_element(file, element_pos, *key, value)?;
        record_pos += ELEMENT_POSITION_SIZE;
    }
    Ok(element_pos - offset)
}

/// Doc-table element: `(doc_id, name_len)` header, then the name bytes.
fn write_doc_name_element(file: &File, offset: u64, key: u64, name: &String) -> Result<u64> {
    let header = DoctableElementHeader {
        doc_id: key,
        name_len: checked_i16(name.len(), "document name")?,
    };
    file.write_all_at(&header.to_bytes(), offset)?;
    file.write_all_at(name.as_bytes(), offset + DOCTABLE_ELEMENT_HEADER_SIZE)?;
    Ok(DOCTABLE_ELEMENT_HEADER_SIZE + name.len() as u64)
}

/// Inverted-index element: `(word_len, table_len)` header, the word
/// bytes, then the nested doc-id table.
fn write_word_postings_element(
    file: &File,
    offset: u64,
    _key: u64,
    postings: &WordPostings,
) -> Result<u64> {
    let word_len = checked_i16(postings.word.len(), "word")?;

    // The nested table's size has to be known before the header can go
    // in, so it is written first, at its final resting offset.
    let table_offset = offset + WORD_POSTINGS_HEADER_SIZE + postings.word.len() as u64;
    let table_len = write_hash_table(
        file,
        table_offset,
        &postings.postings,
        write_position_list_element,
    )?;

    let header = WordPostingsHeader {
        word_len,
        table_len: checked_i32(table_len)?,
    };
    file.write_all_at(&header.to_bytes(), offset)?;
    file.write_all_at(
        postings.word.as_bytes(),
        offset + WORD_POSTINGS_HEADER_SIZE,
    )?;

    Ok(WORD_POSTINGS_HEADER_SIZE + postings.word.len() as u64 + table_len)
}

/// Doc-id table element: `(doc_id, num_positions)` header, then the
/// positions.
fn write_position_list_element(
    file: &File,
    offset: u64,
    key: u64,
    positions: &Vec<u32>,
) -> Result<u64> {
    let header = DocIdElementHeader {
        doc_id: key,
        num_positions: checked_i32(positions.len() as u64)?,
    };
    file.write_all_at(&header.to_bytes(), offset)?;

    let mut buf = Vec::with_capacity(positions.len() * 4);
    for &position in positions {
        buf.extend_from_slice(&checked_i32(u64::from(position))?.to_be_bytes());
    }
    file.write_all_at(&buf, offset + DOC_ID_ELEMENT_HEADER_SIZE)?;

    Ok(DOC_ID_ELEMENT_HEADER_SIZE + buf.len() as u64)
}
