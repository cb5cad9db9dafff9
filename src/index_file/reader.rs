//! Index-file readers: lazy, bounded views over an open index file.
//!
//! Nothing is slurped into memory; every lookup is a handful of
//! positioned reads that walk from the header to a bucket record to the
//! element offsets to the element itself. Readers share one `Arc<File>`
//! per index and use `read_exact_at` throughout, so there is no seek
//! cursor to serialize; a query that wants isolation simply opens its own
//! `FileIndexReader`.
//!
//! Failure policy: a bad magic number, checksum mismatch, short read, or
//! nonsensical record surfaces as `CorruptIndex`; a key that simply is not
//! there is `Ok(None)`. Partial results never escape.

use std::fs::File;
use std::io;
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::doctable::DocId;
use crate::error::{Result, TrawlerError};
use crate::table::fnv_hash_64;

use super::layout::{
    BucketRecord, DocIdElementHeader, DoctableElementHeader, IndexFileHeader, WordPostingsHeader,
    BUCKET_LIST_HEADER_SIZE, BUCKET_RECORD_SIZE, DOCTABLE_ELEMENT_HEADER_SIZE,
    DOC_ID_ELEMENT_HEADER_SIZE, ELEMENT_POSITION_SIZE, HEADER_SIZE, MAGIC_NUMBER,
    WORD_POSTINGS_HEADER_SIZE,
};
use super::writer::checksum_regions;

/// Shared handle on an open index file: the file plus its path for error
/// context.
#[derive(Clone, Debug)]
struct IndexFile {
    file: Arc<File>,
    path: Arc<PathBuf>,
}

impl IndexFile {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<()> {
        self.file.read_exact_at(buf, offset).map_err(|err| {
            if err.kind() == io::ErrorKind::UnexpectedEof {
                self.corrupt(format!(
                    "short read of {} bytes at offset {offset}",
                    buf.len()
                ))
            } else {
                TrawlerError::Io(err)
            }
        })
    }

    fn corrupt(&self, detail: String) -> TrawlerError {
        TrawlerError::CorruptIndex {
            path: (*self.path).clone(),
            detail,
        }
    }
}

/// Opens an index file, verifies its integrity, and hands out readers for
/// the two regions.
#[derive(Debug)]
pub struct FileIndexReader {
    file: IndexFile,
    header: IndexFileHeader,
}

impl FileIndexReader {
    /// Open `path` and verify the header: the magic number always, the
    /// CRC32 of both regions too when `validate` is set. Either mismatch
    /// is fatal for the whole file.
    pub fn open(path: &Path, validate: bool) -> Result<Self> {
        let file = IndexFile {
            file: Arc::new(File::open(path)?),
            path: Arc::new(path.to_path_buf()),
        };

        let mut buf = [0u8; HEADER_SIZE as usize];
        file.read_at(&mut buf, 0)?;
        let header = IndexFileHeader::from_bytes(&buf);

        if header.magic != MAGIC_NUMBER {
            return Err(file.corrupt(format!("bad magic number {:#010x}", header.magic)));
        }

        let expected_len =
            HEADER_SIZE + u64::from(header.doctable_bytes) + u64::from(header.memindex_bytes);
        let actual_len = file.file.metadata()?.len();
        if actual_len != expected_len {
            return Err(file.corrupt(format!(
                "file is {actual_len} bytes but the header claims {expected_len}"
            )));
        }

        if validate {
            let computed = checksum_regions(
                &file.file,
                HEADER_SIZE,
                u64::from(header.doctable_bytes) + u64::from(header.memindex_bytes),
            )?;
            if computed != header.checksum {
                return Err(file.corrupt(format!(
                    "checksum mismatch: stored {:#010x}, computed {computed:#010x}",
                    header.checksum
                )));
            }
            debug!(path = %path.display(), "index checksum verified");
        }

        Ok(Self { file, header })
    }

    pub fn doc_table_reader(&self) -> Result<DocTableReader> {
        Ok(DocTableReader {
            table: HashTableReader::open(self.file.clone(), HEADER_SIZE)?,
        })
    }

    pub fn index_table_reader(&self) -> Result<IndexTableReader> {
        let offset = HEADER_SIZE + u64::from(self.header.doctable_bytes);
        Ok(IndexTableReader {
            table: HashTableReader::open(self.file.clone(), offset)?,
        })
    }
}

/// Generic reader for one serialized hash table: resolves a key to the
/// absolute offsets of the elements in its bucket. Content-specific
/// readers wrap this and parse the elements themselves.
#[derive(Debug)]
struct HashTableReader {
    file: IndexFile,
    base_offset: u64,
    num_buckets: u64,
}

impl HashTableReader {
    fn open(file: IndexFile, base_offset: u64) -> Result<Self> {
        let mut buf = [0u8; BUCKET_LIST_HEADER_SIZE as usize];
        file.read_at(&mut buf, base_offset)?;
        let num_buckets = i32::from_be_bytes(buf);
        if num_buckets <= 0 {
            return Err(file.corrupt(format!(
                "table at offset {base_offset} claims {num_buckets} buckets"
            )));
        }

        Ok(Self {
            file,
            base_offset,
            num_buckets: num_buckets as u64,
        })
    }

    fn bucket_record(&self, bucket: u64) -> Result<BucketRecord> {
        let offset = self.base_offset + BUCKET_LIST_HEADER_SIZE + bucket * BUCKET_RECORD_SIZE;
        let mut buf = [0u8; BUCKET_RECORD_SIZE as usize];
        self.file.read_at(&mut buf, offset)?;
        let record = BucketRecord::from_bytes(&buf);
        if record.chain_len < 0 || record.bucket_offset < 0 {
            return Err(self.file.corrupt(format!(
                "bucket record at offset {offset} has negative fields"
            )));
        }
        Ok(record)
    }

    /// Absolute offsets of every element in `key`'s bucket. Empty when
    /// the bucket's chain is empty; whether any element actually matches
    /// the key is for the content parser to decide.
    fn element_offsets(&self, key: u64) -> Result<Vec<u64>> {
        let record = self.bucket_record(key % self.num_buckets)?;
        if record.chain_len == 0 {
            return Ok(Vec::new());
        }
        self.chain_element_offsets(&record)
    }

    /// Element offsets of every bucket, in bucket order.
    fn all_element_offsets(&self) -> Result<Vec<u64>> {
        let mut offsets = Vec::new();
        for bucket in 0..self.num_buckets {
            let record = self.bucket_record(bucket)?;
            if record.chain_len > 0 {
                offsets.extend(self.chain_element_offsets(&record)?);
            }
        }
        Ok(offsets)
    }

    fn chain_element_offsets(&self, record: &BucketRecord) -> Result<Vec<u64>> {
        let chain_len = record.chain_len as usize;
        let mut buf = vec![0u8; chain_len * ELEMENT_POSITION_SIZE as usize];
        self.file.read_at(&mut buf, record.bucket_offset as u64)?;

        let mut offsets = Vec::with_capacity(chain_len);
        for chunk in buf.chunks_exact(ELEMENT_POSITION_SIZE as usize) {
            let position = i32::from_be_bytes(chunk.try_into().unwrap());
            if position < 0 {
                return Err(self
                    .file
                    .corrupt(format!("negative element offset {position}")));
            }
            offsets.push(position as u64);
        }
        Ok(offsets)
    }
}

/// Reader for the document-table region: `doc id -> name`.
#[derive(Debug)]
pub struct DocTableReader {
    table: HashTableReader,
}

impl DocTableReader {
    /// Build a corruption error naming this reader's file, for callers
    /// that detect cross-region inconsistencies the reader itself cannot
    /// see.
    pub(crate) fn corruption(&self, detail: String) -> TrawlerError {
        self.table.file.corrupt(detail)
    }

    /// Resolve a doc id to its document name.
    pub fn lookup_doc_id(&self, doc_id: DocId) -> Result<Option<String>> {
        for element_offset in self.table.element_offsets(doc_id)? {
            let mut buf = [0u8; DOCTABLE_ELEMENT_HEADER_SIZE as usize];
            self.table.file.read_at(&mut buf, element_offset)?;
            let header = DoctableElementHeader::from_bytes(&buf);
            if header.doc_id != doc_id {
                continue;
            }
            if header.name_len < 0 {
                return Err(self.table.file.corrupt(format!(
                    "negative name length for doc {doc_id}"
                )));
            }

            let mut name = vec![0u8; header.name_len as usize];
            self.table
                .file
                .read_at(&mut name, element_offset + DOCTABLE_ELEMENT_HEADER_SIZE)?;
            let name = String::from_utf8(name).map_err(|_| {
                self.table
                    .file
                    .corrupt(format!("doc {doc_id} has a non-UTF-8 name"))
            })?;
            return Ok(Some(name));
        }
        Ok(None)
    }
}

/// Reader for the inverted-index region: `word -> doc-id table`.
#[derive(Debug)]
pub struct IndexTableReader {
    table: HashTableReader,
}

impl IndexTableReader {
    /// Look up a word, returning a reader over its nested doc-id table.
    /// The match is decided by the stored word bytes, not just the 64-bit
    /// key, so hash collisions cannot alias two words.
    pub fn lookup_word(&self, word: &str) -> Result<Option<DocIdTableReader>> {
        let key = fnv_hash_64(word.as_bytes());
        for element_offset in self.table.element_offsets(key)? {
            let mut buf = [0u8; WORD_POSTINGS_HEADER_SIZE as usize];
            self.table.file.read_at(&mut buf, element_offset)?;
            let header = WordPostingsHeader::from_bytes(&buf);
            if header.word_len < 0 || header.table_len < 0 {
                return Err(self.table.file.corrupt(format!(
                    "word element at offset {element_offset} has negative lengths"
                )));
            }
            if header.word_len as usize != word.len() {
                continue;
            }

            let mut stored = vec![0u8; header.word_len as usize];
            self.table
                .file
                .read_at(&mut stored, element_offset + WORD_POSTINGS_HEADER_SIZE)?;
            if stored != word.as_bytes() {
                continue;
            }

            let inner_offset =
                element_offset + WORD_POSTINGS_HEADER_SIZE + header.word_len as u64;
            return Ok(Some(DocIdTableReader {
                table: HashTableReader::open(self.table.file.clone(), inner_offset)?,
            }));
        }
        Ok(None)
    }
}

/// Reader for one word's nested table: `doc id -> positions`.
pub struct DocIdTableReader {
    table: HashTableReader,
}

impl DocIdTableReader {
    /// The full ordered positions list for one document.
    pub fn lookup_doc_id(&self, doc_id: DocId) -> Result<Option<Vec<u32>>> {
        for element_offset in self.table.element_offsets(doc_id)? {
            let header = self.element_header(element_offset)?;
            if header.doc_id != doc_id {
                continue;
            }

            let count = header.num_positions as usize;
            let mut buf = vec![0u8; count * 4];
            self.table
                .file
                .read_at(&mut buf, element_offset + DOC_ID_ELEMENT_HEADER_SIZE)?;

            let mut positions = Vec::with_capacity(count);
            for chunk in buf.chunks_exact(4) {
                let position = i32::from_be_bytes(chunk.try_into().unwrap());
                if position < 0 {
                    return Err(self
                        .table
                        .file
                        .corrupt(format!("negative word position {position}")));
                }
                positions.push(position as u32);
            }
            return Ok(Some(positions));
        }
        Ok(None)
    }

    /// Every `(doc id, occurrence count)` pair in this table, which is
    /// the rank-only fast path: one header read per element and no
    /// position data.
    pub fn doc_id_list(&self) -> Result<Vec<(DocId, u32)>> {
        let mut list = Vec::new();
        for element_offset in self.table.all_element_offsets()? {
            let header = self.element_header(element_offset)?;
            list.push((header.doc_id, header.num_positions as u32));
        }
        Ok(list)
    }

    fn element_header(&self, element_offset: u64) -> Result<DocIdElementHeader> {
        let mut buf = [0u8; DOC_ID_ELEMENT_HEADER_SIZE as usize];
        self.table.file.read_at(&mut buf, element_offset)?;
        let header = DocIdElementHeader::from_bytes(&buf);
        if header.num_positions < 0 {
            return Err(self.table.file.corrupt(format!(
                "doc {} claims {} positions",
                header.doc_id, header.num_positions
            )));
        }
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use crate::doctable::DocTable;
    use crate::index_file::write_index;
    use crate::memindex::MemIndex;

    fn small_index() -> (TempDir, PathBuf) {
        let mut doc_table = DocTable::new();
        let one = doc_table.add("one.txt");
        let two = doc_table.add("two.txt");

        let mut mem_index = MemIndex::new();
        mem_index.add_posting_list("dog".to_string(), one, vec![0, 8]);
        mem_index.add_posting_list("cat".to_string(), one, vec![4]);
        mem_index.add_posting_list("cat".to_string(), two, vec![0, 4]);

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("small.idx");
        write_index(&mem_index, &doc_table, &path).unwrap();
        (tmp, path)
    }

    #[test]
    fn test_lookups_against_written_file() {
        let (_tmp, path) = small_index();
        let reader = FileIndexReader::open(&path, true).unwrap();

        let doc_reader = reader.doc_table_reader().unwrap();
        assert_eq!(doc_reader.lookup_doc_id(1).unwrap().unwrap(), "one.txt");
        assert_eq!(doc_reader.lookup_doc_id(2).unwrap().unwrap(), "two.txt");
        assert!(doc_reader.lookup_doc_id(3).unwrap().is_none());

        let index_reader = reader.index_table_reader().unwrap();
        let cat = index_reader.lookup_word("cat").unwrap().unwrap();
        assert_eq!(cat.lookup_doc_id(1).unwrap().unwrap(), vec![4]);
        assert_eq!(cat.lookup_doc_id(2).unwrap().unwrap(), vec![0, 4]);

        let mut list = cat.doc_id_list().unwrap();
        list.sort_unstable();
        assert_eq!(list, vec![(1, 1), (2, 2)]);

        assert!(index_reader.lookup_word("mouse").unwrap().is_none());
        // Prefix of a stored word: same bucket chain is scanned, stored
        // bytes reject it.
        assert!(index_reader.lookup_word("ca").unwrap().is_none());
    }

    #[test]
    fn test_negative_bucket_count_is_corrupt() {
        let (_tmp, path) = small_index();

        // Clobber the doc-table region's bucket count; without CRC
        // validation the damage surfaces at reader construction.
        let mut bytes = fs::read(&path).unwrap();
        bytes[HEADER_SIZE as usize..HEADER_SIZE as usize + 4]
            .copy_from_slice(&(-1i32).to_be_bytes());
        fs::write(&path, bytes).unwrap();

        let reader = FileIndexReader::open(&path, false).unwrap();
        let err = reader.doc_table_reader().unwrap_err();
        assert!(err.is_corruption(), "got {err}");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = FileIndexReader::open(Path::new("/nonexistent/corpus.idx"), false).unwrap_err();
        assert!(!err.is_corruption());
    }

    #[test]
    fn test_validation_rejects_flipped_region_byte() {
        let (_tmp, path) = small_index();

        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        fs::write(&path, bytes).unwrap();

        assert!(FileIndexReader::open(&path, false).is_ok());
        let err = FileIndexReader::open(&path, true).unwrap_err();
        assert!(err.is_corruption(), "got {err}");
    }
}
