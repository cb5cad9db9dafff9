//! Binary index-file format: the on-disk form of a `MemIndex` +
//! `DocTable` pair, plus the writer and the lazy readers over it.
//!
//! # File layout
//!
//! All integers are big-endian. A 16-byte header (magic, CRC32 of the two
//! regions, region sizes) is followed by the document table region and the
//! inverted-index region. Each region is a serialized hash table: a bucket
//! count, one record per bucket (chain length + absolute offset), then the
//! chain contents. Inverted-index elements nest a second hash table per
//! word, mapping doc ids to position lists.
//!
//! The magic number is patched in last, after everything beneath it has
//! been fsynced, so a torn write never yields a file that passes the magic
//! check.

mod layout;
mod reader;
mod writer;

pub use layout::*;
pub use reader::*;
pub use writer::*;
