//! Gettext catalogs: binary MO and text PO codecs plus a file-backed
//! message source.
//!
//! # Architecture
//!
//! - `catalog`: in-memory `MessageCatalog` and context-qualified key helpers
//! - `mo_file`: MO binary reader/writer with advisory file locking
//! - `po_file`: PO text reader/writer
//! - `source`: `GettextMessageSource`, resolving `<base>/<language>/<catalog>.mo`

mod catalog;
mod mo_file;
mod po_file;
mod source;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub use catalog::{join_key, split_key, MessageCatalog, CONTEXT_SEPARATOR};
pub use mo_file::{
    read_catalog, read_header, read_messages, write_catalog, CatalogHeader, Endianness, MoFile,
    StringDescriptor, HEADER_SIZE,
};
pub use po_file::{parse_po, render_po, PoFile};
pub use source::{GettextMessageSource, MemoryCache, MessageCache, MessageSource, Messages};

/// Errors raised while reading or writing catalogs.
///
/// All of them are fatal for the current call; nothing is retried.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unable to open catalog {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to lock catalog {}: {source}", .path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("catalog I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("invalid MO file (magic: {0:#010x})")]
    BadMagic(u32),

    #[error("invalid MO file revision: {0}")]
    UnsupportedRevision(u32),

    #[error("malformed catalog: {0}")]
    Malformed(String),

    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: u32 },

    #[error("invalid PO file at line {line}: {message}")]
    PoSyntax { line: usize, message: String },
}
