//! # huffpress
//!
//! Static Huffman compression of arbitrary byte buffers.
//!
//! * `huff` has the engines, start with `huff::compress_slice` and `huff::expand_slice`
//! * `container` describes the envelope that holds the code tree and the payload
//! * `tools` has the building blocks (frequency counts, code tree, code table, bit packing)

pub mod tools;
pub mod container;
pub mod huff;

type DYNERR = Box<dyn std::error::Error>;

/// Compression Errors
#[derive(thiserror::Error,Debug,PartialEq)]
pub enum Error {
    /// magic marker is missing or does not match
    #[error("file format mismatch")]
    FileFormatMismatch,
    /// header, tree, or payload is truncated or inconsistent
    #[error("corrupt data: {0}")]
    CorruptData(&'static str),
    #[error("file too large")]
    FileTooLarge
}

/// Options controlling the stream functions
#[derive(Clone)]
pub struct Options {
    /// return error if the input is larger
    pub max_file_size: u64
}

pub const STD_OPTIONS: Options = Options {
    max_file_size: u32::MAX as u64
};
