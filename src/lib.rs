//! Lossy whiteboard image compression.
//!
//! A decoded raster is decomposed into a quadtree of flat-color regions
//! (`quad`), the tree is serialized to a compact textual form, and the
//! resulting character stream is Huffman coded into a byte-packed binary
//! container (`wb`) with a companion symbol table file. Decompression runs
//! the same stages backwards and re-renders the raster from the tree.
//!
//! The lossy step is the quantization of every region to a five color
//! palette (`color`); compressing an already-compressed image a second
//! time loses nothing further.
//!
//! Locating the whiteboard in a photograph, perspective correction, and
//! image container formats are upstream concerns; collaborators hand this
//! crate a decoded `raster::Raster` and get one back.

mod tools;
pub mod color;
pub mod raster;
pub mod quad;
pub mod wb;

type DYNERR = Box<dyn std::error::Error>;

/// Codec Errors
///
/// I/O failures propagate separately as `std::io::Error`.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("width or height not parseable or beyond 16 bits")]
    MalformedHeader,
    #[error("input ended in the middle of a tree or symbol")]
    TruncatedStream,
    #[error("unrecognized character `{0}` in tree stream")]
    UnknownSymbol(char),
    #[error("symbol table line is not of the form `character code`")]
    MalformedSymbolTable,
    #[error("no symbols to code")]
    DegenerateAlphabet,
    #[error("image has no pixels")]
    EmptyImage
}

/// Options controlling compression
pub struct Options {
    /// maximum sample spread a region may have and still become a leaf
    pub split_threshold: f64,
    /// bit stream buffer size in bytes
    pub chunk_size: usize
}

pub const STD_OPTIONS: Options = Options {
    split_threshold: 45.0,
    chunk_size: 8
};
