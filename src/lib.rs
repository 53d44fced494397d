//! Static Huffman compression for byte streams.
//!
//! A stream is a serialized code tree followed by the bit-packed payload.
//! Encoding needs two passes over the source; decoding is a single pass.

pub mod config;
pub mod engine;
pub mod protocol;
pub mod utils;
pub mod verify;

pub use engine::config::EngineConfig;
pub use engine::{
    compress, compress_buffered, compress_bytes, decompress, decompress_bytes,
    CompressionStats, DecompressionStats,
};
pub use protocol::{CodecError, HeaderSummary, StreamHeader};
