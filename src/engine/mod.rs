pub mod config;
pub mod frequency;
pub mod huffman;
pub mod codes;
pub mod tree_codec;
pub mod compressor;
pub mod decompressor;
pub mod hash;

pub use compressor::*;
pub use decompressor::*;
