/// Default chunk size for reading the source during encode/decode
pub const DEFAULT_READ_CHUNK: usize = 64 * 1024;

/// Default capacity of the buffered output writer
pub const DEFAULT_WRITE_BUFFER: usize = 64 * 1024;

/// Smallest chunk the engine will accept from configuration
pub const MIN_CHUNK: usize = 1;
