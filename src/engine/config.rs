use serde::{Deserialize, Serialize};

use crate::utils::limits::{DEFAULT_READ_CHUNK, DEFAULT_WRITE_BUFFER, MIN_CHUNK};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub read_chunk_size: usize,
    pub write_buffer_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK,
            write_buffer_size: DEFAULT_WRITE_BUFFER,
        }
    }
}

impl EngineConfig {
    pub fn chunk_size(&self) -> usize {
        self.read_chunk_size.max(MIN_CHUNK)
    }

    pub fn buffer_size(&self) -> usize {
        self.write_buffer_size.max(MIN_CHUNK)
    }
}
