use std::fmt;
use std::io;

#[derive(Debug)]
pub enum CodecError {
    Io(io::Error),
    CorruptHeader(&'static str),
    CorruptTree(&'static str),
    LengthMismatch { declared_bits: u64, bytes_read: u64 },
    InputTooLarge(u64),
    InputChanged,
}

impl CodecError {
    /// True for the structural failures a damaged or forged stream produces.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            CodecError::CorruptHeader(_)
                | CodecError::CorruptTree(_)
                | CodecError::LengthMismatch { .. }
        )
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Io(e) =>
                write!(f, "i/o error: {}", e),
            CodecError::CorruptHeader(what) =>
                write!(f, "corrupt header: {}", what),
            CodecError::CorruptTree(what) =>
                write!(f, "corrupt tree: {}", what),
            CodecError::LengthMismatch { declared_bits, bytes_read } =>
                write!(f, "payload length mismatch: {} bytes read for {} declared bits", bytes_read, declared_bits),
            CodecError::InputTooLarge(bits) =>
                write!(f, "input too large: payload needs {} bits", bits),
            CodecError::InputChanged =>
                write!(f, "input changed between passes"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodecError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(e: io::Error) -> Self {
        CodecError::Io(e)
    }
}
