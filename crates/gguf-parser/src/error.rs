use thiserror::Error;

#[derive(Error, Debug)]
pub enum GGUFError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected end of file at offset {offset} (wanted {wanted} more bytes)")]
    UnexpectedEof { offset: u64, wanted: u64 },

    #[error("Malformed GGUF: {0}")]
    Malformed(String),

    #[error("Not a GGUF file (magic 0x{0:08X})")]
    NotGGUF(u32),

    #[error("Unsupported GGUF version: {0}")]
    UnsupportedVersion(u32),

    #[error("Unsupported metadata value type: {0}")]
    UnsupportedMetadataType(u32),

    #[error("Tensor not found: {0}")]
    NotFound(String),

    #[error("Missing required column: {0}")]
    MissingRequiredColumn(String),
}

pub type Result<T> = std::result::Result<T, GGUFError>;
