/// Error type definitions
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HashError {
    #[error("Invalid state length: expected {expected} bytes, got {actual}")]
    InvalidStateLength { expected: usize, actual: usize },

    #[error("Invalid hex encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Resume offset {0} is not a multiple of the 64-byte block size")]
    UnalignedResume(u64),
}

pub type Result<T> = std::result::Result<T, HashError>;
