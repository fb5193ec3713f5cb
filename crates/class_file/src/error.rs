use std::io;

use cesu8::Cesu8DecodingError;
use thiserror::Error;

use crate::constant_pool;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error("Unexpected end of stream")]
    UnexpectedEndOfStream,
    #[error(transparent)]
    IOError(io::Error),
    #[error("Malformed constant pool: {0}")]
    MalformedConstantPool(#[from] MalformedConstantPool),
    #[error("Invalid magic identifier: 0x{0:X}")]
    InvalidMagicIdentifier(u32),
    #[error("Expected {0}, found {1:?}")]
    UnexpectedConstantPoolEntry(&'static str, constant_pool::CpInfo),
    #[error("Invalid constant pool index: {0}")]
    InvalidConstantPoolIndex(u16),
    #[error("Invalid modified UTF-8")]
    InvalidModifiedUtf8(#[from] Cesu8DecodingError),
    #[error("Attribute {name} declares {declared} bytes but its shape consumed {consumed}")]
    AttributeLengthMismatch {
        name: String,
        declared: usize,
        consumed: usize,
    },
    #[error("Too many {what}: {len}")]
    CollectionTooLarge { what: &'static str, len: usize },
}

impl From<io::Error> for ClassFileError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => ClassFileError::UnexpectedEndOfStream,
            _ => ClassFileError::IOError(e),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MalformedConstantPool {
    #[error("constant_pool_count must be at least 1")]
    ZeroCount,
    #[error("Invalid cp info tag {tag} at index {index}")]
    InvalidTag { tag: u8, index: u16 },
    #[error("Utf8 entry at index {index} declares {length} bytes past the end of the stream")]
    Utf8Overrun { index: u16, length: u16 },
    #[error("Double-width entry at index {0} overruns constant_pool_count")]
    WideEntryOverflow(u16),
    #[error("Entry at index {at} references invalid index {index}")]
    InvalidIndex { at: u16, index: u16 },
}
