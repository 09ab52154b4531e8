use thiserror::Error;

/// Errors surfaced by ring buffer construction, event framing and engine setup.
///
/// Only [`Error::BufferFull`] is expected at runtime, and only on the control
/// thread. The real-time side never returns errors; it clamps, drops or counts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("ring buffer capacity {0} is not a non-zero power of two")]
    InvalidCapacity(usize),
    #[error("ring buffer full: {needed} bytes needed, {available} free")]
    BufferFull { needed: usize, available: usize },
    #[error("frame of {frame} bytes exceeds capacity of {capacity} bytes")]
    FrameTooLarge { frame: usize, capacity: usize },
    #[error("parameter `{0}` is already registered")]
    DuplicateParameter(String),
    #[error("parameter `{0}` not found")]
    UnknownParameter(String),
    #[error("invalid parameter `{id}`: {reason}")]
    InvalidParameter { id: String, reason: &'static str },
    #[error("invalid engine config: {0}")]
    InvalidConfig(&'static str),
}

impl Error {
    pub(crate) fn invalid_parameter(id: impl Into<String>, reason: &'static str) -> Self {
        Error::InvalidParameter {
            id: id.into(),
            reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
