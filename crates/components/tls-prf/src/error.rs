use core::fmt;
use std::error::Error;

/// A PRF error.
#[derive(Debug, thiserror::Error)]
pub struct PrfError {
    kind: ErrorKind,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl PrfError {
    fn new<E>(kind: ErrorKind, source: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self {
            kind,
            source: Some(source.into()),
        }
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, msg.into())
    }

    pub(crate) fn key(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Key, msg.into())
    }

    pub(crate) fn state(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::State, msg.into())
    }

    pub(crate) fn bounds(offset: usize, length: usize, capacity: usize) -> Self {
        Self::new(
            ErrorKind::Bounds,
            format!("offset {offset} with length {length} exceeds buffer of {capacity} bytes"),
        )
    }

    /// Returns `true` if a required input was missing or malformed.
    pub fn is_config(&self) -> bool {
        matches!(self.kind, ErrorKind::Config)
    }

    /// Returns `true` if a MAC key was rejected.
    pub fn is_key(&self) -> bool {
        matches!(self.kind, ErrorKind::Key)
    }

    /// Returns `true` if the operation was not valid in the current state.
    pub fn is_state(&self) -> bool {
        matches!(self.kind, ErrorKind::State)
    }

    /// Returns `true` if an offset or length was out of range.
    pub fn is_bounds(&self) -> bool {
        matches!(self.kind, ErrorKind::Bounds)
    }
}

#[derive(Debug)]
enum ErrorKind {
    Config,
    Key,
    State,
    Bounds,
}

impl fmt::Display for PrfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::Config => write!(f, "config error")?,
            ErrorKind::Key => write!(f, "invalid key error")?,
            ErrorKind::State => write!(f, "state error")?,
            ErrorKind::Bounds => write!(f, "bounds error")?,
        }

        if let Some(ref source) = self.source {
            write!(f, " caused by: {}", source)?;
        }

        Ok(())
    }
}

/// Returns `offset..offset + length` if it lies within a buffer of `capacity`
/// bytes.
pub(crate) fn checked_range(
    capacity: usize,
    offset: usize,
    length: usize,
) -> Result<core::ops::Range<usize>, PrfError> {
    match offset.checked_add(length) {
        Some(end) if end <= capacity => Ok(offset..end),
        _ => Err(PrfError::bounds(offset, length, capacity)),
    }
}
