use std::error::Error;
use std::fmt;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Io,
    Parse,
    FieldNotFound,
    ValueMismatch,
    InvalidValue,
    UnsupportedOperation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub(crate) fn io_at(action: &str, path: &Path, err: io::Error) -> Self {
        Self::new(
            CoreErrorCode::Io,
            format!("failed to {action} {}: {err}", path.display()),
        )
    }

    pub(crate) fn unknown_slot(kind: &str, index: usize, limit: usize) -> Self {
        Self::new(
            CoreErrorCode::UnsupportedOperation,
            format!("invalid {kind} index {index}, expected 0..{}", limit - 1),
        )
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for CoreError {}
