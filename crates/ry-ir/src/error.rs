//! Error types for layout loading and saving.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("failed to parse layout: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("layout I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt layout: {0}")]
    CorruptLayout(String),
}

pub type LayoutResult<T> = Result<T, LayoutError>;
