use std::path::PathBuf;

pub type Result<T, E = ChapterError> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum ChapterError {
    /// Malformed clock string, display line or ffmetadata value.
    #[error("Format error: {0}")]
    Format(String),

    /// Edited chapters that cannot be written back.
    #[error("{0}")]
    Validation(String),

    #[error("{tool} failed on {}: {reason}", .path.display())]
    Process {
        tool: String,
        path: PathBuf,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChapterError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    pub(crate) fn process(
        tool: impl Into<String>,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Process {
            tool: tool.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }
}
