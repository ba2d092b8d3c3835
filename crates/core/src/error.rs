use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which precondition on the scan root failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryProblem {
    DoesNotExist,
    NotADirectory,
    NotReadable,
}

impl fmt::Display for DirectoryProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DirectoryProblem::DoesNotExist => "does not exist",
            DirectoryProblem::NotADirectory => "is not a directory",
            DirectoryProblem::NotReadable => "is not readable",
        };
        f.write_str(msg)
    }
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid directory {}: {problem}", path.display())]
    InvalidDirectory {
        path: PathBuf,
        problem: DirectoryProblem,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid exclude pattern: {0}")]
    Pattern(#[from] globset::Error),
}

impl ScanError {
    pub fn invalid_directory(path: impl Into<PathBuf>, problem: DirectoryProblem) -> Self {
        ScanError::InvalidDirectory {
            path: path.into(),
            problem,
        }
    }
}
