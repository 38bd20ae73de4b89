//! Transfer tasks built from command-line arguments

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::errors::DomainError;

/// Operating mode selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Listen,
    Upload,
}

impl FromStr for TransferMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "listen" => Ok(Self::Listen),
            "upload" => Ok(Self::Upload),
            _ => Err(DomainError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Listen => "listen",
            Self::Upload => "upload",
        };
        write!(f, "{s}")
    }
}

/// One run's worth of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferTask {
    /// Poll the folder until `round_limit` files have been downloaded and deleted
    Listen { round_limit: u32 },
    /// Push the given files, in order, once
    Upload { paths: Vec<PathBuf> },
}

impl TransferTask {
    /// Builds a task from the mode and the arguments that follow it
    ///
    /// `listen` takes exactly one non-negative integer. `upload` takes one
    /// or more paths.
    pub fn from_args(mode: TransferMode, args: &[String]) -> Result<Self, DomainError> {
        match mode {
            TransferMode::Listen => match args {
                [limit] => limit
                    .trim()
                    .parse::<u32>()
                    .map(|round_limit| Self::Listen { round_limit })
                    .map_err(|_| DomainError::InvalidRoundLimit(limit.clone())),
                _ => Err(DomainError::ValidationFailed(format!(
                    "listen expects exactly one round limit, got {} arguments",
                    args.len()
                ))),
            },
            TransferMode::Upload => {
                if args.is_empty() {
                    return Err(DomainError::ValidationFailed(
                        "upload expects at least one file path".to_string(),
                    ));
                }
                Ok(Self::Upload {
                    paths: args.iter().map(PathBuf::from).collect(),
                })
            }
        }
    }

    pub fn mode(&self) -> TransferMode {
        match self {
            Self::Listen { .. } => TransferMode::Listen,
            Self::Upload { .. } => TransferMode::Upload,
        }
    }
}
