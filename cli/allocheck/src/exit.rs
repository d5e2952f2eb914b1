//! Process exit statuses.

use std::process::ExitCode;

/// Distinct exit status per failing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    /// The snapshot source could not be built.
    SourceConstruction,
    /// The output file could not be created.
    OutputCreate,
    /// Options could not be parsed.
    Usage,
    /// A listing failed before classification.
    Reconcile,
    /// The report could not be encoded.
    Encode,
    /// The output file could not be flushed and closed.
    OutputClose,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::SourceConstruction => 1,
            Self::OutputCreate => 2,
            Self::Usage => 64,
            Self::Reconcile => 97,
            Self::Encode => 98,
            Self::OutputClose => 99,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}
