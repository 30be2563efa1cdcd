use std::fmt;

/// Why a dispatch attempt was requested.
///
/// Only used for logging: triggers coalesce into a single `pending` flag, so
/// the coordinator never needs to know which files caused a re-run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerReason {
    /// One-off trigger at startup to consume files that were already present.
    InitialScan,
    /// One or more new input files settled in the watched directory.
    ///
    /// `name` is the first accepted file of the batch, `merged` counts the
    /// additional files that arrived within the same debounce window.
    NewFile { name: String, merged: usize },
    /// Re-run for triggers that arrived while the previous run was active.
    Pending,
}

impl TriggerReason {
    pub fn new_file(name: impl Into<String>) -> Self {
        TriggerReason::NewFile {
            name: name.into(),
            merged: 0,
        }
    }
}

impl fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerReason::InitialScan => write!(f, "initial scan"),
            TriggerReason::NewFile { name, merged: 0 } => write!(f, "new file: {name}"),
            TriggerReason::NewFile { name, merged } => {
                write!(f, "new file: {name} (+{merged} more)")
            }
            TriggerReason::Pending => write!(f, "pending"),
        }
    }
}
