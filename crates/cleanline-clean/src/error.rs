//! Domain errors raised while loading or cleaning a dataset

/// Carried inside `anyhow::Error`; callers can `downcast_ref::<CleanError>()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanError {
    /// A required column is not in the header.
    MissingColumn(String),
    /// The index column holds the same id twice (rows are 1-based, header excluded).
    DuplicateId {
        id: String,
        first_row: usize,
        row: usize,
    },
    /// A non-empty price cell that is not a number.
    InvalidPrice { id: String, value: String },
}

impl std::fmt::Display for CleanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn(name) => write!(f, "missing column '{name}'"),
            Self::DuplicateId { id, first_row, row } => {
                write!(f, "duplicate id '{id}' at rows {first_row} and {row}")
            }
            Self::InvalidPrice { id, value } => {
                write!(f, "row id '{id}': price '{value}' is not a number")
            }
        }
    }
}

impl std::error::Error for CleanError {}
