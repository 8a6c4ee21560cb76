use thiserror::Error;

/// Errors reported by the matrix engine and the network built on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Storage for a `rows x cols` matrix could not be reserved.
    #[error("allocation failed for a {rows}x{cols} matrix")]
    Allocation { rows: usize, cols: usize },

    /// Operand dimensions violate an operation's precondition.
    #[error("shape mismatch in {op}: expected {expected}, got {got}")]
    ShapeMismatch {
        op: &'static str,
        expected: String,
        got: String,
    },

    #[error("invalid construction: {0}")]
    InvalidConstruction(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A network operation was called out of the feedforward/backprop/update order.
    #[error("{op} called in phase {phase}")]
    InvalidPhase { op: &'static str, phase: &'static str },

    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn shape(
        op: &'static str,
        expected: (usize, usize),
        got: (usize, usize),
    ) -> Self {
        Error::ShapeMismatch {
            op,
            expected: format!("{}x{}", expected.0, expected.1),
            got: format!("{}x{}", got.0, got.1),
        }
    }
}
