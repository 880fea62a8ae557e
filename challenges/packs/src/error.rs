use thiserror::Error;

/// Input rejected before any graph is built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    #[error("at least one pack size is required")]
    NoPackSizes,

    #[error("pack sizes must be positive, got {0}")]
    NonPositivePackSize(i64),

    #[error("quantity {quantity} exceeds the limit of {limit}")]
    QuantityTooLarge { quantity: i64, limit: i64 },

    #[error("{count} pack sizes exceeds the limit of {limit}")]
    TooManyPackSizes { count: usize, limit: usize },

    #[error("quantity {quantity} with {sizes} pack sizes needs up to {edges} edges, over the limit of {limit}")]
    TooMuchWork {
        quantity: i64,
        sizes: usize,
        edges: u64,
        limit: u64,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    /// The search could not walk from the root to the chosen candidate. This
    /// is a defect in generation or pruning, never a problem with the input.
    #[error("internal error: remaining quantity {target} unreachable from {root}")]
    Unreachable { root: i64, target: i64 },
}

impl SolveError {
    /// True for failures the caller can fix by changing the request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SolveError::InvalidInput(_))
    }
}
