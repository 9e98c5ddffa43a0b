/// Errors raised for contract violations and rejected input.
///
/// Over-long items and empty buckets are not errors: they come back as
/// over-capacity groups and empty results respectively.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CutError {
    #[error("demand {index}: {reason}")]
    InvalidDemand { index: usize, reason: String },

    #[error("stock {index}: {reason}")]
    InvalidStock { index: usize, reason: String },

    #[error("at least one demand is required")]
    NoDemands,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("capacity {capacity} exceeds the configured maximum of {max}")]
    CapacityTooLarge { capacity: u32, max: u32 },

    #[error("demand pool contains a zero-length item")]
    ZeroLengthItem,

    #[error("combined length {total} exceeds {max}")]
    CombinationTooLong { total: u64, max: u32 },

    #[error("{what} expand to {count} pieces, more than the limit of {max}")]
    TooManyPieces {
        what: &'static str,
        count: u64,
        max: u32,
    },

    #[error("{0}")]
    Input(String),
}

pub type Result<T> = std::result::Result<T, CutError>;
