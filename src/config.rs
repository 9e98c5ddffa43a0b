use serde::{Deserialize, Serialize};

use crate::error::{CutError, Result};

/// Standard raw-material length used when a tube type has no stock of its own.
pub const DEFAULT_STOCK_LENGTH: u32 = 5850;

/// Upper bound on any capacity handed to the knapsack table.
pub const MAX_CAPACITY: u32 = 10_000;

/// Upper bound on expanded demand pieces, and separately on expanded stock
/// units, in one run. Together with `MAX_CAPACITY` this caps the knapsack
/// table at about 50 MB.
pub const MAX_PIECES: u32 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutConfig {
    pub default_stock_length: u32,
    pub max_capacity: u32,
    pub max_pieces: u32,
}

impl Default for CutConfig {
    fn default() -> Self {
        Self {
            default_stock_length: DEFAULT_STOCK_LENGTH,
            max_capacity: MAX_CAPACITY,
            max_pieces: MAX_PIECES,
        }
    }
}

impl CutConfig {
    pub fn with_default_stock_length(mut self, length: u32) -> Self {
        self.default_stock_length = length;
        self
    }

    pub fn with_max_capacity(mut self, max_capacity: u32) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    pub fn with_max_pieces(mut self, max_pieces: u32) -> Self {
        self.max_pieces = max_pieces;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_stock_length == 0 {
            return Err(CutError::InvalidConfig(
                "default stock length must be non-zero".to_string(),
            ));
        }
        if self.max_capacity == 0 {
            return Err(CutError::InvalidConfig(
                "max capacity must be non-zero".to_string(),
            ));
        }
        if self.default_stock_length > self.max_capacity {
            return Err(CutError::InvalidConfig(format!(
                "default stock length {} exceeds max capacity {}",
                self.default_stock_length, self.max_capacity
            )));
        }
        if self.max_pieces == 0 {
            return Err(CutError::InvalidConfig(
                "max pieces must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
