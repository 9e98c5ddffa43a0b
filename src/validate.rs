//! Input and output checks that run outside the allocation core.

use std::collections::HashMap;

use crate::classify::canonical_type;
use crate::config::CutConfig;
use crate::error::{CutError, Result};
use crate::types::{CutResult, Demand, Stock};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub errors: Vec<CutError>,
    pub warnings: Vec<String>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fails with the first error, keeping warnings on success.
    pub fn into_result(self) -> Result<Self> {
        match self.errors.first() {
            Some(err) => Err(err.clone()),
            None => Ok(self),
        }
    }
}

/// Total pieces once every record is expanded by its quantity.
pub fn expanded_count(quantities: impl IntoIterator<Item = u32>) -> u64 {
    quantities.into_iter().map(u64::from).sum()
}

/// Rejects inputs whose expansion would exceed `max_pieces`.
pub fn check_piece_limit(what: &'static str, count: u64, config: &CutConfig) -> Result<()> {
    if count > u64::from(config.max_pieces) {
        return Err(CutError::TooManyPieces {
            what,
            count,
            max: config.max_pieces,
        });
    }
    Ok(())
}

pub fn validate_demands(demands: &[Demand], config: &CutConfig) -> Validation {
    let mut v = Validation::default();
    if demands.is_empty() {
        v.errors.push(CutError::NoDemands);
        return v;
    }
    for (index, d) in demands.iter().enumerate() {
        if d.length == 0 {
            v.errors.push(CutError::InvalidDemand {
                index,
                reason: "length must be greater than zero".to_string(),
            });
        }
        if d.qty == 0 {
            v.errors.push(CutError::InvalidDemand {
                index,
                reason: "quantity must be greater than zero".to_string(),
            });
        }
    }
    let pieces = expanded_count(demands.iter().map(|d| d.qty));
    if let Err(e) = check_piece_limit("demands", pieces, config) {
        v.errors.push(e);
    }
    v
}

/// An empty stock list is fine: every demand type falls back to the default length.
pub fn validate_stocks(stocks: &[Stock], config: &CutConfig) -> Validation {
    let mut v = Validation::default();
    for (index, s) in stocks.iter().enumerate() {
        if s.length == 0 {
            v.errors.push(CutError::InvalidStock {
                index,
                reason: "length must be greater than zero".to_string(),
            });
        } else if s.length > config.max_capacity {
            v.errors.push(CutError::InvalidStock {
                index,
                reason: format!(
                    "length {} exceeds the maximum of {}",
                    s.length, config.max_capacity
                ),
            });
        }
        if s.qty == 0 {
            v.errors.push(CutError::InvalidStock {
                index,
                reason: "quantity must be greater than zero".to_string(),
            });
        }
    }
    let units = expanded_count(stocks.iter().map(|s| s.qty));
    if let Err(e) = check_piece_limit("stocks", units, config) {
        v.errors.push(e);
    }
    v
}

/// Validates configuration, stocks and demands together.
pub fn validate_input(stocks: &[Stock], demands: &[Demand], config: &CutConfig) -> Result<()> {
    config.validate()?;
    validate_stocks(stocks, config).into_result()?;
    validate_demands(demands, config).into_result()?;
    Ok(())
}

/// Checks finished results against the demands they came from.
///
/// Missing types or zero display lengths are errors. Demand pieces that no
/// group accounts for, and groups holding an item longer than their stock,
/// are reported as warnings.
pub fn validate_results(results: &[CutResult], demands: &[Demand]) -> Validation {
    let mut v = Validation::default();

    for (i, r) in results.iter().enumerate() {
        if r.stock_type.is_empty() {
            v.errors
                .push(CutError::Input(format!("result {}: missing stock type", i + 1)));
        }
        if r.stock_length == 0 {
            v.errors
                .push(CutError::Input(format!("result {}: invalid stock length", i + 1)));
        }
        for g in r.groups.iter().filter(|g| g.is_over_capacity()) {
            v.warnings.push(format!(
                "{}: {:?} needs {} but the stock is only {}",
                r.stock_type, g.items, g.used, g.stock_length
            ));
        }
    }

    let mut expected: HashMap<&str, Vec<u32>> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for d in demands {
        let key = canonical_type(&d.tube_type);
        if !expected.contains_key(key) {
            order.push(key);
        }
        expected
            .entry(key)
            .or_default()
            .extend(std::iter::repeat_n(d.length, d.qty as usize));
    }

    for key in order {
        let mut remaining = expected.remove(key).unwrap_or_default();
        for r in results.iter().filter(|r| r.stock_type == key) {
            for item in r.groups.iter().flat_map(|g| &g.items) {
                if let Some(pos) = remaining.iter().position(|len| len == item) {
                    remaining.remove(pos);
                }
            }
        }
        if !remaining.is_empty() {
            v.warnings.push(format!(
                "{key}: {} demand piece(s) not placed: {:?}",
                remaining.len(),
                remaining
            ));
        }
    }

    v
}

/// Returns the waste left when `items` are cut from `max_length`.
pub fn validate_combination(items: &[u32], max_length: u32) -> Result<u32> {
    let total: u64 = items.iter().copied().map(u64::from).sum();
    if total > u64::from(max_length) {
        return Err(CutError::CombinationTooLong {
            total,
            max: max_length,
        });
    }
    Ok(max_length - total as u32)
}
