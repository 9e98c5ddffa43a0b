use std::time::Instant;

use crate::config::MAX_CAPACITY;
use crate::error::{CutError, Result};
use crate::observer::{Observer, Step};
use crate::types::Selection;

/// Chooses which demands go into a single container of fixed capacity.
pub trait ContainerOptimizer {
    fn optimize(
        &self,
        demands: &[u32],
        capacity: u32,
        observer: &dyn Observer,
    ) -> Result<Selection>;
}

/// Exact 0/1 knapsack where an item's weight and value are both its length.
///
/// Runs in O(n * capacity) time and memory, so capacities are capped at
/// `max_capacity`.
#[derive(Debug, Clone, Copy)]
pub struct DpOptimizer {
    max_capacity: u32,
}

impl Default for DpOptimizer {
    fn default() -> Self {
        Self::new(MAX_CAPACITY)
    }
}

impl DpOptimizer {
    pub fn new(max_capacity: u32) -> Self {
        Self { max_capacity }
    }
}

impl ContainerOptimizer for DpOptimizer {
    fn optimize(
        &self,
        demands: &[u32],
        capacity: u32,
        observer: &dyn Observer,
    ) -> Result<Selection> {
        if capacity > self.max_capacity {
            return Err(CutError::CapacityTooLarge {
                capacity,
                max: self.max_capacity,
            });
        }
        if demands.contains(&0) {
            return Err(CutError::ZeroLengthItem);
        }

        let start = Instant::now();
        let fitting: Vec<u32> = demands.iter().copied().filter(|&d| d <= capacity).collect();
        let selection = best_subset(&fitting, capacity);

        observer.on_step(&Step::Optimized {
            capacity,
            candidates: fitting.len(),
            selected: &selection.items,
            used: selection.used,
        });
        observer.on_timing("optimize", start.elapsed());
        Ok(selection)
    }
}

fn best_subset(items: &[u32], capacity: u32) -> Selection {
    if items.is_empty() {
        return Selection::default();
    }

    let width = capacity as usize + 1;
    let n = items.len();

    // best[w] holds the row for the items seen so far; walking w downwards
    // lets one row stand in for the whole table.
    let mut best = vec![0u32; width];
    let mut keep = vec![false; (n + 1) * width];

    for (i, &len) in items.iter().enumerate() {
        let len_idx = len as usize;
        let row = &mut keep[(i + 1) * width..(i + 2) * width];
        for w in (len_idx..width).rev() {
            let with = best[w - len_idx] + len;
            // Strictly greater: ties keep the item out.
            if with > best[w] {
                best[w] = with;
                row[w] = true;
            }
        }
    }

    let mut chosen = Vec::new();
    let mut w = capacity as usize;
    let mut i = n;
    while i > 0 && w > 0 {
        if keep[i * width + w] {
            let len = items[i - 1];
            chosen.push(len);
            w -= len as usize;
        }
        i -= 1;
    }

    let used = chosen.iter().sum();
    Selection {
        items: chosen,
        used,
    }
}
