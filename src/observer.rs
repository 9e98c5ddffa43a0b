use std::time::Duration;

use crate::types::{CutResult, StockUnit};

/// Something notable that happened during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<'a> {
    DemandsClassified {
        buckets: usize,
    },
    StocksClassified {
        buckets: usize,
        units: usize,
    },
    DefaultInjected {
        tube_type: &'a str,
        length: u32,
    },
    Optimized {
        capacity: u32,
        candidates: usize,
        selected: &'a [u32],
        used: u32,
    },
    Packed {
        capacity: u32,
        items: usize,
        groups: usize,
    },
    UnitConsumed {
        tube_type: &'a str,
        unit: StockUnit,
        remaining: usize,
    },
    NoDemand {
        tube_type: &'a str,
    },
}

/// Hooks into a run. Every method has a no-op default, and the outcome of a
/// run never depends on which observer is attached.
pub trait Observer {
    fn on_step(&self, _step: &Step<'_>) {}
    fn on_timing(&self, _label: &str, _elapsed: Duration) {}
    fn on_result(&self, _result: &CutResult) {}
}

impl<O: Observer + ?Sized> Observer for &O {
    fn on_step(&self, step: &Step<'_>) {
        (**self).on_step(step)
    }

    fn on_timing(&self, label: &str, elapsed: Duration) {
        (**self).on_timing(label, elapsed)
    }

    fn on_result(&self, result: &CutResult) {
        (**self).on_result(result)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Forwards everything to `tracing`: steps and timings at debug, results at info.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_step(&self, step: &Step<'_>) {
        match step {
            Step::DefaultInjected { tube_type, length } => {
                tracing::debug!(tube_type, length, "default stock length added");
            }
            Step::Optimized {
                capacity,
                candidates,
                selected,
                used,
            } => {
                tracing::debug!(
                    capacity,
                    candidates,
                    selected = ?selected,
                    used,
                    waste = capacity.saturating_sub(*used),
                    "container optimized"
                );
            }
            Step::NoDemand { tube_type } => {
                tracing::debug!(tube_type, "stock type has no matching demand");
            }
            other => tracing::debug!(step = ?other, "allocation step"),
        }
    }

    fn on_timing(&self, label: &str, elapsed: Duration) {
        tracing::debug!(label, elapsed_us = elapsed.as_micros() as u64, "timing");
    }

    fn on_result(&self, result: &CutResult) {
        let over_capacity = result.groups.iter().filter(|g| g.is_over_capacity()).count();
        if over_capacity > 0 {
            tracing::warn!(
                stock_type = %result.stock_type,
                over_capacity,
                "demands longer than every available stock length"
            );
        }
        tracing::info!(
            stock_type = %result.stock_type,
            stock_length = result.stock_length,
            pieces = result.piece_count(),
            "result assembled"
        );
    }
}
