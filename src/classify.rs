//! Buckets demand and stock records by tube type.
//!
//! Records with a blank, whitespace-only or `unspecified` type all end up in a
//! single [`UNSPECIFIED`] bucket per entity class.

use std::cmp::Reverse;

use crate::observer::{Observer, Step};
use crate::types::{Buckets, Demand, Stock, StockUnit, UNSPECIFIED};

pub trait Classifier {
    fn classify_demands(&self, demands: &[Demand], observer: &dyn Observer) -> Buckets<Demand>;

    fn classify_stocks(&self, stocks: &[Stock], observer: &dyn Observer) -> Buckets<StockUnit>;

    /// Gives every demand type a default stock unit unless it already has one.
    fn add_default_stock_lengths(
        &self,
        demands: &Buckets<Demand>,
        stocks: Buckets<StockUnit>,
        observer: &dyn Observer,
    ) -> Buckets<StockUnit>;
}

#[derive(Debug, Clone, Copy)]
pub struct TubeClassifier {
    default_stock_length: u32,
}

impl TubeClassifier {
    pub fn new(default_stock_length: u32) -> Self {
        Self {
            default_stock_length,
        }
    }
}

impl Classifier for TubeClassifier {
    fn classify_demands(&self, demands: &[Demand], observer: &dyn Observer) -> Buckets<Demand> {
        let mut buckets = Buckets::new();
        for demand in demands {
            buckets
                .entry(bucket_key(&demand.tube_type))
                .push(demand.clone());
        }
        merge_unspecified(&mut buckets);
        for (key, items) in buckets.iter_mut() {
            for demand in items.iter_mut() {
                demand.tube_type = key.to_string();
            }
        }

        observer.on_step(&Step::DemandsClassified {
            buckets: buckets.len(),
        });
        buckets
    }

    fn classify_stocks(&self, stocks: &[Stock], observer: &dyn Observer) -> Buckets<StockUnit> {
        let mut buckets = Buckets::new();
        for stock in stocks {
            let units = buckets.entry(bucket_key(&stock.tube_type));
            units.extend((0..stock.qty).map(|_| StockUnit::new(stock.length)));
        }
        merge_unspecified(&mut buckets);

        observer.on_step(&Step::StocksClassified {
            buckets: buckets.len(),
            units: buckets.iter().map(|(_, units)| units.len()).sum(),
        });
        buckets
    }

    fn add_default_stock_lengths(
        &self,
        demands: &Buckets<Demand>,
        mut stocks: Buckets<StockUnit>,
        observer: &dyn Observer,
    ) -> Buckets<StockUnit> {
        for tube_type in demands.keys() {
            let units = stocks.entry(tube_type);
            if units.iter().any(|u| u.is_default) {
                continue;
            }
            units.push(StockUnit::default_length(self.default_stock_length));
            observer.on_step(&Step::DefaultInjected {
                tube_type,
                length: self.default_stock_length,
            });
        }
        stocks
    }
}

/// True for keys that carry no usable type.
pub fn is_unspecified(key: &str) -> bool {
    let key = key.trim();
    key.is_empty() || key == UNSPECIFIED
}

/// The bucket a raw type string settles in once classification is done.
pub fn canonical_type(raw: &str) -> &str {
    if is_unspecified(raw) { UNSPECIFIED } else { raw }
}

fn bucket_key(raw: &str) -> &str {
    if raw.is_empty() { UNSPECIFIED } else { raw }
}

/// Folds every unspecified-looking bucket into [`UNSPECIFIED`], keeping the
/// position of the first one.
fn merge_unspecified<T>(buckets: &mut Buckets<T>) {
    let keys: Vec<String> = buckets
        .keys()
        .filter(|k| is_unspecified(k))
        .map(str::to_string)
        .collect();
    if keys.len() == 1 && keys[0] == UNSPECIFIED {
        return;
    }
    let Some(first) = buckets.keys().position(is_unspecified) else {
        return;
    };

    let mut merged = Vec::new();
    for key in &keys {
        if let Some(items) = buckets.remove(key) {
            merged.extend(items);
        }
    }
    buckets.insert_at(first, UNSPECIFIED, merged);
}

/// Flattens demands into one length per piece, longest first.
pub fn expand_demands(demands: &[Demand]) -> Vec<u32> {
    let mut lengths: Vec<u32> = demands
        .iter()
        .flat_map(|d| std::iter::repeat_n(d.length, d.qty as usize))
        .collect();
    lengths.sort_unstable_by(|a, b| b.cmp(a));
    lengths
}

/// Specific stock before the default length, longer pieces first.
pub fn sort_stock_units(units: &[StockUnit]) -> Vec<StockUnit> {
    let mut sorted = units.to_vec();
    sorted.sort_by_key(|u| (u.is_default, Reverse(u.length)));
    sorted
}
