use std::time::Instant;

use crate::assemble::{Assembler, ResultAssembler};
use crate::classify::{Classifier, TubeClassifier, expand_demands, sort_stock_units};
use crate::config::CutConfig;
use crate::error::{CutError, Result};
use crate::knapsack::{ContainerOptimizer, DpOptimizer};
use crate::observer::{NoopObserver, Observer, Step};
use crate::packer::{FallbackPacker, FirstFitPacker};
use crate::types::{Buckets, CutResult, Demand, Group, Stock, StockUnit};
use crate::validate::{check_piece_limit, expanded_count};

/// Allocation driver: classifies the input, then walks each type's stock
/// units in order, handing the remaining demand pool to the optimizer (or to
/// the packer once the default length is reached).
pub struct Solver<'a> {
    config: CutConfig,
    classifier: Box<dyn Classifier + 'a>,
    optimizer: Box<dyn ContainerOptimizer + 'a>,
    packer: Box<dyn FallbackPacker + 'a>,
    assembler: Box<dyn Assembler + 'a>,
    observer: Box<dyn Observer + 'a>,
}

impl<'a> Solver<'a> {
    pub fn new(config: CutConfig) -> Self {
        Self {
            config,
            classifier: Box::new(TubeClassifier::new(config.default_stock_length)),
            optimizer: Box::new(DpOptimizer::new(config.max_capacity)),
            packer: Box::new(FirstFitPacker),
            assembler: Box::new(ResultAssembler::new(config.default_stock_length)),
            observer: Box::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: impl Observer + 'a) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn with_classifier(mut self, classifier: impl Classifier + 'a) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn with_optimizer(mut self, optimizer: impl ContainerOptimizer + 'a) -> Self {
        self.optimizer = Box::new(optimizer);
        self
    }

    pub fn with_packer(mut self, packer: impl FallbackPacker + 'a) -> Self {
        self.packer = Box::new(packer);
        self
    }

    pub fn with_assembler(mut self, assembler: impl Assembler + 'a) -> Self {
        self.assembler = Box::new(assembler);
        self
    }

    pub fn config(&self) -> &CutConfig {
        &self.config
    }

    /// Runs the whole pipeline over raw records. Returns one result per stock
    /// type, in the order types were first seen in `stocks` (types that only
    /// appear in `demands` follow).
    pub fn solve(&self, stocks: &[Stock], demands: &[Demand]) -> Result<Vec<CutResult>> {
        self.config.validate()?;
        check_contract(stocks, demands, &self.config)?;

        let start = Instant::now();
        let observer = &*self.observer;
        let demand_buckets = self.classifier.classify_demands(demands, observer);
        let stock_buckets = self.classifier.classify_stocks(stocks, observer);
        let stock_buckets =
            self.classifier
                .add_default_stock_lengths(&demand_buckets, stock_buckets, observer);

        let results = self.allocate(&stock_buckets, &demand_buckets)?;
        observer.on_timing("solve", start.elapsed());
        Ok(results)
    }

    pub fn allocate(
        &self,
        stock_buckets: &Buckets<StockUnit>,
        demand_buckets: &Buckets<Demand>,
    ) -> Result<Vec<CutResult>> {
        let mut results = Vec::new();

        for (tube_type, units) in stock_buckets.iter() {
            let result = match demand_buckets.get(tube_type) {
                None => {
                    self.observer.on_step(&Step::NoDemand { tube_type });
                    let stock_length = units
                        .iter()
                        .map(|u| u.length)
                        .max()
                        .unwrap_or(self.config.default_stock_length);
                    self.assembler.create_empty_result(tube_type, stock_length)
                }
                Some(demands) => {
                    let groups = self.allocate_bucket(tube_type, units, demands)?;
                    if groups.is_empty() {
                        continue;
                    }
                    let display = self.assembler.infer_display_length(&groups, units);
                    self.assembler.create_result(tube_type, display, groups)
                }
            };
            self.observer.on_result(&result);
            results.push(result);
        }

        Ok(results)
    }

    fn allocate_bucket(
        &self,
        tube_type: &str,
        units: &[StockUnit],
        demands: &[Demand],
    ) -> Result<Vec<Group>> {
        let observer = &*self.observer;
        let mut remaining = expand_demands(demands);
        let mut groups = Vec::new();

        for unit in sort_stock_units(units) {
            if remaining.is_empty() {
                break;
            }

            if unit.is_default {
                groups.extend(self.packer.pack(&remaining, unit.length, observer));
                remaining.clear();
            } else {
                let selection = self.optimizer.optimize(&remaining, unit.length, observer)?;
                if !selection.is_empty() {
                    remove_used_items(&mut remaining, &selection.items);
                    groups.push(selection.into_group(unit.length));
                }
            }

            observer.on_step(&Step::UnitConsumed {
                tube_type,
                unit,
                remaining: remaining.len(),
            });
            if unit.is_default {
                break;
            }
        }

        Ok(groups)
    }
}

/// Removes one occurrence of each used length from the pool.
///
/// Matching by value is sound only because pool entries are bare lengths;
/// entries carrying per-demand identity would need removal by identity.
pub fn remove_used_items(pool: &mut Vec<u32>, used: &[u32]) {
    for len in used {
        if let Some(pos) = pool.iter().position(|d| d == len) {
            pool.remove(pos);
        }
    }
}

fn check_contract(stocks: &[Stock], demands: &[Demand], config: &CutConfig) -> Result<()> {
    for (index, d) in demands.iter().enumerate() {
        if d.length == 0 || d.qty == 0 {
            return Err(CutError::InvalidDemand {
                index,
                reason: format!("length and quantity must be non-zero, got {}x{}", d.length, d.qty),
            });
        }
    }
    for (index, s) in stocks.iter().enumerate() {
        if s.length == 0 || s.qty == 0 {
            return Err(CutError::InvalidStock {
                index,
                reason: format!("length and quantity must be non-zero, got {}x{}", s.length, s.qty),
            });
        }
    }
    check_piece_limit("demands", expanded_count(demands.iter().map(|d| d.qty)), config)?;
    check_piece_limit("stocks", expanded_count(stocks.iter().map(|s| s.qty)), config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::testing::RecordingObserver;
    use crate::types::Selection;

    fn solve(stocks: &[Stock], demands: &[Demand]) -> Vec<CutResult> {
        Solver::new(CutConfig::default())
            .solve(stocks, demands)
            .unwrap()
    }

    fn items(result: &CutResult) -> Vec<Vec<u32>> {
        result.groups.iter().map(|g| g.items.clone()).collect()
    }

    /// Validates a complete run for one type:
    /// 1. Every group that holds more than one item fits its stock length
    /// 2. The placed items are exactly the expanded demand multiset
    fn assert_result_valid(result: &CutResult, demands: &[Demand]) {
        for (gi, g) in result.groups.iter().enumerate() {
            assert_eq!(g.used, g.items.iter().sum::<u32>(), "group {gi}: used mismatch");
            if g.items.len() > 1 {
                assert!(
                    g.used <= g.stock_length,
                    "group {gi} ({:?}) exceeds stock length {}",
                    g.items,
                    g.stock_length
                );
            }
        }

        let mut placed: Vec<u32> = result.groups.iter().flat_map(|g| g.items.clone()).collect();
        placed.sort_unstable_by(|a, b| b.cmp(a));
        let expected = expand_demands(demands);
        assert_eq!(placed, expected, "placed items differ from demand");
    }

    #[test]
    fn test_specific_stock_then_default() {
        let demands = vec![Demand::new("A", 1000, 3)];
        let results = solve(&[Stock::new("A", 2500, 1)], &demands);

        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert_eq!(r.stock_type, "A");
        assert_eq!(r.stock_length, 2500);
        assert_eq!(items(r), vec![vec![1000, 1000], vec![1000]]);
        assert_eq!(r.groups[0].stock_length, 2500);
        assert_eq!(r.groups[1].stock_length, 5850);
        assert_result_valid(r, &demands);
    }

    #[test]
    fn test_default_only_type() {
        let demands = vec![Demand::new("B", 500, 2)];
        let results = solve(&[], &demands);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].stock_type, "B");
        assert_eq!(results[0].stock_length, 5850);
        assert_eq!(items(&results[0]), vec![vec![500, 500]]);
        assert_eq!(results[0].groups[0].used, 1000);
    }

    #[test]
    fn test_item_longer_than_default() {
        let results = solve(&[], &[Demand::new("A", 9000, 1)]);
        let g = &results[0].groups[0];
        assert_eq!(g.items, vec![9000]);
        assert_eq!(g.stock_length, 5850);
        assert!(g.is_over_capacity());
    }

    #[test]
    fn test_stock_without_demand_yields_empty_result() {
        let results = solve(
            &[Stock::new("C", 3000, 1), Stock::new("C", 4000, 2)],
            &[Demand::new("A", 1000, 1)],
        );
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].stock_type, "C");
        assert_eq!(results[0].stock_length, 4000);
        assert!(results[0].is_empty());
        assert_eq!(results[1].stock_type, "A");
    }

    #[test]
    fn test_specific_stock_exhausts_demand_before_default() {
        let demands = vec![Demand::new("A", 1200, 4)];
        let results = solve(&[Stock::new("A", 2400, 2)], &demands);
        let r = &results[0];
        assert_eq!(items(r), vec![vec![1200, 1200], vec![1200, 1200]]);
        assert!(r.groups.iter().all(|g| g.stock_length == 2400));
        assert_eq!(r.stock_length, 2400);
    }

    #[test]
    fn test_unused_stock_units_produce_no_groups() {
        // The first 2500 takes both pieces; the pool is empty after that.
        let demands = vec![Demand::new("A", 1200, 2)];
        let results = solve(&[Stock::new("A", 2500, 3)], &demands);
        assert_eq!(items(&results[0]), vec![vec![1200, 1200]]);
    }

    #[test]
    fn test_stock_shorter_than_all_demands_is_skipped() {
        let demands = vec![Demand::new("A", 3000, 2)];
        let results = solve(&[Stock::new("A", 1000, 2)], &demands);
        assert_eq!(items(&results[0]), vec![vec![3000]; 2]);
        assert!(results[0].groups.iter().all(|g| g.stock_length == 5850));
    }

    #[test]
    fn test_larger_specific_stock_used_first() {
        let demands = vec![Demand::new("A", 2000, 3), Demand::new("A", 900, 1)];
        let results = solve(
            &[Stock::new("A", 3000, 1), Stock::new("A", 6000, 1)],
            &demands,
        );
        let r = &results[0];
        assert_eq!(r.groups[0].stock_length, 6000);
        assert_eq!(r.groups[0].used, 6000);
        assert_eq!(r.groups[1].stock_length, 3000);
        assert_eq!(r.groups[1].items, vec![900]);
        assert_result_valid(r, &demands);
    }

    #[test]
    fn test_blank_types_share_stock() {
        let demands = vec![Demand::new("", 1000, 2), Demand::new("   ", 1000, 1)];
        let results = solve(&[Stock::new("unspecified", 3000, 1)], &demands);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].stock_type, "unspecified");
        assert_eq!(items(&results[0]), vec![vec![1000, 1000, 1000]]);
    }

    #[test]
    fn test_no_stock_and_no_demand() {
        assert!(solve(&[], &[]).is_empty());
    }

    #[test]
    fn test_custom_default_length() {
        let solver = Solver::new(CutConfig::default().with_default_stock_length(6000));
        let results = solver.solve(&[], &[Demand::new("A", 3000, 2)]).unwrap();
        assert_eq!(results[0].stock_length, 6000);
        assert_eq!(items(&results[0]), vec![vec![3000, 3000]]);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let err = Solver::new(CutConfig::default())
            .solve(&[], &[Demand::new("A", 1000, 0)])
            .unwrap_err();
        assert!(matches!(err, CutError::InvalidDemand { index: 0, .. }));
    }

    #[test]
    fn test_stock_above_capacity_bound_fails_loudly() {
        let solver = Solver::new(CutConfig::default().with_max_capacity(5900));
        let err = solver
            .solve(&[Stock::new("A", 6000, 1)], &[Demand::new("A", 1000, 1)])
            .unwrap_err();
        assert!(matches!(err, CutError::CapacityTooLarge { capacity: 6000, .. }));
    }

    #[test]
    fn test_oversized_quantity_fails_before_expansion() {
        let err = Solver::new(CutConfig::default())
            .solve(&[], &[Demand::new("A", 10, 4_000_000_000)])
            .unwrap_err();
        assert_eq!(
            err,
            CutError::TooManyPieces {
                what: "demands",
                count: 4_000_000_000,
                max: 5_000
            }
        );

        let err = Solver::new(CutConfig::default().with_max_pieces(3))
            .solve(&[Stock::new("A", 2500, 4)], &[Demand::new("A", 1000, 3)])
            .unwrap_err();
        assert!(matches!(err, CutError::TooManyPieces { what: "stocks", count: 4, .. }));
    }

    #[test]
    fn test_default_length_above_capacity_bound_rejected() {
        let err = Solver::new(CutConfig::default().with_max_capacity(5000))
            .solve(&[], &[Demand::new("A", 1000, 1)])
            .unwrap_err();
        assert!(matches!(err, CutError::InvalidConfig(_)));
    }

    #[test]
    fn test_deterministic() {
        let stocks = vec![Stock::new("A", 2500, 2), Stock::new("B", 4000, 1)];
        let demands = vec![
            Demand::new("A", 700, 5),
            Demand::new("B", 1300, 4),
            Demand::new("A", 450, 3),
        ];
        assert_eq!(solve(&stocks, &demands), solve(&stocks, &demands));
    }

    #[test]
    fn test_observer_sees_run() {
        let observer = RecordingObserver::default();
        Solver::new(CutConfig::default())
            .with_observer(&observer)
            .solve(&[Stock::new("A", 2500, 1)], &[Demand::new("A", 1000, 3)])
            .unwrap();
        assert_eq!(observer.count("step UnitConsumed"), 2);
        assert_eq!(observer.count("step Packed"), 1);
        assert_eq!(observer.count("result A"), 1);
        assert_eq!(observer.count("timing solve"), 1);
    }

    #[test]
    fn test_observer_does_not_change_outcome() {
        let stocks = vec![Stock::new("A", 3100, 2)];
        let demands = vec![Demand::new("A", 800, 7), Demand::new("", 400, 2)];
        let quiet = solve(&stocks, &demands);
        let observer = RecordingObserver::default();
        let watched = Solver::new(CutConfig::default())
            .with_observer(&observer)
            .solve(&stocks, &demands)
            .unwrap();
        assert_eq!(quiet, watched);
    }

    #[derive(Debug)]
    struct FirstItemOnly;

    impl ContainerOptimizer for FirstItemOnly {
        fn optimize(&self, demands: &[u32], capacity: u32, _: &dyn Observer) -> Result<Selection> {
            Ok(demands
                .iter()
                .find(|&&d| d <= capacity)
                .map(|&d| Selection {
                    items: vec![d],
                    used: d,
                })
                .unwrap_or_default())
        }
    }

    #[test]
    fn test_injected_optimizer_is_used() {
        let results = Solver::new(CutConfig::default())
            .with_optimizer(FirstItemOnly)
            .solve(&[Stock::new("A", 5000, 1)], &[Demand::new("A", 1000, 3)])
            .unwrap();
        assert_eq!(items(&results[0]), vec![vec![1000], vec![1000, 1000]]);
    }

    #[test]
    fn test_remove_used_items_first_occurrence() {
        let mut pool = vec![500, 400, 400, 400, 100];
        remove_used_items(&mut pool, &[400, 100, 400]);
        assert_eq!(pool, vec![500, 400]);

        remove_used_items(&mut pool, &[999]);
        assert_eq!(pool, vec![500, 400]);
    }
}
