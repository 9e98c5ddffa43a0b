use crate::types::{CutResult, Group, StockUnit};

/// Packages allocated groups into per-type results.
pub trait Assembler {
    fn infer_display_length(&self, groups: &[Group], units: &[StockUnit]) -> u32;

    fn create_result(&self, stock_type: &str, display_length: u32, groups: Vec<Group>)
    -> CutResult;

    fn create_empty_result(&self, stock_type: &str, stock_length: u32) -> CutResult;
}

#[derive(Debug, Clone, Copy)]
pub struct ResultAssembler {
    default_stock_length: u32,
}

impl ResultAssembler {
    pub fn new(default_stock_length: u32) -> Self {
        Self {
            default_stock_length,
        }
    }
}

impl Assembler for ResultAssembler {
    /// Picks the length worth showing for a whole type: the first stock unit
    /// long enough for each group is collected, and a non-default length wins
    /// over the default one.
    fn infer_display_length(&self, groups: &[Group], units: &[StockUnit]) -> u32 {
        let mut matched: Vec<u32> = Vec::new();
        for group in groups.iter().filter(|g| g.used > 0) {
            if let Some(unit) = units.iter().find(|u| u.length >= group.used)
                && !matched.contains(&unit.length)
            {
                matched.push(unit.length);
            }
        }
        matched
            .into_iter()
            .find(|&len| len != self.default_stock_length)
            .unwrap_or(self.default_stock_length)
    }

    fn create_result(
        &self,
        stock_type: &str,
        display_length: u32,
        groups: Vec<Group>,
    ) -> CutResult {
        CutResult {
            stock_type: stock_type.to_string(),
            stock_length: display_length,
            groups,
        }
    }

    fn create_empty_result(&self, stock_type: &str, stock_length: u32) -> CutResult {
        CutResult {
            stock_type: stock_type.to_string(),
            stock_length,
            groups: Vec::new(),
        }
    }
}
