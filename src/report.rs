use serde::Serialize;

use crate::types::CutResult;

/// Separator between cut lengths in a row's `cuts` column.
pub const CUT_SEPARATOR: &str = " + ";

/// One stock piece, flattened for tables and spreadsheet-style consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub stock_type: String,
    pub stock_length: u32,
    pub cuts: String,
    pub remainder: u32,
    pub used: u32,
}

pub fn report_rows(results: &[CutResult]) -> Vec<ReportRow> {
    results
        .iter()
        .flat_map(|r| {
            r.groups.iter().map(|g| ReportRow {
                stock_type: r.stock_type.clone(),
                stock_length: g.stock_length,
                cuts: g
                    .items
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(CUT_SEPARATOR),
                remainder: g.remainder(),
                used: g.used,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub pieces: usize,
    pub stock_length: u64,
    pub used_length: u64,
    pub over_capacity: usize,
}

impl Summary {
    pub fn from_results(results: &[CutResult]) -> Self {
        let groups = results.iter().flat_map(|r| &r.groups);
        let mut summary = Summary {
            pieces: 0,
            stock_length: 0,
            used_length: 0,
            over_capacity: 0,
        };
        for g in groups {
            summary.pieces += 1;
            // Over-capacity groups count the length they actually need.
            summary.stock_length += u64::from(g.stock_length.max(g.used));
            summary.used_length += u64::from(g.used);
            if g.is_over_capacity() {
                summary.over_capacity += 1;
            }
        }
        summary
    }

    pub fn waste_length(&self) -> u64 {
        self.stock_length - self.used_length
    }

    pub fn waste_percent(&self) -> f64 {
        if self.stock_length == 0 {
            return 0.0;
        }
        self.waste_length() as f64 / self.stock_length as f64 * 100.0
    }
}
