//! Region totals over a combined report.
//!
//! Quantities are summed as exact decimals. Cells that do not hold a number
//! (nulls, booleans, dates, unparseable text) count as zero and are tallied in
//! [`RegionSummary::skipped_quantities`]. Numbers that do not fit a `Decimal`,
//! and amounts whose addition would overflow the running region total, are left
//! out of the total and tallied in [`RegionSummary::out_of_range_quantities`]
//! with a `warn!` per row. Each total is rounded to three decimal places with
//! ties away from zero, then regions are ordered by total descending; equal
//! totals keep the order in which regions first appeared.

use std::collections::HashMap;

use log::{debug, warn};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    aliases::{QUANTITY_FIELD, REGION_COLUMN},
    data::{NumericError, display_cell},
    report::CombinedReport,
};

pub const TOTAL_SCALE: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionTotal {
    pub region: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionSummary {
    pub totals: Vec<RegionTotal>,
    pub skipped_quantities: usize,
    pub out_of_range_quantities: usize,
}

impl RegionSummary {
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Sum of every region total, `None` when it does not fit a `Decimal`.
    pub fn grand_total(&self) -> Option<Decimal> {
        self.totals
            .iter()
            .try_fold(Decimal::ZERO, |acc, t| acc.checked_add(t.total))
    }
}

pub fn round_total(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(TOTAL_SCALE, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

pub fn aggregate(report: &CombinedReport) -> RegionSummary {
    let Some(region_idx) = report.column_index(REGION_COLUMN) else {
        return RegionSummary::default();
    };
    let rows = report.rows();
    let quantity_idx = report.column_index(QUANTITY_FIELD);

    let mut order: Vec<RegionTotal> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0usize;
    let mut out_of_range = 0usize;

    for (row_idx, row) in rows.iter().enumerate() {
        let region = display_cell(row.get(region_idx).and_then(Option::as_ref));
        let quantity = quantity_idx
            .and_then(|idx| row.get(idx))
            .and_then(Option::as_ref)
            .map_or(Err(NumericError::NotNumeric), |value| value.to_decimal());
        let amount = match quantity {
            Ok(amount) => amount,
            Err(NumericError::NotNumeric) => {
                debug!("Row {}: quantity is not numeric, counted as zero", row_idx + 1);
                skipped += 1;
                Decimal::ZERO
            }
            Err(NumericError::OutOfRange) => {
                warn!("Row {}: quantity is too large to sum, left out of '{region}'", row_idx + 1);
                out_of_range += 1;
                Decimal::ZERO
            }
        };
        let slot = *positions.entry(region.clone()).or_insert_with(|| {
            order.push(RegionTotal {
                region,
                total: Decimal::ZERO,
            });
            order.len() - 1
        });
        let entry = &mut order[slot];
        match entry.total.checked_add(amount) {
            Some(total) => entry.total = total,
            None => {
                warn!(
                    "Row {}: adding {amount} overflows the total of '{}', left out",
                    row_idx + 1,
                    entry.region
                );
                out_of_range += 1;
            }
        }
    }

    for entry in &mut order {
        entry.total = round_total(entry.total);
    }
    order.sort_by(|a, b| b.total.cmp(&a.total));

    RegionSummary {
        totals: order,
        skipped_quantities: skipped,
        out_of_range_quantities: out_of_range,
    }
}
