use crate::error::{Result, WindRoseError};
use crate::models::{
    AbsolutePivot, CompassDirection, PercentagePivot, Pivot, PivotRow, RowLabel, WindSample,
};
use crate::utils::constants::DEFAULT_DRIFT_TOLERANCE;
use std::collections::BTreeMap;
use tracing::{debug, warn};

const COLUMNS: usize = CompassDirection::COUNT;

/// Builds speed x direction pivots from filtered wind samples.
pub struct Aggregator {
    drift_tolerance: f64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            drift_tolerance: DEFAULT_DRIFT_TOLERANCE,
        }
    }

    pub fn with_drift_tolerance(mut self, drift_tolerance: f64) -> Self {
        self.drift_tolerance = drift_tolerance;
        self
    }

    /// Count samples per `(speed, direction)`. Every direction gets a column,
    /// zero-filled when absent; rows exist only for observed speeds.
    pub fn absolute_pivot(&self, samples: &[WindSample]) -> Result<AbsolutePivot> {
        if samples.is_empty() {
            return Err(WindRoseError::EmptyInput(
                "no observations to aggregate".to_string(),
            ));
        }

        let mut counts: BTreeMap<RowLabel, [u64; COLUMNS]> = BTreeMap::new();
        for sample in samples {
            let cells = counts
                .entry(RowLabel::speed(sample.speed))
                .or_insert([0; COLUMNS]);
            cells[sample.direction.index()] += 1;
        }

        let mut column_totals = [0u64; COLUMNS];
        let rows: Vec<PivotRow<u64>> = counts
            .into_iter()
            .map(|(label, cells)| {
                for (total, count) in column_totals.iter_mut().zip(cells.iter()) {
                    *total += count;
                }
                PivotRow {
                    label,
                    total: cells.iter().sum(),
                    cells,
                }
            })
            .collect();
        let grand_total = column_totals.iter().sum();

        debug!(
            rows = rows.len(),
            samples = samples.len(),
            "built absolute pivot"
        );
        Ok(Pivot::new(rows, column_totals, grand_total))
    }

    /// Normalize counts to percentages of `total_count`.
    ///
    /// Margins are summed from the unrounded cell values. The grand total is
    /// the sum of every cell, so floating-point drift away from 100 stays
    /// visible instead of being papered over.
    pub fn percentage_pivot(
        &self,
        absolute: &AbsolutePivot,
        total_count: u64,
    ) -> Result<PercentagePivot> {
        if total_count == 0 {
            return Err(WindRoseError::ZeroTotal);
        }
        let total = total_count as f64;

        let mut column_totals = [0.0f64; COLUMNS];
        let mut grand_total = 0.0f64;
        let rows: Vec<PivotRow<f64>> = absolute
            .rows()
            .iter()
            .map(|row| {
                let mut cells = [0.0f64; COLUMNS];
                for (cell, count) in cells.iter_mut().zip(row.cells.iter()) {
                    *cell = 100.0 * *count as f64 / total;
                }
                for (column, cell) in column_totals.iter_mut().zip(cells.iter()) {
                    *column += cell;
                }
                let row_total: f64 = cells.iter().sum();
                grand_total += row_total;

                PivotRow {
                    label: row.label.clone(),
                    cells,
                    total: row_total,
                }
            })
            .collect();

        let pivot = Pivot::new(rows, column_totals, grand_total);
        if pivot.drift() > self.drift_tolerance {
            warn!(
                grand_total = pivot.grand_total(),
                tolerance = self.drift_tolerance,
                "percentage grand total drifts from 100"
            );
        }

        Ok(pivot)
    }

    /// Both pivots, normalized by the absolute grand total.
    pub fn build(&self, samples: &[WindSample]) -> Result<(AbsolutePivot, PercentagePivot)> {
        let absolute = self.absolute_pivot(samples)?;
        let percentage = self.percentage_pivot(&absolute, absolute.total_count())?;
        Ok((absolute, percentage))
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}
