use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::direction::CompassDirection;

/// Row key of a pivot table.
///
/// Variant order is the row order: every numeric speed sorts before any
/// non-numeric label; speeds ascend numerically, other labels lexically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RowLabel {
    Speed(OrderedFloat<f64>),
    Other(String),
}

impl RowLabel {
    pub fn speed(value: f64) -> Self {
        RowLabel::Speed(OrderedFloat(value))
    }

    pub fn as_speed(&self) -> Option<f64> {
        match self {
            RowLabel::Speed(value) => Some(value.into_inner()),
            RowLabel::Other(_) => None,
        }
    }
}

impl fmt::Display for RowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowLabel::Speed(value) => {
                let speed = value.into_inner();
                if speed.fract() == 0.0 {
                    write!(f, "{:.0}", speed)
                } else {
                    write!(f, "{}", speed)
                }
            }
            RowLabel::Other(label) => write!(f, "{}", label),
        }
    }
}

/// One speed row: a cell per compass direction plus the row total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotRow<T> {
    pub label: RowLabel,
    pub cells: [T; CompassDirection::COUNT],
    pub total: T,
}

impl<T: Copy> PivotRow<T> {
    pub fn value(&self, direction: CompassDirection) -> T {
        self.cells[direction.index()]
    }
}

/// Speed x direction table with marginal totals.
///
/// Columns are always the sixteen compass directions in `CompassDirection::ALL`
/// order, present in the data or not. Rows are kept sorted by label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pivot<T> {
    rows: Vec<PivotRow<T>>,
    column_totals: [T; CompassDirection::COUNT],
    grand_total: T,
}

pub type AbsolutePivot = Pivot<u64>;
pub type PercentagePivot = Pivot<f64>;

impl<T: Copy> Pivot<T> {
    pub(crate) fn new(
        mut rows: Vec<PivotRow<T>>,
        column_totals: [T; CompassDirection::COUNT],
        grand_total: T,
    ) -> Self {
        rows.sort_by(|a, b| a.label.cmp(&b.label));
        Self {
            rows,
            column_totals,
            grand_total,
        }
    }

    pub fn rows(&self) -> &[PivotRow<T>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, label: &RowLabel) -> Option<&PivotRow<T>> {
        self.rows.iter().find(|r| &r.label == label)
    }

    pub fn speed_row(&self, speed: f64) -> Option<&PivotRow<T>> {
        self.row(&RowLabel::speed(speed))
    }

    /// Cell at `(speed, direction)`; `None` when no row has that speed.
    pub fn value(&self, speed: f64, direction: CompassDirection) -> Option<T> {
        self.speed_row(speed).map(|r| r.value(direction))
    }

    pub fn column_total(&self, direction: CompassDirection) -> T {
        self.column_totals[direction.index()]
    }

    pub fn column_totals(&self) -> &[T; CompassDirection::COUNT] {
        &self.column_totals
    }

    pub fn grand_total(&self) -> T {
        self.grand_total
    }

    pub fn row_labels(&self) -> impl Iterator<Item = &RowLabel> {
        self.rows.iter().map(|r| &r.label)
    }
}

impl AbsolutePivot {
    pub fn total_count(&self) -> u64 {
        self.grand_total
    }

    /// Direction with the largest count; the first in compass order wins ties.
    pub fn prevailing_direction(&self) -> Option<CompassDirection> {
        let mut best: Option<(CompassDirection, u64)> = None;
        for direction in CompassDirection::ALL {
            let count = self.column_total(direction);
            if count > 0 && best.map_or(true, |(_, c)| count > c) {
                best = Some((direction, count));
            }
        }
        best.map(|(direction, _)| direction)
    }
}

impl PercentagePivot {
    /// Distance of the recomputed grand total from 100.
    pub fn drift(&self) -> f64 {
        (self.grand_total - 100.0).abs()
    }

    /// Sum of the marginal "Total" row across all directions.
    pub fn direction_total_sum(&self) -> f64 {
        self.column_totals.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_label_ordering() {
        let mut labels = vec![
            RowLabel::Other("b".into()),
            RowLabel::speed(10.0),
            RowLabel::Other("a".into()),
            RowLabel::speed(2.0),
            RowLabel::speed(0.5),
        ];
        labels.sort();

        assert_eq!(
            labels,
            vec![
                RowLabel::speed(0.5),
                RowLabel::speed(2.0),
                RowLabel::speed(10.0),
                RowLabel::Other("a".into()),
                RowLabel::Other("b".into()),
            ]
        );
    }

    #[test]
    fn test_row_label_display() {
        assert_eq!(RowLabel::speed(3.0).to_string(), "3");
        assert_eq!(RowLabel::speed(2.5).to_string(), "2.5");
        assert_eq!(RowLabel::Other("gust".into()).to_string(), "gust");
    }

    #[test]
    fn test_pivot_sorts_rows_on_construction() {
        let row = |speed: f64, n: u64| {
            let mut cells = [0u64; CompassDirection::COUNT];
            cells[0] = n;
            PivotRow {
                label: RowLabel::speed(speed),
                cells,
                total: n,
            }
        };
        let mut column_totals = [0u64; CompassDirection::COUNT];
        column_totals[0] = 3;

        let pivot = Pivot::new(vec![row(5.0, 1), row(1.0, 2)], column_totals, 3);

        let labels: Vec<String> = pivot.row_labels().map(|l| l.to_string()).collect();
        assert_eq!(labels, vec!["1", "5"]);
        assert_eq!(pivot.value(1.0, CompassDirection::N), Some(2));
        assert_eq!(pivot.value(7.0, CompassDirection::N), None);
        assert_eq!(pivot.prevailing_direction(), Some(CompassDirection::N));
    }
}
