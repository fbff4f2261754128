use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::errors::ApplicationError;

pub const MONTH_COLUMN: &str = "Month";

/// Row-major dense matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![0.0; rows * cols] }
    }

    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, ApplicationError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if rows.iter().any(|row| row.len() != cols) {
            return Err(ApplicationError::Data("matrix rows have uneven widths".to_string()));
        }
        Ok(Self { rows: rows.len(), cols, data: rows.concat() })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, index: usize) -> &[f64] {
        &self.data[index * self.cols..(index + 1) * self.cols]
    }

    /// Flattened row-major view.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Places `other` to the right of `self`, row by row.
    pub fn hstack(&self, other: &Matrix) -> Result<Matrix, ApplicationError> {
        if self.rows != other.rows {
            return Err(ApplicationError::Data(format!(
                "cannot stack matrices with {} and {} rows",
                self.rows, other.rows
            )));
        }
        let cols = self.cols + other.cols;
        let mut data = Vec::with_capacity(self.rows * cols);
        for index in 0..self.rows {
            data.extend_from_slice(self.row(index));
            data.extend_from_slice(other.row(index));
        }
        Ok(Matrix { rows: self.rows, cols, data })
    }

    /// Elementwise mean. Returns `None` for an empty slice or mismatched shapes.
    pub fn mean(matrices: &[Matrix]) -> Option<Matrix> {
        let first = matrices.first()?;
        if matrices.iter().any(|matrix| matrix.rows != first.rows || matrix.cols != first.cols) {
            return None;
        }
        let count = matrices.len() as f64;
        let mut data = vec![0.0; first.data.len()];
        for matrix in matrices {
            for (sum, value) in data.iter_mut().zip(&matrix.data) {
                *sum += value;
            }
        }
        for value in &mut data {
            *value /= count;
        }
        Some(Matrix { rows: first.rows, cols: first.cols, data })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MonthlyRecord {
    pub month: String,
    pub values: Vec<f64>,
}

/// Which rows of a post office's history feed the predictors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryWindow {
    pub months: usize,
    /// Rows skipped at the recent end, clamped so the window never starts before row 0.
    pub offset: usize,
}

impl HistoryWindow {
    /// Row range of the window, or `None` when the history is too short.
    pub fn range(&self, history_len: usize) -> Option<std::ops::Range<usize>> {
        if history_len < self.months {
            return None;
        }
        let end = history_len.saturating_sub(self.offset).max(self.months);
        Some(end - self.months..end)
    }
}

/// Monthly history per post office, each sorted by month.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeSeriesTable {
    columns: Vec<String>,
    histories: BTreeMap<String, Vec<MonthlyRecord>>,
}

impl TimeSeriesTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, histories: BTreeMap::new() }
    }

    pub fn push(
        &mut self,
        post_office: impl Into<String>,
        record: MonthlyRecord,
    ) -> Result<(), ApplicationError> {
        let post_office = post_office.into();
        if record.values.len() != self.columns.len() {
            return Err(ApplicationError::Data(format!(
                "history row for `{post_office}` month `{}` has {} values, expected {}",
                record.month,
                record.values.len(),
                self.columns.len()
            )));
        }
        let history = self.histories.entry(post_office).or_default();
        let position = history.partition_point(|existing| {
            compare_months(&existing.month, &record.month) != Ordering::Greater
        });
        history.insert(position, record);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn history(&self, post_office: &str) -> &[MonthlyRecord] {
        self.histories.get(post_office).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn post_office_count(&self) -> usize {
        self.histories.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[MonthlyRecord])> {
        self.histories.iter().map(|(post_office, history)| (post_office.as_str(), history.as_slice()))
    }

    pub fn column_indices(&self, names: &[String]) -> Result<Vec<usize>, ApplicationError> {
        names
            .iter()
            .map(|name| {
                self.columns.iter().position(|column| column == name).ok_or_else(|| {
                    ApplicationError::Data(format!("history table has no column `{name}`"))
                })
            })
            .collect()
    }

    /// Window of the selected columns, or `None` when the history is too short.
    pub fn window(
        &self,
        post_office: &str,
        column_indices: &[usize],
        window: HistoryWindow,
    ) -> Option<Matrix> {
        let history = self.history(post_office);
        let range = window.range(history.len())?;
        let cols = column_indices.len();
        let mut data = Vec::with_capacity(window.months * cols);
        for record in &history[range] {
            data.extend(column_indices.iter().map(|index| record.values[*index]));
        }
        Some(Matrix { rows: window.months, cols, data })
    }
}

/// Numeric when both sides parse as numbers, otherwise lexicographic.
pub fn compare_months(left: &str, right: &str) -> Ordering {
    match (left.trim().parse::<f64>(), right.trim().parse::<f64>()) {
        (Ok(left), Ok(right)) => left.total_cmp(&right),
        _ => left.cmp(right),
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use super::{compare_months, HistoryWindow, Matrix, MonthlyRecord, TimeSeriesTable};

    fn record(month: &str, values: Vec<f64>) -> MonthlyRecord {
        MonthlyRecord { month: month.to_owned(), values }
    }

    #[test]
    fn months_sort_numerically_when_possible() {
        assert_eq!(compare_months("2", "10"), Ordering::Less);
        assert_eq!(compare_months("2024-02", "2024-10"), Ordering::Less);
        assert_eq!(compare_months("b", "a"), Ordering::Greater);
    }

    #[test]
    fn push_keeps_history_sorted_and_stable() {
        let mut table = TimeSeriesTable::new(vec!["a".to_owned()]);
        table.push("Alpha SO", record("3", vec![3.0])).expect("push");
        table.push("Alpha SO", record("1", vec![1.0])).expect("push");
        table.push("Alpha SO", record("2", vec![2.0])).expect("push");
        table.push("Alpha SO", record("2", vec![2.5])).expect("push");

        let values: Vec<f64> =
            table.history("Alpha SO").iter().map(|record| record.values[0]).collect();
        assert_eq!(values, vec![1.0, 2.0, 2.5, 3.0]);
    }

    #[test]
    fn window_skips_offset_rows_at_the_recent_end() {
        let window = HistoryWindow { months: 3, offset: 1 };
        assert_eq!(window.range(5), Some(1..4));
        assert_eq!(window.range(3), Some(0..3));
        assert_eq!(window.range(2), None);

        let no_offset = HistoryWindow { months: 3, offset: 0 };
        assert_eq!(no_offset.range(5), Some(2..5));
    }

    #[test]
    fn window_selects_columns_in_requested_order() {
        let mut table = TimeSeriesTable::new(vec!["a".to_owned(), "b".to_owned()]);
        for month in 1..=4 {
            let m = f64::from(month);
            table.push("Alpha SO", record(&month.to_string(), vec![m, m * 10.0])).expect("push");
        }

        let indices = table.column_indices(&["b".to_owned(), "a".to_owned()]).expect("columns");
        let matrix = table
            .window("Alpha SO", &indices, HistoryWindow { months: 2, offset: 1 })
            .expect("window");

        assert_eq!(matrix.rows(), 2);
        assert_eq!(matrix.as_slice(), &[20.0, 2.0, 30.0, 3.0]);
        assert!(table.column_indices(&["missing".to_owned()]).is_err());
    }

    #[test]
    fn hstack_and_mean_follow_row_major_layout() {
        let left = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).expect("matrix");
        let right = Matrix::from_rows(&[vec![5.0], vec![6.0]]).expect("matrix");

        let stacked = left.hstack(&right).expect("stack");
        assert_eq!(stacked.as_slice(), &[1.0, 2.0, 5.0, 3.0, 4.0, 6.0]);

        let other = Matrix::from_rows(&[vec![3.0, 4.0], vec![5.0, 6.0]]).expect("matrix");
        let mean = Matrix::mean(&[left, other]).expect("mean");
        assert_eq!(mean.as_slice(), &[2.0, 3.0, 4.0, 5.0]);
        assert!(Matrix::mean(&[]).is_none());
    }
}
