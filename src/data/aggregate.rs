use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use crate::error::{PipelineError, Result};

use super::model::{CellValue, Dataset};

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

/// Per-group reduction applied by [`group_by`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregation {
    /// Arithmetic mean of the named column, skipping nulls.
    Mean(String),
    /// Number of rows in the group, nulls included.
    Count,
    /// Rows per group and per value of the named column, unstacked into one
    /// output column per distinct value (sorted). Absent pairs count 0;
    /// rows with a null in the named column are dropped.
    CountBy(String),
}

#[derive(Debug, Default)]
struct Accumulator {
    rows: usize,
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn finish(&self, aggregation: &Aggregation) -> Option<f64> {
        match aggregation {
            Aggregation::Mean(_) if self.count == 0 => None,
            Aggregation::Mean(_) => Some(self.sum / self.count as f64),
            Aggregation::Count | Aggregation::CountBy(_) => Some(self.rows as f64),
        }
    }
}

// ---------------------------------------------------------------------------
// ResultTable – the grouped output, index reset
// ---------------------------------------------------------------------------

/// One group of the result: its key and one value per value column.
/// A value is `None` when every input to it was null.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub key: CellValue,
    pub values: Vec<Option<f64>>,
}

impl ResultRow {
    /// Row of a table with a single value column.
    pub fn single(key: impl Into<CellValue>, value: Option<f64>) -> Self {
        ResultRow {
            key: key.into(),
            values: vec![value],
        }
    }
}

/// Table `[key_column, value_columns..]`, one row per group in ascending
/// key order. Row positions are the plain `0..len` range.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    key_column: String,
    value_columns: Vec<String>,
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new(key_column: &str, value_columns: Vec<String>, rows: Vec<ResultRow>) -> Self {
        ResultTable {
            key_column: key_column.to_string(),
            value_columns,
            rows,
        }
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn value_columns(&self) -> &[String] {
        &self.value_columns
    }

    pub fn columns(&self) -> Vec<&str> {
        std::iter::once(self.key_column.as_str())
            .chain(self.value_columns.iter().map(String::as_str))
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns().contains(&name)
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// First value column for `key`, if the group exists.
    pub fn get(&self, key: &CellValue) -> Option<Option<f64>> {
        self.rows
            .iter()
            .find(|r| &r.key == key)
            .map(|r| r.values.first().copied().flatten())
    }

    /// Value of `column` for `key`, if both exist.
    pub fn value_at(&self, key: &CellValue, column: &str) -> Option<Option<f64>> {
        let idx = self.value_columns.iter().position(|c| c == column)?;
        let row = self.rows.iter().find(|r| &r.key == key)?;
        row.values.get(idx).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Arrow view of the table with a leading unnamed positional index column.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut fields = vec![
            Field::new("", DataType::UInt64, false),
            Field::new(&self.key_column, DataType::Utf8, false),
        ];
        let mut arrays: Vec<ArrayRef> = vec![
            Arc::new(UInt64Array::from_iter_values(0..self.rows.len() as u64)),
            Arc::new(StringArray::from_iter_values(
                self.rows.iter().map(|r| r.key.to_string()),
            )),
        ];
        for (i, column) in self.value_columns.iter().enumerate() {
            fields.push(Field::new(column, DataType::Float64, true));
            arrays.push(Arc::new(Float64Array::from(
                self.rows
                    .iter()
                    .map(|r| r.values.get(i).copied().flatten())
                    .collect::<Vec<_>>(),
            )));
        }
        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
    }

    /// Text table with every row and column.
    pub fn render(&self) -> Result<String> {
        let batch = self.to_record_batch()?;
        Ok(pretty_format_batches(&[batch])?.to_string())
    }
}

// ---------------------------------------------------------------------------
// GROUP BY
// ---------------------------------------------------------------------------

fn require(dataset: &Dataset, column: &str) -> Result<()> {
    if dataset.has_column(column) {
        Ok(())
    } else {
        Err(PipelineError::MissingColumn(column.to_string()))
    }
}

/// Group `dataset` by `key` and reduce each group with `aggregation`.
///
/// Rows with a null key belong to no group. For `Mean` and `Count` the
/// single value column is named `output`; `CountBy` names its columns
/// after the values it splits on.
pub fn group_by(
    dataset: &Dataset,
    key: &str,
    aggregation: &Aggregation,
    output: &str,
) -> Result<ResultTable> {
    require(dataset, key)?;
    match aggregation {
        Aggregation::Mean(column) => require(dataset, column)?,
        Aggregation::CountBy(column) => {
            require(dataset, column)?;
            return count_unstacked(dataset, key, column);
        }
        Aggregation::Count => {}
    }

    let mut groups: BTreeMap<CellValue, Accumulator> = BTreeMap::new();
    for row in 0..dataset.len() {
        let k = dataset.value(row, key);
        if k.is_null() {
            continue;
        }
        let acc = groups.entry(k.clone()).or_default();
        acc.rows += 1;

        let Aggregation::Mean(column) = aggregation else {
            continue;
        };
        let cell = dataset.value(row, column);
        if cell.is_null() {
            continue;
        }
        let v = cell.as_f64().ok_or_else(|| PipelineError::NonNumeric {
            column: column.clone(),
            row,
            value: cell.clone(),
        })?;
        if v.is_nan() {
            continue;
        }
        acc.sum += v;
        acc.count += 1;
    }

    let rows: Vec<ResultRow> = groups
        .into_iter()
        .map(|(key, acc)| ResultRow {
            values: vec![acc.finish(aggregation)],
            key,
        })
        .collect();
    log::debug!("group_by({key}): {} groups from {} rows", rows.len(), dataset.len());

    Ok(ResultTable::new(key, vec![output.to_string()], rows))
}

fn count_unstacked(dataset: &Dataset, key: &str, split: &str) -> Result<ResultTable> {
    let mut counts: BTreeMap<CellValue, BTreeMap<CellValue, usize>> = BTreeMap::new();
    let mut splits: BTreeSet<CellValue> = BTreeSet::new();
    for row in 0..dataset.len() {
        let k = dataset.value(row, key);
        let s = dataset.value(row, split);
        if k.is_null() || s.is_null() {
            continue;
        }
        splits.insert(s.clone());
        *counts.entry(k.clone()).or_default().entry(s.clone()).or_default() += 1;
    }

    let rows: Vec<ResultRow> = counts
        .into_iter()
        .map(|(key, per_split)| ResultRow {
            values: splits
                .iter()
                .map(|s| Some(per_split.get(s).copied().unwrap_or(0) as f64))
                .collect(),
            key,
        })
        .collect();
    log::debug!(
        "group_by({key}, {split}): {} groups x {} columns",
        rows.len(),
        splits.len()
    );

    let columns = splits.iter().map(|s| s.to_string()).collect();
    Ok(ResultTable::new(key, columns, rows))
}

/// Mean of `value` per distinct `key`; the output column keeps the name `value`.
pub fn group_mean(dataset: &Dataset, key: &str, value: &str) -> Result<ResultTable> {
    group_by(dataset, key, &Aggregation::Mean(value.to_string()), value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{trades, Record};

    #[test]
    fn test_group_mean_orders_keys() {
        let ds = trades(&[
            (Some("Positive"), Some(10.0)),
            (Some("Positive"), Some(20.0)),
            (Some("Negative"), Some(-5.0)),
        ]);
        let table = group_mean(&ds, "Classification", "closedPnL").unwrap();
        assert_eq!(table.columns(), ["Classification", "closedPnL"]);
        assert_eq!(
            table.rows(),
            &[
                ResultRow::single("Negative", Some(-5.0)),
                ResultRow::single("Positive", Some(15.0)),
            ]
        );
    }

    #[test]
    fn test_mean_skips_null_values() {
        let ds = trades(&[
            (Some("Fear"), Some(4.0)),
            (Some("Fear"), None),
            (Some("Fear"), Some(8.0)),
        ]);
        let table = group_mean(&ds, "Classification", "closedPnL").unwrap();
        assert_eq!(table.get(&"Fear".into()), Some(Some(6.0)));
    }

    #[test]
    fn test_all_null_group_has_no_mean() {
        let ds = trades(&[(Some("Greed"), None), (Some("Fear"), Some(1.0))]);
        let table = group_mean(&ds, "Classification", "closedPnL").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&"Greed".into()), Some(None));
    }

    #[test]
    fn test_empty_input_keeps_columns() {
        let ds = trades(&[]);
        let table = group_mean(&ds, "Classification", "closedPnL").unwrap();
        assert!(table.is_empty());
        assert!(table.has_column("Classification"));
        assert!(table.has_column("closedPnL"));
        assert!(table.render().unwrap().contains("closedPnL"));
    }

    #[test]
    fn test_count_includes_null_values() {
        let ds = trades(&[
            (Some("Fear"), None),
            (Some("Fear"), Some(2.0)),
            (Some("Greed"), Some(1.0)),
        ]);
        let table = group_by(&ds, "Classification", &Aggregation::Count, "num_trades").unwrap();
        assert_eq!(table.value_columns(), ["num_trades"]);
        assert_eq!(table.get(&"Fear".into()), Some(Some(2.0)));
        assert_eq!(table.get(&"Greed".into()), Some(Some(1.0)));
    }

    #[test]
    fn test_boolean_mean_is_a_rate() {
        let records = [true, false, true, true]
            .into_iter()
            .map(|w| {
                Record::from([
                    ("Classification".to_string(), CellValue::from("Greed")),
                    ("win".to_string(), CellValue::Bool(w)),
                ])
            })
            .collect();
        let ds = Dataset::from_records(records);
        let table = group_mean(&ds, "Classification", "win").unwrap();
        assert_eq!(table.get(&"Greed".into()), Some(Some(0.75)));
    }

    #[test]
    fn test_missing_value_column() {
        let ds = trades(&[(Some("Fear"), Some(1.0))]);
        let err = group_mean(&ds, "Classification", "pnl").unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(c) if c == "pnl"));
    }

    #[test]
    fn test_text_value_is_rejected() {
        let ds = Dataset::from_records(vec![Record::from([
            ("Classification".to_string(), CellValue::from("Fear")),
            ("closedPnL".to_string(), CellValue::from("n/a-ish")),
        ])]);
        let err = group_mean(&ds, "Classification", "closedPnL").unwrap_err();
        assert!(matches!(err, PipelineError::NonNumeric { row: 0, .. }));
    }

    #[test]
    fn test_render_lists_every_row() {
        let ds = trades(&[(Some("Greed"), Some(2.5)), (Some("Fear"), None)]);
        let text = group_mean(&ds, "Classification", "closedPnL")
            .unwrap()
            .render()
            .unwrap();
        let fear = text.find("Fear").unwrap();
        let greed = text.find("Greed").unwrap();
        assert!(fear < greed);
        assert!(text.contains("2.5"));
    }

    fn sided(rows: &[(Option<&str>, Option<&str>)]) -> Dataset {
        let records = rows
            .iter()
            .map(|&(label, side)| {
                Record::from([
                    ("Classification".to_string(), CellValue::from(label)),
                    ("side".to_string(), CellValue::from(side)),
                ])
            })
            .collect();
        Dataset::new(vec!["Classification".to_string(), "side".to_string()], records)
    }

    #[test]
    fn test_count_by_unstacks_and_fills_zero() {
        let ds = sided(&[
            (Some("Greed"), Some("BUY")),
            (Some("Greed"), Some("BUY")),
            (Some("Greed"), Some("SELL")),
            (Some("Fear"), Some("SELL")),
            (Some("Fear"), None),
            (None, Some("BUY")),
        ]);
        let by_side = Aggregation::CountBy("side".to_string());
        let table = group_by(&ds, "Classification", &by_side, "unused").unwrap();

        assert_eq!(table.columns(), ["Classification", "BUY", "SELL"]);
        assert_eq!(table.value_at(&"Fear".into(), "BUY"), Some(Some(0.0)));
        assert_eq!(table.value_at(&"Fear".into(), "SELL"), Some(Some(1.0)));
        assert_eq!(table.value_at(&"Greed".into(), "BUY"), Some(Some(2.0)));
        assert_eq!(table.value_at(&"Greed".into(), "SELL"), Some(Some(1.0)));
        let text = table.render().unwrap();
        assert!(text.contains("BUY") && text.contains("SELL"));
    }

    #[test]
    fn test_count_by_missing_split_column() {
        let ds = trades(&[(Some("Fear"), Some(1.0))]);
        let err = group_by(&ds, "Classification", &Aggregation::CountBy("side".into()), "n")
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(c) if c == "side"));
    }

    #[test]
    fn test_count_by_empty_input() {
        let ds = sided(&[]);
        let table = group_by(&ds, "Classification", &Aggregation::CountBy("side".into()), "n")
            .unwrap();
        assert!(table.is_empty());
        assert!(table.value_columns().is_empty());
        assert!(table.render().is_ok());
    }
}
