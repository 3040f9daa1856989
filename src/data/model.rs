use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the trade table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
/// Group keys live in `BTreeMap`s downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string kept as text for simplicity.
    Date(String),
    Null,
}

// -- Manual Eq/Ord so we can group on CellValue --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            CellValue::Null
        } else {
            CellValue::Float(v)
        }
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}

impl CellValue {
    /// Interpret the value as an `f64` for averaging.
    /// Booleans count as 0/1, the way a mean over a boolean column does.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

static NULL: CellValue = CellValue::Null;

// ---------------------------------------------------------------------------
// Record – one row of the DataFrame
// ---------------------------------------------------------------------------

/// A single trade row: column_name → value.
pub type Record = BTreeMap<String, CellValue>;

// ---------------------------------------------------------------------------
// Dataset – an ordered table of records with an explicit schema
// ---------------------------------------------------------------------------

/// The in-memory table handed to the pipeline by the loading stage.
///
/// The column list is kept separately from the rows so that an empty
/// dataset still reports its schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    /// Build a dataset with an explicit column order.
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Dataset { columns, records }
    }

    /// Build a dataset whose schema is the sorted union of the records' keys.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut columns: Vec<String> = records
            .iter()
            .flat_map(|r| r.keys().cloned())
            .collect();
        columns.sort();
        columns.dedup();
        Dataset { columns, records }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Cell at `row`/`column`. Keys missing from a record read as null.
    pub fn value(&self, row: usize, column: &str) -> &CellValue {
        self.records
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&NULL)
    }

    /// Same schema, only the records at `indices` (in that order).
    pub fn select_rows(&self, indices: &[usize]) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            records: indices
                .iter()
                .filter_map(|&i| self.records.get(i).cloned())
                .collect(),
        }
    }

    /// A copy with one extra column computed from each record.
    /// An existing column of the same name is overwritten.
    pub fn with_column<F>(&self, name: &str, f: F) -> Dataset
    where
        F: Fn(&Record) -> CellValue,
    {
        let mut columns = self.columns.clone();
        if !self.has_column(name) {
            columns.push(name.to_string());
        }
        let records = self
            .records
            .iter()
            .map(|r| {
                let mut r = r.clone();
                let v = f(&r);
                r.insert(name.to_string(), v);
                r
            })
            .collect();
        Dataset { columns, records }
    }

    /// Rename columns in place (old name → new name), all renames at once.
    /// Unknown names are ignored.
    pub fn rename_columns(&mut self, renames: &BTreeMap<String, String>) {
        let rename = |name: String| renames.get(&name).cloned().unwrap_or(name);
        self.columns = std::mem::take(&mut self.columns)
            .into_iter()
            .map(rename)
            .collect();
        self.records = std::mem::take(&mut self.records)
            .into_iter()
            .map(|rec| rec.into_iter().map(|(k, v)| (rename(k), v)).collect())
            .collect();
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn trades(rows: &[(Option<&str>, Option<f64>)]) -> Dataset {
    let records = rows
        .iter()
        .map(|(label, pnl)| {
            let mut r = Record::new();
            r.insert("Classification".to_string(), (*label).into());
            r.insert("closedPnL".to_string(), (*pnl).into());
            r
        })
        .collect();
    Dataset::new(
        vec!["Classification".to_string(), "closedPnL".to_string()],
        records,
    )
}
