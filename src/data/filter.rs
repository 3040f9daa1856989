use crate::error::{PipelineError, Result};

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Null-label filter
// ---------------------------------------------------------------------------

/// Return indices of rows whose `label` cell is non-null.
pub fn non_null_indices(dataset: &Dataset, label: &str) -> Result<Vec<usize>> {
    if !dataset.has_column(label) {
        return Err(PipelineError::MissingColumn(label.to_string()));
    }
    Ok((0..dataset.len())
        .filter(|&i| !dataset.value(i, label).is_null())
        .collect())
}

/// Derive the subsequence of rows whose `label` is present.
///
/// Null values in other columns are kept; averaging skips them later.
pub fn drop_null_labels(dataset: &Dataset, label: &str) -> Result<Dataset> {
    let keep = non_null_indices(dataset, label)?;
    log::debug!(
        "drop_null_labels({label}): kept {} of {} rows",
        keep.len(),
        dataset.len()
    );
    Ok(dataset.select_rows(&keep))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::trades;

    #[test]
    fn test_drops_only_null_labels() {
        let ds = trades(&[
            (Some("Positive"), Some(10.0)),
            (None, Some(100.0)),
            (Some("Negative"), None),
        ]);
        let filtered = drop_null_labels(&ds, "Classification").unwrap();
        assert_eq!(filtered.len(), 2);
        assert!((0..filtered.len()).all(|i| !filtered.value(i, "Classification").is_null()));
        // null outcome survives the label filter
        assert!(filtered.value(1, "closedPnL").is_null());
        assert_eq!(filtered.columns(), ds.columns());
    }

    #[test]
    fn test_all_null_labels_gives_empty_view() {
        let ds = trades(&[(None, Some(5.0)), (None, None)]);
        let filtered = drop_null_labels(&ds, "Classification").unwrap();
        assert!(filtered.is_empty());
        assert!(filtered.has_column("closedPnL"));
    }

    #[test]
    fn test_missing_label_column() {
        let ds = trades(&[(Some("Fear"), Some(1.0))]);
        let err = drop_null_labels(&ds, "Sentiment").unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(c) if c == "Sentiment"));
    }
}
