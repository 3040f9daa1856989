use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::report::{ReportKind, ReportSpec, DEFAULT_SIDE_COLUMN};

/// Run settings, read from an optional JSON file.
///
/// ```json
/// {
///   "label_column": "Classification",
///   "value_column": "closedPnL",
///   "side_column": "side",
///   "reports": ["average-pnl", "long-short"],
///   "rename": { "Closed PnL": "closedPnL" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub label_column: String,
    pub value_column: String,
    /// Trade direction column split on by the long/short report.
    pub side_column: String,
    pub reports: Vec<ReportKind>,
    /// Column renames applied right after loading (old → new).
    pub rename: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            label_column: "Classification".to_string(),
            value_column: "closedPnL".to_string(),
            side_column: DEFAULT_SIDE_COLUMN.to_string(),
            reports: vec![ReportKind::AveragePnl],
            rename: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// One spec per configured report, in order.
    pub fn report_specs(&self) -> Vec<ReportSpec> {
        self.reports
            .iter()
            .map(|&kind| {
                ReportSpec::new(kind, &self.label_column, &self.value_column)
                    .with_side_column(&self.side_column)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg: Config = serde_json::from_str(r#"{ "reports": ["win-rate", "trade-frequency"] }"#)
            .unwrap();
        assert_eq!(cfg.label_column, "Classification");
        assert_eq!(cfg.value_column, "closedPnL");
        let names: Vec<String> = cfg.report_specs().into_iter().map(|s| s.frame_name).collect();
        assert_eq!(names, ["win_sentiment", "freq_sentiment"]);
    }

    #[test]
    fn test_side_column_reaches_long_short() {
        let cfg: Config =
            serde_json::from_str(r#"{ "side_column": "Side", "reports": ["long-short"] }"#)
                .unwrap();
        let spec = &cfg.report_specs()[0];
        assert_eq!(spec.frame_name, "long_short_sentiment");
        assert_eq!(spec.aggregation, crate::data::aggregate::Aggregation::CountBy("Side".into()));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(serde_json::from_str::<Config>(r#"{ "label": "x" }"#).is_err());
    }

    #[test]
    fn test_default_runs_average_pnl() {
        let specs = Config::default().report_specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].title, "Average PnL by Market Sentiment");
    }
}
