use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::chart::{ChartSurface, Figure};
use crate::data::aggregate::{group_by, Aggregation, ResultTable};
use crate::data::filter::drop_null_labels;
use crate::data::model::{CellValue, Dataset};
use crate::error::{PipelineError, Result};

/// Printed instead of a chart when the result cannot be plotted.
pub const NO_PLOT_MESSAGE: &str = "No data to plot or columns missing.";

/// Column holding a trade's direction (`BUY` / `SELL`).
pub const DEFAULT_SIDE_COLUMN: &str = "side";

// ---------------------------------------------------------------------------
// Report catalogue
// ---------------------------------------------------------------------------

/// The sentiment views the tool knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    /// Mean closed PnL per sentiment class.
    AveragePnl,
    /// Share of winning trades per sentiment class.
    WinRate,
    /// Number of trades per sentiment class.
    TradeFrequency,
    /// Buy and sell trade counts per sentiment class, stacked.
    LongShort,
}

/// Column computed before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Derived {
    /// `target = source > 0`; a null source gives `false`.
    PositiveFlag { source: String, target: String },
}

impl Derived {
    fn apply(&self, dataset: &Dataset) -> Result<Dataset> {
        match self {
            Derived::PositiveFlag { source, target } => {
                if !dataset.has_column(source) {
                    return Err(PipelineError::MissingColumn(source.clone()));
                }
                Ok(dataset.with_column(target, |r| {
                    let positive = r
                        .get(source)
                        .and_then(CellValue::as_f64)
                        .is_some_and(|v| v > 0.0);
                    CellValue::Bool(positive)
                }))
            }
        }
    }
}

/// Everything one run of the pipeline needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSpec {
    /// Name printed in the `"{frame_name} DataFrame:"` header.
    pub frame_name: String,
    pub title: String,
    pub y_label: String,
    pub label_column: String,
    /// Name of the single value column; unused by `Aggregation::CountBy`,
    /// whose columns are named after the values it splits on.
    pub output_column: String,
    pub aggregation: Aggregation,
    pub derived: Option<Derived>,
}

impl ReportSpec {
    pub fn new(kind: ReportKind, label_column: &str, value_column: &str) -> Self {
        let label_column = label_column.to_string();
        match kind {
            ReportKind::AveragePnl => ReportSpec {
                frame_name: "pnl_sentiment".into(),
                title: "Average PnL by Market Sentiment".into(),
                y_label: value_column.to_string(),
                label_column,
                output_column: value_column.to_string(),
                aggregation: Aggregation::Mean(value_column.to_string()),
                derived: None,
            },
            ReportKind::WinRate => ReportSpec {
                frame_name: "win_sentiment".into(),
                title: "Win Rate by Market Sentiment".into(),
                y_label: "win".into(),
                label_column,
                output_column: "win".into(),
                aggregation: Aggregation::Mean("win".into()),
                derived: Some(Derived::PositiveFlag {
                    source: value_column.to_string(),
                    target: "win".into(),
                }),
            },
            ReportKind::TradeFrequency => ReportSpec {
                frame_name: "freq_sentiment".into(),
                title: "Trade Frequency by Sentiment".into(),
                y_label: "num_trades".into(),
                label_column,
                output_column: "num_trades".into(),
                aggregation: Aggregation::Count,
                derived: None,
            },
            ReportKind::LongShort => ReportSpec {
                frame_name: "long_short_sentiment".into(),
                title: "Long/Short Count by Sentiment".into(),
                y_label: "Number of Trades".into(),
                label_column,
                output_column: "num_trades".into(),
                aggregation: Aggregation::CountBy(DEFAULT_SIDE_COLUMN.into()),
                derived: None,
            },
        }
    }

    /// Use `side` as the column a `CountBy` report splits on.
    pub fn with_side_column(mut self, side: &str) -> Self {
        if let Aggregation::CountBy(column) = &mut self.aggregation {
            *column = side.to_string();
        }
        self
    }

    /// Non-empty, keyed by the label column, and carrying the value
    /// column(s) the report produces.
    pub fn is_plottable(&self, table: &ResultTable) -> bool {
        if table.is_empty() || table.key_column() != self.label_column {
            return false;
        }
        match &self.aggregation {
            Aggregation::CountBy(_) => !table.value_columns().is_empty(),
            Aggregation::Mean(_) | Aggregation::Count => table.has_column(&self.output_column),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline: filter → aggregate → report
// ---------------------------------------------------------------------------

/// Run one report over `dataset`: print the grouped table to `out` and hand
/// a bar chart to `surface`, or print [`NO_PLOT_MESSAGE`] when there is
/// nothing to plot.
///
/// `dataset` is left untouched. Missing columns are returned as errors;
/// an empty result is not an error.
pub fn run_report<W, S>(
    dataset: &Dataset,
    spec: &ReportSpec,
    out: &mut W,
    surface: &mut S,
) -> Result<ResultTable>
where
    W: Write + ?Sized,
    S: ChartSurface + ?Sized,
{
    let prepared;
    let source = match &spec.derived {
        Some(derived) => {
            prepared = derived.apply(dataset)?;
            &prepared
        }
        None => dataset,
    };

    let filtered = drop_null_labels(source, &spec.label_column)?;
    let table = group_by(
        &filtered,
        &spec.label_column,
        &spec.aggregation,
        &spec.output_column,
    )?;

    writeln!(out, "{} DataFrame:", spec.frame_name)?;
    writeln!(out, "{}", table.render()?)?;

    if spec.is_plottable(&table) {
        surface.display(Figure::bar_chart(&table, &spec.title, &spec.y_label))?;
    } else {
        log::warn!("{}: nothing to plot ({} rows)", spec.frame_name, table.len());
        writeln!(out, "{NO_PLOT_MESSAGE}")?;
    }

    log::info!("{}: {} groups", spec.frame_name, table.len());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::trades;

    #[derive(Default)]
    struct Recorder(Vec<Figure>);

    impl ChartSurface for Recorder {
        fn display(&mut self, figure: Figure) -> Result<()> {
            self.0.push(figure);
            Ok(())
        }
    }

    fn avg_pnl() -> ReportSpec {
        ReportSpec::new(ReportKind::AveragePnl, "Classification", "closedPnL")
    }

    #[test]
    fn test_average_pnl_scenario() {
        let ds = trades(&[
            (Some("Positive"), Some(10.0)),
            (Some("Positive"), Some(20.0)),
            (Some("Negative"), Some(-5.0)),
            (None, Some(100.0)),
        ]);
        let mut out = Vec::new();
        let mut surface = Recorder::default();
        let table = run_report(&ds, &avg_pnl(), &mut out, &mut surface).unwrap();

        assert_eq!(table.get(&"Negative".into()), Some(Some(-5.0)));
        assert_eq!(table.get(&"Positive".into()), Some(Some(15.0)));

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("pnl_sentiment DataFrame:\n"));
        assert!(!text.contains(NO_PLOT_MESSAGE));

        assert_eq!(surface.0.len(), 1);
        let fig = &surface.0[0];
        assert_eq!(fig.title, "Average PnL by Market Sentiment");
        let keys: Vec<String> = fig.categories.iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["Negative", "Positive"]);
    }

    #[test]
    fn test_only_null_labels_prints_diagnostic() {
        let ds = trades(&[(None, Some(5.0))]);
        let mut out = Vec::new();
        let mut surface = Recorder::default();
        let table = run_report(&ds, &avg_pnl(), &mut out, &mut surface).unwrap();

        assert!(table.is_empty());
        assert!(surface.0.is_empty());
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("pnl_sentiment DataFrame:\n"));
        assert!(text.ends_with(&format!("{NO_PLOT_MESSAGE}\n")));
    }

    #[test]
    fn test_guard_rejects_shape_drift() {
        let row = crate::data::aggregate::ResultRow::single("Fear", Some(1.0));
        let table = ResultTable::new("Sentiment", vec!["closedPnL".into()], vec![row.clone()]);
        assert!(!avg_pnl().is_plottable(&table));
        let table = ResultTable::new("Classification", vec!["pnl".into()], vec![row.clone()]);
        assert!(!avg_pnl().is_plottable(&table));
        let table = ResultTable::new("Classification", vec!["closedPnL".into()], vec![row]);
        assert!(avg_pnl().is_plottable(&table));
    }

    #[test]
    fn test_source_is_not_mutated() {
        let ds = trades(&[(Some("Fear"), Some(-2.0)), (None, Some(1.0))]);
        let before = ds.clone();
        let spec = ReportSpec::new(ReportKind::WinRate, "Classification", "closedPnL");
        run_report(&ds, &spec, &mut Vec::new(), &mut Recorder::default()).unwrap();
        assert_eq!(ds, before);
    }

    #[test]
    fn test_win_rate_report() {
        let ds = trades(&[
            (Some("Greed"), Some(3.0)),
            (Some("Greed"), Some(-1.0)),
            (Some("Greed"), None),
            (Some("Fear"), Some(0.0)),
        ]);
        let spec = ReportSpec::new(ReportKind::WinRate, "Classification", "closedPnL");
        let mut out = Vec::new();
        let mut surface = Recorder::default();
        let table = run_report(&ds, &spec, &mut out, &mut surface).unwrap();

        assert_eq!(table.value_columns(), ["win"]);
        assert_eq!(table.get(&"Greed".into()), Some(Some(1.0 / 3.0)));
        assert_eq!(table.get(&"Fear".into()), Some(Some(0.0)));
        assert!(String::from_utf8(out).unwrap().starts_with("win_sentiment DataFrame:"));
        assert_eq!(surface.0[0].title, "Win Rate by Market Sentiment");
    }

    #[test]
    fn test_trade_frequency_report() {
        let ds = trades(&[
            (Some("Fear"), Some(1.0)),
            (Some("Fear"), None),
            (Some("Greed"), Some(2.0)),
            (None, Some(2.0)),
        ]);
        let spec = ReportSpec::new(ReportKind::TradeFrequency, "Classification", "closedPnL");
        let table = run_report(&ds, &spec, &mut Vec::new(), &mut Recorder::default()).unwrap();
        assert_eq!(table.columns(), ["Classification", "num_trades"]);
        assert_eq!(table.get(&"Fear".into()), Some(Some(2.0)));
        assert_eq!(table.get(&"Greed".into()), Some(Some(1.0)));
    }

    #[test]
    fn test_missing_label_column_propagates() {
        let ds = trades(&[(Some("Fear"), Some(1.0))]);
        let spec = ReportSpec::new(ReportKind::AveragePnl, "sentiment", "closedPnL");
        let mut out = Vec::new();
        let err = run_report(&ds, &spec, &mut out, &mut Recorder::default()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(c) if c == "sentiment"));
        assert!(out.is_empty());
    }

    fn sided(rows: &[(Option<&str>, Option<&str>)]) -> Dataset {
        let records = rows
            .iter()
            .map(|(label, side)| {
                crate::data::model::Record::from([
                    ("Classification".to_string(), CellValue::from(*label)),
                    ("side".to_string(), CellValue::from(*side)),
                ])
            })
            .collect();
        Dataset::new(vec!["Classification".to_string(), "side".to_string()], records)
    }

    #[test]
    fn test_long_short_report_is_stacked() {
        let ds = sided(&[
            (Some("Greed"), Some("BUY")),
            (Some("Greed"), Some("SELL")),
            (Some("Greed"), Some("BUY")),
            (Some("Fear"), Some("SELL")),
            (None, Some("BUY")),
            (Some("Fear"), None),
        ]);
        let spec = ReportSpec::new(ReportKind::LongShort, "Classification", "closedPnL");
        let mut out = Vec::new();
        let mut surface = Recorder::default();
        let table = run_report(&ds, &spec, &mut out, &mut surface).unwrap();

        assert_eq!(table.columns(), ["Classification", "BUY", "SELL"]);
        assert_eq!(table.value_at(&"Fear".into(), "BUY"), Some(Some(0.0)));
        assert_eq!(table.value_at(&"Greed".into(), "BUY"), Some(Some(2.0)));
        assert_eq!(table.value_at(&"Greed".into(), "SELL"), Some(Some(1.0)));
        assert!(String::from_utf8(out)
            .unwrap()
            .starts_with("long_short_sentiment DataFrame:\n"));

        let fig = &surface.0[0];
        assert_eq!(fig.title, "Long/Short Count by Sentiment");
        assert_eq!(fig.y_label, "Number of Trades");
        assert!(fig.is_stacked());
        assert_eq!(fig.series[1].name, "SELL");
        assert_eq!(fig.series[1].heights, [Some(1.0), Some(1.0)]);
    }

    #[test]
    fn test_long_short_uses_configured_side_column() {
        let ds = sided(&[(Some("Fear"), Some("BUY"))]);
        let spec = ReportSpec::new(ReportKind::LongShort, "Classification", "closedPnL")
            .with_side_column("direction");
        let err = run_report(&ds, &spec, &mut Vec::new(), &mut Recorder::default()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(c) if c == "direction"));
    }
}
