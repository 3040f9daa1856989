use crate::data::aggregate::ResultTable;
use crate::data::model::CellValue;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Figure – a categorical bar chart, independent of any backend
// ---------------------------------------------------------------------------

/// One bar per category. A height is `None` for a group without a value.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub name: String,
    pub heights: Vec<Option<f64>>,
}

/// Bar chart with categories on x. Several series are stacked, in order,
/// the first one at the bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<CellValue>,
    pub series: Vec<BarSeries>,
}

/// Height actually drawn: a missing value is a zero-height bar.
pub fn drawn_height(height: Option<f64>) -> f64 {
    height.unwrap_or(0.0)
}

impl Figure {
    /// Bar chart of `table`: key column on x, one series per value column.
    pub fn bar_chart(table: &ResultTable, title: &str, y_label: &str) -> Self {
        let series = table
            .value_columns()
            .iter()
            .enumerate()
            .map(|(i, name)| BarSeries {
                name: name.clone(),
                heights: table
                    .rows()
                    .iter()
                    .map(|r| r.values.get(i).copied().flatten())
                    .collect(),
            })
            .collect();
        Figure {
            title: title.to_string(),
            x_label: table.key_column().to_string(),
            y_label: y_label.to_string(),
            categories: table.rows().iter().map(|r| r.key.clone()).collect(),
            series,
        }
    }

    pub fn is_stacked(&self) -> bool {
        self.series.len() > 1
    }

    /// Hover text, e.g. `Fear: -1.25`, `Greed: <null>`, or `Fear / BUY: 3`
    /// on a stacked chart.
    pub fn hover_text(&self, series: usize, bar: usize) -> String {
        let category = self
            .categories
            .get(bar)
            .map(|c| c.to_string())
            .unwrap_or_default();
        let height = self
            .series
            .get(series)
            .and_then(|s| s.heights.get(bar).copied().flatten());
        let value = match height {
            Some(h) => h.to_string(),
            None => CellValue::Null.to_string(),
        };
        match (self.is_stacked(), self.series.get(series)) {
            (true, Some(s)) => format!("{category} / {}: {value}", s.name),
            _ => format!("{category}: {value}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Surfaces
// ---------------------------------------------------------------------------

/// Somewhere a finished figure is displayed.
pub trait ChartSurface {
    fn display(&mut self, figure: Figure) -> Result<()>;
}

/// Surface for runs without a window: figures are only logged.
#[derive(Debug, Default)]
pub struct HeadlessSurface;

impl ChartSurface for HeadlessSurface {
    fn display(&mut self, figure: Figure) -> Result<()> {
        log::info!(
            "figure '{}': {} bars x {} series ({} vs {})",
            figure.title,
            figure.categories.len(),
            figure.series.len(),
            figure.y_label,
            figure.x_label
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::ResultRow;

    #[test]
    fn test_bar_chart_follows_table() {
        let table = ResultTable::new(
            "Classification",
            vec!["closedPnL".to_string()],
            vec![
                ResultRow::single("Fear", Some(-1.25)),
                ResultRow::single("Greed", None),
            ],
        );
        let fig = Figure::bar_chart(&table, "Average PnL by Market Sentiment", "closedPnL");
        assert_eq!(fig.x_label, "Classification");
        assert_eq!(fig.y_label, "closedPnL");
        assert!(!fig.is_stacked());
        assert_eq!(fig.categories.len(), 2);
        assert_eq!(fig.hover_text(0, 0), "Fear: -1.25");
        assert_eq!(drawn_height(fig.series[0].heights[1]), 0.0);
        assert_eq!(fig.hover_text(0, 1), "Greed: <null>");
    }

    #[test]
    fn test_unstacked_table_gives_stacked_series() {
        let table = ResultTable::new(
            "Classification",
            vec!["BUY".to_string(), "SELL".to_string()],
            vec![
                ResultRow { key: "Fear".into(), values: vec![Some(0.0), Some(1.0)] },
                ResultRow { key: "Greed".into(), values: vec![Some(2.0), Some(1.0)] },
            ],
        );
        let fig = Figure::bar_chart(&table, "Long/Short Count by Sentiment", "Number of Trades");
        assert!(fig.is_stacked());
        assert_eq!(fig.series[0].name, "BUY");
        assert_eq!(fig.series[1].heights, [Some(1.0), Some(1.0)]);
        assert_eq!(fig.hover_text(0, 1), "Greed / BUY: 2");
    }
}
