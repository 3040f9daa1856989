use eframe::egui::Color32;

use crate::chart::Figure;
use crate::color::ColorMap;
use crate::data::model::CellValue;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// One figure plus its cached bar colours: one colour per category, or one
/// per series when the figure is stacked.
pub struct FigureView {
    pub figure: Figure,
    pub colors: ColorMap,
    series_keys: Vec<CellValue>,
}

impl FigureView {
    pub fn new(figure: Figure) -> Self {
        let series_keys: Vec<CellValue> = figure
            .series
            .iter()
            .map(|s| CellValue::String(s.name.clone()))
            .collect();
        let colors = if figure.is_stacked() {
            ColorMap::new(&series_keys)
        } else {
            ColorMap::new(&figure.categories)
        };
        Self {
            figure,
            colors,
            series_keys,
        }
    }

    pub fn bar_color(&self, series: usize, bar: usize) -> Color32 {
        let key = if self.figure.is_stacked() {
            self.series_keys.get(series)
        } else {
            self.figure.categories.get(bar)
        };
        key.map_or(Color32::GRAY, |k| self.colors.color_for(k))
    }
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Figures produced by the reports, in run order.
    pub figures: Vec<FigureView>,

    /// Index into `figures` of the one on screen.
    pub selected: usize,
}

impl AppState {
    pub fn new(figures: Vec<Figure>) -> Self {
        Self {
            figures: figures.into_iter().map(FigureView::new).collect(),
            selected: 0,
        }
    }

    pub fn current(&self) -> Option<&FigureView> {
        self.figures.get(self.selected)
    }

    pub fn select(&mut self, index: usize) {
        if index < self.figures.len() {
            self.selected = index;
        }
    }
}
