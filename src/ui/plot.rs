use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::chart::drawn_height;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Bar chart (central panel)
// ---------------------------------------------------------------------------

/// Render the selected figure as a categorical bar chart. Each series is
/// stacked on top of the ones before it.
pub fn bar_plot(ui: &mut Ui, state: &AppState) {
    let Some(view) = state.current() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No figures to show");
        });
        return;
    };
    let figure = &view.figure;

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(figure.title.as_str());
    });

    let mut charts: Vec<BarChart> = Vec::with_capacity(figure.series.len());
    for (s, series) in figure.series.iter().enumerate() {
        let bars: Vec<Bar> = series
            .heights
            .iter()
            .enumerate()
            .map(|(i, &height)| {
                Bar::new(i as f64, drawn_height(height))
                    .name(figure.hover_text(s, i))
                    .fill(view.bar_color(s, i))
                    .width(0.6)
            })
            .collect();
        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars)
            .name(series.name.as_str())
            .stack_on(&below);
        charts.push(chart);
    }

    // Category names for the x axis ticks, by bar position.
    let labels: Vec<String> = figure.categories.iter().map(|c| c.to_string()).collect();
    let stacked = figure.is_stacked();

    Plot::new(("bar_plot", state.selected))
        .x_axis_label(figure.x_label.as_str())
        .y_axis_label(figure.y_label.as_str())
        .x_axis_formatter(move |mark, _range| {
            let pos = mark.value.round();
            if (mark.value - pos).abs() > f64::EPSILON || pos < 0.0 {
                return String::new();
            }
            labels.get(pos as usize).cloned().unwrap_or_default()
        })
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for chart in charts {
                if stacked {
                    plot_ui.bar_chart(chart);
                } else {
                    plot_ui.bar_chart(chart.name(figure.y_label.as_str()));
                }
            }
        });
}
