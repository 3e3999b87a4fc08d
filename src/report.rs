use std::fmt::Write;

use crate::pages::{PanelContent, RenderedPage};
use crate::views::{BarChart, ChartView, RadarChart};

fn write_bar(output: &mut String, chart: &BarChart) {
    if chart.categories.is_empty() {
        let _ = writeln!(output, "No data for this window.");
        return;
    }

    for (idx, category) in chart.categories.iter().enumerate() {
        let values: Vec<String> = chart
            .series
            .iter()
            .filter_map(|series| {
                series.data.get(idx).map(|datum| {
                    let mut cell = format!("{} {:.1}", series.name, datum.value);
                    if datum.is_activator == Some(true) {
                        cell.push_str(" (done)");
                    }
                    if let Some(label) = &datum.label {
                        let _ = write!(cell, " since {}", label);
                    }
                    cell
                })
            })
            .collect();
        let _ = writeln!(output, "- {}: {}", category, values.join(", "));
    }
}

fn write_radar(output: &mut String, chart: &RadarChart) {
    if chart.indicators.is_empty() {
        let _ = writeln!(output, "No resources in this window.");
        return;
    }
    if chart.series.is_empty() {
        let _ = writeln!(output, "Scores not available yet.");
    }

    for (idx, indicator) in chart.indicators.iter().enumerate() {
        let values: Vec<String> = chart
            .series
            .iter()
            .filter_map(|series| {
                series
                    .values
                    .get(idx)
                    .map(|value| format!("{} {:.1}/{:.0}", series.label, value, indicator.max))
            })
            .collect();
        if values.is_empty() {
            let _ = writeln!(output, "- {}", indicator.name);
        } else {
            let _ = writeln!(output, "- {}: {}", indicator.name, values.join(", "));
        }
    }
}

fn write_chart<T>(output: &mut String, chart: &ChartView<T>, write: fn(&mut String, &T)) {
    match chart {
        ChartView::Loading => {
            let _ = writeln!(output, "Loading.");
        }
        ChartView::Ready(chart) => write(output, chart),
    }
}

pub fn build_report(page: &RenderedPage) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Learning Dashboard ({})", page.page.name());
    let _ = writeln!(
        output,
        "Generated for course {} (window ending {})",
        page.course_id, page.until
    );

    for panel in &page.panels {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", panel.title);

        match &panel.content {
            PanelContent::Filters { until, max } => {
                let _ = writeln!(output, "Until {} (latest selectable {})", until, max);
            }
            PanelContent::Text { value } => {
                let _ = writeln!(output, "{}", value);
            }
            PanelContent::Bar { chart } => write_chart(&mut output, chart, write_bar),
            PanelContent::Radar { chart } => write_chart(&mut output, chart, write_radar),
            PanelContent::Error { message } => {
                let _ = writeln!(output, "Unavailable: {}", message);
            }
        }
    }

    output
}
