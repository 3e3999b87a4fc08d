use std::collections::HashMap;

use tracing::warn;

use crate::error::DashboardError;
use crate::models::{Action, Scores, SlidingWindow};
use crate::taxonomy::{self, ModuleKind};

use super::{as_percent, ChartView, Indicator, RadarChart, RadarSeries, PERCENT};

pub const COHORT_SERIES: &str = "Moyenne de la cohorte";
pub const COHORT_LABEL: &str = "moyenne cohorte";
pub const STUDENT_SERIES: &str = "Score de l'étudiant";

fn align(indicators: &[&Action], scores: &Scores) -> Vec<Option<usize>> {
    let positions: HashMap<&str, usize> = scores
        .actions
        .iter()
        .enumerate()
        .map(|(idx, action)| (action.iri.as_str(), idx))
        .collect();

    let aligned: Vec<Option<usize>> = indicators
        .iter()
        .map(|action| positions.get(action.iri.as_str()).copied())
        .collect();

    let missing = aligned.iter().filter(|pos| pos.is_none()).count();
    if missing > 0 {
        warn!(missing, "radar indicators without a score column, plotted as zero");
    }
    aligned
}

fn project(values: &[f64], aligned: &[Option<usize>]) -> Vec<f64> {
    aligned
        .iter()
        .map(|pos| {
            pos.and_then(|idx| values.get(idx).copied())
                .map(as_percent)
                .unwrap_or(0.0)
        })
        .collect()
}

/// Axes are emitted as soon as the window is known so the radar is drawn
/// before the scores arrive.
pub fn build(
    snapshot: Option<&SlidingWindow>,
    scores: Option<&Scores>,
    student: Option<&str>,
) -> Result<ChartView<RadarChart>, DashboardError> {
    let Some(snapshot) = snapshot else {
        return Ok(ChartView::Loading);
    };
    let Some(actions) = snapshot.active_actions.as_deref() else {
        return Ok(ChartView::Ready(RadarChart::default()));
    };

    let resources = taxonomy::filter_kind(actions, ModuleKind::Resource)?;
    let indicators = resources
        .iter()
        .map(|action| Indicator {
            name: action.name.clone(),
            max: PERCENT,
        })
        .collect();

    let Some(scores) = scores else {
        return Ok(ChartView::Ready(RadarChart {
            indicators,
            ..RadarChart::default()
        }));
    };

    let aligned = align(&resources, scores);
    let mut series = Vec::new();

    if let Some(average) = &scores.average {
        series.push(RadarSeries {
            name: COHORT_SERIES.to_string(),
            label: COHORT_LABEL.to_string(),
            values: project(average, &aligned),
        });
    }

    if let Some((student, values)) = student.and_then(|id| scores.student(id).map(|v| (id, v))) {
        series.push(RadarSeries {
            name: STUDENT_SERIES.to_string(),
            label: student.to_string(),
            values: project(values, &aligned),
        });
    }

    Ok(ChartView::Ready(RadarChart {
        indicators,
        series,
        student_options: scores.students().map(str::to_string).collect(),
    }))
}
