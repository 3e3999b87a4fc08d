use std::cmp::Ordering;

use crate::error::DashboardError;
use crate::models::{Action, SlidingWindow};
use crate::taxonomy::{self, ModuleKind};

use super::{BarChart, BarDatum, BarSeries, ChartView, Role, PERCENT};

pub const SERIES_NAME: &str = "Score d'activation";

/// Actions of `kind` ranked by ascending activation rate. Equal rates keep
/// the order the service sent them in.
pub fn ranked_actions(actions: &[Action], kind: ModuleKind) -> Result<Vec<&Action>, DashboardError> {
    let mut ranked = taxonomy::filter_kind(actions, kind)?;
    ranked.sort_by(|a, b| {
        a.activation_rate
            .partial_cmp(&b.activation_rate)
            .unwrap_or(Ordering::Equal)
    });
    Ok(ranked)
}

/// Students get their own bars flagged through `is_activator`; instructors
/// only see the cohort-wide rate. A window without active actions renders
/// the empty chart, `Loading` is reserved for a window not fetched yet.
pub fn build(
    snapshot: Option<&SlidingWindow>,
    kind: ModuleKind,
    highlighted: Option<&str>,
    role: Role,
) -> Result<ChartView<BarChart>, DashboardError> {
    let Some(snapshot) = snapshot else {
        return Ok(ChartView::Loading);
    };
    let Some(actions) = snapshot.active_actions.as_deref() else {
        return Ok(ChartView::Ready(BarChart::default()));
    };

    let ranked = ranked_actions(actions, kind)?;
    if ranked.is_empty() {
        return Ok(ChartView::Ready(BarChart::default()));
    }

    let highlighted = match role {
        Role::Student => highlighted,
        Role::Instructor => None,
    };

    let data = ranked
        .iter()
        .map(|action| BarDatum {
            value: action.activation_rate * PERCENT,
            is_activator: highlighted.map(|student| action.is_activated_by(student)),
            label: action
                .activation_date
                .map(|date| date.format("%d/%m/%y").to_string()),
        })
        .collect();

    Ok(ChartView::Ready(BarChart {
        categories: ranked.iter().map(|action| action.name.clone()).collect(),
        series: vec![BarSeries::stacked(SERIES_NAME, data)],
    }))
}
