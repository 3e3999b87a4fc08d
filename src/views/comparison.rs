use std::cmp::Ordering;

use serde::Serialize;

use crate::error::DashboardError;
use crate::models::Scores;
use crate::taxonomy::{self, ModuleKind};

use super::{clamp_score, BarChart, BarDatum, BarSeries, ChartView};

pub const RESOURCE_SERIES: &str = "Score ressource";
pub const ACTIVITY_SERIES: &str = "Score activité";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentTotal {
    pub student: String,
    pub resource_score: f64,
    pub activity_score: f64,
}

impl StudentTotal {
    pub fn total(&self) -> f64 {
        self.resource_score + self.activity_score
    }
}

fn masked_sum(values: &[f64], mask: &[bool]) -> f64 {
    values
        .iter()
        .zip(mask)
        .filter(|(_, selected)| **selected)
        .map(|(value, _)| clamp_score(*value))
        .sum()
}

/// Per-student resource and activity totals, lowest overall total first.
/// Students with equal totals keep the service's order.
pub fn student_totals(scores: &Scores) -> Result<Vec<StudentTotal>, DashboardError> {
    let resource_mask = taxonomy::mask(&scores.actions, ModuleKind::Resource)?;
    let activity_mask = taxonomy::mask(&scores.actions, ModuleKind::Activity)?;

    let mut totals: Vec<StudentTotal> = scores
        .scores
        .iter()
        .map(|entry| StudentTotal {
            student: entry.student.clone(),
            resource_score: masked_sum(&entry.values, &resource_mask),
            activity_score: masked_sum(&entry.values, &activity_mask),
        })
        .collect();

    totals.sort_by(|a, b| a.total().partial_cmp(&b.total()).unwrap_or(Ordering::Equal));
    Ok(totals)
}

pub fn build(scores: Option<&Scores>) -> Result<ChartView<BarChart>, DashboardError> {
    let Some(scores) = scores else {
        return Ok(ChartView::Loading);
    };

    let totals = student_totals(scores)?;
    if totals.is_empty() {
        return Ok(ChartView::Ready(BarChart::default()));
    }

    let resource = totals.iter().map(|t| BarDatum::plain(t.resource_score)).collect();
    let activity = totals.iter().map(|t| BarDatum::plain(t.activity_score)).collect();

    Ok(ChartView::Ready(BarChart {
        categories: totals.into_iter().map(|t| t.student).collect(),
        series: vec![
            BarSeries::stacked(RESOURCE_SERIES, resource),
            BarSeries::stacked(ACTIVITY_SERIES, activity),
        ],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{activity, resource, scores};

    #[test]
    fn negative_sentinels_never_reduce_sums() {
        let matrix = scores(
            vec![resource("r", 0.5, &[]), activity("a", 0.5, &[])],
            vec![("student-1", vec![-1.0, 3.0]), ("student-2", vec![2.0, -5.0])],
            None,
        );

        let totals = student_totals(&matrix).unwrap();
        let one = totals.iter().find(|t| t.student == "student-1").unwrap();
        let two = totals.iter().find(|t| t.student == "student-2").unwrap();

        assert_eq!(one.resource_score, 0.0);
        assert_eq!(one.activity_score, 3.0);
        assert_eq!(two.resource_score, 2.0);
        assert_eq!(two.activity_score, 0.0);
    }

    #[test]
    fn sorted_by_total_with_stable_ties() {
        let matrix = scores(
            vec![resource("r", 0.5, &[]), activity("a", 0.5, &[])],
            vec![
                ("zoe", vec![2.0, 2.0]),
                ("adam", vec![1.0, 0.0]),
                ("mia", vec![0.0, 4.0]),
                ("leo", vec![0.5, 0.5]),
            ],
            None,
        );

        let view = build(Some(&matrix)).unwrap();
        let chart = view.ready().unwrap();

        assert_eq!(chart.categories, vec!["adam", "leo", "zoe", "mia"]);
        assert_eq!(chart.series[0].name, RESOURCE_SERIES);
        assert_eq!(chart.series[0].values(), vec![1.0, 0.5, 2.0, 0.0]);
        assert_eq!(chart.series[1].values(), vec![0.0, 0.5, 2.0, 4.0]);
    }

    #[test]
    fn short_score_rows_count_missing_columns_as_zero() {
        let matrix = scores(
            vec![resource("r", 0.5, &[]), activity("a", 0.5, &[])],
            vec![("alice", vec![1.0])],
            None,
        );

        let totals = student_totals(&matrix).unwrap();
        assert_eq!(totals[0].total(), 1.0);
    }

    #[test]
    fn no_scores_yet_is_a_placeholder() {
        assert!(build(None).unwrap().is_loading());
    }

    #[test]
    fn empty_matrix_gives_empty_chart() {
        let matrix = scores(Vec::new(), Vec::new(), None);
        let view = build(Some(&matrix)).unwrap();
        assert_eq!(view, ChartView::Ready(BarChart::default()));
        assert!(view.ready().unwrap().is_empty());
    }
}
