use serde::Serialize;

use crate::models::SlidingWindow;

/// Shown while a value has not been loaded. Zero is a real value and is
/// never used as a placeholder.
pub const PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub window: String,
    pub actions: String,
    pub cohort: String,
}

fn counted(count: usize, singular: &str, plural: &str) -> String {
    format!("{} {}", count, if count > 1 { plural } else { singular })
}

pub fn actions_count(snapshot: Option<&SlidingWindow>) -> String {
    match snapshot.and_then(|s| s.active_actions.as_ref()) {
        Some(actions) => counted(actions.len(), "action", "actions"),
        None => PLACEHOLDER.to_string(),
    }
}

pub fn cohort_size(snapshot: Option<&SlidingWindow>) -> String {
    match snapshot.and_then(|s| s.dynamic_cohort.as_ref()) {
        Some(cohort) => counted(cohort.len(), "élève", "élèves"),
        None => PLACEHOLDER.to_string(),
    }
}

pub fn window_range(snapshot: Option<&SlidingWindow>) -> String {
    match snapshot {
        Some(s) => format!(
            "{} - {}",
            s.window.since.format("%d %b %Y"),
            s.window.until.format("%d %b %Y")
        ),
        None => PLACEHOLDER.to_string(),
    }
}

pub fn summarize(snapshot: Option<&SlidingWindow>) -> Summary {
    Summary {
        window: window_range(snapshot),
        actions: actions_count(snapshot),
        cohort: cohort_size(snapshot),
    }
}
