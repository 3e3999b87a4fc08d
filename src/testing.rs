use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::client::{AnalyticsSource, QueryKey};
use crate::error::FetchError;
use crate::models::{Action, Scores, ScoresOptions, SlidingWindow, StudentScores, Window};
use crate::taxonomy::{ActivityType, ResourceType};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn key(course_id: &str, year: i32, month: u32, day: u32) -> QueryKey {
    QueryKey::new(course_id, date(year, month, day))
}

pub fn action(iri: &str, tag: &str, rate: f64, students: &[&str]) -> Action {
    Action {
        iri: iri.to_string(),
        name: format!("Action {iri}"),
        module_type: tag.to_string(),
        activation_date: Some(date(2024, 2, 20)),
        activation_rate: rate,
        activation_students: students.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn resource(iri: &str, rate: f64, students: &[&str]) -> Action {
    action(iri, ResourceType::Page.tag(), rate, students)
}

pub fn activity(iri: &str, rate: f64, students: &[&str]) -> Action {
    action(iri, ActivityType::QuizAttempt.tag(), rate, students)
}

pub fn sliding_window(until: NaiveDate, actions: Vec<Action>, cohort: &[&str]) -> SlidingWindow {
    SlidingWindow {
        window: Window {
            since: until - chrono::Duration::days(14),
            until,
        },
        active_actions: Some(actions),
        dynamic_cohort: Some(cohort.iter().map(|s| s.to_string()).collect()),
    }
}

pub fn scores(actions: Vec<Action>, rows: Vec<(&str, Vec<f64>)>, average: Option<Vec<f64>>) -> Scores {
    Scores {
        actions,
        scores: rows
            .into_iter()
            .map(|(student, values)| StudentScores {
                student: student.to_string(),
                values,
            })
            .collect(),
        total: None,
        average,
    }
}

/// Answers every key with the same payloads, dated to the requested key.
pub struct FakeSource {
    actions: Vec<Action>,
    delay: Duration,
    fail_windows: AtomicBool,
    window_calls: AtomicUsize,
    scores_calls: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            actions: vec![
                resource("r1", 0.5, &["alice"]),
                activity("a1", 0.25, &["bob"]),
            ],
            delay: Duration::ZERO,
            fail_windows: AtomicBool::new(false),
            window_calls: AtomicUsize::new(0),
            scores_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fail_windows(&self, fail: bool) {
        self.fail_windows.store(fail, Ordering::SeqCst);
    }

    pub fn window_calls(&self) -> usize {
        self.window_calls.load(Ordering::SeqCst)
    }

    pub fn scores_calls(&self) -> usize {
        self.scores_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalyticsSource for FakeSource {
    async fn fetch_window(&self, key: &QueryKey) -> Result<SlidingWindow, FetchError> {
        self.window_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_windows.load(Ordering::SeqCst) {
            return Err(FetchError::Status {
                code: 500,
                body: "An error occurred while computing sliding window".to_string(),
            });
        }
        Ok(sliding_window(key.until, self.actions.clone(), &["alice", "bob"]))
    }

    async fn fetch_scores(
        &self,
        _key: &QueryKey,
        options: ScoresOptions,
    ) -> Result<Scores, FetchError> {
        self.scores_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let average = options.average.then(|| vec![0.5, 0.25]);
        Ok(scores(
            self.actions.clone(),
            vec![("alice", vec![1.0, 0.0]), ("bob", vec![0.0, 1.0])],
            average,
        ))
    }
}
