use chrono::NaiveDate;
use tracing::debug;

use crate::cache::{AnalyticsCache, Slot};
use crate::client::QueryKey;
use crate::filters::FilterState;
use crate::models::{Scores, ScoresOptions, SlidingWindow};

pub const SCORES_OPTIONS: ScoresOptions = ScoresOptions {
    totals: false,
    average: true,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    key: QueryKey,
    generation: u64,
}

impl Ticket {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

#[derive(Debug)]
struct Loaded {
    key: QueryKey,
    window: Slot<SlidingWindow>,
    scores: Slot<Scores>,
}

/// Both payloads are committed together and only for the latest ticket, so
/// panels never see a window from one key beside scores from another.
#[derive(Debug)]
pub struct DashboardSession {
    course_id: String,
    filter: FilterState,
    generation: u64,
    loaded: Option<Loaded>,
}

impl DashboardSession {
    pub fn new(course_id: impl Into<String>, filter: FilterState) -> Self {
        Self {
            course_id: course_id.into(),
            filter,
            generation: 0,
            loaded: None,
        }
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn key(&self) -> QueryKey {
        QueryKey::new(self.course_id.clone(), self.filter.until_date())
    }

    /// Moves the filter. Data for the previous key is no longer visible.
    pub fn set_until(&mut self, date: Option<NaiveDate>) {
        if self.filter.set_until(date) {
            self.generation += 1;
            self.loaded = None;
        }
    }

    /// Drops the active key from the cache and orphans in-flight tickets.
    /// Data already committed stays visible until the next commit.
    pub fn refresh(&mut self, cache: &AnalyticsCache) {
        cache.refresh(&self.key());
        self.generation += 1;
    }

    pub fn begin(&self) -> Ticket {
        Ticket {
            key: self.key(),
            generation: self.generation,
        }
    }

    /// Applies results fetched under `ticket`. Returns false, leaving the
    /// session untouched, when the ticket has been superseded.
    pub fn commit(
        &mut self,
        ticket: Ticket,
        window: Slot<SlidingWindow>,
        scores: Slot<Scores>,
    ) -> bool {
        if ticket.generation != self.generation || ticket.key != self.key() {
            debug!(
                until = %ticket.key.until,
                current = %self.filter.until_date(),
                "dropping stale analytics response"
            );
            return false;
        }
        self.loaded = Some(Loaded {
            key: ticket.key,
            window,
            scores,
        });
        true
    }

    pub async fn load(&mut self, cache: &AnalyticsCache) -> bool {
        let ticket = self.begin();
        let (window, scores) = tokio::join!(
            cache.window(&ticket.key),
            cache.scores(&ticket.key, SCORES_OPTIONS)
        );
        self.commit(ticket, window.into(), scores.into())
    }

    pub fn window_slot(&self) -> Slot<SlidingWindow> {
        self.loaded
            .as_ref()
            .map(|loaded| loaded.window.clone())
            .unwrap_or_default()
    }

    pub fn scores_slot(&self) -> Slot<Scores> {
        self.loaded
            .as_ref()
            .map(|loaded| loaded.scores.clone())
            .unwrap_or_default()
    }

    pub fn window(&self) -> Option<&SlidingWindow> {
        self.loaded.as_ref().and_then(|loaded| loaded.window.ready())
    }

    pub fn scores(&self) -> Option<&Scores> {
        self.loaded.as_ref().and_then(|loaded| loaded.scores.ready())
    }

    pub fn loaded_key(&self) -> Option<&QueryKey> {
        self.loaded.as_ref().map(|loaded| &loaded.key)
    }
}
