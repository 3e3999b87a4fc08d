use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::client::{AnalyticsSource, QueryKey};
use crate::error::FetchError;
use crate::models::{Scores, ScoresOptions, SlidingWindow};

type Cell<T> = Arc<OnceCell<Result<Arc<T>, FetchError>>>;

#[derive(Debug, Clone)]
pub enum Slot<T> {
    Pending,
    Ready(Arc<T>),
    Failed(FetchError),
}

impl<T> Slot<T> {
    /// Pending and failed slots both read as "no data yet".
    pub fn ready(&self) -> Option<&T> {
        match self {
            Slot::Ready(value) => Some(value),
            Slot::Pending | Slot::Failed(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Slot::Pending)
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Pending
    }
}

impl<T> From<Result<Arc<T>, FetchError>> for Slot<T> {
    fn from(result: Result<Arc<T>, FetchError>) -> Self {
        match result {
            Ok(value) => Slot::Ready(value),
            Err(err) => Slot::Failed(err),
        }
    }
}

pub struct AnalyticsCache {
    source: Arc<dyn AnalyticsSource>,
    windows: Mutex<HashMap<QueryKey, Cell<SlidingWindow>>>,
    scores: Mutex<HashMap<(QueryKey, ScoresOptions), Cell<Scores>>>,
    window_fetches: AtomicUsize,
    scores_fetches: AtomicUsize,
}

fn cell_for<K, T>(map: &Mutex<HashMap<K, Cell<T>>>, key: &K) -> Cell<T>
where
    K: Eq + Hash + Clone,
{
    map.lock().entry(key.clone()).or_default().clone()
}

fn peek<K, T>(map: &Mutex<HashMap<K, Cell<T>>>, key: &K) -> Slot<T>
where
    K: Eq + Hash,
{
    match map.lock().get(key).and_then(|cell| cell.get()) {
        Some(result) => result.clone().into(),
        None => Slot::Pending,
    }
}

impl AnalyticsCache {
    pub fn new(source: Arc<dyn AnalyticsSource>) -> Self {
        Self {
            source,
            windows: Mutex::new(HashMap::new()),
            scores: Mutex::new(HashMap::new()),
            window_fetches: AtomicUsize::new(0),
            scores_fetches: AtomicUsize::new(0),
        }
    }

    pub async fn window(&self, key: &QueryKey) -> Result<Arc<SlidingWindow>, FetchError> {
        let cell = cell_for(&self.windows, key);
        if cell.initialized() {
            debug!(course_id = %key.course_id, until = %key.until, "window served from cache");
        }
        cell.get_or_init(|| async {
            self.window_fetches.fetch_add(1, Ordering::Relaxed);
            info!(course_id = %key.course_id, until = %key.until, "fetching sliding window");
            self.source.fetch_window(key).await.map(Arc::new)
        })
        .await
        .clone()
    }

    pub async fn scores(
        &self,
        key: &QueryKey,
        options: ScoresOptions,
    ) -> Result<Arc<Scores>, FetchError> {
        let cell = cell_for(&self.scores, &(key.clone(), options));
        if cell.initialized() {
            debug!(course_id = %key.course_id, until = %key.until, "scores served from cache");
        }
        cell.get_or_init(|| async {
            self.scores_fetches.fetch_add(1, Ordering::Relaxed);
            info!(course_id = %key.course_id, until = %key.until, ?options, "fetching scores");
            self.source.fetch_scores(key, options).await.map(Arc::new)
        })
        .await
        .clone()
    }

    pub fn peek_window(&self, key: &QueryKey) -> Slot<SlidingWindow> {
        peek(&self.windows, key)
    }

    pub fn peek_scores(&self, key: &QueryKey, options: ScoresOptions) -> Slot<Scores> {
        peek(&self.scores, &(key.clone(), options))
    }

    /// Drops every entry for `key` so the next read goes back to the source.
    /// Entries for other keys are kept.
    pub fn refresh(&self, key: &QueryKey) {
        let dropped_window = self.windows.lock().remove(key).is_some();
        let mut scores = self.scores.lock();
        let before = scores.len();
        scores.retain(|(cached, _), _| cached != key);
        info!(
            course_id = %key.course_id,
            until = %key.until,
            dropped_window,
            dropped_scores = before - scores.len(),
            "refreshing analytics"
        );
    }

    pub fn window_fetches(&self) -> usize {
        self.window_fetches.load(Ordering::Relaxed)
    }

    pub fn scores_fetches(&self) -> usize {
        self.scores_fetches.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{key, FakeSource};
    use std::time::Duration;

    #[tokio::test]
    async fn concurrent_reads_share_one_fetch() {
        let source = Arc::new(FakeSource::new().with_delay(Duration::from_millis(20)));
        let cache = AnalyticsCache::new(source.clone());
        let k = key("course-1", 2024, 3, 1);

        let (a, b) = tokio::join!(cache.window(&k), cache.window(&k));

        assert_eq!(source.window_calls(), 1);
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    }

    #[tokio::test]
    async fn concurrent_score_reads_share_one_fetch() {
        let source = Arc::new(FakeSource::new().with_delay(Duration::from_millis(20)));
        let cache = AnalyticsCache::new(source.clone());
        let k = key("course-1", 2024, 3, 1);
        let options = ScoresOptions {
            totals: false,
            average: true,
        };

        let (a, b) = tokio::join!(cache.scores(&k, options), cache.scores(&k, options));

        assert_eq!(source.scores_calls(), 1);
        assert_eq!(cache.scores_fetches(), 1);
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert!(cache.peek_scores(&k, options).ready().is_some());
    }

    #[tokio::test]
    async fn cached_key_is_not_fetched_again() {
        let source = Arc::new(FakeSource::new());
        let cache = AnalyticsCache::new(source.clone());
        let k = key("course-1", 2024, 3, 1);
        let options = ScoresOptions {
            totals: false,
            average: true,
        };

        cache.window(&k).await.unwrap();
        cache.window(&k).await.unwrap();
        cache.scores(&k, options).await.unwrap();
        cache.scores(&k, options).await.unwrap();

        assert_eq!(source.window_calls(), 1);
        assert_eq!(source.scores_calls(), 1);
        assert_eq!(cache.window_fetches(), 1);
        assert_eq!(cache.scores_fetches(), 1);
    }

    #[tokio::test]
    async fn scores_options_are_part_of_the_key() {
        let source = Arc::new(FakeSource::new());
        let cache = AnalyticsCache::new(source.clone());
        let k = key("course-1", 2024, 3, 1);

        cache.scores(&k, ScoresOptions::default()).await.unwrap();
        cache
            .scores(
                &k,
                ScoresOptions {
                    totals: false,
                    average: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(source.scores_calls(), 2);
    }

    #[tokio::test]
    async fn refresh_only_touches_the_active_key() {
        let source = Arc::new(FakeSource::new());
        let cache = AnalyticsCache::new(source.clone());
        let active = key("course-1", 2024, 3, 1);
        let other = key("course-1", 2024, 2, 1);

        cache.window(&active).await.unwrap();
        cache.window(&other).await.unwrap();
        cache.scores(&active, ScoresOptions::default()).await.unwrap();
        cache.refresh(&active);

        assert!(cache.peek_window(&active).is_pending());
        assert!(cache.peek_window(&other).ready().is_some());
        assert!(cache.peek_scores(&active, ScoresOptions::default()).is_pending());

        cache.window(&active).await.unwrap();
        cache.window(&other).await.unwrap();
        assert_eq!(source.window_calls(), 3);
    }

    #[tokio::test]
    async fn failures_stay_in_the_slot_until_refresh() {
        let source = Arc::new(FakeSource::new());
        source.fail_windows(true);
        let cache = AnalyticsCache::new(source.clone());
        let k = key("course-1", 2024, 3, 1);

        assert!(cache.window(&k).await.is_err());
        let slot = cache.peek_window(&k);
        assert!(matches!(slot, Slot::Failed(_)));
        assert!(slot.ready().is_none());

        source.fail_windows(false);
        assert!(cache.window(&k).await.is_err());
        cache.refresh(&k);
        assert!(cache.window(&k).await.is_ok());
        assert_eq!(source.window_calls(), 2);
    }

    #[test]
    fn unknown_key_peeks_as_pending() {
        let cache = AnalyticsCache::new(Arc::new(FakeSource::new()));
        assert!(cache.peek_window(&key("course-1", 2024, 3, 1)).is_pending());
    }
}
