use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::error::FetchError;
use crate::filters::format_wire_date;
use crate::models::{Scores, ScoresOptions, SlidingWindow};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub course_id: String,
    pub until: NaiveDate,
}

impl QueryKey {
    pub fn new(course_id: impl Into<String>, until: NaiveDate) -> Self {
        QueryKey {
            course_id: course_id.into(),
            until,
        }
    }
}

#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    async fn fetch_window(&self, key: &QueryKey) -> Result<SlidingWindow, FetchError>;

    async fn fetch_scores(
        &self,
        key: &QueryKey,
        options: ScoresOptions,
    ) -> Result<Scores, FetchError>;
}

#[derive(Serialize)]
struct WindowParams<'a> {
    course_id: &'a str,
    until: String,
}

#[derive(Serialize)]
struct ScoresParams<'a> {
    course_id: &'a str,
    until: String,
    totals: bool,
    average: bool,
}

pub struct HttpAnalyticsClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpAnalyticsClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    async fn get<P, T>(&self, path: &str, params: &P) -> Result<T, FetchError>
    where
        P: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self.client.get(&url).query(params);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        if !resp.status().is_success() {
            let code = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status { code, body });
        }

        Ok(resp.json().await?)
    }
}

#[async_trait]
impl AnalyticsSource for HttpAnalyticsClient {
    async fn fetch_window(&self, key: &QueryKey) -> Result<SlidingWindow, FetchError> {
        debug!(course_id = %key.course_id, until = %key.until, "GET tdbp/window");
        let params = WindowParams {
            course_id: &key.course_id,
            until: format_wire_date(key.until),
        };
        self.get("tdbp/window", &params).await
    }

    async fn fetch_scores(
        &self,
        key: &QueryKey,
        options: ScoresOptions,
    ) -> Result<Scores, FetchError> {
        debug!(course_id = %key.course_id, until = %key.until, ?options, "GET tdbp/scores");
        let params = ScoresParams {
            course_id: &key.course_id,
            until: format_wire_date(key.until),
            totals: options.totals,
            average: options.average,
        };
        self.get("tdbp/scores", &params).await
    }
}

/// Serves saved JSON payloads regardless of the requested key.
pub struct FileAnalyticsSource {
    window: PathBuf,
    scores: Option<PathBuf>,
}

impl FileAnalyticsSource {
    pub fn new(window: PathBuf, scores: Option<PathBuf>) -> Self {
        Self { window, scores }
    }
}

#[async_trait]
impl AnalyticsSource for FileAnalyticsSource {
    async fn fetch_window(&self, _key: &QueryKey) -> Result<SlidingWindow, FetchError> {
        let raw = tokio::fs::read_to_string(&self.window).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn fetch_scores(
        &self,
        _key: &QueryKey,
        _options: ScoresOptions,
    ) -> Result<Scores, FetchError> {
        let path = self
            .scores
            .as_ref()
            .ok_or_else(|| FetchError::Transport("no scores file configured".to_string()))?;
        let raw = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}
