//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use search_console_mcp::client::*;
use search_console_mcp::error::ApiError;
use search_console_mcp::retry::{RetryPolicy, RetryingInvoker, Sleeper};

/// A Search Console API answering from scripted results.
///
/// Analytics results are keyed by the query's start date so concurrent
/// period queries get deterministic answers.
#[derive(Default)]
pub struct FakeApi {
    sites: Mutex<VecDeque<ApiResult<SitesListResponse>>>,
    analytics: Mutex<HashMap<String, VecDeque<ApiResult<SearchAnalyticsResponse>>>>,
    notifications: Mutex<VecDeque<ApiResult<PublishUrlNotificationResponse>>>,
    calls: AtomicU32,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn push_sites(&self, result: ApiResult<SitesListResponse>) {
        self.sites.lock().unwrap().push_back(result);
    }

    pub fn push_analytics(&self, start_date: &str, result: ApiResult<SearchAnalyticsResponse>) {
        self.analytics
            .lock()
            .unwrap()
            .entry(start_date.to_string())
            .or_default()
            .push_back(result);
    }

    pub fn push_notification(&self, result: ApiResult<PublishUrlNotificationResponse>) {
        self.notifications.lock().unwrap().push_back(result);
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn unscripted<T>() -> ApiResult<T> {
    Err(ApiError::transport("no scripted response"))
}

#[async_trait]
impl SearchConsoleApi for FakeApi {
    async fn list_sites(&self) -> ApiResult<SitesListResponse> {
        self.record();
        self.sites.lock().unwrap().pop_front().unwrap_or_else(unscripted)
    }

    async fn query_search_analytics(
        &self,
        _site_url: &str,
        query: &SearchAnalyticsQuery,
    ) -> ApiResult<SearchAnalyticsResponse> {
        self.record();
        self.analytics
            .lock()
            .unwrap()
            .get_mut(&query.start_date)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(unscripted)
    }

    async fn list_sitemaps(&self, _site_url: &str) -> ApiResult<SitemapsListResponse> {
        self.record();
        Ok(SitemapsListResponse::default())
    }

    async fn inspect_url(&self, _request: &InspectUrlRequest) -> ApiResult<InspectUrlResponse> {
        self.record();
        Ok(InspectUrlResponse::default())
    }

    async fn publish_url_notification(
        &self,
        _notification: &UrlNotification,
    ) -> ApiResult<PublishUrlNotificationResponse> {
        self.record();
        self.notifications
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(unscripted)
    }
}

/// Records requested delays without waiting.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Default policy, no waiting.
pub fn instant_invoker() -> RetryingInvoker {
    RetryingInvoker::new(
        RetryPolicy::default()
            .with_initial_delay(Duration::ZERO)
            .with_jitter_max(Duration::ZERO),
    )
}

/// A `YYYY-MM-DD` date `days` before today.
pub fn days_ago(days: i64) -> String {
    (Utc::now().date_naive() - chrono::Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

pub fn row(keys: &[&str], clicks: f64, impressions: f64) -> ApiDataRow {
    ApiDataRow {
        keys: Some(keys.iter().map(|k| k.to_string()).collect()),
        clicks: Some(clicks),
        impressions: Some(impressions),
        ctr: Some(if impressions > 0.0 { clicks / impressions } else { 0.0 }),
        position: Some(5.0),
    }
}
