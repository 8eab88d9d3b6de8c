//! Integration tests for validation, retry and error classification.
//!
//! These exercise the tools end to end against a scripted API: validation
//! must reject bad input before any call, transient failures are retried
//! with backoff, and terminal failures surface immediately.

mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use common::{days_ago, instant_invoker, row, FakeApi, RecordingSleeper};
use search_console_mcp::client::{
    PublishUrlNotificationResponse, SearchAnalyticsResponse, SitesListResponse,
};
use search_console_mcp::error::{classify, ApiError, ErrorCategory, ToolError};
use search_console_mcp::mcp::tools::{
    compare_periods, get_analytics, list_sites, submit_url, ComparePeriodsRequest,
    GetAnalyticsRequest, SubmitUrlRequest,
};
use search_console_mcp::retry::{RetryPolicy, RetryingInvoker};
use search_console_mcp::validation::{
    validate_date, validate_date_range_at, ValidationError,
};

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_malformed_dates_fail_with_bad_format() {
    for value in ["2025-1-1", "25-01-01", "2025.01.01", "January 1, 2025", "2025-01-01 "] {
        let err = validate_date(value, "startDate").unwrap_err();
        assert!(
            matches!(err, ValidationError::BadFormat { .. }),
            "{:?} should fail with BadFormat",
            value
        );
    }
}

#[test]
fn test_calendar_invalid_dates_fail() {
    for value in ["2025-13-01", "2025-02-30", "2023-02-29", "2025-11-31"] {
        let err = validate_date(value, "endDate").unwrap_err();
        assert!(
            matches!(err, ValidationError::InvalidCalendarDate { .. }),
            "{:?} should fail with InvalidCalendarDate",
            value
        );
    }
}

#[test]
fn test_inverted_range_fails() {
    let now = Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap();
    assert_eq!(
        validate_date_range_at("2026-10-02", "2026-10-01", now).unwrap_err(),
        ValidationError::RangeInverted
    );
}

#[test]
fn test_retention_boundary_against_fixed_now() {
    let now = Utc.with_ymd_and_hms(2026, 3, 31, 18, 0, 0).unwrap();
    // 2026-03-31 minus sixteen months clamps to 2024-11-30
    assert!(validate_date_range_at("2024-11-30", "2024-12-31", now).is_ok());
    assert_eq!(
        validate_date_range_at("2024-11-29", "2024-12-31", now).unwrap_err(),
        ValidationError::RangeTooOld
    );
}

// ============================================================================
// Retry behaviour
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_rate_limited_call_makes_four_attempts_and_waits() {
    let invoker = RetryingInvoker::new(RetryPolicy::default());
    let calls = &AtomicU32::new(0);
    let started = tokio::time::Instant::now();

    let result: Result<(), ApiError> = invoker
        .invoke(move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::http(429, "Quota exceeded"))
        })
        .await;

    assert_eq!(result.unwrap_err().code, Some(429));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert!(started.elapsed() >= Duration::from_millis(7000));
}

#[tokio::test]
async fn test_rate_limited_delays_follow_backoff_with_jitter() {
    let sleeper = Arc::new(RecordingSleeper::default());
    let invoker = RetryingInvoker::with_sleeper(RetryPolicy::default(), sleeper.clone());

    let _: Result<(), ApiError> = invoker
        .invoke(|| async { Err(ApiError::http(429, "Quota exceeded")) })
        .await;

    let delays = sleeper.delays();
    assert_eq!(delays.len(), 3);
    for (delay, base_ms) in delays.iter().zip([1000u64, 2000, 4000]) {
        assert!(*delay >= Duration::from_millis(base_ms));
        assert!(*delay < Duration::from_millis(base_ms + 1000));
    }
}

#[tokio::test]
async fn test_not_found_fails_after_one_attempt_without_delay() {
    let sleeper = Arc::new(RecordingSleeper::default());
    let invoker = RetryingInvoker::with_sleeper(RetryPolicy::default(), sleeper.clone());
    let calls = &AtomicU32::new(0);

    let result: Result<(), ApiError> = invoker
        .invoke(move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::http(404, "Not found"))
        })
        .await;

    assert_eq!(result.unwrap_err().code, Some(404));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn test_success_on_second_attempt_after_unavailable() {
    let sleeper = Arc::new(RecordingSleeper::default());
    let invoker = RetryingInvoker::with_sleeper(RetryPolicy::default(), sleeper.clone());
    let calls = &AtomicU32::new(0);

    let result = invoker
        .invoke(move || async move {
            match calls.fetch_add(1, Ordering::SeqCst) {
                0 => Err(ApiError::http(503, "Service unavailable")),
                _ => Ok(42),
            }
        })
        .await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(sleeper.delays().len(), 1);
}

#[tokio::test]
async fn test_nested_response_status_drives_retry() {
    let invoker = instant_invoker();
    let calls = &AtomicU32::new(0);

    let result: Result<(), ApiError> = invoker
        .invoke(move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            let mut error = ApiError::transport("wrapped");
            error.response_status = Some(400);
            Err(error)
        })
        .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn test_unauthorized_and_forbidden_are_access_denied() {
    for status in [401, 403] {
        let classified = classify(&ApiError::http(status, "denied"), "get sitemaps");
        assert_eq!(classified.category, ErrorCategory::AccessDenied);
        assert_eq!(classified.status_code, Some(status));
    }
}

#[test]
fn test_missing_status_is_unclassified() {
    let classified = classify(&ApiError::transport("socket hang up"), "list sites");
    assert_eq!(classified.category, ErrorCategory::Unclassified);
    assert_eq!(classified.message, "Failed to list sites: socket hang up");
    assert_eq!(classified.remediation, "An unexpected error occurred");
}

// ============================================================================
// End to end through the tools
// ============================================================================

fn analytics_request(row_limit: i64) -> GetAnalyticsRequest {
    GetAnalyticsRequest {
        site_url: "https://example.com/".to_string(),
        start_date: days_ago(28),
        end_date: days_ago(1),
        dimensions: None,
        row_limit: Some(row_limit),
        start_row: None,
    }
}

#[tokio::test]
async fn test_row_limit_out_of_range_never_calls_api() {
    for row_limit in [0, 25_001] {
        let api = FakeApi::new();
        let err = get_analytics::run(&api, &instant_invoker(), analytics_request(row_limit))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ToolError::Validation(ValidationError::OutOfRange { .. })
        ));
        assert_eq!(api.calls(), 0);
    }
}

fn compare_request() -> ComparePeriodsRequest {
    ComparePeriodsRequest {
        site_url: "https://example.com/".to_string(),
        current_start_date: days_ago(7),
        current_end_date: days_ago(1),
        previous_start_date: days_ago(14),
        previous_end_date: days_ago(8),
        dimensions: None,
        row_limit: None,
    }
}

#[tokio::test]
async fn test_compare_fails_whole_when_current_period_fails() {
    let api = FakeApi::new();
    let request = compare_request();
    api.push_analytics(
        &request.current_start_date,
        Err(ApiError::http(403, "User does not have sufficient permission")),
    );
    api.push_analytics(
        &request.previous_start_date,
        Ok(SearchAnalyticsResponse {
            rows: vec![row(&["rust"], 10.0, 100.0)],
            response_aggregation_type: None,
        }),
    );

    let err = compare_periods::run(&api, &instant_invoker(), request)
        .await
        .unwrap_err();

    match err {
        ToolError::Api(e) => {
            assert_eq!(e.category, ErrorCategory::AccessDenied);
            assert_eq!(e.message, "Access denied for compare periods");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_compare_success_pairs_periods() {
    let api = FakeApi::new();
    let request = compare_request();
    api.push_analytics(
        &request.current_start_date,
        Ok(SearchAnalyticsResponse {
            rows: vec![row(&["rust"], 30.0, 300.0), row(&["mcp"], 5.0, 50.0)],
            response_aggregation_type: None,
        }),
    );
    api.push_analytics(
        &request.previous_start_date,
        Ok(SearchAnalyticsResponse {
            rows: vec![row(&["rust"], 20.0, 400.0)],
            response_aggregation_type: None,
        }),
    );

    let response = compare_periods::run(&api, &instant_invoker(), request)
        .await
        .unwrap();

    assert_eq!(api.calls(), 2);
    assert_eq!(response.total_rows, 2);
    assert_eq!(response.rows[0].metrics.clicks.change_percent, 50.0);
    assert_eq!(response.rows[0].metrics.impressions.change_percent, -25.0);
    assert_eq!(response.rows[1].metrics.clicks.previous, 0.0);
    assert_eq!(response.totals.clicks.current, 35.0);
    assert_eq!(response.totals.clicks.change_percent, 75.0);
}

#[tokio::test]
async fn test_compare_retries_transient_failure_in_one_period() {
    let api = FakeApi::new();
    let request = compare_request();
    api.push_analytics(&request.current_start_date, Err(ApiError::http(500, "backend")));
    api.push_analytics(
        &request.current_start_date,
        Ok(SearchAnalyticsResponse::default()),
    );
    api.push_analytics(
        &request.previous_start_date,
        Ok(SearchAnalyticsResponse::default()),
    );

    let response = compare_periods::run(&api, &instant_invoker(), request)
        .await
        .unwrap();

    assert_eq!(api.calls(), 3);
    assert!(response.rows.is_empty());
}

#[tokio::test]
async fn test_list_sites_empty_message() {
    let api = FakeApi::new();
    api.push_sites(Ok(SitesListResponse::default()));

    let response = list_sites::run(&api, &instant_invoker()).await.unwrap();
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["sites"], serde_json::json!([]));
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("No Search Console sites found."));
}

#[tokio::test]
async fn test_submit_forbidden_reports_indexing_api() {
    let api = FakeApi::new();
    api.push_notification(Err(ApiError::http(403, "Permission denied")));

    let err = submit_url::run(
        &api,
        &instant_invoker(),
        SubmitUrlRequest {
            url: "https://example.com/page".to_string(),
            notification_type: Default::default(),
        },
    )
    .await
    .unwrap_err();

    assert_eq!(
        err.message(),
        "Indexing API not enabled or insufficient permissions"
    );
    assert_eq!(err.status_code(), Some(403));
    assert_eq!(api.calls(), 1);
}

#[tokio::test]
async fn test_submit_retries_rate_limit_then_succeeds() {
    let api = FakeApi::new();
    api.push_notification(Err(ApiError::http(429, "Quota exceeded")));
    api.push_notification(Ok(PublishUrlNotificationResponse::default()));

    let response = submit_url::run(
        &api,
        &instant_invoker(),
        SubmitUrlRequest {
            url: "https://example.com/page".to_string(),
            notification_type: Default::default(),
        },
    )
    .await
    .unwrap();

    assert!(response.success);
    assert_eq!(api.calls(), 2);
}
