// submit_url_for_indexing MCP tool implementation
// Publishes an Indexing API notification for a URL

use chrono::{SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::client::{NotificationType, SearchConsoleApi, UrlNotification};
use crate::error::{classify, ClassifiedError, ErrorCategory, ToolResult};
use crate::retry::RetryingInvoker;
use crate::validation::{validate_url, PAGE_URL_EXAMPLE};

const CONTEXT: &str = "submit URL for indexing";

/// Request parameters for the submit_url_for_indexing tool.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct SubmitUrlRequest {
    #[schemars(description = r#"The full URL to submit (e.g., "https://example.com/page")"#)]
    pub url: String,
    #[schemars(
        description = "Type of notification: URL_UPDATED (request indexing) or URL_DELETED (request removal)"
    )]
    #[serde(rename = "type", default)]
    pub notification_type: NotificationType,
}

/// Response from the submit_url_for_indexing tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitUrlResponse {
    pub success: bool,
    pub url: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub notify_time: String,
    pub message: String,
}

/// Confirmation text for a published notification.
pub fn success_message(notification_type: NotificationType) -> &'static str {
    match notification_type {
        NotificationType::UrlUpdated => {
            "Successfully submitted URL for indexing. Google will crawl this URL soon."
        }
        NotificationType::UrlDeleted => "Successfully requested URL removal from index.",
    }
}

/// The error reported when the Indexing API answers 403.
pub fn indexing_forbidden() -> ClassifiedError {
    ClassifiedError::new(
        ErrorCategory::AccessDenied,
        "Indexing API not enabled or insufficient permissions",
        Some(403),
        "Enable the Indexing API in Google Cloud Console and ensure your OAuth credentials have the \
         \"https://www.googleapis.com/auth/indexing\" scope. \
         You may also need to verify ownership of the URL in Search Console.",
    )
}

/// Runs the tool.
pub async fn run(
    api: &dyn SearchConsoleApi,
    invoker: &RetryingInvoker,
    request: SubmitUrlRequest,
) -> ToolResult<SubmitUrlResponse> {
    validate_url(&request.url, "URL", PAGE_URL_EXAMPLE)?;

    let notification = UrlNotification {
        url: request.url,
        notification_type: request.notification_type,
    };

    invoker
        .invoke(|| api.publish_url_notification(&notification))
        .await
        .map_err(|error| {
            if error.code == Some(403) {
                indexing_forbidden()
            } else {
                classify(&error, CONTEXT)
            }
        })?;

    tracing::info!(
        url = %notification.url,
        notification_type = %notification.notification_type,
        "URL notification published"
    );

    Ok(SubmitUrlResponse {
        success: true,
        message: success_message(notification.notification_type).to_string(),
        url: notification.url,
        notification_type: notification.notification_type,
        notify_time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
