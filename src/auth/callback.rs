//! Local HTTP listener for the OAuth redirect.
//!
//! Google redirects the browser to the configured redirect URI with either
//! `?code=...` or `?error=...`. The listener answers with a small HTML page and
//! forwards the outcome to whoever is waiting in [`wait_for_code`].

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Router,
};
use tokio::sync::{mpsc, oneshot};

use super::AuthError;

type CodeSender = mpsc::Sender<Result<String, AuthError>>;

const SUCCESS_PAGE: &str = "<html><body><h1>Authentication successful!</h1>\
<p>You can close this window and return to the terminal.</p></body></html>";

const FAILURE_PAGE: &str = "<html><body><h1>Authentication failed</h1>\
<p>No authorization code was received. Check the terminal for details.</p></body></html>";

/// Builds the router that receives the OAuth redirect on any path.
pub fn callback_router(sender: CodeSender) -> Router {
    Router::new()
        .fallback(redirect_handler)
        .with_state(sender)
}

async fn redirect_handler(
    State(sender): State<CodeSender>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let outcome = match params.get("code") {
        Some(code) if !code.is_empty() => Ok(code.clone()),
        _ => {
            if let Some(error) = params.get("error") {
                tracing::warn!(error = %error, "OAuth redirect carried an error");
            }
            Err(AuthError::MissingCode)
        }
    };

    let page = match outcome {
        Ok(_) => (StatusCode::OK, Html(SUCCESS_PAGE)),
        Err(_) => (StatusCode::BAD_REQUEST, Html(FAILURE_PAGE)),
    };

    // Only the first redirect matters; later ones find the channel full or closed.
    let _ = sender.try_send(outcome);
    page.into_response()
}

/// Listens on `127.0.0.1:port` until one OAuth redirect arrives and returns
/// its authorization code.
pub async fn wait_for_code(port: u16) -> Result<String, AuthError> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AuthError::Listener(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(%addr, "Waiting for OAuth redirect");

    let (code_tx, mut code_rx) = mpsc::channel(1);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        axum::serve(listener, callback_router(code_tx))
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    let outcome = code_rx
        .recv()
        .await
        .unwrap_or(Err(AuthError::Listener("Listener stopped".to_string())));

    let _ = shutdown_tx.send(());
    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::debug!(error = %e, "Callback listener exited with error"),
        Err(e) => tracing::debug!(error = %e, "Callback listener task failed"),
    }

    outcome
}
