//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The number of characters of a body to log at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
/// Only text bodies (HTML and form data) are logged, other bodies such as
/// static files are passed through untouched.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body = if is_text(parts.headers.get(CONTENT_TYPE)) {
        let bytes = match buffer_body(body).await {
            Ok(bytes) => bytes,
            Err(response) => return response,
        };
        log_body("Received request", &format!("{parts:#?}"), &bytes);
        Body::from(bytes)
    } else {
        tracing::info!("Received request: {parts:#?}");
        body
    };

    let response = next.run(Request::from_parts(parts, body)).await;

    let (parts, body) = response.into_parts();
    if !is_text(parts.headers.get(CONTENT_TYPE)) {
        tracing::info!("Sending response: {parts:#?}");
        return Response::from_parts(parts, body);
    }

    let bytes = match buffer_body(body).await {
        Ok(bytes) => bytes,
        Err(response) => return response,
    };
    log_body("Sending response", &format!("{parts:#?}"), &bytes);

    Response::from_parts(parts, Body::from(bytes))
}

fn is_text(content_type: Option<&axum::http::HeaderValue>) -> bool {
    content_type
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value.starts_with("text/") || value.starts_with("application/x-www-form-urlencoded")
        })
}

async fn buffer_body(body: Body) -> Result<Bytes, Response> {
    axum::body::to_bytes(body, usize::MAX).await.map_err(|error| {
        tracing::error!("could not read body: {error}");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}

fn log_body(prefix: &str, headers: &str, bytes: &Bytes) {
    let body = String::from_utf8_lossy(bytes);

    match truncate(&body, LOG_BODY_LENGTH_LIMIT) {
        Some(truncated) => {
            tracing::info!("{prefix}: {headers}\nbody: {truncated}...");
            tracing::debug!("Full body: {body:?}");
        }
        None => tracing::info!("{prefix}: {headers}\nbody: {body:?}"),
    }
}

/// The first `max_chars` characters of `text`, or `None` if `text` is not longer than that.
fn truncate(text: &str, max_chars: usize) -> Option<&str> {
    text.char_indices()
        .nth(max_chars)
        .map(|(byte_index, _)| &text[..byte_index])
}
