use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Response header carrying the id used in this request's log lines
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Logs every request and response with a per-request id.
///
/// Handler log lines emitted while the request is in flight are attached to
/// the `request` span, so they carry the same id as the access log and the
/// `x-request-id` header returned to the caller.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = sanitize_query(request.uri().query().unwrap_or(""));
    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let span = info_span!("request", request_id = %request_id, method = %method, path = %path);

    async move {
        info!(query = %query, user_agent = %user_agent, "Incoming request");

        let mut response = next.run(request).await;

        let status = response.status().as_u16();
        let duration_ms = start.elapsed().as_millis() as u64;

        match response.status() {
            s if s.is_server_error() => {
                error!(status, duration_ms, "Request failed (server error)")
            }
            s if s.is_client_error() => {
                warn!(status, duration_ms, "Request failed (client error)")
            }
            _ => info!(status, duration_ms, "Request completed"),
        }

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }

        response
    }
    .instrument(span)
    .await
}

const SENSITIVE_KEYS: [&str; 5] = ["api_key", "token", "password", "secret", "authorization"];

/// Mask the value of every sensitive query parameter.
///
/// A key is sensitive when it equals one of [`SENSITIVE_KEYS`] or ends with
/// one after a `_` or `-` separator (`access_token`, `client-secret`).
fn sanitize_query(query: &str) -> String {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_sensitive_key(key) => format!("{}=***", key),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.iter().any(|name| {
        key == *name
            || key
                .strip_suffix(name)
                .is_some_and(|prefix| prefix.ends_with('_') || prefix.ends_with('-'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_query() {
        assert_eq!(sanitize_query(""), "");
        assert_eq!(sanitize_query("agent=writer"), "agent=writer");
        assert_eq!(sanitize_query("api_key=secret123"), "api_key=***");
        assert_eq!(
            sanitize_query("q=test&api_key=secret&limit=10"),
            "q=test&api_key=***&limit=10"
        );
        assert_eq!(
            sanitize_query("token=abc&password=pw"),
            "token=***&password=***"
        );
    }

    #[test]
    fn test_sanitize_query_masks_repeated_keys() {
        assert_eq!(sanitize_query("token=a&token=LEAKED"), "token=***&token=***");
        assert_eq!(
            sanitize_query("secret=1&q=x&secret=2"),
            "secret=***&q=x&secret=***"
        );
    }

    #[test]
    fn test_sanitize_query_matches_whole_keys() {
        assert_eq!(sanitize_query("mytoken=visible"), "mytoken=visible");
        assert_eq!(sanitize_query("tokens=5"), "tokens=5");
        assert_eq!(sanitize_query("access_token=abc"), "access_token=***");
        assert_eq!(sanitize_query("Client-Secret=abc"), "Client-Secret=***");
        assert_eq!(sanitize_query("token&q=1"), "token&q=1");
    }
}
