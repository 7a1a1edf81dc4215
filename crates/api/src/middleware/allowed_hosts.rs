//! `Host` header allow-list, configured by `ALLOWED_HOSTS`.

use axum::extract::{Request, State};
use axum::http::header::HOST;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::AppError;
use crate::state::AppState;

/// Reject requests whose `Host` header is not in the configured allow-list.
pub async fn enforce_allowed_hosts(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(strip_port);

    if !state.config.is_host_allowed(host) {
        tracing::warn!(host = ?host, "Rejected request for disallowed host");
        return Err(AppError::BadRequest("Invalid Host header".into()));
    }

    Ok(next.run(request).await)
}

/// `example.com:8000` -> `example.com`, `[::1]:8000` -> `::1`.
fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_ports() {
        assert_eq!(strip_port("example.com"), "example.com");
        assert_eq!(strip_port("example.com:8000"), "example.com");
        assert_eq!(strip_port("127.0.0.1:80"), "127.0.0.1");
        assert_eq!(strip_port("[::1]:8000"), "::1");
        assert_eq!(strip_port("[::1]"), "::1");
    }
}
