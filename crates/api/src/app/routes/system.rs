use axum::http::StatusCode;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Liveness probe hit by the keep-alive task (and external uptime checkers).
pub async fn ping() -> &'static str {
    "pong"
}
