// src/routes/mod.rs
pub mod chat;
pub mod contact;
pub mod health;

use std::path::Path;
use std::time::Instant;

use crate::{config::Mode, error::AppError, state::SharedState};
use axum::{
    Router,
    body::Body,
    extract::Request,
    http::header,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use chat::{chat_handler, history_handler};
use contact::contact_handler;
use health::health_handler;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub fn create_router() -> Router<SharedState> {
    let api_routes = Router::new()
        .route("/contact", post(contact_handler))
        .route("/chat", post(chat_handler))
        .route("/chat/{session_id}", get(history_handler))
        .route("/health", get(health_handler))
        .fallback(not_found);

    Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn(log_api_request))
        .layer(TraceLayer::new_for_http())
}

/// Attach whatever serves non-API paths for the given mode.
///
/// Production serves the built SPA with `index.html` as the client-side
/// routing fallback. Development leaves the front end to its own dev server
/// and opens CORS so it can call the API.
pub fn with_frontend(
    router: Router<SharedState>,
    mode: Mode,
    static_dir: Option<&Path>,
) -> Router<SharedState> {
    match (mode, static_dir) {
        (Mode::Production, Some(dir)) => {
            tracing::info!(path = %dir.display(), "serving static files");
            let spa = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
            router.fallback_service(spa)
        }
        (Mode::Production, None) => {
            tracing::error!("no build directory found, serving the API only");
            router.fallback(not_found)
        }
        (Mode::Development, _) => router.fallback(not_found).layer(CorsLayer::very_permissive()),
    }
}

async fn not_found() -> AppError {
    AppError::NotFound
}

/// Longest `/api` log line once the response body is appended.
pub const LOG_LINE_MAX: usize = 80;

async fn log_api_request(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if !path.starts_with("/api") {
        return next.run(req).await;
    }
    let method = req.method().clone();
    let start = Instant::now();
    let response = next.run(req).await;
    let line = format!(
        "{} {} {} in {}ms",
        method,
        path,
        response.status().as_u16(),
        start.elapsed().as_millis()
    );
    tracing::info!("{line}");

    if !tracing::enabled!(tracing::Level::DEBUG) || !is_json(&response) {
        return response;
    }

    // buffer the JSON body so it can be logged, then hand it back untouched
    let (parts, body) = response.into_parts();
    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            let full = format!("{line} :: {}", String::from_utf8_lossy(&bytes));
            tracing::debug!("{}", truncate_log_line(&full, LOG_LINE_MAX));
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to buffer response body for logging");
            Response::from_parts(parts, Body::empty())
        }
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// Cut `line` to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate_log_line(line: &str, max: usize) -> String {
    if line.chars().count() <= max {
        return line.to_string();
    }
    let mut out: String = line.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
