use std::sync::Arc;
use axum::{
    extract::State,
    http::{
        header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE, IF_MODIFIED_SINCE, LAST_MODIFIED},
        HeaderMap, Method, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    Router,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use shared::protocol::{HTTP_DATE_FORMAT, OBSOLETE_HTTP_DATE_FORMATS};
use crate::config::Config;
use crate::render::render;
use crate::status::{
    assemble::assemble,
    parser::parse_status,
    source::{read_status_file, FileRead},
};
use super::error::ServeError;
use super::negotiate::negotiate;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

/// The status resource is matched by the negotiation layer, not by the router,
/// so every request lands in one handler.
pub fn router(state: AppState) -> Router {
    Router::new()
        .fallback(serve_status)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn serve_status(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ServeError> {
    let accept = header_str(&headers, ACCEPT);
    let request = negotiate(&method, &uri, accept, &state.config.server.path)?;

    let since = header_str(&headers, IF_MODIFIED_SINCE).and_then(parse_http_date);
    let file = match read_status_file(state.config.nagios.status_file.clone(), since).await? {
        FileRead::NotModified { modified } => {
            return Ok((
                StatusCode::NOT_MODIFIED,
                [(LAST_MODIFIED, http_date(modified))],
            )
                .into_response());
        }
        FileRead::Loaded(file) => file,
    };

    let parsed = parse_status(&file.contents);
    if parsed.skipped_blocks > 0 {
        tracing::warn!(
            skipped = parsed.skipped_blocks,
            kept = parsed.blocks.len(),
            "Status file contained malformed blocks"
        );
    }
    let snapshot = assemble(parsed.blocks)?;
    let body = render(&snapshot, request.format, &request.options)?;

    tracing::debug!(
        format = request.format.name(),
        hosts = snapshot.hosts.len(),
        bytes = body.len(),
        "Serving status"
    );

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, request.format.media_type().to_string()),
            (CONTENT_LENGTH, body.len().to_string()),
            (LAST_MODIFIED, http_date(file.modified)),
        ],
        body,
    )
        .into_response())
}

fn header_str(headers: &HeaderMap, name: axum::http::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn http_date(time: DateTime<Utc>) -> String {
    time.format(HTTP_DATE_FORMAT).to_string()
}

/// Accepts IMF-fixdate and the obsolete RFC 850 and asctime forms.
/// Unparsable dates are treated as absent.
fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }

    OBSOLETE_HTTP_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|date| date.and_utc())
}
