//! HTTP endpoint serving pages as JSON.
//!
//! `GET /api/data?page=<n>&filter=<text>` answers with
//! `{"items": [...], "currentPage": n, "totalPages": n, "totalItems": n}` or
//! with `{"error": "..."}` and a non-2xx status. Unreachable and malformed
//! upstream sources are reported identically.

use std::convert::Infallible;
use std::sync::Arc;

use http_body_util::Full;
use hyper::Method;
use hyper::Request;
use hyper::Response;
use hyper::StatusCode;
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::header::HeaderValue;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use super::PageSource;
use crate::error::Error;
use crate::query::Query;

/// Path of the page endpoint.
pub const DATA_PATH: &str = "/api/data";

/// Error message returned for every failed page request.
pub const FETCH_FAILED: &str = "Failed to fetch data";

/// Body of a failure response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
}

/// Accepts connections on `listener` until `cancel` fires.
///
/// Each connection is served on its own task. Accept failures are logged and
/// do not stop the server.
pub async fn serve(
    listener: TcpListener,
    source: Arc<dyn PageSource>,
    cancel: CancellationToken,
) -> Result<(), Error> {
    log::info!("serving pages on {}", listener.local_addr()?);

    loop {
        let (stream, peer) = tokio::select! {
            _ = cancel.cancelled() => {
                log::info!("page server shutting down");
                return Ok(());
            }
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    log::warn!("accept failed: {}", e);
                    continue;
                }
            },
        };

        let source = Arc::clone(&source);
        tokio::spawn(async move {
            let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                let source = Arc::clone(&source);
                async move { Ok::<_, Infallible>(handle(req, source.as_ref()).await) }
            });

            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                log::debug!("connection from {} closed with error: {}", peer, e);
            }
        });
    }
}

/// Answers a single request.
pub async fn handle<B>(req: Request<B>, source: &dyn PageSource) -> Response<Full<Bytes>> {
    let routed = route(&req);
    drop(req);

    let query = match routed {
        Ok(query) => query,
        Err((status, message)) => return error_response(status, message),
    };
    log::debug!("page request {}", query);

    match source.fetch_page(&query).await {
        Ok(page) => json_response(StatusCode::OK, &page),
        Err(e) => {
            log::error!("error fetching data for {}: {}", query, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, FETCH_FAILED)
        }
    }
}

fn route<B>(req: &Request<B>) -> Result<Query, (StatusCode, &'static str)> {
    if req.uri().path() != DATA_PATH {
        return Err((StatusCode::NOT_FOUND, "Not found"));
    }
    if req.method() != Method::GET {
        return Err((StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"));
    }
    Ok(parse_query(req.uri().query().unwrap_or("")))
}

/// Reads `page` (default 1) and `filter` (default empty) from a query string.
pub fn parse_query(query: &str) -> Query {
    let mut page = None;
    let mut filter = String::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "page" => page = parse_page(&value),
            "filter" => filter = value.into_owned(),
            _ => {}
        }
    }
    Query::new(page.unwrap_or(1), filter)
}

/// Parses the leading integer of `raw`, ignoring trailing garbage.
///
/// Digit runs beyond the `i64` range saturate so they still land past the
/// last page (or clamp to the first).
fn parse_page(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let digits_start = usize::from(raw.starts_with(['-', '+']));
    let digits_end = raw[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(raw.len(), |i| i + digits_start);
    if digits_end == digits_start {
        return None;
    }
    match raw[..digits_end].parse::<i64>() {
        Ok(page) => Some(page),
        Err(_) if raw.starts_with('-') => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(
        status,
        &ErrorBody {
            error: message.to_string(),
        },
    )
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let (status, bytes) = match serde_json::to_vec(body) {
        Ok(bytes) => (status, bytes),
        Err(e) => {
            log::error!("failed to encode response: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                br#"{"error":"Failed to fetch data"}"#.to_vec(),
            )
        }
    };

    let mut response = Response::new(Full::new(Bytes::from(bytes)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
