//! Page service end to end: upstream sheet -> DataService -> HTTP -> HttpPageSource.

mod common;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use common::FakeSource;
use http_body_util::BodyExt;
use http_body_util::Empty;
use http_body_util::Full;
use hyper::Request;
use hyper::Response;
use hyper::StatusCode;
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use sheetgrid_lib::Query;
use sheetgrid_lib::SheetClient;
use sheetgrid_lib::error::Error;
use sheetgrid_lib::service::DataService;
use sheetgrid_lib::service::ErrorBody;
use sheetgrid_lib::service::FETCH_FAILED;
use sheetgrid_lib::service::HttpPageSource;
use sheetgrid_lib::service::PageSource;
use sheetgrid_lib::service::handle;
use sheetgrid_lib::service::serve;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

const PREFIX: &str = "/*O_o*/\ngoogle.visualization.Query.setResponse(";
const SUFFIX: &str = ");";

/// A gviz payload with `n` rows, alternating between two domains.
fn gviz_payload(n: usize) -> String {
    let rows: Vec<String> = (0..n)
        .map(|i| {
            let domain = if i % 2 == 0 { "Finance" } else { "Retail" };
            format!(r#"{{"c":[{{"v":"Company {i}"}},{{"v":"{domain}"}},{{"v":{i}.0}}]}}"#)
        })
        .collect();
    let table = format!(
        r#"{{"version":"0.6","status":"ok","table":{{"cols":[{{"id":"A","label":"Name","type":"string"}},{{"id":"B","label":"Domain","type":"string"}},{{"id":"C","label":"Employees","type":"number"}}],"rows":[{}]}}}}"#,
        rows.join(",")
    );
    format!("{PREFIX}{table}{SUFFIX}")
}

/// Serves a fixed response on every request until the token is cancelled.
async fn spawn_upstream(status: StatusCode, body: String) -> (SocketAddr, CancellationToken) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    tokio::spawn(async move {
        loop {
            let stream = tokio::select! {
                _ = token.cancelled() => return,
                accepted = listener.accept() => accepted.unwrap().0,
            };
            let body = body.clone();
            tokio::spawn(async move {
                let service = service_fn(move |_req: Request<hyper::body::Incoming>| {
                    let body = body.clone();
                    async move {
                        let mut response = Response::new(Full::new(Bytes::from(body)));
                        *response.status_mut() = status;
                        Ok::<_, Infallible>(response)
                    }
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    (addr, cancel)
}

/// Starts the page server for `source` on an ephemeral port.
async fn spawn_server(source: Arc<dyn PageSource>) -> (String, CancellationToken) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let cancel = CancellationToken::new();
    tokio::spawn(serve(listener, source, cancel.clone()));
    (base, cancel)
}

fn data_service(addr: SocketAddr) -> DataService {
    let client = SheetClient::builder()
        .url(format!("http://{addr}/gviz/tq?tqx=out:json"))
        .build()
        .unwrap();
    DataService::new(client)
}

async fn body_json<T: serde::de::DeserializeOwned>(response: Response<Full<Bytes>>) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// DataService against an upstream sheet
// =============================================================================

#[tokio::test]
async fn test_data_service_pages_upstream_sheet() {
    let (addr, upstream) = spawn_upstream(StatusCode::OK, gviz_payload(134)).await;
    let service = data_service(addr);

    let page = service.fetch_page(&Query::new(3, "")).await.unwrap();
    assert_eq!(page.total_items, 134);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 34);
    assert_eq!(page.items[0].get_text("Name").as_deref(), Some("Company 100"));
    assert_eq!(page.items[0].get_text("Employees").as_deref(), Some("100"));

    let finance = service.fetch_page(&Query::new(1, "FIN")).await.unwrap();
    assert_eq!(finance.total_items, 67);
    assert_eq!(finance.total_pages, 2);

    upstream.cancel();
}

#[tokio::test]
async fn test_data_service_reports_bad_status() {
    let (addr, upstream) = spawn_upstream(StatusCode::SERVICE_UNAVAILABLE, String::new()).await;

    let err = data_service(addr).fetch_page(&Query::default()).await.unwrap_err();
    assert!(err.is_unreachable());

    upstream.cancel();
}

#[tokio::test]
async fn test_data_service_reports_malformed_payload() {
    let body = format!("{PREFIX}{{\"status\":\"error\"}}{SUFFIX}");
    let (addr, upstream) = spawn_upstream(StatusCode::OK, body).await;

    let err = data_service(addr).fetch_page(&Query::default()).await.unwrap_err();
    assert!(err.is_malformed());

    upstream.cancel();
}

// =============================================================================
// Request handling
// =============================================================================

#[tokio::test]
async fn test_handle_returns_page_json() {
    let source = FakeSource::new();
    let req = Request::get("/api/data?page=2&filter=fin").body(Empty::<Bytes>::new()).unwrap();

    let response = handle(req, &*source).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = body_json(response).await;
    assert_eq!(json["currentPage"], 2);
    assert_eq!(json["totalItems"], 4);
    assert_eq!(json["totalPages"], 1);
    assert!(json["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_handle_lenient_page_parameter() {
    let source = FakeSource::new();
    let req = Request::get("/api/data?page=1abc").body(Empty::<Bytes>::new()).unwrap();

    let json: serde_json::Value = body_json(handle(req, &*source).await).await;
    assert_eq!(json["currentPage"], 1);
    assert_eq!(json["totalItems"], 10);
}

#[tokio::test]
async fn test_handle_page_beyond_i64_is_empty() {
    let source = FakeSource::new();
    let req = Request::get("/api/data?page=99999999999999999999")
        .body(Empty::<Bytes>::new())
        .unwrap();

    let response = handle(req, &*source).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = body_json(response).await;
    assert!(json["items"].as_array().unwrap().is_empty());
    assert_eq!(json["totalItems"], 10);
    assert_eq!(json["totalPages"], 1);
    assert_eq!(json["currentPage"], i64::MAX);
}

#[tokio::test]
async fn test_handle_failure_is_generic() {
    let source = FakeSource::new();
    source.set_failing(true);
    let req = Request::get("/api/data").body(Empty::<Bytes>::new()).unwrap();

    let response = handle(req, &*source).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = body_json(response).await;
    assert_eq!(body.error, FETCH_FAILED);
}

#[tokio::test]
async fn test_handle_unknown_path_and_method() {
    let source = FakeSource::new();

    let req = Request::get("/api/other").body(Empty::<Bytes>::new()).unwrap();
    assert_eq!(handle(req, &*source).await.status(), StatusCode::NOT_FOUND);

    let req = Request::post("/api/data").body(Empty::<Bytes>::new()).unwrap();
    assert_eq!(
        handle(req, &*source).await.status(),
        StatusCode::METHOD_NOT_ALLOWED
    );
    assert_eq!(source.calls(), 0);
}

// =============================================================================
// Over the wire
// =============================================================================

#[tokio::test]
async fn test_remote_source_round_trip() {
    let source = FakeSource::new();
    let (base, server) = spawn_server(source.clone()).await;
    let remote = HttpPageSource::new(&base).unwrap();

    let page = remote.fetch_page(&Query::new(1, "")).await.unwrap();
    assert_eq!(page.total_items, 10);
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.items[0].columns(), ["Name", "Domain", "Employees"]);
    assert_eq!(page.items[0].get_text("Name").as_deref(), Some("Company 00000"));

    server.cancel();
}

#[tokio::test]
async fn test_remote_source_maps_error_body() {
    let source = FakeSource::new();
    let (base, server) = spawn_server(source.clone()).await;
    let remote = HttpPageSource::new(&base).unwrap();

    let err = remote.fetch_page(&Query::new(1, "boom")).await.unwrap_err();
    match err {
        Error::Remote { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, FETCH_FAILED);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    server.cancel();
}

#[tokio::test]
async fn test_remote_source_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let remote = HttpPageSource::new(&base).unwrap();

    let err = remote.fetch_page(&Query::default()).await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
    assert!(err.is_unreachable());
    assert!(!err.is_malformed());
}

#[tokio::test]
async fn test_full_stack_through_server() {
    let (addr, upstream) = spawn_upstream(StatusCode::OK, gviz_payload(60)).await;
    let (base, server) = spawn_server(Arc::new(data_service(addr))).await;
    let remote = HttpPageSource::new(&base).unwrap();

    let page = remote.fetch_page(&Query::new(2, "")).await.unwrap();
    assert_eq!(page.current_page, 2);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.items[9].get_text("Name").as_deref(), Some("Company 59"));

    server.cancel();
    upstream.cancel();
}
