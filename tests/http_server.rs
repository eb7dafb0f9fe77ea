//! HTTP front-end tests over a real socket.

use std::time::Duration;

use axum::http::StatusCode;

mod common;

use common::*;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_serves_static_files_with_request_id() {
    let dir = webapp();
    let mut app = application(dir.path());
    app.servlets = vec![servlet("files", "file", &["/"])];
    let server = start_server(app).await;

    let resp = client().get(server.url("/static/site.css")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/css; charset=utf-8"
    );
    assert!(resp.headers().get("x-request-id").is_some());
    assert_eq!(resp.text().await.unwrap(), "body { margin: 0 }");

    let resp = client().get(server.url("/")).send().await.unwrap();
    assert_eq!(resp.text().await.unwrap(), "<h1>home</h1>");

    server.shutdown.trigger();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_error_statuses_reach_the_client() {
    let dir = webapp();
    let mut app = application(dir.path());
    app.servlets = vec![
        servlet("files", "file", &["/static/*"]),
        servlet("boom", "failing", &["/boom/*"]),
    ];
    app.error_pages = vec![error_page(404, "/errors/404.html")];
    let server = start_server(app).await;

    let resp = client().get(server.url("/static/nope.css")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        resp.text().await.unwrap(),
        "<p>Nothing at /static/nope.css (404)</p>"
    );

    let resp = client().get(server.url("/boom/now")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(resp.text().await.unwrap().contains("database offline"));

    let resp = client().get(server.url("/unmapped")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_head_and_unsupported_methods() {
    let dir = webapp();
    let mut app = application(dir.path());
    app.servlets = vec![servlet("files", "file", &["/"])];
    let server = start_server(app).await;

    let resp = client().head(server.url("/index.html")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get("last-modified").is_some());

    let resp = client().post(server.url("/index.html")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_header_filter_applies() {
    let dir = webapp();
    let mut app = application(dir.path());
    app.servlets = vec![servlet("files", "file", &["/"])];
    let mut secure = filter("secure", "headers");
    secure
        .init_params
        .insert("X-Frame-Options".into(), "DENY".into());
    app.filters = vec![secure, filter("log", "logging")];
    app.filter_mappings = vec![url_mapping("log", &["/*"]), servlet_mapping("secure", &["*"])];
    let server = start_server(app).await;

    let resp = client().get(server.url("/index.html")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("x-frame-options").unwrap(), "DENY");

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_body_limit() {
    let dir = webapp();
    let mut app = application(dir.path());
    app.servlets = vec![servlet("files", "file", &["/"])];
    app.max_body_bytes = 16;
    let server = start_server(app).await;

    let resp = client()
        .post(server.url("/index.html"))
        .body(vec![b'x'; 1024])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_config_reload_swaps_application() {
    let dir = webapp();
    let mut app = application(dir.path());
    app.servlets = vec![servlet("files", "file", &["/static/*"])];
    let server = start_server(app.clone()).await;

    let resp = client().get(server.url("/hello.html")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let mut reloaded = servlet_host::ServerConfig::default();
    app.servlets = vec![servlet("files", "file", &["/"])];
    reloaded.application = app;
    server.config_tx.send(reloaded).unwrap();

    let mut status = StatusCode::SERVICE_UNAVAILABLE;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        status = client().get(server.url("/hello.html")).send().await.unwrap().status();
        if status == StatusCode::OK {
            break;
        }
    }
    assert_eq!(status, StatusCode::OK);

    server.shutdown.trigger();
}
