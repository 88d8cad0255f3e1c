//! Remote image fetching against a local HTTP server.

use std::net::SocketAddr;

use axum::{
    Router,
    http::{Method, StatusCode, header},
    routing::get,
};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

mod common;

use common::{png, send, setup_with_limit};

const LIMIT: usize = 1024;

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn image_host() -> Router {
    let sprite = png(4, 4, [255, 0, 0, 255]);
    assert!(sprite.len() < LIMIT);
    Router::new()
        .route(
            "/sprite.png",
            get(move || async move { ([(header::CONTENT_TYPE, "image/png")], sprite) }),
        )
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .route("/huge", get(|| async { vec![0u8; LIMIT * 4] }))
}

/// Answers one request with a chunked body of `chunks` x 512 bytes and no
/// Content-Length.
async fn serve_chunked(chunks: usize) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let head = "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nTransfer-Encoding: chunked\r\n\r\n";
        if socket.write_all(head.as_bytes()).await.is_err() {
            return;
        }
        let chunk = [0u8; 512];
        for _ in 0..chunks {
            let mut frame = format!("{:x}\r\n", chunk.len()).into_bytes();
            frame.extend_from_slice(&chunk);
            frame.extend_from_slice(b"\r\n");
            // the client hangs up once the limit is crossed
            if socket.write_all(&frame).await.is_err() {
                return;
            }
        }
        let _ = socket.write_all(b"0\r\n\r\n").await;
    });
    addr
}

async fn extract_url(url: String) -> (StatusCode, serde_json::Value) {
    let (app, _) = setup_with_limit(LIMIT);
    send(
        &app,
        Method::POST,
        "/palette/extract",
        None,
        Some(json!({ "url": url, "count": 1 })),
    )
    .await
}

#[tokio::test]
async fn fetches_and_extracts_remote_png() {
    let addr = serve(image_host()).await;
    let (status, body) = extract_url(format!("http://{}/sprite.png", addr)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["colors"], json!(["#ff0000"]));
}

#[tokio::test]
async fn upstream_error_status_is_unprocessable() {
    let addr = serve(image_host()).await;
    let (status, body) = extract_url(format!("http://{}/missing", addr)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn declared_length_over_limit_is_rejected() {
    let addr = serve(image_host()).await;
    let (status, body) = extract_url(format!("http://{}/huge", addr)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn chunked_body_growing_past_limit_is_rejected() {
    let addr = serve_chunked(LIMIT / 512 * 4).await;
    let (status, body) = extract_url(format!("http://{}/stream.png", addr)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());
}
