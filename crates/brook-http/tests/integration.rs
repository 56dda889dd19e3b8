//! Integration tests for brook-http using mockito

use brook_http::{ClientConfig, HttpClient, HttpError, QueryParameter};
use futures::StreamExt;
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq)]
struct Container {
    id: String,
}

// === GET ===

#[tokio::test]
async fn test_get_text_single_item() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/version")
        .with_status(200)
        .with_body("1.0.0")
        .create_async()
        .await;

    let client = HttpClient::new(server.url()).expect("Client should build");
    let items: Vec<_> = client
        .get("/version")
        .text()
        .expect("Valid request")
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_ref().expect("200 is a success"), "1.0.0");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_json_seq_delivers_each_element() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/numbers")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[1,2,3]")
        .create_async()
        .await;

    let client = HttpClient::new(server.url()).expect("Client should build");
    let items: Vec<_> = client
        .get("/numbers")
        .json_seq::<i64>()
        .expect("Valid request")
        .collect()
        .await;

    let values: Vec<i64> = items
        .into_iter()
        .collect::<Result<_, _>>()
        .expect("Exactly three items, zero failures");
    assert_eq!(values, vec![1, 2, 3]);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_404_delivers_one_status_failure() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/missing")
        .with_status(404)
        .with_body("gone")
        .create_async()
        .await;

    let client = HttpClient::new(server.url()).expect("Client should build");
    let items: Vec<_> = client
        .get("/missing")
        .json_seq::<i64>()
        .expect("Valid request")
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    match &items[0] {
        Err(HttpError::Status { status, .. }) => assert_eq!(*status, 404),
        other => panic!("Expected status failure, got {other:?}"),
    }

    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_sends_unescaped_query_in_order() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/containers/json")
        .match_query(mockito::Matcher::Exact("all=true&size=1".to_string()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let client = HttpClient::new(server.url()).expect("Client should build");
    let items: Vec<_> = client
        .get("containers/json")
        .query_params([
            QueryParameter::of("all", "true"),
            QueryParameter::of("size", "1"),
        ])
        .text()
        .expect("Valid request")
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_sends_custom_headers() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/secure")
        .match_header("x-api-key", "secret")
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let client = HttpClient::new(server.url()).expect("Client should build");
    let items: Vec<_> = client
        .get("/secure")
        .header("x-api-key", "secret")
        .text()
        .expect("Valid request")
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_byte_stream_delivers_raw_bytes() {
    let mut server = mockito::Server::new_async().await;

    // Not valid UTF-8, so only the raw-bytes path can deliver it
    let payload: &[u8] = &[0x00, 0x9f, 0x92, 0x96];
    let mock = server
        .mock("GET", "/export")
        .with_status(200)
        .with_body(payload)
        .create_async()
        .await;

    let client = HttpClient::new(server.url()).expect("Client should build");
    let items: Vec<_> = client
        .get("/export")
        .byte_stream()
        .expect("Valid request")
        .collect()
        .await;

    let mut collected = Vec::new();
    for item in items {
        collected.extend_from_slice(&item.expect("200 is a success"));
    }
    assert_eq!(collected, payload);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_redirects_disabled_surface_redirect_status() {
    let mut server = mockito::Server::new_async().await;
    let url = server.url();

    let redirect = server
        .mock("GET", "/old")
        .with_status(301)
        .with_header("location", &format!("{url}/new"))
        .create_async()
        .await;
    let target = server
        .mock("GET", "/new")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let config = ClientConfig::builder().follow_redirects(false).build();
    let client = HttpClient::with_config(url, config).expect("Client should build");
    let items: Vec<_> = client
        .get("/old")
        .status()
        .expect("Valid request")
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    match &items[0] {
        Err(HttpError::Status { status, .. }) => assert_eq!(*status, 301),
        other => panic!("Expected status failure, got {other:?}"),
    }

    redirect.assert_async().await;
    target.assert_async().await;
}

#[tokio::test]
async fn test_tls_redirects_disabled_still_follows_same_scheme() {
    let mut server = mockito::Server::new_async().await;
    let url = server.url();

    let redirect = server
        .mock("GET", "/old")
        .with_status(302)
        .with_header("location", &format!("{url}/new"))
        .create_async()
        .await;
    let target = server
        .mock("GET", "/new")
        .with_status(200)
        .with_body("moved here")
        .create_async()
        .await;

    let config = ClientConfig::builder().follow_tls_redirects(false).build();
    let client = HttpClient::with_config(url, config).expect("Client should build");
    let items: Vec<_> = client
        .get("/old")
        .text()
        .expect("Valid request")
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0].as_ref().expect("Redirect target is a success"),
        "moved here"
    );

    redirect.assert_async().await;
    target.assert_async().await;
}

#[tokio::test]
async fn test_get_connection_failure_is_transport_error() {
    // Port 1 is essentially never listening
    let client = HttpClient::new("http://127.0.0.1:1").expect("Client should build");
    let items: Vec<_> = client
        .get("/anything")
        .text()
        .expect("Valid request")
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Err(HttpError::Transport(_))));
}

// === POST ===

#[tokio::test]
async fn test_post_json_body_and_status() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/containers/create")
        .match_header("content-type", "application/json; charset=utf-8")
        .match_body(mockito::Matcher::Exact(r#"{"Image":"ubuntu"}"#.to_string()))
        .with_status(201)
        .create_async()
        .await;

    let client = HttpClient::new(server.url()).expect("Client should build");
    let items: Vec<_> = client
        .post("/containers/create")
        .body_text(r#"{"Image":"ubuntu"}"#)
        .status()
        .expect("Valid request")
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    let status = items[0].as_ref().expect("201 is a success");
    assert_eq!(status.code(), 201);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_post_json_response_decoded() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/containers/create")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"abc123"}"#)
        .create_async()
        .await;

    let client = HttpClient::new(server.url()).expect("Client should build");
    let items: Vec<_> = client
        .post("/containers/create")
        .body_text("{}")
        .json::<Container>()
        .expect("Valid request")
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    let container = items[0].as_ref().expect("201 is a success");
    assert_eq!(container.id, "abc123");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_post_bytes_sends_octet_stream() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/blob")
        .match_header("content-type", "application/octet-stream")
        .match_body(mockito::Matcher::Exact("\x01\x02\x03".to_string()))
        .with_status(200)
        .create_async()
        .await;

    let client = HttpClient::new(server.url()).expect("Client should build");
    let items: Vec<_> = client
        .post("/blob")
        .body_bytes(vec![1u8, 2, 3])
        .status()
        .expect("Valid request")
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    assert!(items[0].is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_post_tar_archive_streams_response() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/build")
        .match_header("content-type", "application/tar")
        .with_status(200)
        .with_body("{\"stream\":\"Step 1\"}")
        .create_async()
        .await;

    let dir = std::env::temp_dir();
    let tar_path = dir.join(format!("brook-test-{}.tar", std::process::id()));
    std::fs::write(&tar_path, b"fake tar bytes").expect("Temp file should be writable");

    let client = HttpClient::new(server.url()).expect("Client should build");
    let items: Vec<_> = client
        .post("/build")
        .body_tar(&tar_path)
        .stream_text()
        .expect("Valid request")
        .collect()
        .await;

    let _ = std::fs::remove_file(&tar_path);

    let joined: String = items
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .expect("Build output should stream")
        .concat();
    assert_eq!(joined, "{\"stream\":\"Step 1\"}");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_post_stream_error_predicate_match_fails() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/images/create")
        .with_status(200)
        .with_body(r#"{"error":"image not found"}"#)
        .create_async()
        .await;

    let client = HttpClient::new(server.url()).expect("Client should build");
    let items: Vec<_> = client
        .post("/images/create")
        .stream_text_with_error_check(|chunk| chunk.contains("\"error\""))
        .expect("Valid request")
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    match &items[0] {
        Err(HttpError::StreamResponse(payload)) => {
            assert!(payload.contains("image not found"));
        }
        other => panic!("Expected stream response failure, got {other:?}"),
    }

    mock.assert_async().await;
}

// === DELETE / HEAD ===

#[tokio::test]
async fn test_delete_delivers_http_status() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("DELETE", "/containers/abc123")
        .with_status(204)
        .create_async()
        .await;

    let client = HttpClient::new(server.url()).expect("Client should build");
    let items: Vec<_> = client
        .delete("/containers/abc123")
        .status()
        .expect("Valid request")
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    let status = items[0].as_ref().expect("204 is a success");
    assert_eq!(status.code(), 204);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_head_delivers_raw_response() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("HEAD", "/ping")
        .with_status(200)
        .with_header("api-version", "1.42")
        .create_async()
        .await;

    let client = HttpClient::new(server.url()).expect("Client should build");
    let items: Vec<_> = client
        .head("/ping")
        .response()
        .expect("Valid request")
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    let response = items[0].as_ref().expect("200 is a success");
    assert_eq!(response.status(), 200);
    assert_eq!(
        response
            .headers()
            .get("api-version")
            .expect("Header should be present"),
        "1.42"
    );

    mock.assert_async().await;
}

// === Cancellation ===

#[tokio::test]
async fn test_dropping_stream_before_poll_makes_no_request() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/never")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let client = HttpClient::new(server.url()).expect("Client should build");
    let stream = client.get("/never").text().expect("Valid request");
    drop(stream);

    mock.assert_async().await;
}

// === Unix domain socket transport ===

#[cfg(unix)]
mod unix_socket {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::UnixListener;

    use super::*;

    /// Accept one connection and answer any request with a canned response
    async fn serve_once(listener: UnixListener, body: &'static str) {
        let (mut stream, _) = listener.accept().await.expect("Accept should succeed");
        let mut buf = vec![0u8; 4096];
        let mut request = Vec::new();
        loop {
            let n = stream.read(&mut buf).await.expect("Read should succeed");
            request.extend_from_slice(&buf[..n]);
            if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\ncontent-length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        stream
            .write_all(response.as_bytes())
            .await
            .expect("Write should succeed");
        stream.flush().await.expect("Flush should succeed");
    }

    #[tokio::test]
    async fn test_get_over_unix_socket() {
        let dir = std::env::temp_dir();
        let socket_path = dir.join(format!("brook-test-{}.sock", std::process::id()));
        let _ = std::fs::remove_file(&socket_path);

        let listener = UnixListener::bind(&socket_path).expect("Bind should succeed");
        let server = tokio::spawn(serve_once(listener, "hello from socket"));

        let client = HttpClient::unix(
            socket_path.to_string_lossy().as_ref(),
            ClientConfig::default(),
        );
        let items: Vec<_> = client
            .get("/info")
            .text()
            .expect("Valid request")
            .collect()
            .await;

        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].as_ref().expect("200 is a success"),
            "hello from socket"
        );

        server.await.expect("Server task should finish");
        let _ = std::fs::remove_file(&socket_path);
    }

    #[tokio::test]
    async fn test_unix_connect_failure_is_transport_error() {
        let client = HttpClient::unix("/definitely/not/here.sock", ClientConfig::default());
        let items: Vec<_> = client
            .get("/info")
            .text()
            .expect("Valid request")
            .collect()
            .await;

        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(HttpError::Transport(_))));
    }
}
