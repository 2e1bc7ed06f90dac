use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    routing::post,
    Router,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower::util::ServiceExt;
use utoipa::openapi::{path::PathItem, OpenApiBuilder};

use api_ingress::{ApiIngress, ApiIngressConfig};

fn ingress(body_limit_bytes: usize) -> ApiIngress {
    let mut doc = OpenApiBuilder::new().build();
    doc.paths
        .paths
        .insert("/echo".to_string(), PathItem::default());

    ApiIngress::new(ApiIngressConfig {
        body_limit_bytes,
        ..Default::default()
    })
    .register(
        |router: Router| router.route("/echo", post(|body: String| async move { body })),
        doc,
    )
}

async fn json_of(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = ingress(1024).build_router().unwrap();
    let res = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = json_of(res).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn openapi_document_merges_module_paths() {
    let app = ingress(1024).build_router().unwrap();
    let res = app
        .oneshot(Request::get("/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = json_of(res).await;
    assert_eq!(json["info"]["title"], api_ingress::openapi::TITLE);
    assert!(json["paths"]["/echo"].is_object());
}

#[tokio::test]
async fn unknown_path_is_a_problem() {
    let app = ingress(1024).build_router().unwrap();
    let res = app
        .oneshot(
            Request::get("/nope")
                .header("x-request-id", "rid-404")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        res.headers().get(CONTENT_TYPE).unwrap(),
        problem::APPLICATION_PROBLEM_JSON
    );
    let json = json_of(res).await;
    assert_eq!(json["instance"], "/nope");
    assert_eq!(json["request_id"], "rid-404");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = ingress(16).build_router().unwrap();

    let ok = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/echo")
                .header("content-length", "5")
                .body(Body::from("hello"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);

    let big = "x".repeat(64);
    let res = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/echo")
                .header("content-length", big.len().to_string())
                .body(Body::from(big))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn serves_until_shutdown() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(ingress(1024).serve_on(listener, async move {
        let _ = stop_rx.await;
    }));

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();
    assert!(raw.starts_with("HTTP/1.1 200 OK"), "{raw}");
    assert!(raw.to_ascii_lowercase().contains("x-request-id:"));

    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn invalid_bind_address_fails() {
    let err = ApiIngress::new(ApiIngressConfig {
        bind_addr: "not-an-address".into(),
        ..Default::default()
    })
    .serve(async {})
    .await
    .unwrap_err();
    assert!(err.to_string().contains("Invalid bind address"));
}
