// tests/health_probe_http.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use url::Url;

use bulkwatch::health::{derive_health_url, HealthProbe, HealthStatus, HttpHealthProbe};

type TestResult = Result<(), Box<dyn std::error::Error>>;

async fn serve(app: Router) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

async fn probe_backend(addr: SocketAddr, timeout: Duration) -> Result<HealthStatus, Box<dyn std::error::Error>> {
    let classify = Url::parse(&format!("http://{addr}/classify"))?;
    let probe = HttpHealthProbe::new(derive_health_url(&classify), timeout)?;
    assert_eq!(probe.url().path(), "/health");
    Ok(with_timeout(probe.check()).await)
}

#[tokio::test]
async fn ok_status_on_derived_health_path_is_healthy() -> TestResult {
    init_tracing();
    let app = Router::new()
        .route("/health", get(|| async { Json(json!({"status": "OK", "model": "demo"})) }))
        .route(
            "/classify",
            get(|| async { (StatusCode::METHOD_NOT_ALLOWED, "POST only") }),
        );
    let addr = serve(app).await?;

    assert_eq!(probe_backend(addr, Duration::from_secs(2)).await?, HealthStatus::Healthy);
    Ok(())
}

#[tokio::test]
async fn degraded_status_is_unhealthy() -> TestResult {
    init_tracing();
    let app = Router::new().route("/health", get(|| async { Json(json!({"status": "degraded"})) }));
    let addr = serve(app).await?;

    let status = probe_backend(addr, Duration::from_secs(2)).await?;
    assert!(matches!(status, HealthStatus::Unhealthy(ref r) if r.contains("degraded")));
    Ok(())
}

#[tokio::test]
async fn server_error_is_unhealthy_even_with_ok_body() -> TestResult {
    init_tracing();
    let app = Router::new().route(
        "/health",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"status": "ok"}))) }),
    );
    let addr = serve(app).await?;

    assert!(!probe_backend(addr, Duration::from_secs(2)).await?.is_healthy());
    Ok(())
}

#[tokio::test]
async fn non_json_body_is_unhealthy() -> TestResult {
    init_tracing();
    let app = Router::new().route("/health", get(|| async { "ok" }));
    let addr = serve(app).await?;

    assert!(!probe_backend(addr, Duration::from_secs(2)).await?.is_healthy());
    Ok(())
}

#[tokio::test]
async fn slow_backend_times_out_as_unhealthy() -> TestResult {
    init_tracing();
    let app = Router::new().route(
        "/health",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"status": "ok"}))
        }),
    );
    let addr = serve(app).await?;

    let started = std::time::Instant::now();
    let status = probe_backend(addr, Duration::from_millis(200)).await?;
    assert!(!status.is_healthy());
    assert!(started.elapsed() < Duration::from_secs(2));
    Ok(())
}

#[tokio::test]
async fn unreachable_backend_is_unhealthy() -> TestResult {
    init_tracing();
    // Grab a free port, then close it again.
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        listener.local_addr()?
    };

    assert!(!probe_backend(addr, Duration::from_millis(500)).await?.is_healthy());
    Ok(())
}
