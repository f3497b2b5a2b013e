use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
};
use lmguide_relay::{
    config::Config,
    notify::Delivery,
    payload::CORE_KEYS,
    pipeline::run,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

const STATUS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Load Management Guide</title></head>
<body>
  <h1>Load Management Guide</h1>
  <p>Last Updated: 10/19/2026 6:05 AM</p>
  <section>
    <h2>Today</h2>
    <span>Monday, October 19</span>
    <table>
      <tr><th>Program</th><th>Probability</th><th>Time</th></tr>
      <tr><td>Residential Interruptible Water Heating</td><td>Unlikely</td><td>Undetermined</td></tr>
      <tr><td>Commercial Interruptible</td><td>Possible</td><td>5:00 PM - 8:00 PM</td></tr>
    </table>
  </section>
  <section>
    <h2>Next Day</h2>
    <span>Tuesday, October 20</span>
    <table>
      <tr><th>Program</th><th>Probability</th><th>Time</th></tr>
      <tr><td>Residential Interruptible Water Heating</td><td>Likely</td><td>4:00 PM - 7:00 PM</td></tr>
    </table>
  </section>
  <img src="/images/gauge2.jpg?v=3" alt="Conservation gauge">
</body>
</html>"#;

const GAUGE_PAGE: &str = r#"<html><body><img src="/images/logo.png"><img src="/images/gauge3.jpg"></body></html>"#;

type Received = Arc<Mutex<Vec<Value>>>;

async fn record(State(received): State<Received>, Json(body): Json<Value>) -> StatusCode {
    received.lock().unwrap().push(body);
    StatusCode::OK
}

async fn spawn_server() -> (String, Received) {
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/status", get(|| async { Html(STATUS_PAGE) }))
        .route("/gauge", get(|| async { Html(GAUGE_PAGE) }))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .route("/webhook", post(record))
        .route(
            "/rejecting",
            post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "payload too large") }),
        )
        .with_state(received.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), received)
}

fn config(base: &str, page: &str) -> Config {
    Config {
        status_url: format!("{}{}", base, page),
        webhook_url: Some(format!("{}/webhook", base)),
        fetch_timeout: Duration::from_secs(5),
        render_wait: Duration::ZERO,
        ..Config::default()
    }
}

fn vars(body: &Value) -> &serde_json::Map<String, Value> {
    body["merge_variables"].as_object().unwrap()
}

#[tokio::test]
async fn delivers_extracted_fields() {
    let (base, received) = spawn_server().await;

    let report = run(&config(&base, "/status")).await.unwrap();
    assert_eq!(report.delivery, Delivery::Sent { status: 200 });

    let bodies = received.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    let vars = vars(&bodies[0]);
    assert_eq!(vars["today_probability"], "Unlikely");
    assert_eq!(vars["today_time"], "Undetermined");
    assert_eq!(vars["tomorrow_probability"], "Likely");
    assert_eq!(vars["tomorrow_time"], "4:00 PM - 7:00 PM");
    assert_eq!(vars["last_updated"], "10/19/2026 6:05 AM");
    assert_eq!(vars["conservation_status"], "Moderate Usage");
    assert_eq!(vars["today_date"], "Monday, October 19");
    assert_eq!(vars["status"], "ok");
    assert!(!vars.contains_key("error"));
}

#[tokio::test]
async fn gauge_page_overrides_status_page_gauge() {
    let (base, received) = spawn_server().await;
    let config = Config {
        gauge_url: Some(format!("{}/gauge", base)),
        ..config(&base, "/status")
    };

    let report = run(&config).await.unwrap();
    assert_eq!(report.result.conservation_status, "Peak Usage");
    assert_eq!(vars(&received.lock().unwrap()[0])["conservation_status"], "Peak Usage");
}

#[tokio::test]
async fn unreachable_page_sends_error_payload() {
    let (base, received) = spawn_server().await;
    let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead = format!("http://{}", closed.local_addr().unwrap());
    drop(closed);

    let config = Config {
        status_url: format!("{}/status", dead),
        ..config(&base, "/status")
    };

    let report = run(&config).await.unwrap();
    assert_eq!(report.delivery, Delivery::Sent { status: 200 });

    let bodies = received.lock().unwrap();
    let vars = vars(&bodies[0]);
    for key in CORE_KEYS {
        assert!(vars.contains_key(key), "missing {}", key);
    }
    assert_eq!(vars["today_probability"], "Error");
    assert_eq!(vars["tomorrow_time"], "Error");
    assert_eq!(vars["status"], "error");
    assert!(vars["error"].as_str().unwrap().starts_with("Failed to fetch data"));
}

#[tokio::test]
async fn page_error_status_is_a_fetch_failure() {
    let (base, received) = spawn_server().await;

    let report = run(&config(&base, "/missing")).await.unwrap();
    assert_eq!(report.result.today_probability, "Error");
    assert_eq!(vars(&received.lock().unwrap()[0])["status"], "error");
}

#[tokio::test]
async fn rejected_webhook_is_not_fatal() {
    let (base, received) = spawn_server().await;
    let config = Config {
        webhook_url: Some(format!("{}/rejecting", base)),
        ..config(&base, "/status")
    };

    let report = run(&config).await.unwrap();
    assert_eq!(report.delivery, Delivery::Rejected { status: 422 });
    assert_eq!(report.result.today_probability, "Unlikely");
    assert!(received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_webhook_is_skipped() {
    let (base, _received) = spawn_server().await;
    let config = Config {
        webhook_url: None,
        ..config(&base, "/status")
    };

    let report = run(&config).await.unwrap();
    assert_eq!(report.delivery, Delivery::Skipped);
    assert_eq!(report.payload.get("today_time"), Some("Undetermined"));
}

#[tokio::test]
async fn missing_webhook_fails_when_required() {
    let (base, _received) = spawn_server().await;
    let config = Config {
        webhook_url: None,
        require_webhook: true,
        ..config(&base, "/status")
    };

    assert!(run(&config).await.is_err());
}

#[tokio::test]
async fn writes_step_output_line() {
    let (base, _received) = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("github_output");
    let config = Config {
        step_output: Some(path.clone()),
        ..config(&base, "/status")
    };

    let report = run(&config).await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let line = contents.lines().next().unwrap();
    let json = line.strip_prefix("data=").unwrap();
    let written: Value = serde_json::from_str(json).unwrap();
    assert_eq!(written, serde_json::to_value(&report.payload).unwrap());
}

#[tokio::test]
async fn unwritable_step_output_still_notifies() {
    let (base, received) = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("github_output");
    let config = Config {
        step_output: Some(path.clone()),
        ..config(&base, "/status")
    };

    let report = run(&config).await.unwrap();
    assert_eq!(report.delivery, Delivery::Sent { status: 200 });
    assert!(!path.exists());
    assert_eq!(received.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn failed_gauge_page_keeps_status_page_gauge() {
    let (base, received) = spawn_server().await;
    let config = Config {
        gauge_url: Some(format!("{}/missing", base)),
        ..config(&base, "/status")
    };

    let report = run(&config).await.unwrap();
    assert_eq!(report.result.conservation_status, "Moderate Usage");
    assert_eq!(report.result.today_probability, "Unlikely");

    let bodies = received.lock().unwrap();
    let vars = vars(&bodies[0]);
    assert_eq!(vars["status"], "ok");
    assert_eq!(vars["conservation_status"], "Moderate Usage");
    assert!(!vars.contains_key("error"));
}
