use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tower::ServiceExt;

use simple_timer::{
    create_router,
    services::{
        load_settings, JsonSettingsStore, MemorySettingsStore, SettingsStore, SettingsWriter,
        SilentSoundPlayer,
    },
    state::{AppState, TimerSession},
    tasks::settings_writer_task,
    utils::ManualClock,
};

/// Build the app the way the daemon does, returning the settings writer task
fn app_with_store(clock: &ManualClock, store: Arc<dyn SettingsStore>) -> (Arc<AppState>, Router, JoinHandle<()>) {
    let settings = load_settings(store.as_ref());
    let (settings_writer, saves) = SettingsWriter::new();
    let writer = tokio::spawn(settings_writer_task(store, saves));

    let session = TimerSession::new(Arc::new(clock.clone()), Arc::new(SilentSoundPlayer), settings, settings_writer);
    let state = Arc::new(AppState::new(20554, "127.0.0.1".to_string(), session));
    let router = create_router(Arc::clone(&state));
    (state, router, writer)
}

fn app(clock: &ManualClock) -> (Arc<AppState>, Router) {
    let (state, router, _) = app_with_store(clock, Arc::new(MemorySettingsStore::default()));
    (state, router)
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(body) => {
            request = request.header("content-type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    let response = router.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

async fn query(router: &Router, text: &str) -> (StatusCode, Value) {
    send(router, Method::POST, "/query", Some(json!({ "query": text }))).await
}

#[tokio::test]
async fn health_reports_ok() {
    let (_, router) = app(&ManualClock::default());
    let (status, body) = send(&router, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn idle_status_shows_default_target() {
    let (_, router) = app(&ManualClock::default());
    let (status, body) = send(&router, Method::GET, "/status", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "idle");
    assert_eq!(body["timer"]["target"], "15:00");
    assert_eq!(body["timer"]["remaining"], Value::Null);
    assert_eq!(body["display"], "15:00");
}

#[tokio::test]
async fn bare_number_sets_and_starts() {
    let (_, router) = app(&ManualClock::default());
    let (status, body) = query(&router, "20").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], json!({ "kind": "set", "seconds": 1200 }));
    assert_eq!(body["timer"]["phase"], "running");
    assert_eq!(body["timer"]["remaining"], "20:00");

    let (_, status_body) = send(&router, Method::GET, "/status", None).await;
    assert_eq!(status_body["last_action"], "set");
}

#[tokio::test]
async fn add_and_subtract_adjust_target() {
    let (_, router) = app(&ManualClock::default());

    let (_, body) = query(&router, "+1h").await;
    assert_eq!(body["action"], json!({ "kind": "add", "seconds": 3600 }));
    assert_eq!(body["timer"]["target"], "01:15:00");
    assert_eq!(body["timer"]["phase"], "idle");

    let (_, body) = query(&router, "minus 5 min").await;
    assert_eq!(body["action"], json!({ "kind": "add", "seconds": -300 }));
    assert_eq!(body["timer"]["target"], "01:10:00");

    let (_, body) = query(&router, "-10h").await;
    assert_eq!(body["timer"]["target"], "00:00");
}

#[tokio::test]
async fn garbage_query_is_rejected() {
    let (state, router) = app(&ManualClock::default());
    let before = state.snapshot();

    let (status, body) = query(&router, "xyz").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");
    assert_eq!(state.snapshot(), before);
}

#[tokio::test]
async fn start_and_stop_keywords_toggle() {
    let (_, router) = app(&ManualClock::default());

    let (status, body) = query(&router, "start").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "running");

    let (status, _) = query(&router, "start").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = query(&router, "q").await;
    assert_eq!(body["timer"]["phase"], "idle");
    assert_eq!(body["timer"]["target"], "15:00");
}

#[tokio::test]
async fn start_and_stop_endpoints_report_changes() {
    let (_, router) = app(&ManualClock::default());

    let (_, body) = send(&router, Method::POST, "/stop", None).await;
    assert_eq!(body["status"], "unchanged");

    let (_, body) = send(&router, Method::POST, "/start", None).await;
    assert_eq!(body["status"], "ok");
    let (_, body) = send(&router, Method::POST, "/start", None).await;
    assert_eq!(body["status"], "unchanged");

    let (_, body) = send(&router, Method::POST, "/stop", None).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["timer"]["phase"], "idle");
}

#[tokio::test]
async fn completed_timer_alarm_can_be_dismissed() {
    let clock = ManualClock::default();
    let (state, router) = app(&clock);

    query(&router, "1m").await;
    clock.advance(chrono::Duration::seconds(60));
    state.tick().unwrap();

    let (_, body) = send(&router, Method::GET, "/status", None).await;
    assert_eq!(body["timer"]["phase"], "completing");
    assert_eq!(body["timer"]["remaining"], "00:00");
    assert_eq!(body["timer"]["alarm_active"], true);

    for _ in 0..2 {
        let (status, body) = send(&router, Method::POST, "/alarm/stop", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timer"]["completion_state"], Value::Null);
        assert_eq!(body["timer"]["alarm_active"], false);
    }
}

#[tokio::test]
async fn new_query_during_alarm_resets_it() {
    let clock = ManualClock::default();
    let (state, router) = app(&clock);

    query(&router, "10s").await;
    clock.advance(chrono::Duration::seconds(10));
    state.tick().unwrap();
    assert_eq!(state.snapshot().completion_state, Some(true));

    let (_, body) = query(&router, "5").await;
    assert_eq!(body["timer"]["phase"], "running");
    assert_eq!(body["timer"]["completion_state"], Value::Null);
    assert_eq!(body["timer"]["remaining"], "05:00");
}

#[tokio::test]
async fn settings_are_patched_and_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let (state, router, writer) = app_with_store(&ManualClock::default(), Arc::new(JsonSettingsStore::new(&path)));

    let (_, body) = send(&router, Method::GET, "/settings", None).await;
    assert_eq!(body["selectedSound"], "Blow");
    assert_eq!(body["soundOffset"], 0.2);

    let patch = json!({ "selectedSound": "Glass", "repeatSound": false });
    let (status, body) = send(&router, Method::PUT, "/settings", Some(patch)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selectedSound"], "Glass");
    assert_eq!(body["repeatSound"], false);
    assert_eq!(body["isSoundEnabled"], true);

    query(&router, "25").await;

    drop((state, router));
    writer.await.unwrap();
    let stored = JsonSettingsStore::new(&path).load().unwrap();
    assert_eq!(stored.selected_timer_duration, 1500);
    assert!(!stored.repeat_sound);
}

#[tokio::test]
async fn stored_duration_is_used_on_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"selectedTimerDuration": 300}"#).unwrap();

    let (_, router, _) = app_with_store(&ManualClock::default(), Arc::new(JsonSettingsStore::new(&path)));
    let (_, body) = send(&router, Method::GET, "/status", None).await;

    assert_eq!(body["timer"]["target"], "05:00");
}
