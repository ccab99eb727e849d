use axum::{routing::get, Json, Router};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct Slot {
    kind: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    active_tab: String,
    loading: bool,
    filters: BTreeMap<String, Option<String>>,
    slots: BTreeMap<String, Slot>,
    banners: Vec<Value>,
}

impl Snapshot {
    fn slot(&self, id: &str) -> &str {
        &self.slots.get(id).expect("missing slot").value
    }
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));
static STUB_API: Lazy<String> = Lazy::new(spawn_stub_api);

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn stub_router() -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .route(
            "/api/overview",
            get(|| async {
                Json(json!({
                    "presell_entries": 1500,
                    "bot_starts": 120,
                    "pix_generated": 40,
                    "pix_paid": 10
                }))
            }),
        )
        .route(
            "/api/sales",
            get(|| async {
                Json(json!({
                    "total_revenue": 1234.5,
                    "total_transactions": 12,
                    "conversion_rate": 30,
                    "average_ticket": 102.875,
                    "sales_by_date": [{ "date": "2026-10-18", "revenue": 1234.5, "transactions": 12 }],
                    "sales_by_plan": []
                }))
            }),
        )
        .route("/api/logs", get(|| async { Json(json!({ "logs": [] })) }))
}

// The stub outlives any single test runtime, so it gets a thread of its own.
fn spawn_stub_api() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub api");
    listener.set_nonblocking(true).expect("nonblocking stub api");
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("stub runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("stub listener");
            axum::serve(listener, stub_router()).await.expect("stub api");
        });
    });
    format!("http://{addr}")
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/view")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_funnel_dashboard"))
        .env("PORT", port.to_string())
        .env("DASHBOARD_API_URL", STUB_API.as_str())
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn view(client: &Client, server: &TestServer) -> Snapshot {
    client
        .get(format!("{}/api/view", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_index_renders_loaded_overview() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    client
        .post(format!("{}/api/tab/overview", server.base_url))
        .send()
        .await
        .unwrap();

    let response = client.get(&server.base_url).send().await.unwrap();
    assert!(response.status().is_success());
    let page = response.text().await.unwrap();

    assert!(page.contains(r#"<span class="value" id="presell-entries">1.500</span>"#));
    assert!(page.contains(r#"<span class="value" id="quick-conversion">25.0%</span>"#));
    assert!(page.contains(r#"id="overview-tab" class="tab-content active""#));
    assert!(!page.contains("{{"));
}

#[tokio::test]
async fn http_switch_tab_returns_sales_snapshot() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let snapshot: Snapshot = client
        .post(format!("{}/api/tab/sales", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(snapshot.active_tab, "sales");
    assert!(!snapshot.loading);
    assert_eq!(snapshot.slot("total-revenue"), "R$\u{a0}1.234,50");
    assert_eq!(snapshot.slot("average-ticket"), "R$\u{a0}102,88");
    assert_eq!(snapshot.slot("conversion-rate"), "30.0%");
    assert_eq!(snapshot.slots["sales-by-plan"].kind, "html");
    assert!(snapshot.slot("sales-chart-data").contains("18/10/2026"));
    assert!(snapshot.slot("sales-by-plan").contains("Nenhuma venda encontrada"));
    assert!(snapshot.banners.is_empty());
}

#[tokio::test]
async fn http_unknown_tab_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/tab/funnel", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_filter_form_clears_dates_and_redirects() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let response = client
        .post(format!("{}/filters", server.base_url))
        .form(&[("start_date", ""), ("end_date", "2026-10-19")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());

    let snapshot = view(&client, &server).await;
    assert_eq!(snapshot.filters.get("start_date"), Some(&None));
    assert_eq!(
        snapshot.filters.get("end_date"),
        Some(&Some("2026-10-19".to_string()))
    );
}

#[tokio::test]
async fn http_refresh_keeps_active_tab() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    client
        .post(format!("{}/api/tab/logs", server.base_url))
        .send()
        .await
        .unwrap();
    let snapshot: Snapshot = client
        .post(format!("{}/api/refresh", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(snapshot.active_tab, "logs");
    assert!(snapshot.slot("logs-data").contains("Nenhum log encontrado"));
}
