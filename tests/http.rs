use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct BreakdownRow {
    label: String,
    count: u64,
    percent: String,
}

#[derive(Debug, Deserialize)]
struct Metrics {
    status_breakdown: Vec<BreakdownRow>,
    total_sent: u64,
    total_booked: u64,
    percent_booked: f64,
    estimated_revenue: f64,
    language_breakdown: Vec<BreakdownRow>,
}

#[derive(Debug, Deserialize)]
struct ProviderVolume {
    provider_name: String,
    booked_count: u64,
}

#[derive(Debug, Deserialize)]
struct DashboardResponse {
    start: String,
    end: String,
    metrics: Metrics,
    providers: Vec<ProviderVolume>,
}

#[derive(Debug, Deserialize)]
struct ShowRate {
    months_covered: Vec<String>,
    total_booked: u64,
    total_kept: u64,
    show_rate_percent: f64,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    tenant_id: String,
    token: String,
}

const EMAIL: &str = "frontdesk@openhealth.org";
const PASSWORD: &str = "correct horse";

const FIXTURE: &str = r#"[
  {"Patient ID": "p1", "Date": "2025-06-30", "Time": "09:00:00", "Provider Name": "Dr. Adams",
   "Status": "Booked", "Duplicate": "", "pt_language": "English", "reach_out_medium": "SMS", "Kept": true},
  {"Patient ID": "p1", "Date": "2025-06-30", "Time": "09:00:00", "Provider Name": "Dr. Okafor",
   "Status": "Booked", "Duplicate": "✅", "pt_language": "English", "reach_out_medium": "SMS"},
  {"Patient ID": "p2", "Date": "2025-07-01", "Time": "10:00:00", "Provider Name": "Dr. Okafor",
   "Status": "Booked", "pt_language": "Spanish", "reach_out_medium": "Call", "Kept": false},
  {"Patient ID": "p3", "Date": "2025-07-01", "Time": "11:00:00", "Provider Name": "Dr. Adams",
   "Status": "Sent", "reach_out_medium": "SMS"}
]"#;

struct TestServer {
    base_url: String,
    records_path: PathBuf,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_file(&self.records_path);
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

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

fn unique_records_path() -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "outreach_dashboard_http_{}_{}.json",
        std::process::id(),
        nanos
    ))
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/login")).send().await {
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
    let records_path = unique_records_path();
    std::fs::write(&records_path, FIXTURE).expect("write fixture");
    let child = Command::new(env!("CARGO_BIN_EXE_outreach_dashboard"))
        .env("PORT", port.to_string())
        .env("RECORDS_PATH", &records_path)
        .env("REVENUE_RATES", "2000-01-01=154,2025-07-01=175")
        .env("PASSWORD_ITERATIONS", "1000")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        base_url,
        records_path,
        child,
    }
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

async fn login(client: &Client, server: &TestServer) -> LoginResponse {
    let response = client
        .post(format!("{}/api/register", server.base_url))
        .json(&serde_json::json!({ "email": EMAIL, "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert!(
        response.status().is_success() || response.status() == StatusCode::CONFLICT,
        "register failed: {}",
        response.status()
    );

    client
        .post(format!("{}/api/login", server.base_url))
        .json(&serde_json::json!({ "email": EMAIL, "password": PASSWORD }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn fetch_metrics(client: &Client, server: &TestServer, token: &str) -> DashboardResponse {
    client
        .get(format!(
            "{}/api/metrics?mode=range&start=2025-06-01&end=2025-07-31",
            server.base_url
        ))
        .header("x-session-token", token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_data_routes_require_session() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!(
            "{}/api/metrics?mode=single&date=2025-07-01",
            server.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .get(format!("{}/api/latest-date", server.base_url))
        .header("x-session-token", "openhealth")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .post(format!("{}/api/register", server.base_url))
        .json(&serde_json::json!({ "email": "not-an-email", "password": "pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_metrics_for_range() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let session = login(&client, &server).await;
    assert_eq!(session.tenant_id, "openhealth");

    let dashboard = fetch_metrics(&client, &server, &session.token).await;
    assert_eq!(dashboard.start, "2025-06-01");
    assert_eq!(dashboard.end, "2025-07-31");

    let metrics = dashboard.metrics;
    assert_eq!(metrics.total_sent, 4);
    assert_eq!(metrics.total_booked, 2);
    assert_eq!(metrics.percent_booked, 50.0);
    assert_eq!(metrics.estimated_revenue, 154.0 + 175.0);
    let statuses: Vec<_> = metrics
        .status_breakdown
        .iter()
        .map(|row| (row.label.as_str(), row.count, row.percent.as_str()))
        .collect();
    assert_eq!(statuses, vec![("Booked", 3, "75.0"), ("Sent", 1, "25.0")]);
    let languages: Vec<_> = metrics
        .language_breakdown
        .iter()
        .map(|row| row.label.as_str())
        .collect();
    assert_eq!(languages, vec!["English", "Spanish", "Unknown"]);

    let providers: Vec<_> = dashboard
        .providers
        .iter()
        .map(|row| (row.provider_name.as_str(), row.booked_count))
        .collect();
    assert_eq!(providers, vec![("Dr. Adams", 1), ("Dr. Okafor", 1)]);
}

#[tokio::test]
async fn http_empty_range_yields_zeroes() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let token = login(&client, &server).await.token;

    let dashboard: DashboardResponse = client
        .get(format!(
            "{}/api/metrics?mode=single&date=2024-01-01",
            server.base_url
        ))
        .header("x-session-token", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(dashboard.metrics.total_sent, 0);
    assert_eq!(dashboard.metrics.total_booked, 0);
    assert_eq!(dashboard.metrics.percent_booked, 0.0);
    assert_eq!(dashboard.metrics.estimated_revenue, 0.0);
    assert!(dashboard.metrics.status_breakdown.is_empty());

    let response = client
        .get(format!(
            "{}/api/metrics?mode=range&start=2025-07-02&end=2025-07-01",
            server.base_url
        ))
        .header("x-session-token", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_provider_details_and_show_rate() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let token = login(&client, &server).await.token;

    let details: Vec<serde_json::Value> = client
        .get(format!(
            "{}/api/details?mode=range&start=2025-06-01&end=2025-07-31&provider=Dr.%20Adams",
            server.base_url
        ))
        .header("x-session-token", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0]["Patient ID"], "p1");

    let rate: ShowRate = client
        .get(format!(
            "{}/api/show-rate?months=2025-06,2025-07",
            server.base_url
        ))
        .header("x-session-token", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rate.months_covered, vec!["2025-06", "2025-07"]);
    assert_eq!(rate.total_booked, 2);
    assert_eq!(rate.total_kept, 1);
    assert_eq!(rate.show_rate_percent, 50.0);
}

#[tokio::test]
async fn http_failed_reload_keeps_last_known_records() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let token = login(&client, &server).await.token;

    std::fs::write(&server.records_path, "not json").unwrap();
    let response = client
        .post(format!("{}/api/records/reload", server.base_url))
        .header("x-session-token", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let dashboard = fetch_metrics(&client, &server, &token).await;
    assert_eq!(dashboard.metrics.total_sent, 4);

    std::fs::write(&server.records_path, FIXTURE).unwrap();
    let response = client
        .post(format!("{}/api/records/reload", server.base_url))
        .header("x-session-token", &token)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
async fn http_wrong_password_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    login(&client, &server).await;

    let response = client
        .post(format!("{}/api/login", server.base_url))
        .json(&serde_json::json!({ "email": EMAIL, "password": "guess" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .post(format!("{}/api/register", server.base_url))
        .json(&serde_json::json!({ "email": EMAIL, "password": "takeover" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn http_logout_ends_only_its_own_session() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let first = login(&client, &server).await;
    let second = login(&client, &server).await;
    assert_eq!(first.tenant_id, second.tenant_id);
    assert_ne!(first.token, second.token);

    let response = client
        .delete(format!("{}/api/session", server.base_url))
        .header("x-session-token", &first.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let latest = |token: String| {
        client
            .get(format!("{}/api/latest-date", server.base_url))
            .header("x-session-token", token)
            .send()
    };
    assert_eq!(
        latest(first.token.clone()).await.unwrap().status(),
        StatusCode::UNAUTHORIZED
    );
    assert!(latest(second.token.clone()).await.unwrap().status().is_success());
}

#[tokio::test]
async fn http_dashboard_page_requires_login() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();
    login(&client, &server).await;

    let response = client
        .get(format!(
            "{}/?mode=range&start=2025-06-01&end=2025-07-31",
            server.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/login");
    let body = response.text().await.unwrap();
    assert!(!body.contains("Total Sent"));

    let response = client
        .post(format!("{}/login", server.base_url))
        .form(&[("email", EMAIL), ("password", PASSWORD)])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = response.headers()["set-cookie"]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session="));

    let body = client
        .get(format!(
            "{}/?mode=range&start=2025-06-01&end=2025-07-31",
            server.base_url
        ))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Total Sent"));
    assert!(body.contains(r#"<p id="show-rate">50.0%</p>"#));

    let response = client
        .post(format!("{}/logout", server.base_url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let response = client
        .get(format!("{}/", server.base_url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn http_login_form_shows_error_on_bad_password() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    login(&client, &server).await;

    let response = client
        .post(format!("{}/login", server.base_url))
        .form(&[("email", EMAIL), ("password", "guess")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.text().await.unwrap().contains(r#"class="message""#));
}
