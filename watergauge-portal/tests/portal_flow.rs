//! End-to-end portal flow tests against a scripted in-process portal.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::Form;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use watergauge_core::CodeSource;
use watergauge_portal::{PortalClient, PortalConfig, PortalError, SessionState};

const CSV_BODY: &str = "\
Account Number,Read Date,Meter Reading,Gallons,Leak Detected,Leak Volume,Meter Class
123,2024-01-05 01:00:00 PM,1037.7,3.1,0,0,Residential
123,2024-01-05  02:00:00 PM,1050.2,12.5,0,0,Residential
123,bad date,1060.0,9.0,0,0,Residential";

/// How the download endpoint behaves per call.
#[derive(Clone, Copy)]
enum DownloadPlan {
    /// Always serve the CSV.
    Csv,
    /// Always reject with this status.
    Fail(u16),
    /// Reject the first call with this status, then serve the CSV.
    FailFirstThenCsv(u16),
}

struct MockPortal {
    base_url: String,
    login_calls: Arc<AtomicUsize>,
    download_calls: Arc<AtomicUsize>,
    verified_code: Arc<Mutex<Option<String>>>,
}

async fn spawn_portal(
    login_status: StatusCode,
    login_body: &'static str,
    download: DownloadPlan,
) -> MockPortal {
    let login_calls = Arc::new(AtomicUsize::new(0));
    let download_calls = Arc::new(AtomicUsize::new(0));
    let verified_code = Arc::new(Mutex::new(None));

    let app = Router::new()
        .route(
            "/index.php/auth/login",
            post({
                let calls = login_calls.clone();
                move |Form(params): Form<HashMap<String, String>>| {
                    let calls = calls.clone();
                    async move {
                        assert_eq!(params.get("username").map(String::as_str), Some("resident@example.com"));
                        assert_eq!(params.get("password").map(String::as_str), Some("hunter2"));
                        calls.fetch_add(1, Ordering::SeqCst);
                        (login_status, login_body)
                    }
                }
            }),
        )
        .route(
            "/index.php/auth/verify",
            post({
                let verified = verified_code.clone();
                move |Form(params): Form<HashMap<String, String>>| {
                    let verified = verified.clone();
                    async move {
                        *verified.lock().unwrap() = params.get("code").cloned();
                        (StatusCode::OK, "verified")
                    }
                }
            }),
        )
        .route(
            "/index.php/Download/hourly",
            get({
                let calls = download_calls.clone();
                move || {
                    let calls = calls.clone();
                    async move {
                        let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                        match download {
                            DownloadPlan::Csv => (StatusCode::OK, CSV_BODY),
                            DownloadPlan::Fail(status) => {
                                (StatusCode::from_u16(status).unwrap(), "rejected")
                            }
                            DownloadPlan::FailFirstThenCsv(status) if call == 1 => {
                                (StatusCode::from_u16(status).unwrap(), "rejected")
                            }
                            DownloadPlan::FailFirstThenCsv(_) => (StatusCode::OK, CSV_BODY),
                        }
                    }
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockPortal {
        base_url: format!("http://{addr}"),
        login_calls,
        download_calls,
        verified_code,
    }
}

fn config_for(portal: &MockPortal, wait_time_secs: u64) -> PortalConfig {
    let toml_str = format!(
        r#"
        [portal]
        base_url = "{}"
        username = "resident@example.com"
        password = "hunter2"

        [mailbox]
        wait_time_secs = {wait_time_secs}
        "#,
        portal.base_url
    );
    toml::from_str(&toml_str).unwrap()
}

/// Code source for tests; panics if polled when `code` is `None`.
struct ScriptedCodes {
    code: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedCodes {
    fn yielding(code: &str) -> Arc<Self> {
        Arc::new(Self {
            code: Some(code.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            code: None,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CodeSource for ScriptedCodes {
    async fn fetch_code(&self, _subject_filter: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Some(self.code.clone().expect("code source polled unexpectedly"))
    }
}

#[tokio::test]
async fn test_fetch_without_two_factor_never_touches_code_source() {
    let portal = spawn_portal(StatusCode::OK, "Welcome back, resident", DownloadPlan::Csv).await;
    let codes = ScriptedCodes::unreachable();
    let mut client = PortalClient::with_code_source(config_for(&portal, 90), codes.clone()).unwrap();

    let records = client.fetch_usage().await.unwrap();
    assert_eq!(records.len(), 2, "the malformed row is dropped");
    assert_eq!(records[1].gallons, 12.5);
    assert_eq!(client.session_state(), SessionState::Authenticated);
    assert_eq!(codes.calls.load(Ordering::SeqCst), 0);

    // Second fetch reuses the session: no further login.
    client.fetch_usage().await.unwrap();
    assert_eq!(portal.login_calls.load(Ordering::SeqCst), 1);
    assert_eq!(portal.download_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_two_factor_flow_submits_polled_code() {
    let portal = spawn_portal(
        StatusCode::OK,
        "Please enter the verification code we emailed you",
        DownloadPlan::Csv,
    )
    .await;
    let codes = ScriptedCodes::yielding("654321");
    let mut client = PortalClient::with_code_source(config_for(&portal, 90), codes.clone()).unwrap();

    let records = client.fetch_usage().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(codes.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        portal.verified_code.lock().unwrap().as_deref(),
        Some("654321")
    );
}

#[tokio::test]
async fn test_download_failure_embeds_status_and_returns_nothing() {
    let portal = spawn_portal(StatusCode::OK, "Welcome back", DownloadPlan::Fail(500)).await;
    let mut client =
        PortalClient::with_code_source(config_for(&portal, 90), ScriptedCodes::unreachable())
            .unwrap();

    let err = client.fetch_usage().await.unwrap_err();
    assert!(matches!(err, PortalError::Status { status: 500, .. }));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_login_rejection_leaves_session_anonymous() {
    let portal = spawn_portal(StatusCode::FORBIDDEN, "nope", DownloadPlan::Csv).await;
    let mut client =
        PortalClient::with_code_source(config_for(&portal, 90), ScriptedCodes::unreachable())
            .unwrap();

    let err = client.fetch_usage().await.unwrap_err();
    assert!(err.to_string().contains("403"));
    assert_eq!(client.session_state(), SessionState::Anonymous);
    assert_eq!(portal.download_calls.load(Ordering::SeqCst), 0);

    // A later fetch starts from login again.
    let _ = client.fetch_usage().await.unwrap_err();
    assert_eq!(portal.login_calls.load(Ordering::SeqCst), 2);
    assert_eq!(portal.download_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_stale_session_relogs_in_exactly_once() {
    let portal = spawn_portal(
        StatusCode::OK,
        "Welcome back",
        DownloadPlan::FailFirstThenCsv(401),
    )
    .await;
    let mut client =
        PortalClient::with_code_source(config_for(&portal, 90), ScriptedCodes::unreachable())
            .unwrap();

    let records = client.fetch_usage().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(portal.login_calls.load(Ordering::SeqCst), 2);
    assert_eq!(portal.download_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_persistent_rejection_fails_after_one_retry() {
    let portal = spawn_portal(StatusCode::OK, "Welcome back", DownloadPlan::Fail(401)).await;
    let mut client =
        PortalClient::with_code_source(config_for(&portal, 90), ScriptedCodes::unreachable())
            .unwrap();

    let err = client.fetch_usage().await.unwrap_err();
    assert!(matches!(err, PortalError::Status { status: 401, .. }));
    assert_eq!(portal.login_calls.load(Ordering::SeqCst), 2);
    assert_eq!(portal.download_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_two_factor_without_mailbox_times_out_informatively() {
    let portal = spawn_portal(
        StatusCode::OK,
        "Two-factor verification required",
        DownloadPlan::Csv,
    )
    .await;
    // Real (unconfigured) mailbox reader; a sub-interval wait means zero
    // poll attempts, so the timeout surfaces without any real sleeping.
    let mut client = PortalClient::new(config_for(&portal, 4)).unwrap();

    let err = client.fetch_usage().await.unwrap_err();
    assert!(matches!(err, PortalError::AuthTimeout { waited_secs: 4 }));
    assert_eq!(client.session_state(), SessionState::Anonymous);
}
