//! End-to-end authentication flows against a mocked entitlement service.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use skygate::controller::{AuthController, AuthOutcome};
use skygate::lease::file::LeaseStore;
use skygate::lease::format;
use skygate::{Entitlement, EntitlementClient, SkygateConfig, SkygateError, SystemClock};
use tempfile::TempDir;

const ALICE: &str = r#"{
    "username": "Alice",
    "allowOfflineAuth": true,
    "isSupporter": false,
    "isTester": false,
    "maxOfflineSessions": 5,
    "offlineSessionsPlayed": 2
}"#;

struct ScriptedClient {
    available: bool,
    record: Option<String>,
}

impl EntitlementClient for ScriptedClient {
    fn initialize_connection(&self) {}

    fn is_server_available(&self) -> bool {
        self.available
    }

    fn fetch_user_record(&self, _api_key: &str) -> Result<String, SkygateError> {
        match &self.record {
            Some(record) => Ok(record.clone()),
            None => Err(SkygateError::Transport("scripted failure".to_string())),
        }
    }
}

struct Harness {
    dir: TempDir,
    controller: AuthController,
}

impl Harness {
    fn new(available: bool, record: Option<&str>, api_key: Option<&str>) -> Self {
        let dir = TempDir::new().unwrap();
        let settings_path = dir.path().join("settings.toml");
        if let Some(key) = api_key {
            fs::write(&settings_path, format!("[Networking]\nAPIKey = \"{key}\"\n")).unwrap();
        }

        let config = SkygateConfig {
            app_name: "towersim",
            data_namespace: "towersim-test",
            settings_path,
            service_url: "https://entitlements.example".to_string(),
        };
        let lease = LeaseStore::with_path(dir.path().join("entitlement.lease")).unwrap();
        let client = Arc::new(ScriptedClient {
            available,
            record: record.map(String::from),
        });
        let controller =
            AuthController::with_components(config, lease, client, Arc::new(SystemClock));
        Self { dir, controller }
    }

    fn lease_path(&self) -> PathBuf {
        self.dir.path().join("entitlement.lease")
    }

    fn seed_lease(&self, payload: &str) {
        let sealed = format::seal(payload, &SystemClock).unwrap();
        LeaseStore::with_path(self.lease_path())
            .unwrap()
            .save(&sealed)
            .unwrap();
    }

    fn lease_record(&self) -> Entitlement {
        let sealed = LeaseStore::with_path(self.lease_path())
            .unwrap()
            .load()
            .unwrap()
            .expect("lease should exist");
        Entitlement::from_json(&format::open(&sealed).unwrap().payload).unwrap()
    }
}

#[test]
fn offline_scenario_tracks_sessions() {
    // Save Alice's record, authenticate offline, and watch the persisted
    // counter climb while the adopted record stays at the saved value.
    let harness = Harness::new(false, None, Some("key-123"));
    harness.seed_lease(ALICE);

    let loaded = harness.lease_record();
    assert_eq!(loaded.username, "Alice");
    assert_eq!(loaded.offline_sessions_played, 2);

    match harness.controller.authenticate() {
        AuthOutcome::OfflineOk(record) => {
            assert_eq!(record.username, "Alice");
            assert_eq!(record.offline_sessions_played, 2);
        }
        other => panic!("expected OfflineOk, got {other:?}"),
    }
    assert_eq!(harness.lease_record().offline_sessions_played, 3);

    // A second offline run keeps counting.
    match harness.controller.authenticate() {
        AuthOutcome::OfflineOk(record) => {
            assert_eq!(record.offline_sessions_played, 3);
        }
        other => panic!("expected OfflineOk, got {other:?}"),
    }
    assert_eq!(harness.lease_record().offline_sessions_played, 4);
}

#[test]
fn online_then_offline_round_trip() {
    // Authenticate online once, then replay the refreshed lease offline.
    let online = Harness::new(true, Some(ALICE), Some("key-123"));
    assert!(matches!(
        online.controller.authenticate(),
        AuthOutcome::OnlineOk(_)
    ));
    assert!(online.lease_path().exists());

    let sealed = fs::read(online.lease_path()).unwrap();
    let offline = Harness::new(false, None, Some("key-123"));
    LeaseStore::with_path(offline.lease_path())
        .unwrap()
        .save(&sealed)
        .unwrap();

    // Depending on the environment the refreshed lease may carry a machine
    // binding; on the same "machine" both paths must agree.
    match offline.controller.authenticate() {
        AuthOutcome::OfflineOk(record) => assert_eq!(record.username, "Alice"),
        AuthOutcome::FingerprintUnavailable => {}
        other => panic!("expected OfflineOk, got {other:?}"),
    }
}

#[test]
fn tampered_lease_never_authenticates() {
    let harness = Harness::new(false, None, Some("key-123"));
    harness.seed_lease(ALICE);

    let mut bytes = fs::read(harness.lease_path()).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] = bytes[mid].wrapping_add(1);
    fs::write(harness.lease_path(), &bytes).unwrap();

    assert_eq!(
        harness.controller.authenticate(),
        AuthOutcome::TamperDetected
    );
    let state = harness.controller.state();
    assert!(!state.authenticated);
    assert!(state.can_start);
    // The rejected lease stays on disk for inspection.
    assert!(harness.lease_path().exists());
}

#[test]
fn missing_api_key_fails_closed_without_network() {
    let harness = Harness::new(true, Some(ALICE), None);
    assert_eq!(harness.controller.authenticate(), AuthOutcome::ConfigMissing);
    assert!(!harness.controller.authenticated());
}

#[test]
fn background_start_publishes_snapshot() {
    let harness = Harness::new(false, None, Some("key-123"));
    harness.seed_lease(ALICE);

    let handle = harness.controller.start().unwrap();
    handle.join().unwrap();

    let state = harness.controller.state();
    assert!(state.resolved);
    assert!(state.authenticated);
    assert!(state.offline_mode);
    assert_eq!(state.entitlement.username, "Alice");
}

#[tokio::test]
async fn subscribers_are_woken_by_the_publish() {
    let harness = Harness::new(false, None, Some("key-123"));
    harness.seed_lease(ALICE);

    let mut rx = harness.controller.subscribe();
    assert!(!rx.borrow().resolved);

    let handle = harness.controller.start().unwrap();
    rx.changed().await.unwrap();

    let state = rx.borrow().clone();
    assert!(state.resolved);
    assert!(state.authenticated);
    handle.join().unwrap();
}
