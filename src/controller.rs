//! Authentication controller: decides whether the host may run.
//!
//! The controller orchestrates online vs. offline authentication away from
//! the host's tick loop. Construction wires the parts and starts nothing;
//! [`AuthController::start`] spawns a single background thread that probes
//! connectivity, runs one authentication cycle to completion (there is no
//! cancellation), and publishes the result as one immutable [`AuthState`]
//! snapshot through a watch channel. The host polls
//! [`state`](AuthController::state) once per tick, or awaits
//! [`subscribe`](AuthController::subscribe).
//!
//! Every expected failure — no network, no lease, tampered lease, missing
//! API key — becomes a value in [`AuthOutcome`] and a logged diagnostic;
//! nothing propagates to the host loop as a fault.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::client::http::HttpEntitlementClient;
use crate::client::EntitlementClient;
use crate::clock::{Clock, SystemClock};
use crate::config::{Settings, SkygateConfig};
use crate::errors::SkygateError;
use crate::fingerprint::machine_fingerprint;
use crate::lease::file::LeaseStore;
use crate::lease::format;
use crate::protocol::models::Entitlement;

/// Outcome of one authentication cycle.
///
/// Terminal: the controller never retries on its own. A host that wants
/// another attempt runs a new cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Online authentication succeeded.
    OnlineOk(Entitlement),
    /// Offline authentication against the local lease succeeded.
    OfflineOk(Entitlement),
    /// Settings file or API key absent; the online path stops before any
    /// network call.
    ConfigMissing,
    /// The service was reachable but the record fetch failed.
    TransportFailed(String),
    /// Offline path with no lease on disk (e.g. first run without ever
    /// having been online).
    NoLease,
    /// The lease failed its integrity checks, or belongs to another machine.
    TamperDetected,
    /// The structured record was missing its identity field or unparseable.
    CorruptRecord,
    /// The machine fingerprint could not be computed for lease binding.
    FingerprintUnavailable,
    /// The record forbids offline authentication.
    OfflineDisallowed,
    /// The offline session allowance is used up.
    OfflineLimitReached,
}

impl AuthOutcome {
    /// Whether this outcome authenticates the user.
    pub fn authenticated(&self) -> bool {
        matches!(self, AuthOutcome::OnlineOk(_) | AuthOutcome::OfflineOk(_))
    }

    /// Short human-readable reason, for logging and UI.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthOutcome::OnlineOk(_) => "authenticated online",
            AuthOutcome::OfflineOk(_) => "authenticated offline",
            AuthOutcome::ConfigMissing => "settings or API key missing",
            AuthOutcome::TransportFailed(_) => "entitlement service request failed",
            AuthOutcome::NoLease => "no offline lease",
            AuthOutcome::TamperDetected => "offline lease invalid",
            AuthOutcome::CorruptRecord => "entitlement record corrupt",
            AuthOutcome::FingerprintUnavailable => "machine fingerprint unavailable",
            AuthOutcome::OfflineDisallowed => "offline authentication not permitted",
            AuthOutcome::OfflineLimitReached => "offline session allowance exhausted",
        }
    }
}

/// Snapshot published to the host once per authentication cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    /// Whether the host may start at all. Starts `true`; only a fatal
    /// initialization failure outside this core clears it.
    pub can_start: bool,
    /// Whether the authentication cycle has finished.
    pub resolved: bool,
    /// Whether the user authenticated.
    pub authenticated: bool,
    /// Whether the offline path was taken.
    pub offline_mode: bool,
    /// Current entitlement; [`Entitlement::default`] until resolved.
    pub entitlement: Entitlement,
    /// Human-readable reason, for logging and UI.
    pub reason: &'static str,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            can_start: true,
            resolved: false,
            authenticated: false,
            offline_mode: false,
            entitlement: Entitlement::default(),
            reason: "authentication pending",
        }
    }
}

/// Everything the background cycle needs, shared with the spawned thread.
struct Core {
    settings_path: PathBuf,
    lease: LeaseStore,
    client: Arc<dyn EntitlementClient>,
    clock: Arc<dyn Clock>,
    tx: watch::Sender<AuthState>,
}

/// The authentication controller.
///
/// Construct one at startup, [`start`](Self::start) it, and poll
/// [`state`](Self::state) from the main loop.
pub struct AuthController {
    core: Arc<Core>,
    rx: watch::Receiver<AuthState>,
}

impl AuthController {
    /// Create a controller with the production HTTP client, the system
    /// clock, and a lease store under the configured namespace.
    ///
    /// Starts no background work; call [`start`](Self::start).
    pub fn new(config: SkygateConfig) -> Result<Self, SkygateError> {
        config.validate()?;
        let client = Arc::new(HttpEntitlementClient::new(&config)?);
        let lease = LeaseStore::new(config.data_namespace)?;
        Ok(Self::with_components(
            config,
            lease,
            client,
            Arc::new(SystemClock),
        ))
    }

    /// Create a controller from explicit components: a custom lease
    /// location, an alternative client implementation, or a fixed clock.
    pub fn with_components(
        config: SkygateConfig,
        lease: LeaseStore,
        client: Arc<dyn EntitlementClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (tx, rx) = watch::channel(AuthState::default());
        Self {
            core: Arc::new(Core {
                settings_path: config.settings_path,
                lease,
                client,
                clock,
                tx,
            }),
            rx,
        }
    }

    /// Spawn the authentication cycle on a background thread and return its
    /// handle. The host may join it or simply keep polling
    /// [`state`](Self::state); the cycle always runs to completion.
    pub fn start(&self) -> Result<thread::JoinHandle<()>, SkygateError> {
        let core = Arc::clone(&self.core);
        thread::Builder::new()
            .name("skygate-auth".to_string())
            .spawn(move || {
                core.client.initialize_connection();
                core.authenticate();
            })
            .map_err(|e| SkygateError::TaskSpawn(e.to_string()))
    }

    /// Run one authentication cycle synchronously, publish the resulting
    /// snapshot, and return the outcome.
    ///
    /// [`start`](Self::start) is the non-blocking wrapper around this;
    /// hosts that manage their own threads can call it directly. Blocking
    /// work (disk, network, crypto) happens inside.
    pub fn authenticate(&self) -> AuthOutcome {
        self.core.authenticate()
    }

    /// Latest published snapshot.
    pub fn state(&self) -> AuthState {
        self.rx.borrow().clone()
    }

    /// Whether the user is authenticated. `false` until the cycle resolves.
    pub fn authenticated(&self) -> bool {
        self.rx.borrow().authenticated
    }

    /// Whether the host may start.
    pub fn can_start(&self) -> bool {
        self.rx.borrow().can_start
    }

    /// Whether the offline path was taken.
    pub fn offline_mode(&self) -> bool {
        self.rx.borrow().offline_mode
    }

    /// Current entitlement snapshot.
    pub fn entitlement(&self) -> Entitlement {
        self.rx.borrow().entitlement.clone()
    }

    /// Watch receiver for hosts that want to await the snapshot instead of
    /// polling it.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.core.tx.subscribe()
    }
}

impl Core {
    fn authenticate(&self) -> AuthOutcome {
        let online = self.client.is_server_available();
        let outcome = if online {
            self.authenticate_online()
        } else {
            info!("entitlement service unreachable, trying offline lease");
            self.authenticate_offline()
        };

        let entitlement = match &outcome {
            AuthOutcome::OnlineOk(record) | AuthOutcome::OfflineOk(record) => record.clone(),
            _ => Entitlement::default(),
        };
        let state = AuthState {
            can_start: true,
            resolved: true,
            authenticated: outcome.authenticated(),
            offline_mode: !online,
            entitlement,
            reason: outcome.reason(),
        };

        if state.authenticated {
            info!(
                user = %state.entitlement.username,
                offline = state.offline_mode,
                "authentication finished"
            );
        } else {
            warn!(reason = state.reason, "authentication failed");
        }
        self.tx.send_replace(state);
        outcome
    }

    fn authenticate_online(&self) -> AuthOutcome {
        let settings = match Settings::load(&self.settings_path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "settings unavailable, online authentication abandoned");
                return AuthOutcome::ConfigMissing;
            }
        };
        let api_key = match settings.api_key() {
            Ok(key) => key,
            Err(e) => {
                warn!(error = %e, "API key missing, online authentication abandoned");
                return AuthOutcome::ConfigMissing;
            }
        };

        let raw = match self.client.fetch_user_record(&api_key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "entitlement fetch failed");
                return AuthOutcome::TransportFailed(e.to_string());
            }
        };
        let record = match Entitlement::from_json(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "entitlement record rejected");
                return AuthOutcome::CorruptRecord;
            }
        };

        self.refresh_lease(&record);
        AuthOutcome::OnlineOk(record)
    }

    /// Persist a fresh lease so the next offline run has a fallback.
    ///
    /// The lease is bound to this machine when the fingerprint is readable.
    /// A refresh failure costs future offline eligibility, not the online
    /// result that is already in hand.
    fn refresh_lease(&self, record: &Entitlement) {
        let payload_record = match machine_fingerprint() {
            Ok(fingerprint) => record.bound_to(fingerprint),
            Err(e) => {
                warn!(error = %e, "lease saved without machine binding");
                record.clone()
            }
        };

        let result = payload_record
            .to_json()
            .and_then(|payload| format::seal(&payload, self.clock.as_ref()))
            .and_then(|sealed| self.lease.save(&sealed));
        match result {
            Ok(()) => debug!(path = %self.lease.path().display(), "offline lease refreshed"),
            Err(e) => warn!(error = %e, "failed to refresh offline lease"),
        }
    }

    fn authenticate_offline(&self) -> AuthOutcome {
        let sealed = match self.lease.load() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                warn!(error = %SkygateError::NoLeaseFound, "offline authentication impossible");
                return AuthOutcome::NoLease;
            }
            Err(e) => {
                warn!(error = %e, "offline lease unreadable");
                return AuthOutcome::TamperDetected;
            }
        };

        let lease = match format::open(&sealed) {
            Ok(lease) => lease,
            Err(SkygateError::CorruptRecord(e)) => {
                warn!(error = %e, "offline lease payload corrupt");
                return AuthOutcome::CorruptRecord;
            }
            Err(e) => {
                warn!(error = %e, "offline lease rejected");
                return AuthOutcome::TamperDetected;
            }
        };
        let record = match Entitlement::from_json(&lease.payload) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "offline lease record rejected");
                return AuthOutcome::CorruptRecord;
            }
        };

        if !record.allow_offline_auth {
            warn!(user = %record.username, "account does not permit offline authentication");
            return AuthOutcome::OfflineDisallowed;
        }
        if record.max_offline_sessions > 0
            && record.offline_sessions_played >= record.max_offline_sessions
        {
            warn!(
                played = record.offline_sessions_played,
                limit = record.max_offline_sessions,
                "offline session allowance exhausted"
            );
            return AuthOutcome::OfflineLimitReached;
        }
        if let Some(bound) = &record.machine {
            match machine_fingerprint() {
                Ok(fingerprint) if fingerprint == bound => {}
                Ok(_) => {
                    warn!("lease is bound to a different machine");
                    return AuthOutcome::TamperDetected;
                }
                Err(e) => {
                    warn!(error = %e, "cannot verify lease binding");
                    return AuthOutcome::FingerprintUnavailable;
                }
            }
        }

        // Track the session on disk; the caller gets the pre-increment record.
        let updated = record.with_session_played();
        let persisted = updated
            .to_json()
            .and_then(|payload| format::seal(&payload, self.clock.as_ref()))
            .and_then(|sealed| self.lease.save(&sealed));
        if let Err(e) = persisted {
            warn!(error = %e, "failed to persist offline session count");
        }

        info!(
            user = %record.username,
            sessions_played = updated.offline_sessions_played,
            "offline authentication succeeded"
        );
        AuthOutcome::OfflineOk(record)
    }
}
