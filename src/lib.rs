//! # Skygate
//!
//! **Offline-capable entitlement checks with an encrypted, tamper-evident
//! local lease.**
//!
//! Skygate decides whether a host application is permitted to run. When the
//! entitlement service is reachable it authenticates online and refreshes a
//! local lease; when it is not, it authenticates against that lease — an
//! encrypted, digest-protected file bound to the machine it was issued on.
//! All of it happens off the host's main loop: the host polls a single
//! published snapshot once per tick.
//!
//! ## Features
//!
//! - **Online-first authentication** — API key from the host settings file,
//!   entitlement record from the remote service
//! - **Offline lease fallback** — double-encrypted, length-prefixed binary
//!   file with a content digest; any flipped byte is detected on load
//! - **Machine binding** — a lease issued on one machine does not validate
//!   on another
//! - **Offline session accounting** — each offline run advances a counter
//!   that the record's allowance can cap
//! - **Fail-closed, never crash** — missing settings, missing lease, or a
//!   tampered lease all become `authenticated == false`, not faults
//!
//! ## Quickstart
//!
//! ```no_run
//! use skygate::{AuthController, SkygateConfig};
//! use std::path::PathBuf;
//! use std::time::Duration;
//!
//! fn main() -> Result<(), skygate::SkygateError> {
//!     let config = SkygateConfig {
//!         app_name: "towersim",
//!         data_namespace: "towersim",
//!         settings_path: PathBuf::from("settings.toml"),
//!         service_url: skygate::client::http::DEFAULT_SERVICE_URL.to_string(),
//!     };
//!
//!     let controller = AuthController::new(config)?;
//!     controller.start()?;
//!
//!     // In the host tick loop:
//!     loop {
//!         let state = controller.state();
//!         if state.resolved {
//!             println!("authenticated: {} ({})", state.authenticated, state.reason);
//!             break;
//!         }
//!         std::thread::sleep(Duration::from_millis(16));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Tamper evidence, not DRM
//!
//! The lease format detects accidental or naive corruption and forgery:
//! every byte of the file is covered by an authenticated cipher layer, the
//! payload carries a separate content digest, and the whole artifact only
//! decrypts with keys derived from compiled-in passphrases. A determined
//! attacker with debugger access to the binary is explicitly out of scope.

#![deny(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Crypto layer
pub mod crypto;

// Machine identity
pub mod fingerprint;

// Lease layer
pub mod lease;

// Protocol layer
pub mod protocol;

// Client layer
pub mod client;

// Controller (main public API)
pub mod controller;

// Re-exports for public API
pub use client::{EntitlementClient, HttpEntitlementClient};
pub use clock::{Clock, SystemClock};
pub use config::{Settings, SkygateConfig};
pub use controller::{AuthController, AuthOutcome, AuthState};
pub use errors::SkygateError;
pub use fingerprint::machine_fingerprint;
pub use protocol::models::Entitlement;
