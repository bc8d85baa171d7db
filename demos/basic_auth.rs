//! Basic authentication example.
//!
//! This example demonstrates the core workflow: construct a controller,
//! start the background authentication cycle, and poll the published
//! snapshot the way a tick-driven host would.
//!
//! # Running
//!
//! ```bash
//! cargo run --example basic_auth
//! ```
//!
//! Without a reachable entitlement service this falls back to the offline
//! lease; on a first run with no lease it reports "no offline lease".

use std::path::PathBuf;
use std::time::Duration;

use skygate::client::http::DEFAULT_SERVICE_URL;
use skygate::{AuthController, SkygateConfig};

fn main() {
    let config = SkygateConfig {
        app_name: "towersim",
        data_namespace: "towersim",
        settings_path: PathBuf::from("settings.toml"),
        service_url: DEFAULT_SERVICE_URL.to_string(),
    };

    let controller = match AuthController::new(config) {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = controller.start() {
        eprintln!("Could not start authentication: {e}");
        std::process::exit(1);
    }

    // Stand-in for the host's tick loop.
    loop {
        let state = controller.state();
        if state.resolved {
            println!("authenticated: {}", state.authenticated);
            println!("offline mode:  {}", state.offline_mode);
            println!("reason:        {}", state.reason);
            if state.authenticated {
                println!("user:          {}", state.entitlement.username);
                println!("supporter:     {}", state.entitlement.is_supporter);
            }
            break;
        }
        std::thread::sleep(Duration::from_millis(16));
    }

    match skygate::machine_fingerprint() {
        Ok(fingerprint) => println!("fingerprint:   {fingerprint}"),
        Err(e) => println!("fingerprint:   unavailable ({e})"),
    }
}
