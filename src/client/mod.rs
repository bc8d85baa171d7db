//! Remote entitlement service boundary.

pub mod http;

pub use http::{EntitlementClient, HttpEntitlementClient};
