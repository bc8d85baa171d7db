//! Data exchanged with the remote entitlement service.

pub mod models;
