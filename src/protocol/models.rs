//! The entitlement record: the structured payload exchanged with the
//! service and embedded in the offline lease.

use serde::{Deserialize, Serialize};

use crate::errors::SkygateError;

/// What a user account is allowed to do.
///
/// `Default` is the "no entitlement yet resolved" value: everything false,
/// zero, empty. Instances are never mutated in place; updates produce a new
/// record, which is what makes the controller's single-snapshot publish
/// safe.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
    /// Display name of the account. The one required field: a record
    /// without it is rejected outright.
    pub username: String,

    /// Whether the account may authenticate against the offline lease.
    #[serde(default)]
    pub allow_offline_auth: bool,

    /// Supporter-tier account.
    #[serde(default)]
    pub is_supporter: bool,

    /// Tester account.
    #[serde(default)]
    pub is_tester: bool,

    /// Offline session allowance; zero means no limit is enforced.
    #[serde(default)]
    pub max_offline_sessions: u32,

    /// Sessions played offline since the last online refresh.
    #[serde(default)]
    pub offline_sessions_played: u32,

    /// Fingerprint of the machine the lease was issued on, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<String>,
}

impl Entitlement {
    /// Parse a structured record from the network or a decrypted lease.
    ///
    /// A record without a usable `username` is [`SkygateError::CorruptRecord`]
    /// and nothing else in it is trusted. Every other field defaults to its
    /// permissive-safe value when absent, and unknown fields are ignored, so
    /// the server schema can evolve without stranding clients.
    pub fn from_json(raw: &str) -> Result<Self, SkygateError> {
        let record: Self = serde_json::from_str(raw)
            .map_err(|e| SkygateError::CorruptRecord(format!("parse error: {e}")))?;
        if record.username.is_empty() {
            return Err(SkygateError::CorruptRecord(
                "record has no username".to_string(),
            ));
        }
        Ok(record)
    }

    /// Serialize for the wire or the lease payload.
    pub fn to_json(&self) -> Result<String, SkygateError> {
        serde_json::to_string(self)
            .map_err(|e| SkygateError::CorruptRecord(format!("serialize error: {e}")))
    }

    /// Copy with the offline session counter advanced by one.
    pub fn with_session_played(&self) -> Self {
        Self {
            offline_sessions_played: self.offline_sessions_played.saturating_add(1),
            ..self.clone()
        }
    }

    /// Copy bound to a machine fingerprint.
    pub fn bound_to(&self, fingerprint: &str) -> Self {
        Self {
            machine: Some(fingerprint.to_string()),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RECORD: &str = r#"{
        "username": "Alice",
        "allowOfflineAuth": true,
        "isSupporter": true,
        "isTester": false,
        "maxOfflineSessions": 5,
        "offlineSessionsPlayed": 2
    }"#;

    #[test]
    fn test_parse_full_record() {
        let record = Entitlement::from_json(FULL_RECORD).unwrap();
        assert_eq!(record.username, "Alice");
        assert!(record.allow_offline_auth);
        assert!(record.is_supporter);
        assert!(!record.is_tester);
        assert_eq!(record.max_offline_sessions, 5);
        assert_eq!(record.offline_sessions_played, 2);
        assert_eq!(record.machine, None);
    }

    #[test]
    fn test_parse_minimal_record_uses_defaults() {
        let record = Entitlement::from_json(r#"{"username":"Bob"}"#).unwrap();
        assert_eq!(record.username, "Bob");
        assert!(!record.allow_offline_auth);
        assert!(!record.is_supporter);
        assert_eq!(record.max_offline_sessions, 0);
        assert_eq!(record.offline_sessions_played, 0);
    }

    #[test]
    fn test_parse_missing_username_is_corrupt() {
        let result = Entitlement::from_json(r#"{"isSupporter":true}"#);
        assert!(matches!(result, Err(SkygateError::CorruptRecord(_))));
    }

    #[test]
    fn test_parse_empty_username_is_corrupt() {
        let result = Entitlement::from_json(r#"{"username":""}"#);
        assert!(matches!(result, Err(SkygateError::CorruptRecord(_))));
    }

    #[test]
    fn test_parse_malformed_json_is_corrupt() {
        let result = Entitlement::from_json("not a record");
        assert!(matches!(result, Err(SkygateError::CorruptRecord(_))));
    }

    #[test]
    fn test_parse_tolerates_unknown_fields() {
        let record =
            Entitlement::from_json(r#"{"username":"Eve","futureField":[1,2,3]}"#).unwrap();
        assert_eq!(record.username, "Eve");
    }

    #[test]
    fn test_default_is_unresolved() {
        let record = Entitlement::default();
        assert_eq!(record.username, "");
        assert!(!record.allow_offline_auth);
        assert_eq!(record.max_offline_sessions, 0);
        assert_eq!(record.offline_sessions_played, 0);
    }

    #[test]
    fn test_serialization_round_trip_and_field_names() {
        let record = Entitlement::from_json(FULL_RECORD).unwrap();
        let json = record.to_json().unwrap();

        assert!(json.contains("allowOfflineAuth"));
        assert!(json.contains("maxOfflineSessions"));
        // No binding was set, so the field is omitted entirely.
        assert!(!json.contains("machine"));

        assert_eq!(Entitlement::from_json(&json).unwrap(), record);
    }

    #[test]
    fn test_with_session_played_leaves_original() {
        let record = Entitlement::from_json(FULL_RECORD).unwrap();
        let updated = record.with_session_played();

        assert_eq!(record.offline_sessions_played, 2);
        assert_eq!(updated.offline_sessions_played, 3);
        assert_eq!(updated.username, record.username);
    }

    #[test]
    fn test_bound_to_sets_machine() {
        let record = Entitlement::from_json(FULL_RECORD).unwrap();
        let bound = record.bound_to("abc123");

        assert_eq!(bound.machine.as_deref(), Some("abc123"));
        assert_eq!(record.machine, None);
        assert!(bound.to_json().unwrap().contains("machine"));
    }
}
