//! Core data types for the identity bridge.
//!
//! Field names serialize in camelCase so bridge files stay readable by the
//! web client that produced the first generation of them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque student identifier shared with the cloud backend.
///
/// This is the only student field allowed to leave the device. New entries
/// get a random v4 UUID; entries created elsewhere may carry any string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StudentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for StudentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<Uuid> for StudentId {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

/// One student in the roster: opaque id plus the identity it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    /// Stable opaque identifier, unique within a bridge
    pub uuid: StudentId,

    /// District-assigned student ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_id: Option<String>,

    /// Student display name
    pub name: String,

    /// Optional class period or section (e.g. "Period 1", "Block A")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_period: Option<String>,

    /// When this entry was created
    pub created_at: DateTime<Utc>,

    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

/// The plaintext contents of a bridge.
///
/// Only ever held in memory while the bridge is unlocked. It is serialized
/// whole on every save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_name: Option<String>,

    /// Class periods offered for assignment (e.g. ["Period 1", "Period 2"])
    #[serde(default)]
    pub class_periods: Vec<String>,

    #[serde(default)]
    pub roster: Vec<RosterEntry>,
}

/// Descriptive metadata for a new bridge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeProfile {
    pub district: Option<String>,
    pub school: Option<String>,
    pub teacher_name: Option<String>,
}

impl BridgeProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn district(mut self, district: impl Into<String>) -> Self {
        self.district = Some(district.into());
        self
    }

    pub fn school(mut self, school: impl Into<String>) -> Self {
        self.school = Some(school.into());
        self
    }

    pub fn teacher_name(mut self, teacher_name: impl Into<String>) -> Self {
        self.teacher_name = Some(teacher_name.into());
        self
    }
}

/// Builder for adding a student.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub local_id: Option<String>,
    pub class_period: Option<String>,
}

impl NewStudent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            local_id: None,
            class_period: None,
        }
    }

    pub fn with_local_id(mut self, local_id: impl Into<String>) -> Self {
        self.local_id = Some(local_id.into());
        self
    }

    pub fn with_class_period(mut self, class_period: impl Into<String>) -> Self {
        self.class_period = Some(class_period.into());
        self
    }
}

/// Partial update for an existing student. `None` leaves a field unchanged;
/// a blank `local_id` or `class_period` clears it.
#[derive(Debug, Clone, Default)]
pub struct StudentUpdate {
    pub name: Option<String>,
    pub local_id: Option<String>,
    pub class_period: Option<String>,
}

impl StudentUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn local_id(mut self, local_id: impl Into<String>) -> Self {
        self.local_id = Some(local_id.into());
        self
    }

    pub fn class_period(mut self, class_period: impl Into<String>) -> Self {
        self.class_period = Some(class_period.into());
        self
    }

    pub fn clear_local_id(mut self) -> Self {
        self.local_id = Some(String::new());
        self
    }

    pub fn clear_class_period(mut self) -> Self {
        self.class_period = Some(String::new());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.local_id.is_none() && self.class_period.is_none()
    }
}

/// A rejected CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRowError {
    /// 1-based line number in the input
    pub row: usize,
    pub error: String,
}

/// Outcome of a CSV roster import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub added: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<ImportRowError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_entry_uses_camel_case() {
        let now = Utc::now();
        let entry = RosterEntry {
            uuid: StudentId::from("u1"),
            local_id: Some("S1".to_string()),
            name: "Ada".to_string(),
            class_period: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["uuid"], "u1");
        assert_eq!(json["localId"], "S1");
        assert!(json.get("classPeriod").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_payload_defaults_missing_lists() {
        let payload: BridgePayload =
            serde_json::from_str(r#"{"district":"Mansfield ISD"}"#).unwrap();
        assert_eq!(payload.district.as_deref(), Some("Mansfield ISD"));
        assert!(payload.roster.is_empty());
        assert!(payload.class_periods.is_empty());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(StudentId::generate(), StudentId::generate());
    }

    #[test]
    fn test_builders() {
        let student = NewStudent::new("Ada")
            .with_local_id("S1")
            .with_class_period("Period 1");
        assert_eq!(student.local_id.as_deref(), Some("S1"));

        let update = StudentUpdate::new().name("Ada L.");
        assert!(!update.is_empty());
        assert!(StudentUpdate::new().is_empty());

        let profile = BridgeProfile::new().district("Mansfield ISD").school("Asa Low");
        assert_eq!(profile.school.as_deref(), Some("Asa Low"));
        assert!(profile.teacher_name.is_none());
    }
}
