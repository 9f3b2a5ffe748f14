//! Roster queries and edits on a decrypted payload.
//!
//! These operate on plain data; the manager decides when they are allowed.

use chrono::Utc;

use super::types::{BridgePayload, BridgeProfile, NewStudent, RosterEntry, StudentId, StudentUpdate};
use crate::error::{BridgeError, Result};

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(BridgeError::InvalidInput(
            "Student name cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

impl BridgePayload {
    /// Start an empty bridge.
    pub fn new(profile: BridgeProfile) -> Self {
        Self {
            district: normalize_optional(profile.district),
            school: normalize_optional(profile.school),
            teacher_name: normalize_optional(profile.teacher_name),
            class_periods: Vec::new(),
            roster: Vec::new(),
        }
    }

    pub fn profile(&self) -> BridgeProfile {
        BridgeProfile {
            district: self.district.clone(),
            school: self.school.clone(),
            teacher_name: self.teacher_name.clone(),
        }
    }

    pub fn find_by_uuid(&self, id: &StudentId) -> Option<&RosterEntry> {
        self.roster.iter().find(|entry| &entry.uuid == id)
    }

    pub fn find_by_local_id(&self, local_id: &str) -> Option<&RosterEntry> {
        let local_id = local_id.trim();
        self.roster
            .iter()
            .find(|entry| entry.local_id.as_deref() == Some(local_id))
    }

    /// Case-insensitive substring match on the student name.
    pub fn find_by_name(&self, query: &str) -> Vec<&RosterEntry> {
        let needle = query.trim().to_lowercase();
        self.roster
            .iter()
            .filter(|entry| entry.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// The first id that appears more than once, if any.
    pub fn duplicate_id(&self) -> Option<&StudentId> {
        let mut seen = std::collections::HashSet::new();
        self.roster
            .iter()
            .map(|entry| &entry.uuid)
            .find(|id| !seen.insert(*id))
    }

    pub fn add_student(&mut self, student: NewStudent) -> Result<RosterEntry> {
        let name = normalize_name(&student.name)?;
        let local_id = normalize_optional(student.local_id);

        if let Some(ref id) = local_id {
            if self.find_by_local_id(id).is_some() {
                return Err(BridgeError::DuplicateLocalId(id.clone()));
            }
        }

        let now = Utc::now();
        let entry = RosterEntry {
            uuid: StudentId::generate(),
            local_id,
            name,
            class_period: normalize_optional(student.class_period),
            created_at: now,
            updated_at: now,
        };
        self.roster.push(entry.clone());
        Ok(entry)
    }

    pub fn update_student(&mut self, id: &StudentId, update: StudentUpdate) -> Result<RosterEntry> {
        let name = update.name.as_deref().map(normalize_name).transpose()?;
        let local_id = update.local_id.map(|v| v.trim().to_string());
        let class_period = update.class_period.map(|v| v.trim().to_string());

        if let Some(new_local) = local_id.as_ref().filter(|v| !v.is_empty()) {
            let taken = self
                .roster
                .iter()
                .any(|e| &e.uuid != id && e.local_id.as_deref() == Some(new_local.as_str()));
            if taken {
                return Err(BridgeError::DuplicateLocalId(new_local.clone()));
            }
        }

        let entry = self
            .roster
            .iter_mut()
            .find(|entry| &entry.uuid == id)
            .ok_or_else(|| BridgeError::StudentNotFound(id.clone()))?;

        if let Some(name) = name {
            entry.name = name;
        }
        // A blank value clears the field.
        if let Some(local_id) = local_id {
            entry.local_id = Some(local_id).filter(|v| !v.is_empty());
        }
        if let Some(class_period) = class_period {
            entry.class_period = Some(class_period).filter(|v| !v.is_empty());
        }
        entry.updated_at = Utc::now();

        Ok(entry.clone())
    }

    pub fn remove_student(&mut self, id: &StudentId) -> Result<RosterEntry> {
        let index = self
            .roster
            .iter()
            .position(|entry| &entry.uuid == id)
            .ok_or_else(|| BridgeError::StudentNotFound(id.clone()))?;
        Ok(self.roster.remove(index))
    }

    /// Replace the class period list, dropping blanks and duplicates.
    pub fn set_class_periods(&mut self, periods: Vec<String>) {
        let mut cleaned: Vec<String> = Vec::with_capacity(periods.len());
        for period in periods {
            let period = period.trim();
            if !period.is_empty() && !cleaned.iter().any(|p| p == period) {
                cleaned.push(period.to_string());
            }
        }
        self.class_periods = cleaned;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_with_ada() -> (BridgePayload, StudentId) {
        let mut payload = BridgePayload::new(BridgeProfile::new().district("Mansfield ISD"));
        let ada = payload
            .add_student(NewStudent::new("Ada Lovelace").with_local_id("S1"))
            .unwrap();
        (payload, ada.uuid)
    }

    #[test]
    fn test_add_student_assigns_id_and_timestamps() {
        let (payload, id) = payload_with_ada();
        let entry = payload.find_by_uuid(&id).unwrap();
        assert_eq!(entry.name, "Ada Lovelace");
        assert_eq!(entry.local_id.as_deref(), Some("S1"));
        assert_eq!(entry.created_at, entry.updated_at);
    }

    #[test]
    fn test_add_rejects_duplicate_local_id() {
        let (mut payload, _) = payload_with_ada();
        let result = payload.add_student(NewStudent::new("Someone Else").with_local_id(" S1 "));
        assert!(matches!(result, Err(BridgeError::DuplicateLocalId(id)) if id == "S1"));
        assert_eq!(payload.roster.len(), 1);
    }

    #[test]
    fn test_add_rejects_blank_name() {
        let mut payload = BridgePayload::default();
        assert!(matches!(
            payload.add_student(NewStudent::new("   ")),
            Err(BridgeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_add_without_local_id_allows_many() {
        let mut payload = BridgePayload::default();
        payload.add_student(NewStudent::new("One")).unwrap();
        payload.add_student(NewStudent::new("Two")).unwrap();
        assert_eq!(payload.roster.len(), 2);
        assert!(payload.duplicate_id().is_none());
    }

    #[test]
    fn test_update_student_changes_fields() {
        let (mut payload, id) = payload_with_ada();
        let updated = payload
            .update_student(
                &id,
                StudentUpdate::new().name("Ada King").class_period("Period 2"),
            )
            .unwrap();
        assert_eq!(updated.name, "Ada King");
        assert_eq!(updated.local_id.as_deref(), Some("S1"));
        assert_eq!(updated.class_period.as_deref(), Some("Period 2"));
        assert!(updated.updated_at >= updated.created_at);
    }

    #[test]
    fn test_update_can_clear_optional_fields() {
        let (mut payload, id) = payload_with_ada();
        payload
            .update_student(&id, StudentUpdate::new().class_period("Period 2"))
            .unwrap();

        let cleared = payload
            .update_student(&id, StudentUpdate::new().clear_class_period())
            .unwrap();
        assert_eq!(cleared.class_period, None);
        assert_eq!(cleared.local_id.as_deref(), Some("S1"));

        let blank = payload
            .update_student(&id, StudentUpdate::new().local_id("  "))
            .unwrap();
        assert_eq!(blank.local_id, None);
        assert_eq!(blank.name, "Ada Lovelace");
    }

    #[test]
    fn test_update_rejects_local_id_of_other_student() {
        let (mut payload, id) = payload_with_ada();
        payload
            .add_student(NewStudent::new("Grace Hopper").with_local_id("S2"))
            .unwrap();

        let result = payload.update_student(&id, StudentUpdate::new().local_id("S2"));
        assert!(matches!(result, Err(BridgeError::DuplicateLocalId(_))));

        // Re-setting its own local ID is fine.
        payload
            .update_student(&id, StudentUpdate::new().local_id("S1"))
            .unwrap();
    }

    #[test]
    fn test_update_unknown_student() {
        let (mut payload, _) = payload_with_ada();
        let missing = StudentId::from("missing");
        let result = payload.update_student(&missing, StudentUpdate::new().name("X"));
        assert!(matches!(result, Err(BridgeError::StudentNotFound(id)) if id == missing));
    }

    #[test]
    fn test_remove_student() {
        let (mut payload, id) = payload_with_ada();
        let removed = payload.remove_student(&id).unwrap();
        assert_eq!(removed.uuid, id);
        assert!(payload.roster.is_empty());
        assert!(payload.remove_student(&id).is_err());
    }

    #[test]
    fn test_find_by_name_is_case_insensitive() {
        let (mut payload, _) = payload_with_ada();
        payload.add_student(NewStudent::new("Grace Hopper")).unwrap();

        let found = payload.find_by_name("LOVE");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ada Lovelace");
        assert_eq!(payload.find_by_name("").len(), 2);
    }

    #[test]
    fn test_duplicate_id_detected() {
        let (mut payload, _) = payload_with_ada();
        let copy = payload.roster[0].clone();
        payload.roster.push(copy);
        assert!(payload.duplicate_id().is_some());
    }

    #[test]
    fn test_set_class_periods_cleans_input() {
        let mut payload = BridgePayload::default();
        payload.set_class_periods(vec![
            "Period 1".into(),
            " ".into(),
            "Period 1".into(),
            " Block A ".into(),
        ]);
        assert_eq!(payload.class_periods, vec!["Period 1", "Block A"]);
    }
}
