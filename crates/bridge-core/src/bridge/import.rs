//! CSV roster import.
//!
//! Expected format: `name,localId[,classPeriod]`, one student per line. A
//! first line containing "name" is treated as a header. Students are matched
//! on local ID: a changed name updates the existing entry, an identical one
//! is skipped.

use super::types::{BridgePayload, ImportResult, ImportRowError, NewStudent, StudentUpdate};

/// Merge CSV rows into `payload`. Row failures are collected, not fatal.
pub fn import_csv(payload: &mut BridgePayload, csv_text: &str) -> ImportResult {
    let mut result = ImportResult::default();
    let lines: Vec<&str> = csv_text.lines().map(str::trim).collect();

    let start = match lines.first() {
        Some(first) if first.to_lowercase().contains("name") => 1,
        _ => 0,
    };

    for (index, line) in lines.iter().enumerate().skip(start) {
        if line.is_empty() {
            continue;
        }
        let row = index + 1;

        let mut fields = line.split(',').map(str::trim);
        let name = fields.next().unwrap_or_default();
        let local_id = fields.next().unwrap_or_default();
        let class_period = fields.next().filter(|v| !v.is_empty());

        if name.is_empty() || local_id.is_empty() {
            result.errors.push(ImportRowError {
                row,
                error: "Missing name or localId".to_string(),
            });
            continue;
        }

        let existing = payload
            .find_by_local_id(local_id)
            .map(|entry| (entry.uuid.clone(), entry.name.clone(), entry.class_period.clone()));

        let outcome = match existing {
            Some((id, current_name, current_period)) => {
                let period_changed =
                    class_period.is_some() && class_period != current_period.as_deref();
                if current_name == name && !period_changed {
                    result.skipped += 1;
                    continue;
                }
                let mut update = StudentUpdate::new().name(name);
                if let Some(period) = class_period {
                    update = update.class_period(period);
                }
                payload
                    .update_student(&id, update)
                    .map(|_| result.updated += 1)
            }
            None => {
                let mut student = NewStudent::new(name).with_local_id(local_id);
                if let Some(period) = class_period {
                    student = student.with_class_period(period);
                }
                payload.add_student(student).map(|_| result.added += 1)
            }
        };

        if let Err(err) = outcome {
            result.errors.push(ImportRowError {
                row,
                error: err.to_string(),
            });
        }
    }

    result
}
