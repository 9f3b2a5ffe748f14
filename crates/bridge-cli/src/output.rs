//! Output formatting helpers for the CLI.
//!
//! Tables are drawn only on a terminal; piped output is one tab-separated
//! line per row so it stays stable for scripts.

use std::io::IsTerminal;

use bridge_core::bridge::{ImportResult, RosterEntry};
use bridge_core::envelope::EnvelopeSummary;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

const ROSTER_HEADERS: [&str; 4] = ["ID", "NAME", "LOCAL ID", "PERIOD"];

fn roster_row(entry: &RosterEntry) -> Vec<String> {
    vec![
        entry.uuid.to_string(),
        entry.name.clone(),
        entry.local_id.clone().unwrap_or_default(),
        entry.class_period.clone().unwrap_or_default(),
    ]
}

/// Render roster entries as a table (TTY) or tab-separated lines.
pub fn roster_table(entries: &[RosterEntry], pretty: bool) -> String {
    let rows: Vec<Vec<String>> = entries.iter().map(roster_row).collect();
    if !pretty {
        return rows
            .iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(ROSTER_HEADERS);
    for row in rows {
        table.add_row(row);
    }
    table.to_string()
}

pub fn stdout_is_pretty() -> bool {
    std::io::stdout().is_terminal() && std::env::var("TERM").map_or(true, |t| t != "dumb")
}

pub fn print_roster(entries: &[RosterEntry], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        return Ok(());
    }
    println!("{}", roster_table(entries, stdout_is_pretty()));
    Ok(())
}

pub fn print_entry(entry: &RosterEntry, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entry)?);
        return Ok(());
    }
    println!("ID: {}", entry.uuid);
    println!("Name: {}", entry.name);
    if let Some(local_id) = &entry.local_id {
        println!("Local ID: {}", local_id);
    }
    if let Some(period) = &entry.class_period {
        println!("Class period: {}", period);
    }
    println!("Created: {}", entry.created_at.to_rfc3339());
    println!("Updated: {}", entry.updated_at.to_rfc3339());
    Ok(())
}

pub fn print_import_result(result: &ImportResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }
    println!(
        "Imported: {} added, {} updated, {} skipped",
        result.added, result.updated, result.skipped
    );
    for error in &result.errors {
        eprintln!("Row {}: {}", error.row, error.error);
    }
    Ok(())
}

pub fn print_summary(summary: &EnvelopeSummary, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }
    let support = if summary.supported { "supported" } else { "unsupported" };
    println!("Version: {} ({})", summary.version, support);
    println!("Iterations: {}", summary.iterations);
    println!("Ciphertext: {} bytes", summary.ciphertext_bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry(name: &str, local_id: Option<&str>) -> RosterEntry {
        serde_json::from_value(serde_json::json!({
            "uuid": "u1",
            "name": name,
            "localId": local_id,
            "createdAt": "2024-09-01T12:00:00Z",
            "updatedAt": "2024-09-01T12:00:00Z",
        }))
        .unwrap()
    }

    #[test]
    fn test_plain_table_is_tab_separated() {
        let rows = [sample_entry("Ada", Some("S1"))];
        assert_eq!(roster_table(&rows, false), "u1\tAda\tS1\t");
    }

    #[test]
    fn test_pretty_table_has_headers() {
        let rows = [sample_entry("Ada", None)];
        let rendered = roster_table(&rows, true);
        assert!(rendered.contains("LOCAL ID"));
        assert!(rendered.contains("Ada"));
    }
}
