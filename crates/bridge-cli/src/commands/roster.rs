use bridge_core::bridge::{NewStudent, StudentUpdate};
use bridge_core::{BridgeError, StudentId};

use crate::app::AppContext;
use crate::cli::RosterCommand;
use crate::errors::CliError;
use crate::output::{print_entry, print_roster};

use super::save_and_lock;

pub async fn handle_roster(ctx: &AppContext, command: &RosterCommand) -> anyhow::Result<()> {
    let manager = ctx.unlocked_manager().await?;

    match command {
        RosterCommand::List {
            name,
            local_id,
            json,
        } => {
            let entries = match (local_id, name) {
                (Some(local_id), _) => manager.find_by_local_id(local_id).into_iter().collect::<Vec<_>>(),
                (None, Some(name)) => manager.find_by_name(name),
                (None, None) => manager.roster(),
            };
            manager.lock();
            print_roster(&entries, *json)?;
        }
        RosterCommand::Show { id, json } => {
            let id = StudentId::from(id.as_str());
            let entry = manager.find_by_uuid(&id);
            manager.lock();
            let entry = entry.ok_or_else(|| CliError::from(BridgeError::StudentNotFound(id)))?;
            print_entry(&entry, *json)?;
        }
        RosterCommand::Add {
            name,
            local_id,
            class_period,
        } => {
            let mut student = NewStudent::new(name);
            if let Some(local_id) = local_id {
                student = student.with_local_id(local_id);
            }
            if let Some(period) = class_period {
                student = student.with_class_period(period);
            }
            let added = manager.add(student);
            let entry = match added {
                Ok(entry) => entry,
                Err(err) => {
                    manager.lock();
                    return Err(CliError::from(err).into());
                }
            };
            save_and_lock(&manager).await?;
            if !ctx.quiet {
                println!("Added student {}", entry.uuid);
            }
        }
        RosterCommand::Update {
            id,
            name,
            local_id,
            class_period,
        } => {
            let mut update = StudentUpdate::new();
            if let Some(name) = name {
                update = update.name(name);
            }
            if let Some(local_id) = local_id {
                update = update.local_id(local_id);
            }
            if let Some(period) = class_period {
                update = update.class_period(period);
            }
            if update.is_empty() {
                manager.lock();
                return Err(CliError::invalid_input(
                    "Nothing to update; pass --name, --local-id or --class-period",
                )
                .into());
            }
            if let Err(err) = manager.update(&StudentId::from(id.as_str()), update) {
                manager.lock();
                return Err(CliError::from(err).into());
            }
            save_and_lock(&manager).await?;
            if !ctx.quiet {
                println!("Updated student {}", id);
            }
        }
        RosterCommand::Remove { id } => {
            if let Err(err) = manager.remove(&StudentId::from(id.as_str())) {
                manager.lock();
                return Err(CliError::from(err).into());
            }
            save_and_lock(&manager).await?;
            if !ctx.quiet {
                println!("Removed student {}", id);
            }
        }
        RosterCommand::Periods { periods } => {
            manager.set_class_periods(periods.clone())?;
            let current = manager.class_periods();
            save_and_lock(&manager).await?;
            if !ctx.quiet {
                if current.is_empty() {
                    println!("Cleared class periods");
                } else {
                    println!("Class periods: {}", current.join(", "));
                }
            }
        }
    }

    Ok(())
}
