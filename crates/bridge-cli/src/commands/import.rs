use crate::app::AppContext;
use crate::cli::ImportArgs;
use crate::helpers::read_input;
use crate::output::print_import_result;

use super::save_and_lock;

pub async fn handle_import(ctx: &AppContext, args: &ImportArgs) -> anyhow::Result<()> {
    let csv_text = read_input(&args.file)?;
    let manager = ctx.unlocked_manager().await?;

    let result = manager.import_csv(&csv_text)?;
    if result.added + result.updated > 0 {
        save_and_lock(&manager).await?;
    } else {
        manager.lock();
    }

    if !ctx.quiet || args.json {
        print_import_result(&result, args.json)?;
    }
    Ok(())
}
