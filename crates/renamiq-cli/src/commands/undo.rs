use anyhow::anyhow;
use renamiq_fsops::{RenameResult, UndoEntry, load_undo_journal, retain_failed_entries};

use crate::cli::{OutputFormat, UndoArgs};
use crate::client::{AppContext, CliError, CliResult, read_json_source};
use crate::output::render_undo_results;

pub(crate) async fn handle_undo(ctx: &AppContext, args: UndoArgs, format: OutputFormat) -> CliResult<()> {
    let UndoArgs {
        journal: journal_override,
        file,
    } = args;
    if let Some(source) = file {
        let entries: Vec<UndoEntry> = read_json_source(&source, "undo script")?;
        let results = replay(ctx, entries).await?;
        return report(&results, format);
    }

    let journal_path = ctx.journal_path(journal_override.as_deref());
    let journal = load_undo_journal(&journal_path)
        .map_err(|err| CliError::failure(anyhow!("failed to read undo journal: {}", err.detail())))?;
    let Some(journal) = journal else {
        println!("nothing to undo ({} not found)", journal_path.display());
        return Ok(());
    };

    let results = replay(ctx, journal.entries.clone()).await?;
    retain_failed_entries(&journal_path, &journal, &results).map_err(|err| {
        CliError::failure(anyhow!("failed to update undo journal: {}", err.detail()))
    })?;
    report(&results, format)
}

async fn replay(ctx: &AppContext, entries: Vec<UndoEntry>) -> CliResult<Vec<RenameResult>> {
    ctx.service
        .undo_batch(entries)
        .await
        .map_err(|err| CliError::failure(anyhow!("undo failed: {}", err.detail())))
}

fn report(results: &[RenameResult], format: OutputFormat) -> CliResult<()> {
    render_undo_results(results, format)?;
    let failed = results.iter().filter(|result| !result.success).count();
    if failed == 0 {
        Ok(())
    } else {
        Err(CliError::Partial {
            failed,
            total: results.len(),
        })
    }
}
