use anyhow::anyhow;
use renamiq_fsops::{RenameOperation, UndoJournal, save_undo_journal};
use tracing::info;

use crate::cli::{OutputFormat, RenameArgs};
use crate::client::{AppContext, CliError, CliResult, read_json_source};
use crate::output::render_batch;

pub(crate) async fn handle_rename(ctx: &AppContext, args: RenameArgs, format: OutputFormat) -> CliResult<()> {
    let mut operations: Vec<RenameOperation> = match &args.plan {
        Some(source) => read_json_source(source, "rename plan")?,
        None => Vec::new(),
    };
    operations.extend(args.mappings);
    if operations.is_empty() {
        return Err(CliError::validation(
            "no rename operations supplied (pass --plan or --map)",
        ));
    }

    let outcome = if args.dry_run {
        ctx.service.preview_batch(operations).await
    } else {
        ctx.service.execute_batch(operations).await
    }
    .map_err(|err| CliError::failure(anyhow!("rename batch failed: {}", err.detail())))?;

    if !args.dry_run && !outcome.undo_data.is_empty() {
        let journal_path = ctx.journal_path(args.journal.as_deref());
        let journal = UndoJournal::new(outcome.batch_id, outcome.undo_data.clone());
        save_undo_journal(&journal_path, &journal).map_err(|err| {
            CliError::failure(anyhow!(
                "renames applied but the undo journal could not be written: {}",
                err.detail()
            ))
        })?;
        info!(path = %journal_path.display(), entries = journal.entries.len(), "undo journal saved");
    }

    render_batch(&outcome, args.dry_run, format)?;
    let summary = outcome.summary();
    if summary.is_clean() {
        Ok(())
    } else {
        Err(CliError::Partial {
            failed: summary.failed,
            total: summary.total,
        })
    }
}
