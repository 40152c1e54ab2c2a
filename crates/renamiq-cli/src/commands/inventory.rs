use anyhow::anyhow;
use renamiq_fsops::FsOpsError;

use crate::cli::{LsArgs, OutputFormat, StatArgs};
use crate::client::{AppContext, ArgsPicker, CliError, CliResult};
use crate::output::render_file_records;

pub(crate) async fn handle_stat(ctx: &AppContext, args: StatArgs, format: OutputFormat) -> CliResult<()> {
    let picker = ArgsPicker {
        files: Some(args.paths),
        ..ArgsPicker::default()
    };
    let files = ctx
        .service
        .select_files(&picker)
        .await
        .map_err(|err| CliError::failure(anyhow!("failed to stat files: {}", err.detail())))?;
    render_file_records(&files, format)
}

pub(crate) async fn handle_ls(ctx: &AppContext, args: LsArgs, format: OutputFormat) -> CliResult<()> {
    let files = match args.glob {
        Some(pattern) => ctx
            .service
            .list_directory(args.folder, Some(pattern))
            .await
            .map_err(|err| match err {
                FsOpsError::Glob { .. } => CliError::validation(format!("invalid --glob: {}", err.detail())),
                other => CliError::failure(anyhow!("failed to list folder: {}", other.detail())),
            })?,
        None => {
            let picker = ArgsPicker {
                folder: Some(args.folder),
                ..ArgsPicker::default()
            };
            ctx.service.select_folder(&picker).await.map_err(|err| {
                CliError::failure(anyhow!("failed to list folder: {}", err.detail()))
            })?
        }
    };
    render_file_records(&files, format)
}
