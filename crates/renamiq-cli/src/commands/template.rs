use anyhow::anyhow;
use serde_json::Value;

use crate::cli::{OutputFormat, TemplateLoadArgs, TemplateSaveArgs};
use crate::client::{AppContext, ArgsPicker, CliError, CliResult, read_json_source};
use crate::output::render_template;

pub(crate) async fn handle_template_save(
    ctx: &AppContext,
    args: TemplateSaveArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let document: Value = read_json_source(&args.from, "template document")?;
    let picker = ArgsPicker {
        template: Some(args.path),
        ..ArgsPicker::default()
    };
    let outcome = ctx.service.save_template_with(&picker, document).await;
    if !outcome.success {
        return Err(template_error("save", outcome.error));
    }
    render_template(&outcome, format)
}

pub(crate) async fn handle_template_load(
    ctx: &AppContext,
    args: TemplateLoadArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let picker = ArgsPicker {
        template: Some(args.path),
        ..ArgsPicker::default()
    };
    let outcome = ctx.service.load_template_with(&picker).await;
    if !outcome.success {
        return Err(template_error("load", outcome.error));
    }
    render_template(&outcome, format)
}

fn template_error(action: &str, error: Option<String>) -> CliError {
    let detail = error.unwrap_or_else(|| "unknown error".to_string());
    CliError::failure(anyhow!("template {action} failed: {detail}"))
}
