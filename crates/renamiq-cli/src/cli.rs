//! Argument parsing, bootstrap, and command dispatch.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use clap::{Args, Parser, Subcommand, ValueEnum};
use renamiq_config::{AppConfig, ConfigError, ConfigLoader};
use renamiq_fsops::RenameOperation;
use renamiq_telemetry::{LogFormat, LoggingConfig, build_sha, init_logging};
use tracing::{debug, info};

use crate::client::{AppContext, CliError, CliResult};
use crate::commands::inventory::{handle_ls, handle_stat};
use crate::commands::rename::handle_rename;
use crate::commands::template::{handle_template_load, handle_template_save};
use crate::commands::undo::handle_undo;
use crate::output::render_event;

/// Parses process arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    run_from(std::env::args_os()).await
}

/// Like [`run`], parsing `args` instead of the process arguments.
pub async fn run_from<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let exit_code = err.exit_code();
            if let Err(print_err) = err.print() {
                eprintln!("error: {print_err}");
            }
            return exit_code;
        }
    };
    let command_name = command_label(&cli.command);

    match execute(cli).await {
        Ok(()) => {
            debug!(command = command_name, "command succeeded");
            0
        }
        Err(err) => {
            let exit_code = err.exit_code();
            eprintln!("error: {}", err.display_message());
            info!(command = command_name, exit_code, "command finished with errors");
            exit_code
        }
    }
}

async fn execute(cli: Cli) -> CliResult<()> {
    let config = load_config(cli.config.as_deref())?;
    install_logging(&config);
    let ctx = AppContext::from_config(config)?;

    let mut progress = cli.progress.then(|| ctx.service.events().subscribe(None));
    let result = dispatch(&ctx, cli.command, cli.output).await;

    if let Some(stream) = progress.as_mut() {
        while let Some(envelope) = stream.try_next() {
            render_event(&envelope)?;
        }
    }
    if cli.metrics {
        let rendered = ctx
            .service
            .metrics()
            .render()
            .map_err(|err| CliError::failure(anyhow!("failed to render metrics: {err}")))?;
        eprint!("{rendered}");
    }
    result
}

pub(crate) async fn dispatch(ctx: &AppContext, command: Command, output: OutputFormat) -> CliResult<()> {
    match command {
        Command::Stat(args) => handle_stat(ctx, args, output).await,
        Command::Ls(args) => handle_ls(ctx, args, output).await,
        Command::Rename(args) => handle_rename(ctx, args, output).await,
        Command::Undo(args) => handle_undo(ctx, args, output).await,
        Command::Template(template) => match template {
            TemplateCommand::Save(args) => handle_template_save(ctx, args, output).await,
            TemplateCommand::Load(args) => handle_template_load(ctx, args, output).await,
        },
    }
}

fn load_config(explicit: Option<&Path>) -> CliResult<AppConfig> {
    let mut loader = ConfigLoader::from_process_env();
    if let Some(path) = explicit {
        loader = loader.with_file(path);
    }
    loader
        .load()
        .map_err(|err| CliError::validation(describe_config_error(&err)))
}

fn describe_config_error(err: &ConfigError) -> String {
    match err {
        ConfigError::InvalidField {
            section,
            field,
            value,
            reason,
        } => match value {
            Some(value) => format!("invalid configuration {section}.{field} = '{value}': {reason}"),
            None => format!("invalid configuration {section}.{field}: {reason}"),
        },
        ConfigError::Io { path, source, .. } => {
            format!("failed to read configuration {}: {source}", path.display())
        }
        ConfigError::Parse { path, source } => {
            format!("configuration {} is not valid: {source}", path.display())
        }
    }
}

fn install_logging(config: &AppConfig) {
    let format = config
        .logging
        .format
        .as_deref()
        .and_then(LogFormat::parse)
        .unwrap_or_else(LogFormat::infer);
    let logging = LoggingConfig {
        level: &config.logging.level,
        format,
        build_sha: build_sha(),
    };
    // A subscriber installed earlier in the process stays in charge.
    if let Err(err) = init_logging(&logging) {
        debug!(error = %err, "logging already initialised");
    }
}

#[derive(Parser)]
#[command(name = "renamiq", about = "Bulk file renaming with undo")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        help = "Configuration file (defaults to RENAMIQ_CONFIG when set)"
    )]
    config: Option<PathBuf>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[arg(long, global = true, help = "Print emitted events to stderr as JSON lines")]
    progress: bool,
    #[arg(long, global = true, help = "Print Prometheus metrics to stderr when done")]
    metrics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Describe specific files.
    Stat(StatArgs),
    /// List the files directly inside a folder.
    Ls(LsArgs),
    /// Rename files within their directories.
    Rename(RenameArgs),
    /// Reverse the most recent rename batch.
    Undo(UndoArgs),
    /// Save or load rename templates.
    #[command(subcommand)]
    Template(TemplateCommand),
}

#[derive(Subcommand)]
pub(crate) enum TemplateCommand {
    /// Save a template document.
    Save(TemplateSaveArgs),
    /// Load and print a template document.
    Load(TemplateLoadArgs),
}

#[derive(Args)]
pub(crate) struct StatArgs {
    #[arg(required = true, help = "Files to describe")]
    pub(crate) paths: Vec<PathBuf>,
}

#[derive(Args)]
pub(crate) struct LsArgs {
    #[arg(help = "Folder to list")]
    pub(crate) folder: PathBuf,
    #[arg(long, help = "Only list file names matching this glob")]
    pub(crate) glob: Option<String>,
}

#[derive(Args)]
pub(crate) struct RenameArgs {
    #[arg(
        long,
        help = "JSON array of {oldPath, newName} operations, or '-' for stdin"
    )]
    pub(crate) plan: Option<String>,
    #[arg(
        long = "map",
        value_parser = parse_mapping,
        help = "Extra operation as OLD_PATH=NEW_NAME (repeatable)"
    )]
    pub(crate) mappings: Vec<RenameOperation>,
    #[arg(long, help = "Predict results without renaming anything")]
    pub(crate) dry_run: bool,
    #[arg(long, help = "Undo journal to write (defaults to the configured path)")]
    pub(crate) journal: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct UndoArgs {
    #[arg(long, help = "Undo journal to replay (defaults to the configured path)")]
    pub(crate) journal: Option<PathBuf>,
    #[arg(
        long,
        conflicts_with = "journal",
        help = "JSON array of {oldPath, newPath} entries, or '-' for stdin"
    )]
    pub(crate) file: Option<String>,
}

#[derive(Args)]
pub(crate) struct TemplateSaveArgs {
    #[arg(help = "Destination file, or a folder to save the default template name in")]
    pub(crate) path: PathBuf,
    #[arg(long, help = "JSON document to save, or '-' for stdin")]
    pub(crate) from: String,
}

#[derive(Args)]
pub(crate) struct TemplateLoadArgs {
    #[arg(help = "Template file to load")]
    pub(crate) path: PathBuf,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Stat(_) => "stat",
        Command::Ls(_) => "ls",
        Command::Rename(args) if args.dry_run => "rename_preview",
        Command::Rename(_) => "rename",
        Command::Undo(_) => "undo",
        Command::Template(TemplateCommand::Save(_)) => "template_save",
        Command::Template(TemplateCommand::Load(_)) => "template_load",
    }
}

/// Parse `OLD_PATH=NEW_NAME`; the first `=` separates the two halves.
pub(crate) fn parse_mapping(input: &str) -> Result<RenameOperation, String> {
    let (old_path, new_name) = input
        .split_once('=')
        .ok_or_else(|| format!("mapping '{input}' must look like OLD_PATH=NEW_NAME"))?;
    if old_path.trim().is_empty() {
        return Err(format!("mapping '{input}' is missing the old path"));
    }
    Ok(RenameOperation::new(old_path, new_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mappings_split_on_first_equals() -> Result<(), String> {
        let operation = parse_mapping("/d/a.txt=b=c.txt")?;
        assert_eq!(operation, RenameOperation::new("/d/a.txt", "b=c.txt"));
        assert_eq!(parse_mapping("/d/a.txt=")?.new_name, "");
        assert!(parse_mapping("no-separator").is_err());
        assert!(parse_mapping("=b.txt").is_err());
        Ok(())
    }

    #[test]
    fn arguments_parse_into_commands() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from([
            "renamiq",
            "--output",
            "json",
            "rename",
            "--map",
            "/d/a.txt=b.txt",
            "--map",
            "/d/c.txt=d.txt",
            "--dry-run",
        ])?;
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(command_label(&cli.command), "rename_preview");
        let Command::Rename(args) = cli.command else {
            panic!("expected rename command");
        };
        assert_eq!(args.mappings.len(), 2);
        assert!(args.plan.is_none());

        let template = Cli::try_parse_from(["renamiq", "template", "load", "x.rnq", "--progress"])?;
        assert!(template.progress);
        assert_eq!(command_label(&template.command), "template_load");
        Ok(())
    }

    #[test]
    fn undo_sources_are_exclusive() {
        let result = Cli::try_parse_from([
            "renamiq", "undo", "--journal", "a.json", "--file", "b.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn stat_requires_paths() {
        assert!(Cli::try_parse_from(["renamiq", "stat"]).is_err());
    }

    #[test]
    fn config_errors_are_described_with_context() {
        let message = describe_config_error(&ConfigError::InvalidField {
            section: "events",
            field: "capacity",
            value: Some("0".to_string()),
            reason: "must be positive",
        });
        assert_eq!(
            message,
            "invalid configuration events.capacity = '0': must be positive"
        );
    }
}
