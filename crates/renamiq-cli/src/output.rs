//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use renamiq_events::EventEnvelope;
use renamiq_fsops::{BatchOutcome, FileRecord, RenameResult, TemplateOutcome};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_file_records(files: &[FileRecord], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(files)?,
        OutputFormat::Table => {
            println!("{:>10} {:<20} {:<6} NAME", "SIZE", "MODIFIED", "EXT");
            for file in files {
                println!(
                    "{:>10} {:<20} {:<6} {}",
                    format_bytes(file.size),
                    file.modified.format("%Y-%m-%d %H:%M:%S"),
                    file.ext,
                    file.path.display()
                );
            }
            println!("{} file(s)", files.len());
        }
    }
    Ok(())
}

pub(crate) fn render_batch(outcome: &BatchOutcome, preview: bool, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(outcome)?,
        OutputFormat::Table => {
            if preview {
                println!("preview of batch {} (nothing was renamed)", outcome.batch_id);
            } else {
                println!("batch {}", outcome.batch_id);
            }
            print_result_rows(&outcome.results);
            let summary = outcome.summary();
            println!(
                "{} succeeded, {} failed, {} undo entr{}",
                summary.succeeded,
                summary.failed,
                outcome.undo_data.len(),
                if outcome.undo_data.len() == 1 { "y" } else { "ies" }
            );
        }
    }
    Ok(())
}

pub(crate) fn render_undo_results(results: &[RenameResult], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(results)?,
        OutputFormat::Table => {
            print_result_rows(results);
            let restored = results.iter().filter(|result| result.success).count();
            println!("{restored} restored, {} failed", results.len() - restored);
        }
    }
    Ok(())
}

pub(crate) fn render_template(outcome: &TemplateOutcome, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(outcome)?,
        OutputFormat::Table => {
            if let Some(path) = &outcome.path {
                println!("template saved to {}", path.display());
            }
            if let Some(data) = &outcome.data {
                print_json(data)?;
            }
        }
    }
    Ok(())
}

pub(crate) fn render_event(envelope: &EventEnvelope) -> CliResult<()> {
    let line = serde_json::to_string(envelope)
        .map_err(|err| CliError::failure(anyhow!("failed to format event: {err}")))?;
    eprintln!("{line}");
    Ok(())
}

fn print_result_rows(results: &[RenameResult]) {
    println!("{:<6} {:<18} FROM -> TO", "STATUS", "KIND");
    for result in results {
        let status = if result.success { "ok" } else { "FAILED" };
        let kind = result.kind.map_or("-", |kind| kind.as_str());
        println!(
            "{:<6} {:<18} {} -> {}",
            status,
            kind,
            result.old_path.display(),
            result.new_path.display()
        );
        if let Some(error) = &result.error {
            println!("       {error}");
        }
    }
}

/// Human-readable byte count with binary units.
pub(crate) fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;
    let value = bytes_to_f64(bytes);
    if value >= GIB {
        format!("{:.2} GiB", value / GIB)
    } else if value >= MIB {
        format!("{:.2} MiB", value / MIB)
    } else if value >= KIB {
        format!("{:.2} KiB", value / KIB)
    } else {
        format!("{bytes} B")
    }
}

fn bytes_to_f64(value: u64) -> f64 {
    let high = u32::try_from(value >> 32).unwrap_or(u32::MAX);
    let low = u32::try_from(value & 0xFFFF_FFFF).unwrap_or(u32::MAX);
    f64::from(high) * 4_294_967_296.0 + f64::from(low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_scales_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.00 KiB");
        assert_eq!(format_bytes(1536), "1.50 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GiB");
    }
}
