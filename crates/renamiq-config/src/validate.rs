//! Validation and parsing helpers for configuration values.

use crate::defaults::MAX_EVENT_CAPACITY;
use crate::error::{ConfigError, ConfigResult};
use crate::model::AppConfig;

const LOG_FORMATS: &[&str] = &["json", "pretty", "text"];

/// Validate a fully layered configuration.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for the first field that fails validation.
pub fn validate_config(config: &AppConfig) -> ConfigResult<()> {
    let level = config.logging.level.trim();
    if level.is_empty() || level.chars().any(char::is_whitespace) {
        return Err(ConfigError::invalid(
            "logging",
            "level",
            &config.logging.level,
            "must be a single filter directive",
        ));
    }

    if let Some(format) = config.logging.format.as_deref()
        && !LOG_FORMATS.contains(&format.trim().to_ascii_lowercase().as_str())
    {
        return Err(ConfigError::invalid(
            "logging",
            "format",
            format,
            "must be json or pretty",
        ));
    }

    let capacity = config.events.capacity;
    if capacity == 0 || capacity > MAX_EVENT_CAPACITY {
        return Err(ConfigError::invalid(
            "events",
            "capacity",
            capacity.to_string(),
            "out_of_range",
        ));
    }

    let extension = config.templates.extension.as_str();
    if extension.is_empty() || !extension.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return Err(ConfigError::invalid(
            "templates",
            "extension",
            extension,
            "must be ascii alphanumeric without a leading dot",
        ));
    }

    let file_name = config.templates.default_file_name.as_str();
    let suffix = format!(".{extension}");
    if file_name.len() <= suffix.len() || !file_name.ends_with(&suffix) {
        return Err(ConfigError::invalid(
            "templates",
            "default_file_name",
            file_name,
            "must carry the template extension",
        ));
    }

    if config.undo.journal_path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidField {
            section: "undo",
            field: "journal_path",
            value: None,
            reason: "empty",
        });
    }

    Ok(())
}

pub(crate) fn parse_bool(
    section: &'static str,
    field: &'static str,
    raw: &str,
) -> ConfigResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(section, field, raw, "must be a boolean")),
    }
}

pub(crate) fn parse_usize(
    section: &'static str,
    field: &'static str,
    raw: &str,
) -> ConfigResult<usize> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::invalid(section, field, raw, "must be an unsigned integer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn invalid_field(result: ConfigResult<()>) -> Option<(&'static str, &'static str)> {
        match result {
            Err(ConfigError::InvalidField { section, field, .. }) => Some((section, field)),
            _ => None,
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn rejects_each_invalid_section() {
        let mut config = AppConfig::default();
        config.logging.level = "info debug".into();
        assert_eq!(
            invalid_field(validate_config(&config)),
            Some(("logging", "level"))
        );

        let mut config = AppConfig::default();
        config.logging.format = Some("xml".into());
        assert_eq!(
            invalid_field(validate_config(&config)),
            Some(("logging", "format"))
        );

        let mut config = AppConfig::default();
        config.events.capacity = 0;
        assert_eq!(
            invalid_field(validate_config(&config)),
            Some(("events", "capacity"))
        );

        let mut config = AppConfig::default();
        config.templates.extension = ".rnq".into();
        assert_eq!(
            invalid_field(validate_config(&config)),
            Some(("templates", "extension"))
        );

        let mut config = AppConfig::default();
        config.templates.default_file_name = "template.json".into();
        assert_eq!(
            invalid_field(validate_config(&config)),
            Some(("templates", "default_file_name"))
        );

        let mut config = AppConfig::default();
        config.undo.journal_path = PathBuf::new();
        assert_eq!(
            invalid_field(validate_config(&config)),
            Some(("undo", "journal_path"))
        );
    }

    #[test]
    fn parses_flag_spellings() {
        assert!(matches!(parse_bool("undo", "guard", "YES"), Ok(true)));
        assert!(matches!(parse_bool("undo", "guard", "0"), Ok(false)));
        assert!(parse_bool("undo", "guard", "maybe").is_err());
        assert!(matches!(parse_usize("events", "capacity", " 12 "), Ok(12)));
        assert!(parse_usize("events", "capacity", "-1").is_err());
    }
}
