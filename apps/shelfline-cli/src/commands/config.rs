//! # Config Commands
//!
//! Inspect the effective configuration or write a starter file.

use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use super::Output;
use crate::config::{ConfigError, ShelflineConfig};
use crate::error::{AppError, AppResult, ErrorCode};

/// Prints the configuration after file and environment overrides.
pub fn show<W: Write>(config: &ShelflineConfig, out: &mut Output<W>) -> AppResult<()> {
    let text = toml::to_string_pretty(config).map_err(ConfigError::from)?;
    out.emit(config, || text)
}

/// Writes the default configuration to `path` (or the platform default).
///
/// An existing file is kept unless `force` is set.
pub fn init<W: Write>(path: Option<PathBuf>, force: bool, out: &mut Output<W>) -> AppResult<()> {
    let path = path
        .or_else(ShelflineConfig::default_config_path)
        .ok_or(ConfigError::NoPath)?;
    debug!(?path, force, "config init command");

    if path.exists() && !force {
        return Err(AppError::new(
            ErrorCode::ConfigError,
            format!("{} already exists (use --force to overwrite)", path.display()),
        ));
    }

    ShelflineConfig::default().save(Some(path.clone()))?;
    out.emit(&path, || format!("Wrote {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_then_refuse_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelfline.toml");

        let mut out = Output::new(false, Vec::new());
        init(Some(path.clone()), false, &mut out).unwrap();
        assert!(ShelflineConfig::load(Some(path.clone())).is_ok());

        let mut out = Output::new(false, Vec::new());
        let err = init(Some(path.clone()), false, &mut out).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);

        init(Some(path), true, &mut out).unwrap();
    }

    #[test]
    fn test_show_as_toml() {
        let mut out = Output::new(false, Vec::new());
        show(&ShelflineConfig::default(), &mut out).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.contains("[tracking]"));
        assert!(text.contains("Action Took"));
    }
}
