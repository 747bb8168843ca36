//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler returns the process exit code from
//! [`crate::pipeline::exit_codes`].

mod analyze;
mod check;
mod curate;
mod import;

pub use analyze::{analyze_inputs, open_session, run_analyze, AnalyzeOptions};
pub use check::run_check;
pub use curate::{run_curate, CurateOptions};
pub use import::{run_import, ImportOptions};

use crate::config::{load_or, AppConfig, ConfigPreset, Validatable};
use crate::pipeline::collect_files;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the effective configuration.
///
/// The preset (default: balanced) is the base, a discovered config file is
/// layered over it, and the caller applies CLI flags last.
pub fn resolve_config(config_path: Option<&Path>, preset: Option<&str>) -> Result<AppConfig> {
    let base = match preset {
        Some(name) => {
            let preset = ConfigPreset::from_name(name).with_context(|| {
                let names: Vec<_> = ConfigPreset::all().iter().map(ConfigPreset::name).collect();
                format!("unknown preset '{name}', expected one of: {}", names.join(", "))
            })?;
            AppConfig::from_preset(preset)
        }
        None => AppConfig::default(),
    };

    let (config, loaded_from) = load_or(&base, config_path);
    if let Some(path) = &loaded_from {
        tracing::debug!("Using config file {}", path.display());
    }
    Ok(config)
}

/// Reject configurations that fail validation, listing every problem.
pub fn ensure_valid(config: &AppConfig) -> Result<()> {
    let errors = config.validate();
    if errors.is_empty() {
        return Ok(());
    }
    let listed: Vec<String> = errors.iter().map(ToString::to_string).collect();
    bail!("invalid configuration:\n  {}", listed.join("\n  "));
}

/// Expand inputs into JSON document paths; directories are read one level deep.
fn document_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let found = collect_files(input, false, &["*.json"], &[] as &[&str])?;
            paths.extend(found);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_config_rejects_unknown_preset() {
        let missing = Path::new("/nonexistent/binsniff.yaml");
        let err = resolve_config(Some(missing), Some("reckless")).unwrap_err();
        assert!(err.to_string().contains("unknown preset 'reckless'"));
    }

    #[test]
    fn test_resolve_config_layers_file_over_preset() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let path = tmp.path().join("binsniff.yaml");
        std::fs::write(&path, "matching:\n  threshold: 0.3\n").expect("write");

        let config = resolve_config(Some(path.as_path()), Some("strict")).expect("resolves");

        assert_eq!(config.matching.threshold, 0.3);
        assert_eq!(config.matching.max_substring_hits, 3);
    }

    #[test]
    fn test_ensure_valid_lists_fields() {
        let mut config = AppConfig::default();
        config.matching.threshold = 1.5;
        let err = ensure_valid(&config).unwrap_err();
        assert!(err.to_string().contains("matching.threshold"));
    }

    #[test]
    fn test_document_paths_reads_directories_flat() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        std::fs::write(tmp.path().join("zlib.json"), "{}").expect("write");
        std::fs::write(tmp.path().join("notes.txt"), "").expect("write");
        std::fs::create_dir(tmp.path().join("nested")).expect("mkdir");
        std::fs::write(tmp.path().join("nested/ffmpeg.json"), "{}").expect("write");

        let paths = document_paths(&[tmp.path().to_path_buf()]).expect("collects");
        assert_eq!(paths, vec![tmp.path().join("zlib.json")]);
    }
}
