//! Configuration loading from disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ini::ConfigTree;
use crate::config::schema::{ValidatedConfig, REQUIRED_SECTIONS};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file '{}' not found", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read configuration file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse error in '{}' at line {line}: {reason}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("configuration file '{}' is missing required section [{section}]", .path.display())]
    MissingSection { path: PathBuf, section: &'static str },
}

/// Read and parse a task configuration file without interpreting any values.
pub fn load_config(path: &Path) -> Result<ConfigTree, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    parse_config(path, &content)
}

/// Parse already-read configuration text; `path` is only used in errors.
pub fn parse_config(path: &Path, content: &str) -> Result<ConfigTree, ConfigError> {
    let tree = ConfigTree::parse(content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        line: e.line,
        reason: e.reason,
    })?;

    if let Some(section) = REQUIRED_SECTIONS
        .into_iter()
        .find(|section| !tree.has_section(section))
    {
        return Err(ConfigError::MissingSection {
            path: path.to_path_buf(),
            section,
        });
    }

    tracing::debug!(path = %path.display(), sections = tree.section_names().count(), "Configuration parsed");
    Ok(tree)
}

/// Either stage of turning a file into a `ValidatedConfig`.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Load and validate configuration from a file.
pub fn load_validated(path: &Path) -> Result<ValidatedConfig, LoadError> {
    let tree = load_config(path)?;
    Ok(validate_config(&tree)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_SECTIONS: &str = "[extractor]\n[sinker]\n[runtime]\n[parallelizer]\n\
        [pipeline]\n[filter]\n[router]\n[resumer]\n";

    #[test]
    fn test_all_sections_present() {
        let tree = parse_config(Path::new("task.ini"), ALL_SECTIONS).unwrap();
        assert_eq!(tree.section_names().count(), 8);
    }

    #[test]
    fn test_each_missing_section_is_reported() {
        for missing in REQUIRED_SECTIONS {
            let text = ALL_SECTIONS.replace(&format!("[{missing}]\n"), "");
            match parse_config(Path::new("task.ini"), &text) {
                Err(ConfigError::MissingSection { section, .. }) => assert_eq!(section, missing),
                other => panic!("expected MissingSection for {missing}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_extra_sections_are_kept() {
        let text = format!("{ALL_SECTIONS}[checker]\nqueue_size=10\n");
        let tree = parse_config(Path::new("task.ini"), &text).unwrap();
        assert_eq!(tree.get("checker", "queue_size"), Some("10"));
    }

    #[test]
    fn test_parse_error_carries_line() {
        let err = parse_config(Path::new("task.ini"), "[extractor]\nnot a pair\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 2, .. }));
        assert!(err.to_string().contains("task.ini"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here/task.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }
}
