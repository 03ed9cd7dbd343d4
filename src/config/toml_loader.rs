//! TOML configuration file parsing.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Read and deserialize a TOML file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if it is not valid TOML for `T`.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(path, &content)
}

/// Deserialize TOML `content`, attributing errors to `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if `content` is not valid TOML for `T`.
pub fn parse_config<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: String,
    }

    #[test]
    fn loads_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provision.toml");
        std::fs::write(&path, "name = \"jq\"\n").unwrap();
        let sample: Sample = load_config(&path).unwrap();
        assert_eq!(sample.name, "jq");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config::<Sample>(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }), "{err:?}");
    }

    #[test]
    fn invalid_toml_is_parse_error_naming_the_file() {
        let err = parse_config::<Sample>(Path::new("conf/provision.toml"), "name = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
        assert!(err.to_string().contains("conf/provision.toml"));
    }
}
