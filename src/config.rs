use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::frame::{FrameProps, DEFAULT_INITIAL_CONTENT};
use crate::vdom::VNode;

/// Defaults applied to frames created from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameConfig {
    pub initial_content: String,
    pub mount_target: Option<String>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            initial_content: DEFAULT_INITIAL_CONTENT.to_string(),
            mount_target: None,
        }
    }
}

impl FrameConfig {
    /// Read YAML from `config_path`, falling back to defaults when no path is
    /// given or the file does not exist.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn props(&self, children: impl Into<VNode>) -> FrameProps {
        let props = FrameProps::new(children).initial_content(self.initial_content.clone());
        match &self.mount_target {
            Some(selector) => props.mount_target(selector.clone()),
            None => props,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_default() {
        let config = FrameConfig::load(None).unwrap();
        assert_eq!(config, FrameConfig::default());
        assert!(config.initial_content.contains("frame-root"));
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let config = FrameConfig::load(Some(PathBuf::from("/nonexistent/frame.yaml"))).unwrap();
        assert_eq!(config, FrameConfig::default());
    }

    #[test]
    fn loads_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "initial_content: '<html><body><main id=\"app\"></main></body></html>'\nmount_target: '#app'"
        )
        .unwrap();
        let config = FrameConfig::load(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.mount_target.as_deref(), Some("#app"));
        assert!(config.initial_content.contains("<main id=\"app\">"));

        let props = config.props("child");
        assert_eq!(props.mount_target.as_deref(), Some("#app"));
        assert_eq!(props.initial_content, Some(config.initial_content.clone()));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = FrameConfig::from_yaml("mount_target: '.slot'").unwrap();
        assert_eq!(config.initial_content, DEFAULT_INITIAL_CONTENT);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = FrameConfig::from_yaml("mountTarget: '#app'").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}
