use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    /// The content relay renders exactly one child.
    #[error("frame content expects exactly one child, got {count}")]
    ChildrenOnly { count: usize },
    #[error("frame has been torn down")]
    NotMounted,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read frame config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
