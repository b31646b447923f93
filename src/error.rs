use std::path::PathBuf;
use std::time::Duration;

/// Why the primary asset could not be used. Every variant is recovered by
/// substituting the fallback model.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("asset not found: {0}")]
    Missing(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("no drawable geometry in {0}")]
    Empty(PathBuf),

    #[error("gave up after {0:?}")]
    Timeout(Duration),

    #[error("loader worker exited without a result")]
    Disconnected,
}

impl LoadError {
    pub fn from_gltf(path: PathBuf, err: gltf::Error) -> Self {
        match err {
            gltf::Error::Io(source) if source.kind() == std::io::ErrorKind::NotFound => LoadError::Missing(path),
            gltf::Error::Io(source) => LoadError::Io { path, source },
            other => LoadError::Parse {
                path,
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_missing() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = LoadError::from_gltf(PathBuf::from("a.glb"), gltf::Error::Io(io));
        assert!(matches!(err, LoadError::Missing(_)));
    }

    #[test]
    fn test_other_io_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err = LoadError::from_gltf(PathBuf::from("a.glb"), gltf::Error::Io(io));
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("a.glb"));
    }

    #[test]
    fn test_timeout_message() {
        let err = LoadError::Timeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "gave up after 10s");
    }
}
