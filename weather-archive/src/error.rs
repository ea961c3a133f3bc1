use thiserror::Error;

/// Coarse failure categories. Every category is handled the same way by the
/// pipeline: logged and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Parse,
    Storage,
}

/// Why a single city could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("city name is empty")]
    EmptyCity,

    #[error("request for '{city}' failed: {source}")]
    Transport {
        city: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("weather API returned {status} for '{city}': {body}")]
    Status { city: String, status: u16, body: String },

    #[error("unexpected weather API response for '{city}': {reason}")]
    Parse { city: String, reason: String },
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Transport { .. } | FetchError::Status { .. } => FailureKind::Transport,
            FetchError::EmptyCity | FetchError::Parse { .. } => FailureKind::Parse,
        }
    }
}

/// Failure of an object store operation.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not check container '{bucket}': {message}")]
    ContainerCheck { bucket: String, message: String },

    #[error("could not create container '{bucket}': {message}")]
    ContainerCreate { bucket: String, message: String },

    #[error("write of '{key}' failed: {message}")]
    Write { key: String, message: String },

    #[error("read of '{key}' failed: {message}")]
    Read { key: String, message: String },

    #[error("object '{key}' not found")]
    NotFound { key: String },

    #[error("archive record encoding failed: {0}")]
    Codec(#[from] serde_json::Error),
}

impl StorageError {
    pub fn kind(&self) -> FailureKind {
        FailureKind::Storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_parse_map_to_taxonomy() {
        let status = FetchError::Status { city: "Nowhere".into(), status: 404, body: "{}".into() };
        assert_eq!(status.kind(), FailureKind::Transport);
        assert!(status.to_string().contains("404"));

        let parse = FetchError::Parse { city: "Nowhere".into(), reason: "missing main".into() };
        assert_eq!(parse.kind(), FailureKind::Parse);
    }

    #[test]
    fn storage_errors_are_storage_kind() {
        let err = StorageError::NotFound { key: "weather-data/x.json".into() };
        assert_eq!(err.kind(), FailureKind::Storage);
        assert_eq!(err.to_string(), "object 'weather-data/x.json' not found");
    }
}
