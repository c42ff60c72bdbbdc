//! Error types for the repertoire client

use thiserror::Error;
use trainer::BackendError;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid backend address: {0}")]
    InvalidAddress(String),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} {path} returned {code}: {message}")]
    Status {
        method: String,
        path: String,
        code: u16,
        message: String,
    },

    #[error("Mock response not configured for: {0}")]
    NotConfigured(String),
}

impl From<ClientError> for BackendError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Status { code: 404, path, .. } => BackendError::NotFound(path),
            ClientError::Status { code, message, .. } => BackendError::Status { code, message },
            ClientError::Http(e) if e.is_decode() => BackendError::InvalidData(e.to_string()),
            other => BackendError::Unavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_backend_error() {
        let not_found = ClientError::Status {
            method: "GET".into(),
            path: "/repertoires/x".into(),
            code: 404,
            message: "missing".into(),
        };
        assert_eq!(
            BackendError::from(not_found),
            BackendError::NotFound("/repertoires/x".into())
        );

        let server = ClientError::Status {
            method: "POST".into(),
            path: "/position-errors".into(),
            code: 500,
            message: "boom".into(),
        };
        assert_eq!(
            BackendError::from(server),
            BackendError::Status {
                code: 500,
                message: "boom".into()
            }
        );

        assert!(matches!(
            BackendError::from(ClientError::NotConfigured("get_path".into())),
            BackendError::Unavailable(_)
        ));
    }
}
