use thiserror::Error;

/// Coarse error classification exposed to components and their views
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The backend could not be reached
    Transport,
    /// The backend answered with a non-success status or reported a failure
    Http,
    /// The backend answered successfully but the body was unusable
    MalformedResponse,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport => write!(f, "transport"),
            Self::Http => write!(f, "http"),
            Self::MalformedResponse => write!(f, "malformed response"),
        }
    }
}

/// Errors raised by the [`Gateway`](super::Gateway)
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Failed to send request to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with {status}: {body}")]
    Http {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{url} reported an error: {message}")]
    Reported { url: String, message: String },

    #[error("Malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    #[error("Cannot build an endpoint beneath origin {0}")]
    InvalidEndpoint(String),

    #[error("Cannot build request: {0}")]
    InvalidRequest(String),

    #[error("Path '{0}' cannot be requested without being rewritten")]
    InvalidPath(String),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. }
            | Self::InvalidEndpoint(_)
            | Self::InvalidRequest(_)
            | Self::InvalidPath(_) => ErrorKind::Transport,
            Self::Http { .. } | Self::Reported { .. } => ErrorKind::Http,
            Self::MalformedResponse { .. } => ErrorKind::MalformedResponse,
        }
    }

    /// HTTP status, when the backend answered at all
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let http = GatewayError::Http {
            url: "http://localhost:8000/extract/run".to_string(),
            status: reqwest::StatusCode::UNPROCESSABLE_ENTITY,
            body: "{\"detail\":\"missing tsv_file\"}".to_string(),
        };
        assert_eq!(http.kind(), ErrorKind::Http);
        assert_eq!(http.status(), Some(reqwest::StatusCode::UNPROCESSABLE_ENTITY));
        assert!(http.to_string().contains("422"));

        let malformed = GatewayError::MalformedResponse {
            url: "http://localhost:8000/info/supported".to_string(),
            reason: "expected a JSON object".to_string(),
        };
        assert_eq!(malformed.kind(), ErrorKind::MalformedResponse);
        assert_eq!(malformed.status(), None);

        let endpoint = GatewayError::InvalidEndpoint("data:text/plain,x".to_string());
        assert_eq!(endpoint.kind(), ErrorKind::Transport);

        let reported = GatewayError::Reported {
            url: "http://localhost:8000/download/gone.csv".to_string(),
            message: "File not found".to_string(),
        };
        assert_eq!(reported.kind(), ErrorKind::Http);
        assert_eq!(reported.status(), None);
    }
}
