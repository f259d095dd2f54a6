use thiserror::Error;

/// Errors raised by the sync operations and the warehouse client.
///
/// The read-side clients (insider, odds feed) log and swallow most of these;
/// the sync operations propagate them so a route can answer with a 500 body.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned error: {status}")]
    UpstreamStatus {
        service: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("Failed to decode {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("Warehouse error: {0}")]
    Warehouse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    pub fn decode(service: &'static str, err: impl std::fmt::Display) -> Self {
        SyncError::Decode {
            service,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SyncError::MissingConfig("ODDS_API_KEY");
        assert_eq!(err.to_string(), "Missing configuration: ODDS_API_KEY");

        let err = SyncError::UpstreamStatus {
            service: "Odds API",
            status: reqwest::StatusCode::TOO_MANY_REQUESTS,
        };
        assert_eq!(err.to_string(), "Odds API returned error: 429 Too Many Requests");

        let err = SyncError::decode("ESPN", "missing field `events`");
        assert_eq!(
            err.to_string(),
            "Failed to decode ESPN response: missing field `events`"
        );
    }
}
