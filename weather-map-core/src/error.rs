use serde::Serialize;

/// Message shown for every failed coordinate lookup, whatever the cause.
pub const COORDINATE_LOOKUP_FAILED: &str = "Failed to fetch weather data. Please try again.";

/// Failures raised while talking to the weather provider or preparing to.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl WeatherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::Network(_) => ErrorKind::Network,
            WeatherError::NotFound(_) => ErrorKind::NotFound,
            WeatherError::Parse(_) => ErrorKind::Parse,
            WeatherError::Config(_) => ErrorKind::Config,
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WeatherError::Network(format!("request timed out: {err}"))
        } else if err.is_decode() {
            WeatherError::Parse(err.to_string())
        } else {
            WeatherError::Network(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    NotFound,
    Parse,
    Config,
}

/// A failed lookup as the interaction state sees it: a category plus a
/// message fit for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct LookupError {
    pub kind: ErrorKind,
    pub message: String,
}

impl LookupError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Collapse a coordinate lookup failure. The underlying cause is kept
    /// in the logs, not in the message.
    pub fn for_coordinate(err: &WeatherError) -> Self {
        tracing::warn!(error = %err, "coordinate lookup failed");
        Self::new(err.kind(), COORDINATE_LOOKUP_FAILED)
    }

    pub fn for_name(query: &str, err: &WeatherError) -> Self {
        tracing::warn!(query, error = %err, "name lookup failed");
        let message = match err {
            WeatherError::NotFound(_) => format!("No weather found for '{query}'."),
            WeatherError::Config(detail) => format!("Weather service is misconfigured: {detail}"),
            WeatherError::Network(_) | WeatherError::Parse(_) => {
                format!("Failed to fetch weather for '{query}'. Please try again.")
            }
        };
        Self::new(err.kind(), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_failures_share_one_message() {
        let a = LookupError::for_coordinate(&WeatherError::Network("reset".into()));
        let b = LookupError::for_coordinate(&WeatherError::Parse("eof".into()));

        assert_eq!(a.message, COORDINATE_LOOKUP_FAILED);
        assert_eq!(b.message, COORDINATE_LOOKUP_FAILED);
        assert_eq!(a.kind, ErrorKind::Network);
        assert_eq!(b.kind, ErrorKind::Parse);
    }

    #[test]
    fn name_failures_mention_the_query() {
        let err = LookupError::for_name("Paris", &WeatherError::NotFound("city not found".into()));

        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.to_string(), "No weather found for 'Paris'.");
    }

    #[test]
    fn weather_error_display() {
        assert!(WeatherError::Config("missing key".into()).to_string().contains("Configuration"));
        assert!(WeatherError::Network("timeout".into()).to_string().contains("Network"));
    }
}
