//! Error types shared by the API client, routing and audio layers

use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Network failure while talking to the Quran API
    #[error("request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The API answered with a non-2xx status
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body was not the JSON we expect
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Surah number missing or outside 1..=114
    #[error("invalid surah number: {0:?}")]
    InvalidSurahNumber(String),

    /// A view or container the caller relied on is not present
    #[error("missing element: {0}")]
    MissingElement(&'static str),

    #[error("audio error: {0}")]
    Audio(String),

    #[error("preferences error: {0}")]
    Preferences(#[from] std::io::Error),
}

impl AppError {
    /// Errors that should show the "not found" presentation rather than the generic one
    pub fn is_not_found(&self) -> bool {
        match self {
            AppError::InvalidSurahNumber(_) => true,
            AppError::Status { status, .. } => *status == 404,
            _ => false,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            AppError::Fetch(e) if e.is_timeout() => {
                "The request timed out. The Quran server might be slow right now.".to_string()
            }
            AppError::Fetch(e) if e.is_connect() || e.is_request() => {
                "Connection error. Please check your internet connection and try again.".to_string()
            }
            AppError::Fetch(e) if e.is_decode() => {
                "Received an unexpected response format from the server.".to_string()
            }
            AppError::Fetch(_) => "A network error occurred. Please try again later.".to_string(),
            AppError::Status { status, .. } => format!("The server answered with status {}.", status),
            AppError::Decode(_) => "Received an unexpected response format from the server.".to_string(),
            AppError::InvalidSurahNumber(_) => "Surah not found.".to_string(),
            AppError::MissingElement(what) => format!("Nothing to act on ({}).", what),
            AppError::Audio(msg) => format!("Audio playback failed: {}", msg),
            AppError::Preferences(_) => "Could not save preferences.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_number_is_not_found() {
        let err = AppError::InvalidSurahNumber("200".to_string());
        assert!(err.is_not_found());
        assert_eq!(err.user_message(), "Surah not found.");
    }

    #[test]
    fn status_404_is_not_found_but_500_is_not() {
        let not_found = AppError::Status { status: 404, url: "u".into() };
        let server = AppError::Status { status: 500, url: "u".into() };
        assert!(not_found.is_not_found());
        assert!(!server.is_not_found());
    }

    #[test]
    fn decode_error_converts() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: AppError = json_err.into();
        assert!(matches!(err, AppError::Decode(_)));
        assert!(!err.is_not_found());
    }
}
