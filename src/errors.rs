use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("falha de rede: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("resposta inválida: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("URL inválida: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid PORT: {0}")]
    Port(String),

    #[error("invalid DASHBOARD_API_URL: {0}")]
    ApiUrl(#[from] url::ParseError),

    #[error("invalid DASHBOARD_TIMEZONE: {0}")]
    Timezone(String),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_reads_like_http_line() {
        let err = FetchError::Status {
            status: 500,
            reason: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
    }

    #[test]
    fn json_errors_convert_to_parse() {
        let json_err = serde_json::from_str::<u64>("nope").unwrap_err();
        let err: FetchError = json_err.into();
        assert!(matches!(err, FetchError::Parse(_)));
    }
}
