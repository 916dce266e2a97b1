//! Mapping of HTTP and transport failures onto [`GatewayError`].

use super::protocol::{ApiError, ApiErrorEnvelope};
use muse_application::GatewayError;

/// Classify a non-2xx response.
pub fn from_status(status: u16, body: &str) -> GatewayError {
    let api_error = serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|envelope| envelope.error)
        .unwrap_or_else(|_| ApiError {
            code: status,
            message: body.trim().to_string(),
            status: None,
        });
    from_api_error(status, &api_error)
}

/// Classify an API error object (from a status response or inside a stream).
pub fn from_api_error(status: u16, error: &ApiError) -> GatewayError {
    let message = if error.message.is_empty() {
        format!("HTTP {}", status)
    } else {
        error.message.clone()
    };
    let code_name = error.status.as_deref().unwrap_or_default();

    match status {
        401 | 403 => GatewayError::Unauthorized(message),
        429 => GatewayError::QuotaExceeded(message),
        400 if message.contains("API key") || message.contains("API_KEY") => {
            GatewayError::Unauthorized(message)
        }
        _ if code_name == "RESOURCE_EXHAUSTED" => GatewayError::QuotaExceeded(message),
        _ => GatewayError::RequestFailed(message),
    }
}

/// Classify a failure to send a request. An unreachable host means offline.
pub fn from_transport(error: reqwest::Error) -> GatewayError {
    if error.is_connect() {
        GatewayError::Offline
    } else if error.is_timeout() {
        GatewayError::ConnectionError(error.to_string())
    } else if error.is_decode() {
        GatewayError::InvalidResponse(error.to_string())
    } else {
        GatewayError::RequestFailed(error.to_string())
    }
}

/// Classify a failure while reading a response body that had started.
pub fn from_body(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::ConnectionError(error.to_string())
    } else if error.is_decode() {
        GatewayError::InvalidResponse(error.to_string())
    } else {
        GatewayError::TransportClosed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let body = r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(
            from_status(429, body),
            GatewayError::QuotaExceeded("Resource has been exhausted".to_string())
        );

        let body = r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}}"#;
        assert!(matches!(from_status(400, body), GatewayError::Unauthorized(_)));

        assert!(matches!(
            from_status(403, "forbidden"),
            GatewayError::Unauthorized(_)
        ));
    }

    #[test]
    fn test_unparseable_body_keeps_text() {
        assert_eq!(
            from_status(503, "  upstream overloaded \n"),
            GatewayError::RequestFailed("upstream overloaded".to_string())
        );
        assert_eq!(
            from_status(500, ""),
            GatewayError::RequestFailed("HTTP 500".to_string())
        );
    }

    #[test]
    fn test_user_messages_follow_classification() {
        assert_eq!(
            from_status(429, "{}").user_message(),
            "You have exceeded your API quota. Please check your account status."
        );
        assert_eq!(
            from_status(401, "{}").user_message(),
            "The API key is missing or invalid. Please configure it to use the AI features."
        );
    }
}
