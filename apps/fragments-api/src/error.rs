//! HTTP error mapping

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fragments_domain::FragmentError;
use tracing::{error, warn};

use crate::dto::fragments::ErrorResponse;

/// Error returned by every fragment handler
#[derive(Debug)]
pub enum ApiError {
    /// No authenticated owner on the request
    Unauthorized,
    /// A failure reported by the fragment service
    Fragment(FragmentError),
    /// The request body could not be read, e.g. it exceeds the size limit
    Body(BytesRejection),
    /// The response could not be assembled
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Body(rejection) => rejection.status(),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Fragment(err) if !err.is_client_error() => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Fragment(err) => match err {
                FragmentError::Validation(_)
                | FragmentError::TypeMismatch { .. }
                | FragmentError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
                FragmentError::NotFound(_) => StatusCode::NOT_FOUND,
                FragmentError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                // Remaining client errors are all media type problems
                _ => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            },
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Unauthorized".to_string(),
            ApiError::Body(rejection) => rejection.body_text(),
            // Storage details stay in the logs
            ApiError::Internal(_) => "Unable to process request".to_string(),
            ApiError::Fragment(err) if !err.is_client_error() => {
                "Unable to process request".to_string()
            }
            ApiError::Fragment(FragmentError::NotFound(_)) => "Fragment not found".to_string(),
            ApiError::Fragment(err) => err.to_string(),
        }
    }
}

impl From<FragmentError> for ApiError {
    fn from(err: FragmentError) -> Self {
        ApiError::Fragment(err)
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        ApiError::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = ?self, "Request failed");
        } else {
            warn!(error = ?self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(ErrorResponse::new(status, self.message()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fragments_domain::MediaType;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (FragmentError::validation("x"), StatusCode::BAD_REQUEST),
            (FragmentError::not_found("x"), StatusCode::NOT_FOUND),
            (FragmentError::unsupported_type("x"), StatusCode::UNSUPPORTED_MEDIA_TYPE),
            (FragmentError::unsupported_extension(".x"), StatusCode::UNSUPPORTED_MEDIA_TYPE),
            (
                FragmentError::TypeMismatch {
                    existing: MediaType::TextPlain,
                    requested: MediaType::TextHtml,
                },
                StatusCode::BAD_REQUEST,
            ),
            (FragmentError::payload_too_large(2, 1), StatusCode::PAYLOAD_TOO_LARGE),
            (FragmentError::backend("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_backend_details_are_hidden() {
        let err = ApiError::from(FragmentError::backend("table 'prod' unreachable"));
        assert_eq!(err.message(), "Unable to process request");

        let err = ApiError::from(FragmentError::ConversionNotImplemented {
            from: MediaType::TextCsv,
            to: MediaType::ApplicationYaml,
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Unable to process request");
    }
}
