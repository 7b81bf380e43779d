use actix_web::{http::StatusCode, Error, HttpResponse};

/// Terminal authentication rejections. First rejection wins; no further
/// validation steps run. Each variant maps to a fixed status and JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    MissingToken,
    InvalidToken,
    AccountNotFound,
    AccountBlocked,
    SubjectMismatch,
    DeviceMismatch,
    Unexpected(String),
}

impl AuthRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthRejection::AccountBlocked => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn message(&self) -> String {
        match self {
            AuthRejection::MissingToken => "No authentication token found".to_string(),
            AuthRejection::InvalidToken => "Invalid or expired token".to_string(),
            AuthRejection::AccountNotFound => "User not found".to_string(),
            AuthRejection::AccountBlocked => "Account is blocked".to_string(),
            AuthRejection::SubjectMismatch | AuthRejection::DeviceMismatch => {
                "Token validation failed".to_string()
            }
            AuthRejection::Unexpected(message) => format!("Token validation failed: {}", message),
        }
    }

    /// Converts the rejection into an actix error whose response carries the
    /// exact `{"error": ...}` JSON body for this variant.
    pub fn into_error(self) -> Error {
        let message = self.message();
        let response = HttpResponse::build(self.status()).json(serde_json::json!({
            "error": message
        }));
        actix_web::error::InternalError::from_response(message, response).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_is_forbidden_everything_else_unauthorized() {
        assert_eq!(AuthRejection::AccountBlocked.status(), StatusCode::FORBIDDEN);
        for rejection in [
            AuthRejection::MissingToken,
            AuthRejection::InvalidToken,
            AuthRejection::AccountNotFound,
            AuthRejection::SubjectMismatch,
            AuthRejection::DeviceMismatch,
            AuthRejection::Unexpected("boom".to_string()),
        ] {
            assert_eq!(rejection.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_unexpected_embeds_cause() {
        let rejection = AuthRejection::Unexpected("directory offline".to_string());
        assert_eq!(rejection.message(), "Token validation failed: directory offline");
    }
}
