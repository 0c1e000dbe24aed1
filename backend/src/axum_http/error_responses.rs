use axum::{
    Json,
    http::{HeaderMap, StatusCode, header::ACCEPT},
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::usecases::{UseCaseError, scan_resolver::ScanError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for UseCaseError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (error, message) = match &self {
            UseCaseError::NotFound(_) => ("NOT_FOUND", self.to_string()),
            UseCaseError::Forbidden => ("FORBIDDEN", self.to_string()),
            UseCaseError::Conflict(msg) => ("CONFLICT", msg.clone()),
            UseCaseError::QuotaExceeded(_) => ("QUOTA_EXCEEDED", self.to_string()),
            UseCaseError::BadRequest(msg) => ("BAD_REQUEST", msg.clone()),
            UseCaseError::Internal(err) => {
                // Don't leak internal error detail to client
                error!(error = ?err, "http: internal error");
                ("INTERNAL_ERROR", "Internal server error".to_string())
            }
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            error,
            message,
        });

        (status, body).into_response()
    }
}

pub fn scan_error_response(err: &ScanError, as_json: bool) -> Response {
    let status = err.status_code();

    if as_json {
        let body = Json(ErrorResponse {
            code: status.as_u16(),
            error: err.error_code(),
            message: err.public_message().to_string(),
        });
        return (status, body).into_response();
    }

    let page = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n</head>\n<body style=\"font-family:sans-serif;text-align:center;padding:3rem 1rem\">\n\
         <h1>{title}</h1>\n<p>{message}</p>\n</body>\n</html>\n",
        title = page_title(status),
        message = err.public_message(),
    );

    (status, Html(page)).into_response()
}

fn page_title(status: StatusCode) -> &'static str {
    match status {
        StatusCode::NOT_FOUND => "QR code not found",
        StatusCode::FORBIDDEN => "Unavailable",
        _ => "Something went wrong",
    }
}

pub fn prefers_json(headers: &HeaderMap) -> bool {
    let Some(accept) = headers.get(ACCEPT).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let mut json_q = 0.0_f32;
    let mut html_q = 0.0_f32;

    for range in accept.split(',') {
        let mut parts = range.split(';');
        let media = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
        let q = parts
            .filter_map(|param| param.trim().strip_prefix("q="))
            .find_map(|value| value.trim().parse::<f32>().ok())
            .unwrap_or(1.0);

        if media == "application/json" || media.ends_with("+json") {
            json_q = json_q.max(q);
        } else if media == "text/html" || media == "application/xhtml+xml" {
            html_q = html_q.max(q);
        }
    }

    json_q > html_q
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn accept(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn browser_accept_gets_html() {
        assert!(!prefers_json(&accept(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
        )));
        assert!(!prefers_json(&HeaderMap::new()));
        assert!(!prefers_json(&accept("*/*")));
    }

    #[test]
    fn api_accept_gets_json() {
        assert!(prefers_json(&accept("application/json")));
        assert!(prefers_json(&accept("text/html;q=0.5, application/json")));
        assert!(prefers_json(&accept("application/problem+json")));
    }

    #[test]
    fn scan_error_status_codes() {
        assert_eq!(
            scan_error_response(&ScanError::CodeInvalid, false).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            scan_error_response(&ScanError::SubscriptionInactive, true).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            scan_error_response(&ScanError::DataInconsistent, true).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_use_case_error_hides_details() {
        let response =
            UseCaseError::Internal(anyhow::anyhow!("password authentication failed")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
