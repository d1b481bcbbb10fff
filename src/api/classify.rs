use crate::error::{render_detail, ApiError};
use crate::models::ErrorBody;
use reqwest::StatusCode;
use serde_json::Value;

/// Map a non-2xx response to the shared error taxonomy.
///
/// `body` is the raw response text; a JSON `detail` field is extracted when
/// present.
pub fn classify(status: StatusCode, body: &str) -> ApiError {
    let detail = extract_detail(body);

    match status {
        StatusCode::UNAUTHORIZED => ApiError::AuthenticationRejected {
            detail: render_detail(&detail),
        },
        StatusCode::FORBIDDEN => ApiError::AuthorizationDenied {
            detail: render_detail(&detail),
        },
        StatusCode::NOT_FOUND => ApiError::NotFound {
            detail: render_detail(&detail),
        },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ApiError::ValidationRejected {
                status: status.as_u16(),
                detail,
            }
        }
        _ => ApiError::ServerFault {
            status: status.as_u16(),
            detail: render_detail(&detail).or_else(|| {
                let text = body.trim();
                (!text.is_empty() && text.len() <= 200).then(|| text.to_string())
            }),
        },
    }
}

/// Map a transport failure (no response received).
pub fn classify_transport(err: &reqwest::Error) -> ApiError {
    if err.is_builder() {
        ApiError::Request(err.to_string())
    } else {
        ApiError::NetworkUnavailable(err.to_string())
    }
}

fn extract_detail(body: &str) -> Value {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.detail)
        .unwrap_or(Value::Null)
}
